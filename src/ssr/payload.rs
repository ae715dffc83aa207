use serde_json::value::RawValue;

/// Data embedded into the shell for client hydration.
///
/// A slot is serialized only when its fetch ran and succeeded; empty slots are left out
/// of the JSON object entirely.
#[derive(Debug, Default, serde::Serialize)]
pub struct SsrPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub containers: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Box<RawValue>>,
}

impl SsrPayload {
    pub fn is_empty(&self) -> bool {
        self.docker.is_none()
            && self.containers.is_none()
            && self.members.is_none()
            && self.settings.is_none()
    }

    /// Compact JSON containing only the populated slots.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Availability summary stored in the `docker` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DockerStatus {
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> Option<Box<RawValue>> {
        Some(RawValue::from_string(json.to_owned()).unwrap())
    }

    #[test]
    fn test_empty_payload() {
        let payload = SsrPayload::default();
        assert!(payload.is_empty());
        assert_eq!(payload.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_absent_slots_are_omitted() {
        let payload = SsrPayload {
            members: raw(r#"{"count":2}"#),
            ..Default::default()
        };
        assert!(!payload.is_empty());
        assert_eq!(payload.to_json().unwrap(), r#"{"members":{"count":2}}"#);
    }

    #[test]
    fn test_raw_slots_pass_through_verbatim() {
        let payload = SsrPayload {
            docker: raw(r#"{"available":true}"#),
            containers: raw(r#"[{"name":"valkey-1"}]"#),
            settings: raw(r#"{"theme":"dark","limits":[1,2.5,null]}"#),
            ..Default::default()
        };
        assert_eq!(
            payload.to_json().unwrap(),
            r#"{"docker":{"available":true},"containers":[{"name":"valkey-1"}],"settings":{"theme":"dark","limits":[1,2.5,null]}}"#
        );
    }
}

use super::payload::SsrPayload;
use super::{Error, Result};

/// Textual anchor the hydration script is inserted in front of.
pub const SPLICE_MARKER: &[u8] = b"</head>";
/// Global property the client reads the payload from.
pub const GLOBAL_PROPERTY: &str = "__SSR_DATA__";

const ESCAPED_LT: &str = "\\u003c";

/// Rewrites every `<` so the JSON cannot open or close markup inside the script element
/// it is embedded in. This covers `</script` in any letter case as well as `<!--`, which
/// would otherwise switch the tokenizer into its escaped script states.
///
/// Valid JSON only carries `<` inside string literals, where `\u003c` decodes back to
/// the same character.
pub fn escape_for_script(json: &str) -> String {
    json.replace('<', ESCAPED_LT)
}

/// Wraps already escaped JSON in an inline script assigning [`GLOBAL_PROPERTY`].
pub fn hydration_script(safe_json: &str) -> String {
    format!("<script>window.{GLOBAL_PROPERTY}={safe_json};</script>")
}

/// Inserts `snippet` before the first [`SPLICE_MARKER`].
///
/// Returns `None` if the document has no marker.
pub fn splice(document: &[u8], snippet: &[u8]) -> Option<Vec<u8>> {
    let pos = document
        .windows(SPLICE_MARKER.len())
        .position(|window| window == SPLICE_MARKER)?;

    let mut out = Vec::with_capacity(document.len() + snippet.len());
    out.extend_from_slice(&document[..pos]);
    out.extend_from_slice(snippet);
    out.extend_from_slice(&document[pos..]);
    Some(out)
}

/// Serializes, escapes and splices `payload` into `document`.
///
/// `Ok(None)` means the document has no splice point and should be served as is.
///
/// # Errors
///
/// Returns [`Error::Serialize`] if the payload cannot be serialized.
pub fn inject_payload(document: &[u8], payload: &SsrPayload) -> Result<Option<Vec<u8>>> {
    let json = payload.to_json().map_err(Error::Serialize)?;
    let script = hydration_script(&escape_for_script(&json));
    Ok(splice(document, script.as_bytes()))
}

/// Turns a soft failure into `None`, logging it at the given level.
///
/// Used wherever a failed step should degrade the result rather than fail the request.
pub trait ResultLogExt<T, E> {
    fn ok_log(self, level: log::Level, context: &str) -> Option<T>;
}

impl<T, E> ResultLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, level: log::Level, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::log!(level, "{context}: {err}");
                None
            }
        }
    }
}

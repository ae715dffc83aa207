/// Entry point for the Admin Console backend.
///
/// This binary serves the admin dashboard: it reports on and controls the managed Docker
/// containers and serves the single-page shell with page data already embedded.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., invalid environment variables or an
/// unusable listen address).
///
/// # Examples
///
/// ```bash
/// ADMIN_SESSION_TOKENS=secret HOLOLIVE_BOT_URL=http://hololive-bot:8080 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    admin_console::run().await
}

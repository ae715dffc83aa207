use std::sync::Arc;

use error::ResultLogExt;

/// Admin Console: the backend of a small admin dashboard.
///
/// This library reports on and controls the managed Docker containers of a deployment and
/// serves the dashboard's single-page shell with the data of the requested page already
/// embedded, so the first paint does not wait for client-side fetches.
pub mod api;
pub mod config;
pub mod docker;
pub mod error;
pub mod fsutil;
pub mod ssr;

/// Runs the Admin Console server.
///
/// Reads the configuration, connects to the local Docker daemon, loads the HTML shell and
/// serves the API until the listener fails.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid environment variables (e.g., a malformed `ADMIN_LISTEN_ADDR`).
/// - Failure to build the HTTP client used for the peer bot.
/// - Failure to bind the listen address.
///
/// An unreachable Docker daemon is not an error; container features then report the runtime
/// as unavailable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Configuration: {:?}", config);

    let collector = if config.docker_enabled {
        docker::Collector::connect_local(config.filters.clone())
            .ok_log(log::Level::Warn, "failed to connect to Docker")
            .map(Arc::new)
    } else {
        log::info!("Docker integration disabled");
        None
    };

    let peer = ssr::PeerClient::new(config.peer_bot_url.clone())?;
    if !peer.is_configured() {
        log::info!("No peer bot configured; bot data is never prefetched");
    }
    let pipeline = Arc::new(ssr::Pipeline::new(collector.clone(), peer));

    match &config.web_dir {
        Some(web_dir) => {
            pipeline
                .load_cache_from_disk(web_dir.join(api::INDEX_FILE))
                .ok_log(log::Level::Warn, "failed to load HTML shell");
        }
        None => pipeline.load_cache_from_bytes(ssr::EMBEDDED_SHELL),
    }

    let authenticator = Arc::new(api::StaticTokenAuthenticator::new(
        config.session_tokens.iter().cloned(),
    ));
    let state = api::AppState::new(pipeline, collector, authenticator, config.web_dir.clone());

    api::APIServer::new(state).listen(config.listen_addr).await?;
    Ok(())
}

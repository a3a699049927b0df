use anyhow::Context;

use httpkit_auth::AuthConfig;
use httpkit_server::{Server, ServerConfig, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    httpkit_observability::init();

    let server_config = ServerConfig::from_env().context("invalid server configuration")?;
    let auth_config = AuthConfig::from_env().context("invalid auth configuration")?;

    let routes = app::build_app(&server_config, &auth_config)?;
    let server = Server::bind(&server_config).await?;

    let handle = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            handle.stop();
        }
    });

    server.start(routes).await?;
    Ok(())
}

/// Dashtable HTTP/WebSocket Server
///
/// Serves the dashboard datasets found in `DASHBOARD_DATA_DIR`, the table
/// query endpoint and WebSocket view sessions.

use dashtable::config::DashboardConfig;
use dashtable::server::run_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Host, port and data directory come from the environment
    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    run_server(config).await
}

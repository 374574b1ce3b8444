use cantina_server::utils::init_logger_with_file;
use cantina_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Starting cantina-server"
    );

    let state = ServerState::initialize(config).await?;
    Server::new(state).run().await
}

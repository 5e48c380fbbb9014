use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use vitaledge_core::PipelineConfig;
use vitaledge_pipeline::EdgeProcessor;
use vitaledge_server::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "vitaledge-server", about = "Edge-side vital sign pipeline")]
struct Cli {
    /// Path to the pipeline configuration document.
    #[arg(long, env = "VITALEDGE_CONFIG", default_value = "config/vitaledge.json")]
    config: PathBuf,

    #[arg(long, env = "VITALEDGE_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "VITALEDGE_PORT", default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    vitaledge_core::config::load_dotenv();
    let cli = Cli::parse();

    let config = PipelineConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading pipeline config from {}", cli.config.display()))?;
    config.log_summary();

    let processor = EdgeProcessor::from_config(&config);
    let state = Arc::new(AppState::new(processor));
    let app = build_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

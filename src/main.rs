use vazhabot::{config::Config, logging, run};
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::new()?;
    logging::init(config.log_level, config.log_dir().as_deref())?;
    let config = Arc::new(RwLock::new(config));

    run(config).await?;

    Ok(())
}

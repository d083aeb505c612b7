use std::io;

use demo_charts::{
    chart::DemoContext,
    config::{DemoConfig, DEFAULT_CONFIG_PATH},
    controller, file_logger, stderr_logger,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = DemoConfig::load_or_default(DEFAULT_CONFIG_PATH)?;
    let _guard = match &config.log_dir {
        Some(dir) => Some(file_logger(dir, "main")?),
        None => {
            stderr_logger()?;
            None
        }
    };
    info!("start, seed: {}", config.seed);
    let mut ctx = DemoContext::from_config(&config);
    controller::run(io::stdin().lock(), &mut io::stdout().lock(), &mut ctx)?;
    Ok(())
}

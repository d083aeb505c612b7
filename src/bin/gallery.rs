//! Renders every chart into `./gallery/<chart>.png`.
use demo_charts::{
    chart::{draw_kind, ChartKind, DemoContext},
    config::{DemoConfig, DEFAULT_CONFIG_PATH},
    stderr_logger,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    stderr_logger()?;
    let config = DemoConfig::load_or_default(DEFAULT_CONFIG_PATH)?;
    let mut ctx = DemoContext::from_config(&config);
    std::fs::create_dir_all("./gallery")?;
    for kind in ChartKind::ALL {
        let path = format!("./gallery/{}.png", kind.slug());
        draw_kind(kind, &mut ctx)?.save_png(&path)?;
        info!("{} -> {}", kind, path);
    }
    Ok(())
}

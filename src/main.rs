mod app;
mod audio;
mod cli;
mod config;
mod error;
mod loader;
mod sampler;
mod ui;

use anyhow::Context;
use clap::Parser;

use cli::Cli;
use config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.clone().or_else(config::discover) {
        Some(path) => {
            let cfg = Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => Config::default(),
    };
    cli.apply(&mut config);

    log::info!("Source: {}", config.source.location);
    log::info!(
        "Waveform: {} blocks from channel {}",
        config.waveform.samples,
        config.waveform.channel
    );

    app::run(config).map_err(|e| anyhow::anyhow!("UI exited with an error: {e}"))
}

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "waveplayer", about = "Audio player with a condensed waveform")]
pub struct Cli {
    /// Audio URL (http/https) or local file path
    #[arg(short, long)]
    pub source: Option<String>,

    /// Number of waveform blocks
    #[arg(long)]
    pub samples: Option<usize>,

    /// Channel used for the waveform
    #[arg(long)]
    pub channel: Option<usize>,

    /// Config file (defaults to waveplayer.toml or the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Values given on the command line win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.source.location = source.clone();
        }
        if let Some(samples) = self.samples {
            config.waveform.samples = samples;
        }
        if let Some(channel) = self.channel {
            config.waveform.channel = channel;
        }
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Audio played when neither the CLI nor a config file names a source.
pub const DEFAULT_SOURCE: &str =
    "http://localhost:9002/mongo-api/d949281e5714b880c5ff32881f43ca3f.wav";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// URL (`http://`, `https://`) or filesystem path.
    #[serde(default = "default_location")]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaveformConfig {
    /// Number of blocks the channel is reduced to.
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default)]
    pub channel: usize,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_canvas_width")]
    pub width: f32,
    #[serde(default = "default_canvas_height")]
    pub height: f32,
    /// RGB triple, 0-255.
    #[serde(default = "default_stroke")]
    pub stroke: [u8; 3],
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            channel: 0,
            padding: default_padding(),
            width: default_canvas_width(),
            height: default_canvas_height(),
            stroke: default_stroke(),
            background: default_background(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

fn default_location() -> String { DEFAULT_SOURCE.into() }
fn default_samples() -> usize { 120 }
fn default_padding() -> f32 { 20.0 }
fn default_canvas_width() -> f32 { 200.0 }
fn default_canvas_height() -> f32 { 75.0 }
fn default_stroke() -> [u8; 3] { [0, 0, 0] }
fn default_background() -> [u8; 3] { [245, 245, 220] }
fn default_window_width() -> f32 { 540.0 }
fn default_window_height() -> f32 { 220.0 }

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a config file. A missing file is an error here; callers
    /// decide whether that matters.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// `waveplayer.toml` in the working directory, then the platform config dir.
pub fn discover() -> Option<PathBuf> {
    let local = PathBuf::from("waveplayer.toml");
    if local.exists() {
        return Some(local);
    }
    let platform = dirs::config_dir()?.join("waveplayer").join("config.toml");
    platform.exists().then_some(platform)
}

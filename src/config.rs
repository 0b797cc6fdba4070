use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::colors::Theme;
use crate::lyrics_client::DEFAULT_PROXY_URL;
use crate::playback::DEFAULT_VOLUME;

/// Terminal music player with audio-reactive visuals and karaoke lyrics.
#[derive(Parser, Debug, Clone)]
#[command(name = "sonic-vision")]
pub struct PlayerCli {
    /// Audio file to play.
    #[arg(long, conflicts_with = "song")]
    pub file: Option<PathBuf>,

    /// Id of a catalog song to play.
    #[arg(long)]
    pub song: Option<String>,

    #[arg(long, default_value = "songs/catalog.toml")]
    pub catalog: PathBuf,

    /// Lyrics search for --file, defaults to the file name.
    #[arg(long)]
    pub lyrics_query: Option<String>,

    /// Lyrics proxy endpoint.
    #[arg(long, default_value = DEFAULT_PROXY_URL)]
    pub proxy_url: String,

    /// Skip the lyrics lookup for files.
    #[arg(long)]
    pub no_lyrics_lookup: bool,

    /// Output device, matched by name.
    #[arg(long)]
    pub device: Option<String>,

    /// Theme name or style (neon, minimal, retro).
    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long, default_value_t = DEFAULT_VOLUME)]
    pub volume: f32,

    #[arg(long, default_value = "sonic-vision.log")]
    pub log_file: PathBuf,

    /// Print the output devices and exit.
    #[arg(long)]
    pub list_devices: bool,

    /// TOML file whose values override the command line.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PlayerFileConfig {
    pub catalog: Option<PathBuf>,
    pub proxy_url: Option<String>,
    pub lyrics_lookup: Option<bool>,
    pub device: Option<String>,
    pub theme: Option<String>,
    pub volume: Option<f32>,
    pub log_file: Option<PathBuf>,
}

impl PlayerFileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub file: Option<PathBuf>,
    pub song: Option<String>,
    pub catalog: PathBuf,
    pub lyrics_query: Option<String>,
    pub proxy_url: Option<String>,
    pub lookup_timeout: Duration,
    pub device: Option<String>,
    pub theme: Theme,
    pub volume: f32,
    pub log_file: PathBuf,
}

impl PlayerConfig {
    /// File values win over CLI values where present.
    pub fn resolve(cli: &PlayerCli, file_config: Option<PlayerFileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let theme_name = file.theme.or_else(|| cli.theme.clone());
        let theme = match theme_name {
            Some(name) => match Theme::find(&name) {
                Some(theme) => theme,
                None => bail!("Unknown theme: {}", name),
            },
            None => Theme::default(),
        };

        let lookup_enabled = file.lyrics_lookup.unwrap_or(!cli.no_lyrics_lookup);
        let proxy_url = lookup_enabled.then(|| file.proxy_url.unwrap_or_else(|| cli.proxy_url.clone()));

        Ok(Self {
            file: cli.file.clone(),
            song: cli.song.clone(),
            catalog: file.catalog.unwrap_or_else(|| cli.catalog.clone()),
            lyrics_query: cli.lyrics_query.clone(),
            proxy_url,
            // covers the proxy's own pre-delay and upstream timeout
            lookup_timeout: Duration::from_secs(15),
            device: file.device.or_else(|| cli.device.clone()),
            theme,
            volume: file.volume.unwrap_or(cli.volume).clamp(0.0, 1.0),
            log_file: file.log_file.unwrap_or_else(|| cli.log_file.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = PlayerCli::parse_from(["sonic-vision"]);
        let config = PlayerConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.catalog, PathBuf::from("songs/catalog.toml"));
        assert_eq!(config.volume, 0.7);
        assert_eq!(config.theme.name, "Neon Dreams");
        assert_eq!(config.proxy_url.as_deref(), Some(DEFAULT_PROXY_URL));
        assert_eq!(config.log_file, PathBuf::from("sonic-vision.log"));
    }

    #[test]
    fn test_file_and_song_conflict() {
        assert!(PlayerCli::try_parse_from(["sonic-vision", "--file", "a.mp3", "--song", "x"]).is_err());
    }

    #[test]
    fn test_file_config_overrides() {
        let cli = PlayerCli::parse_from(["sonic-vision", "--theme", "retro", "--volume", "0.2"]);
        let file: PlayerFileConfig = toml::from_str(
            r#"
            theme = "Minimal Wave"
            volume = 3.0
            lyrics_lookup = false
            "#,
        )
        .unwrap();
        let config = PlayerConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.theme.name, "Minimal Wave");
        assert_eq!(config.volume, 1.0);
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_unknown_theme() {
        let cli = PlayerCli::parse_from(["sonic-vision", "--theme", "vaporwave"]);
        assert!(PlayerConfig::resolve(&cli, None).is_err());
    }
}

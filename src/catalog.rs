use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::lyrics::LyricsDocument;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate song id '{0}'")]
    DuplicateId(String),
}

/// A song shipped with the player, lyrics included.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PreloadedSong {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Audio file, relative to the catalog file unless absolute.
    pub audio: PathBuf,
    #[serde(default)]
    pub lyrics: String,
}

impl PreloadedSong {
    pub fn document(&self) -> LyricsDocument {
        LyricsDocument::parse(self.lyrics.as_str())
            .with_credits(Some(self.artist.clone()), Some(self.title.clone()))
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "song")]
    songs: Vec<PreloadedSong>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    songs: Vec<PreloadedSong>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let catalog = Self::from_toml_str(&text, base_dir)?;
        info!("Loaded {} songs from {:?}", catalog.songs.len(), path);
        Ok(catalog)
    }

    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;

        let mut seen = HashSet::new();
        let mut songs = Vec::with_capacity(file.songs.len());
        for mut song in file.songs {
            if !seen.insert(song.id.clone()) {
                return Err(CatalogError::DuplicateId(song.id));
            }
            if song.audio.is_relative() {
                song.audio = base_dir.join(&song.audio);
            }
            songs.push(song);
        }
        Ok(Self { songs })
    }

    pub fn songs(&self) -> &[PreloadedSong] {
        &self.songs
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&PreloadedSong> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// The song after `id`, wrapping around. Starts at the first song when
    /// `id` is unknown or absent.
    pub fn next_after(&self, id: Option<&str>) -> Option<&PreloadedSong> {
        let position = id.and_then(|id| self.songs.iter().position(|song| song.id == id));
        match position {
            Some(index) => self.songs.get((index + 1) % self.songs.len()),
            None => self.songs.first(),
        }
    }
}

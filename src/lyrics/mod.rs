//! Lyrics text and the approximate line timing used by the karaoke view.

pub mod karaoke;

pub use karaoke::{KaraokeView, LineRole};

/// Track length assumed when spreading lines over time. Lines are not
/// aligned to real timestamps; every line gets `ESTIMATED_DURATION_SECS / N`.
pub const ESTIMATED_DURATION_SECS: f64 = 180.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LyricsDocument {
    raw_text: String,
    lines: Vec<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
}

impl LyricsDocument {
    /// Splits on line breaks, trimming each line and dropping blank ones.
    pub fn parse(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let lines = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self {
            raw_text,
            lines,
            artist: None,
            title: None,
        }
    }

    pub fn with_credits(mut self, artist: Option<String>, title: Option<String>) -> Self {
        self.artist = artist.filter(|a| !a.trim().is_empty());
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `"artist - title"`, or whichever of the two is known.
    pub fn heading(&self) -> Option<String> {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => Some(format!("{} - {}", artist, title)),
            (Some(artist), None) => Some(artist.clone()),
            (None, Some(title)) => Some(title.clone()),
            (None, None) => None,
        }
    }
}

/// Line index for `current_time` with `line_count` evenly spread lines, or
/// `None` when it falls past the last line or there is nothing to show.
pub fn estimate_line(current_time: f64, line_count: usize) -> Option<usize> {
    if line_count == 0 || current_time <= 0.0 || !current_time.is_finite() {
        return None;
    }
    let line_interval = ESTIMATED_DURATION_SECS / line_count as f64;
    let index = (current_time / line_interval).floor() as usize;
    (index < line_count).then_some(index)
}

/// Tracks the highlighted line as playback time advances.
#[derive(Clone, Debug, Default)]
pub struct LineEstimator {
    line_count: usize,
    current: usize,
}

impl LineEstimator {
    pub fn new(line_count: usize) -> Self {
        Self {
            line_count,
            current: 0,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Replaces the document; the highlight goes back to the first line.
    pub fn reset(&mut self, line_count: usize) {
        self.line_count = line_count;
        self.current = 0;
    }

    /// Feeds a time update. Returns the new index when the highlight moves.
    pub fn update(&mut self, current_time: f64) -> Option<usize> {
        let index = estimate_line(current_time, self.line_count)?;
        if index == self.current {
            return None;
        }
        self.current = index;
        Some(index)
    }
}

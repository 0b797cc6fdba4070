//! Playback state machine over a media element.
//!
//! The controller owns [`PlaybackState`] and is the only thing that mutates
//! it, either from user actions or from lifecycle events observed on the
//! element by [`PlaybackController::poll`].

pub mod rodio_element;

pub use rodio_element::RodioElement;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio::{FrequencyAnalyzer, SampleTap};
use crate::catalog::PreloadedSong;

pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{path} is not an audio file (detected {detected})")]
    NotAudio { path: PathBuf, detected: String },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported media: {0}")]
    Decode(String),
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("nothing loaded")]
    NotLoaded,
    #[error("analyzer unavailable: {0}")]
    Analyzer(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Loaded,
    Playing,
    Paused,
    Ended,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MediaSource {
    /// A file the user picked; checked with [`validate_upload`] first.
    File(PathBuf),
    Catalog(PreloadedSong),
}

impl MediaSource {
    pub fn path(&self) -> &Path {
        match self {
            MediaSource::File(path) => path,
            MediaSource::Catalog(song) => &song.audio,
        }
    }

    pub fn label(&self) -> String {
        match self {
            MediaSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Unknown".to_string()),
            MediaSource::Catalog(song) => format!("{} - {}", song.artist, song.title),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    TimeUpdate(f64),
    Ended,
}

/// What the controller needs from something that plays audio.
pub trait MediaElement {
    fn load(&mut self, source: &MediaSource) -> Result<(), MediaError>;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: f64) -> Result<(), MediaError>;
    fn set_volume(&mut self, volume: f32);
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Known once metadata is available.
    fn duration(&self) -> Option<f64>;
    fn is_ended(&self) -> bool;
    /// Starts copying played samples into a tap for analysis.
    fn connect_analyzer(&mut self) -> Result<SampleTap, MediaError>;
}

/// Rejects files that do not sniff as audio.
pub fn validate_upload(path: &Path) -> Result<(), MediaError> {
    let kind = infer::get_from_path(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    match kind {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Audio => {
            debug!("Upload {:?} detected as {}", path, kind.mime_type());
            Ok(())
        }
        other => Err(MediaError::NotAudio {
            path: path.to_path_buf(),
            detected: other
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        }),
    }
}

pub struct PlaybackController<E: MediaElement> {
    element: E,
    status: PlayerStatus,
    state: PlaybackState,
    source: Option<MediaSource>,
    analyzer: Option<FrequencyAnalyzer>,
    analyzer_attempted: bool,
    metadata_reported: bool,
    /// Events raised by controller calls, handed out by the next poll.
    queued: Vec<MediaEvent>,
}

impl<E: MediaElement> PlaybackController<E> {
    pub fn new(element: E) -> Self {
        Self::with_volume(element, DEFAULT_VOLUME)
    }

    pub fn with_volume(mut element: E, volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        element.set_volume(volume);
        Self {
            element,
            status: PlayerStatus::Idle,
            state: PlaybackState {
                volume,
                ..PlaybackState::default()
            },
            source: None,
            analyzer: None,
            analyzer_attempted: false,
            metadata_reported: false,
            queued: Vec::new(),
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn analyzer_mut(&mut self) -> Option<&mut FrequencyAnalyzer> {
        self.analyzer.as_mut()
    }

    /// Whether the visualization should be running.
    pub fn visualization_active(&self) -> bool {
        self.state.is_playing && self.analyzer.is_some()
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    /// Replaces the current source. On failure the controller is unchanged.
    pub fn load(&mut self, source: MediaSource) -> Result<(), MediaError> {
        if let MediaSource::File(path) = &source {
            if let Err(e) = validate_upload(path) {
                warn!("Rejected upload: {}", e);
                return Err(e);
            }
        }
        if let Err(e) = self.element.load(&source) {
            warn!("Failed to load {}: {}", source.label(), e);
            return Err(e);
        }
        self.element.set_volume(self.state.volume);

        info!("Loaded {}", source.label());
        self.source = Some(source);
        self.status = PlayerStatus::Loaded;
        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.metadata_reported = false;
        self.queued.clear();
        Ok(())
    }

    pub fn play(&mut self) {
        match self.status {
            PlayerStatus::Idle | PlayerStatus::Playing => return,
            PlayerStatus::Ended => {
                if let Err(e) = self.element.seek(0.0) {
                    warn!("Failed to rewind: {}", e);
                    return;
                }
                self.state.current_time = 0.0;
                self.queued.push(MediaEvent::TimeUpdate(0.0));
            }
            PlayerStatus::Loaded | PlayerStatus::Paused => {}
        }

        if !self.analyzer_attempted {
            self.analyzer_attempted = true;
            match self.element.connect_analyzer() {
                Ok(tap) => self.analyzer = Some(FrequencyAnalyzer::new(tap)),
                Err(e) => warn!("Visualization disabled: {}", e),
            }
        }

        if let Err(e) = self.element.play() {
            warn!("Failed to start playback: {}", e);
            return;
        }
        self.status = PlayerStatus::Playing;
        self.state.is_playing = true;
    }

    pub fn pause(&mut self) {
        if self.status != PlayerStatus::Playing {
            return;
        }
        self.element.pause();
        self.status = PlayerStatus::Paused;
        self.state.is_playing = false;
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Clamps to `[0, duration]`, or only to `>= 0` while the duration is
    /// unknown. The new position is reported by the next [`poll`] in every
    /// state, so lyrics follow seeks made while paused.
    ///
    /// [`poll`]: PlaybackController::poll
    pub fn seek(&mut self, position: f64) {
        if self.status == PlayerStatus::Idle || !position.is_finite() {
            return;
        }
        let mut target = position.max(0.0);
        if self.state.duration > 0.0 {
            target = target.min(self.state.duration);
        }
        if let Err(e) = self.element.seek(target) {
            warn!("Seek to {:.1}s failed: {}", target, e);
            return;
        }
        self.state.current_time = target;
        self.queued.push(MediaEvent::TimeUpdate(target));
        if self.status == PlayerStatus::Ended && target < self.state.duration {
            self.status = PlayerStatus::Paused;
        }
    }

    pub fn seek_by(&mut self, offset: f64) {
        self.seek(self.state.current_time + offset);
    }

    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        self.state.volume = volume.clamp(0.0, 1.0);
        self.element.set_volume(self.state.volume);
    }

    /// Reads the element and reports what changed since the last poll.
    pub fn poll(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        if self.status == PlayerStatus::Idle {
            return events;
        }

        if !self.metadata_reported {
            if let Some(duration) = self.element.duration().filter(|d| d.is_finite()) {
                self.metadata_reported = true;
                self.state.duration = duration.max(0.0);
                events.push(MediaEvent::LoadedMetadata {
                    duration: self.state.duration,
                });
            }
        }
        events.append(&mut self.queued);

        if self.status != PlayerStatus::Playing {
            return events;
        }

        let mut time = self.element.current_time().max(0.0);
        if self.state.duration > 0.0 {
            time = time.min(self.state.duration);
        }
        if time != self.state.current_time {
            self.state.current_time = time;
            events.push(MediaEvent::TimeUpdate(time));
        }

        if self.element.is_ended() {
            debug!("Playback ended");
            self.status = PlayerStatus::Ended;
            self.state.is_playing = false;
            if self.state.duration > 0.0 {
                self.state.current_time = self.state.duration;
            }
            events.push(MediaEvent::Ended);
        }
        events
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeMediaElement;
    use super::*;
    use crate::lyrics::LineEstimator;
    use std::fs;

    fn song() -> MediaSource {
        MediaSource::Catalog(PreloadedSong {
            id: "demo".into(),
            title: "Demo".into(),
            artist: "Nobody".into(),
            audio: PathBuf::from("demo.mp3"),
            lyrics: String::new(),
        })
    }

    fn loaded(duration: f64) -> PlaybackController<FakeMediaElement> {
        let element = FakeMediaElement {
            duration: Some(duration),
            ..Default::default()
        };
        let mut controller = PlaybackController::new(element);
        controller.load(song()).unwrap();
        controller.poll();
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = PlaybackController::new(FakeMediaElement::default());
        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert_eq!(controller.state().volume, 0.7);
        assert_eq!(controller.element().volume, 0.7);
        assert!(!controller.visualization_active());
    }

    #[test]
    fn test_play_pause_cycle() {
        let mut controller = loaded(100.0);
        assert_eq!(controller.status(), PlayerStatus::Loaded);
        assert_eq!(controller.state().duration, 100.0);

        controller.play();
        assert_eq!(controller.status(), PlayerStatus::Playing);
        assert!(controller.state().is_playing);
        assert!(controller.visualization_active());

        controller.toggle();
        assert_eq!(controller.status(), PlayerStatus::Paused);
        assert!(!controller.element().playing);
        controller.toggle();
        assert_eq!(controller.status(), PlayerStatus::Playing);
    }

    #[test]
    fn test_play_while_idle_is_noop() {
        let mut controller = PlaybackController::new(FakeMediaElement::default());
        controller.play();
        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert_eq!(controller.element().analyzer_calls.get(), 0);
    }

    #[test]
    fn test_analyzer_attempted_once() {
        let element = FakeMediaElement {
            fail_analyzer: true,
            duration: Some(10.0),
            ..Default::default()
        };
        let calls = element.analyzer_calls.clone();
        let mut controller = PlaybackController::new(element);
        controller.load(song()).unwrap();

        controller.play();
        assert_eq!(controller.status(), PlayerStatus::Playing);
        assert!(!controller.visualization_active());
        controller.pause();
        controller.play();
        controller.load(song()).unwrap();
        controller.play();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_new_source_while_playing_resets() {
        let mut controller = loaded(100.0);
        controller.play();
        controller.element.time = 42.0;
        controller.poll();
        assert_eq!(controller.state().current_time, 42.0);

        controller.load(song()).unwrap();
        assert_eq!(controller.status(), PlayerStatus::Loaded);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(controller.state().duration, 0.0);
    }

    #[test]
    fn test_failed_load_changes_nothing() {
        let mut controller = loaded(100.0);
        controller.play();
        controller.element.fail_load = true;
        assert!(controller.load(song()).is_err());
        assert_eq!(controller.status(), PlayerStatus::Playing);
        assert_eq!(controller.state().duration, 100.0);
    }

    #[test]
    fn test_seek_clamps() {
        let mut controller = loaded(100.0);
        controller.seek(150.0);
        assert_eq!(controller.state().current_time, 100.0);
        controller.seek(-3.0);
        assert_eq!(controller.state().current_time, 0.0);
        controller.seek_by(5.0);
        assert_eq!(controller.state().current_time, 5.0);
        assert_eq!(controller.element().seeks, vec![100.0, 0.0, 5.0]);
    }

    #[test]
    fn test_seek_without_duration_only_clamps_below() {
        let mut controller = PlaybackController::new(FakeMediaElement::default());
        controller.load(song()).unwrap();
        controller.seek(1000.0);
        assert_eq!(controller.state().current_time, 1000.0);
    }

    #[test]
    fn test_volume_clamps() {
        let mut controller = loaded(10.0);
        controller.set_volume(1.5);
        assert_eq!(controller.state().volume, 1.0);
        controller.set_volume(-0.2);
        assert_eq!(controller.state().volume, 0.0);
        assert_eq!(controller.element().volume, 0.0);
    }

    #[test]
    fn test_poll_reports_time_and_end() {
        let mut controller = loaded(10.0);
        controller.play();
        controller.element.time = 4.0;
        assert_eq!(controller.poll(), vec![MediaEvent::TimeUpdate(4.0)]);
        assert!(controller.poll().is_empty());

        controller.element.time = 12.0;
        controller.element.ended = true;
        let events = controller.poll();
        assert_eq!(events, vec![MediaEvent::TimeUpdate(10.0), MediaEvent::Ended]);
        assert_eq!(controller.status(), PlayerStatus::Ended);
        assert!(!controller.state().is_playing);
        assert!(controller.state().current_time <= controller.state().duration);
    }

    #[test]
    fn test_loaded_metadata_reported_once() {
        let mut controller = PlaybackController::new(FakeMediaElement {
            duration: Some(30.0),
            ..Default::default()
        });
        controller.load(song()).unwrap();
        assert_eq!(
            controller.poll(),
            vec![MediaEvent::LoadedMetadata { duration: 30.0 }]
        );
        assert!(controller.poll().is_empty());
    }

    #[test]
    fn test_replay_after_end_starts_from_zero() {
        let mut controller = loaded(10.0);
        controller.play();
        controller.element.ended = true;
        controller.poll();

        controller.play();
        assert_eq!(controller.status(), PlayerStatus::Playing);
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(controller.element().seeks.last(), Some(&0.0));
    }

    #[test]
    fn test_seek_while_paused_moves_lyrics() {
        let mut controller = loaded(180.0);
        let mut estimator = LineEstimator::new(60);
        controller.play();
        controller.pause();

        controller.seek(90.0);
        let events = controller.poll();
        assert_eq!(events, vec![MediaEvent::TimeUpdate(90.0)]);
        for event in events {
            if let MediaEvent::TimeUpdate(time) = event {
                estimator.update(time);
            }
        }
        assert_eq!(estimator.current(), 30);
        assert!(controller.poll().is_empty());
    }

    #[test]
    fn test_seek_after_end_is_reported() {
        let mut controller = loaded(10.0);
        controller.play();
        controller.element.ended = true;
        controller.poll();

        controller.seek(4.0);
        assert_eq!(controller.status(), PlayerStatus::Paused);
        assert_eq!(controller.poll(), vec![MediaEvent::TimeUpdate(4.0)]);
    }

    #[test]
    fn test_load_drops_queued_seeks() {
        let mut controller = loaded(10.0);
        controller.seek(3.0);
        controller.load(song()).unwrap();
        assert_eq!(
            controller.poll(),
            vec![MediaEvent::LoadedMetadata { duration: 10.0 }]
        );
    }

    #[test]
    fn test_non_audio_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "just some text").unwrap();

        let mut controller = PlaybackController::new(FakeMediaElement::default());
        let err = controller.load(MediaSource::File(path)).unwrap_err();
        assert!(matches!(err, MediaError::NotAudio { .. }));
        assert_eq!(controller.status(), PlayerStatus::Idle);
        assert!(controller.element().loaded.is_none());
    }

    #[test]
    fn test_audio_upload_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        // minimal RIFF/WAVE header
        let mut bytes = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        fs::write(&path, bytes).unwrap();

        assert!(validate_upload(&path).is_ok());
        let mut controller = PlaybackController::new(FakeMediaElement::default());
        controller.load(MediaSource::File(path)).unwrap();
        assert_eq!(controller.status(), PlayerStatus::Loaded);
    }
}

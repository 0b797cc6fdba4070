use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{MediaElement, MediaError, MediaSource};
use crate::audio::{SampleTap, TapSource};

/// Plays through a rodio sink, one sink per source.
///
/// Seeking reopens the file and starts a fresh sink at the target, so the
/// position is `seek_base + sink position`.
pub struct RodioElement {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    seek_base: Duration,
    volume: f32,
    paused: bool,
    tap: SampleTap,
}

impl RodioElement {
    /// Opens the named output device, or the default one.
    pub fn open(device_name: Option<&str>) -> Result<Self, MediaError> {
        let builder = match device_name {
            Some(name) => {
                let device = Self::find_output_device(name)?;
                OutputStreamBuilder::from_device(device)
                    .map_err(|e| MediaError::Output(e.to_string()))?
            }
            None => OutputStreamBuilder::from_default_device()
                .map_err(|e| MediaError::Output(e.to_string()))?,
        };
        let mut stream = builder
            .open_stream_or_fallback()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // the terminal belongs to the UI
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            path: None,
            duration: None,
            seek_base: Duration::ZERO,
            volume: 1.0,
            paused: true,
            tap: SampleTap::new(),
        })
    }

    fn find_output_device(name: &str) -> Result<cpal::Device, MediaError> {
        let host = cpal::default_host();
        let wanted = name.to_lowercase();
        let devices = host
            .output_devices()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name.to_lowercase().contains(&wanted) {
                    info!("Using output device: {}", device_name);
                    return Ok(device);
                }
            }
        }
        Err(MediaError::Output(format!("no output device matching '{}'", name)))
    }

    /// Names of the available output devices.
    pub fn output_device_names() -> Vec<String> {
        let host = cpal::default_host();
        match host.output_devices() {
            Ok(devices) => devices.filter_map(|device| device.name().ok()).collect(),
            Err(e) => {
                warn!("Could not list output devices: {}", e);
                Vec::new()
            }
        }
    }

    fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, MediaError> {
        let file = File::open(path).map_err(|source| MediaError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode(e.to_string()))
    }

    /// Queues `source` on a fresh sink, replacing the current one.
    fn start_sink(&mut self, source: Decoder<BufReader<File>>) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        if self.paused {
            sink.pause();
        }
        sink.append(TapSource::new(source, self.tap.clone()));
        self.sink = Some(sink);
        self.tap.clear();
    }
}

impl MediaElement for RodioElement {
    fn load(&mut self, source: &MediaSource) -> Result<(), MediaError> {
        let path = source.path();
        let decoder = Self::decode(path)?;
        self.duration = decoder.total_duration();
        debug!("Decoded {:?}, duration {:?}", path, self.duration);

        self.paused = true;
        self.seek_base = Duration::ZERO;
        self.path = Some(path.to_path_buf());
        self.start_sink(decoder);
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let sink = self.sink.as_ref().ok_or(MediaError::NotLoaded)?;
        sink.play();
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.paused = true;
    }

    fn seek(&mut self, position: f64) -> Result<(), MediaError> {
        let path = self.path.clone().ok_or(MediaError::NotLoaded)?;
        let mut target = Duration::from_secs_f64(position.max(0.0));
        if let Some(total) = self.duration {
            target = target.min(total);
        }

        let mut decoder = Self::decode(&path)?;
        if let Err(e) = decoder.try_seek(target) {
            return Err(MediaError::Decode(e.to_string()));
        }
        self.start_sink(decoder);
        self.seek_base = target;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn current_time(&self) -> f64 {
        let played = self
            .sink
            .as_ref()
            .map(|sink| sink.get_pos())
            .unwrap_or_default();
        (self.seek_base + played).as_secs_f64()
    }

    fn duration(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }

    fn is_ended(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.empty())
    }

    fn connect_analyzer(&mut self) -> Result<SampleTap, MediaError> {
        self.tap.connect();
        Ok(self.tap.clone())
    }
}

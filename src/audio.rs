use rodio::Source;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::analysis::{Analyzer, FrequencySnapshot, FFT_SIZE};

/// Anything the render loop can pull one snapshot per frame from.
pub trait SnapshotSource {
    fn snapshot(&mut self) -> Option<&FrequencySnapshot>;
}

/// Shared ring of the most recent mono samples heading to the output.
///
/// The tap stays inert until [`SampleTap::connect`] is called, so the
/// playback path pays nothing before the analyzer exists.
#[derive(Clone, Default)]
pub struct SampleTap {
    buffer: Arc<Mutex<Vec<f32>>>,
    connected: Arc<AtomicBool>,
}

impl SampleTap {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::with_capacity(FFT_SIZE * 2))),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Appends interleaved samples, down-mixing each frame to mono.
    pub fn push_frame(&self, frame: &[f32]) {
        if frame.is_empty() || !self.is_connected() {
            return;
        }
        let mono = frame.iter().sum::<f32>() / frame.len() as f32;

        if let Ok(mut buf) = self.buffer.try_lock() {
            buf.push(mono);

            // Keep buffer size manageable
            if buf.len() > FFT_SIZE * 4 {
                buf.drain(0..FFT_SIZE * 2);
            }
        }
    }

    /// Get latest samples for analysis.
    pub fn latest(&self) -> Vec<f32> {
        let Ok(buf) = self.buffer.lock() else {
            return Vec::new();
        };
        if buf.len() >= FFT_SIZE {
            buf[buf.len() - FFT_SIZE..].to_vec()
        } else {
            buf.clone()
        }
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }
}

/// Pass-through source that copies what it yields into a [`SampleTap`].
///
/// Every sample reaches the sink unchanged.
pub struct TapSource<S> {
    inner: S,
    tap: SampleTap,
    channels: usize,
    frame: Vec<f32>,
}

impl<S> TapSource<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, tap: SampleTap) -> Self {
        let channels = inner.channels().max(1) as usize;
        Self {
            inner,
            tap,
            channels,
            frame: Vec::with_capacity(channels),
        }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;

        self.frame.push(sample);
        if self.frame.len() == self.channels {
            self.tap.push_frame(&self.frame);
            self.frame.clear();
        }

        Some(sample)
    }
}

impl<S> Source for TapSource<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.frame.clear();
        self.inner.try_seek(pos)
    }
}

/// The analyzer node: a connected tap plus an FFT over its latest samples.
pub struct FrequencyAnalyzer {
    tap: SampleTap,
    analyzer: Analyzer,
}

impl FrequencyAnalyzer {
    pub fn new(tap: SampleTap) -> Self {
        tap.connect();
        Self {
            tap,
            analyzer: Analyzer::new(),
        }
    }
}

impl SnapshotSource for FrequencyAnalyzer {
    fn snapshot(&mut self) -> Option<&FrequencySnapshot> {
        let samples = self.tap.latest();
        Some(self.analyzer.process(&samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn test_disconnected_tap_records_nothing() {
        let tap = SampleTap::new();
        tap.push_frame(&[0.5, 0.5]);
        assert!(tap.latest().is_empty());
    }

    #[test]
    fn test_tap_downmixes_to_mono() {
        let tap = SampleTap::new();
        tap.connect();
        tap.push_frame(&[1.0, 0.0]);
        tap.push_frame(&[0.5, 0.5]);
        assert_eq!(tap.latest(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_tap_buffer_stays_bounded() {
        let tap = SampleTap::new();
        tap.connect();
        for _ in 0..FFT_SIZE * 5 {
            tap.push_frame(&[0.1]);
        }
        assert_eq!(tap.latest().len(), FFT_SIZE);
        assert!(tap.buffer.lock().unwrap().len() <= FFT_SIZE * 4);
    }

    #[test]
    fn test_tap_source_is_non_destructive() {
        let samples = vec![0.1, -0.2, 0.3, -0.4, 0.5, -0.6];
        let tap = SampleTap::new();
        tap.connect();
        let source = TapSource::new(SamplesBuffer::new(2, 44100, samples.clone()), tap.clone());

        let played: Vec<f32> = source.collect();

        assert_eq!(played, samples);
        assert_eq!(tap.latest().len(), 3);
    }

    #[test]
    fn test_analyzer_connects_tap() {
        let tap = SampleTap::new();
        let mut analyzer = FrequencyAnalyzer::new(tap.clone());
        assert!(tap.is_connected());
        let snapshot = analyzer.snapshot().unwrap();
        assert!(snapshot.bins().iter().all(|&b| b == 0));
    }
}

use rustfft::{num_complex::Complex, FftPlanner};

pub const FFT_SIZE: usize = 2048;
pub const BIN_COUNT: usize = FFT_SIZE / 2;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING_TIME_CONSTANT: f32 = 0.8;

/// Per-bin byte magnitudes for one analysis frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencySnapshot {
    bins: Vec<u8>,
}

impl FrequencySnapshot {
    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Turns the most recent `FFT_SIZE` samples into a [`FrequencySnapshot`].
///
/// Scaling follows a Web Audio analyser node: magnitudes are normalized by
/// the FFT size, smoothed over time, converted to decibels and mapped
/// linearly from `[MIN_DECIBELS, MAX_DECIBELS]` onto `[0, 255]`.
pub struct Analyzer {
    fft: std::sync::Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    snapshot: FrequencySnapshot,
}

impl Analyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Hanning window
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();

        Self {
            fft,
            window,
            smoothed: vec![0.0; BIN_COUNT],
            snapshot: FrequencySnapshot::silent(BIN_COUNT),
        }
    }

    pub fn snapshot(&self) -> &FrequencySnapshot {
        &self.snapshot
    }

    /// Process raw mono samples. With fewer than `FFT_SIZE` samples the
    /// previous snapshot is kept.
    pub fn process(&mut self, samples: &[f32]) -> &FrequencySnapshot {
        if samples.len() < FFT_SIZE {
            return &self.snapshot;
        }

        let recent = &samples[samples.len() - FFT_SIZE..];
        let mut buffer: Vec<Complex<f32>> = recent
            .iter()
            .zip(self.window.iter())
            .map(|(s, w)| Complex::new(s * w, 0.0))
            .collect();

        self.fft.process(&mut buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(buffer.iter().take(BIN_COUNT)) {
            let magnitude = bin.norm() * scale;
            *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed
                + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;
        }

        let bins = self.smoothed.iter().map(|&m| Self::to_byte(m)).collect();
        self.snapshot = FrequencySnapshot::from_bins(bins);
        &self.snapshot
    }

    fn to_byte(magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * magnitude.log10();
        let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_creation() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.window.len(), FFT_SIZE);
        assert_eq!(analyzer.snapshot().len(), BIN_COUNT);
        assert!(BIN_COUNT.is_power_of_two());
    }

    #[test]
    fn test_process_silence() {
        let mut analyzer = Analyzer::new();
        let silence = vec![0.0f32; FFT_SIZE];
        let snapshot = analyzer.process(&silence);
        assert!(snapshot.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_input_keeps_previous_snapshot() {
        let mut analyzer = Analyzer::new();
        let before = analyzer.snapshot().clone();
        let after = analyzer.process(&[0.5; 16]).clone();
        assert_eq!(before, after);
    }

    #[test]
    fn test_process_sine_wave() {
        let mut analyzer = Analyzer::new();
        // Generate 440Hz sine wave
        let samples: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let snapshot = analyzer.process(&samples);

        // 440Hz lands around bin 20 at 44.1kHz
        let (peak, _) = snapshot
            .bins()
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .unwrap();
        assert!((19..=22).contains(&peak), "peak at bin {}", peak);
        assert!(snapshot.bins()[peak] > 200);
        assert!(snapshot.bins()[BIN_COUNT - 1] < snapshot.bins()[peak]);
    }

    #[test]
    fn test_decibel_mapping() {
        assert_eq!(Analyzer::to_byte(0.0), 0);
        assert_eq!(Analyzer::to_byte(1e-6), 0); // -120 dB
        assert_eq!(Analyzer::to_byte(1.0), 255); // 0 dB
        let mid = Analyzer::to_byte(10f32.powf(-65.0 / 20.0));
        assert!((126..=128).contains(&mid));
    }
}

//! Audio onset detection.
//!
//! Computes an onset-strength envelope with spectral flux:
//! STFT magnitude spectrogram, frame-to-frame difference, half-wave
//! rectification, sum across bins. Peaks of the envelope are picked with
//! sliding max/mean windows and a refractory period, matching the
//! pre/post/delta/wait peak-picking policy the detection thresholds were
//! tuned against.

use std::f32::consts::PI;

use rustfft::{FftPlanner, num_complex::Complex};

use crate::analysis::Waveform;
use crate::constants::onset;

/// Peak-picking policy for the onset envelope.
#[derive(Debug, Clone, Copy)]
pub struct PeakPicking {
    /// Frames before a candidate that must not exceed it.
    pub pre_max: usize,
    /// Frames after a candidate that must not exceed it.
    pub post_max: usize,
    /// Frames before a candidate included in the local mean.
    pub pre_avg: usize,
    /// Frames after a candidate included in the local mean.
    pub post_avg: usize,
    /// Minimum prominence above the local mean.
    pub delta: f32,
    /// Minimum number of frames between consecutive peaks.
    pub wait: usize,
}

impl Default for PeakPicking {
    fn default() -> Self {
        Self {
            pre_max: onset::PRE_MAX,
            post_max: onset::POST_MAX,
            pre_avg: onset::PRE_AVG,
            post_avg: onset::POST_AVG,
            delta: onset::DELTA,
            wait: onset::WAIT,
        }
    }
}

/// Onset detector over a mono waveform.
#[derive(Debug)]
pub struct OnsetDetector {
    n_fft: usize,
    hop_length: usize,
    picking: PeakPicking,
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self::new(PeakPicking::default())
    }
}

impl OnsetDetector {
    /// Create a detector with the given peak-picking policy.
    #[must_use]
    pub fn new(picking: PeakPicking) -> Self {
        Self {
            n_fft: onset::N_FFT,
            hop_length: onset::HOP_LENGTH,
            picking,
        }
    }

    /// Return ascending timestamps (seconds) of significant onsets.
    ///
    /// Silent or empty audio yields an empty sequence.
    #[must_use]
    pub fn detect(&self, waveform: &Waveform) -> Vec<f64> {
        let envelope = self.onset_envelope(&waveform.samples);
        let peaks = pick_peaks(&envelope, self.picking);

        #[allow(clippy::cast_precision_loss)]
        let frame_secs = self.hop_length as f64 / f64::from(waveform.sample_rate);
        peaks
            .into_iter()
            .map(|frame| frame as f64 * frame_secs)
            .collect()
    }

    /// Compute the peak-normalized onset-strength envelope.
    ///
    /// Returns an empty vector for input shorter than one STFT window or
    /// with no spectral energy, so downstream peak picking trivially yields
    /// no onsets.
    fn onset_envelope(&self, samples: &[f32]) -> Vec<f32> {
        let spectrogram = self.stft_magnitude(samples);
        if spectrogram.len() < 2 {
            return Vec::new();
        }

        // Spectral flux: positive frame-to-frame magnitude change, summed
        // across bins. First frame has no predecessor.
        let mut envelope = Vec::with_capacity(spectrogram.len());
        envelope.push(0.0_f32);
        for pair in spectrogram.windows(2) {
            let flux: f32 = pair[1]
                .iter()
                .zip(pair[0].iter())
                .map(|(cur, prev)| (cur - prev).max(0.0))
                .sum();
            envelope.push(flux);
        }

        // Normalize to peak 1.0 so `delta` is independent of signal scale.
        let max = envelope.iter().fold(0.0_f32, |acc, &v| acc.max(v));
        if max <= 0.0 {
            return Vec::new();
        }
        for v in &mut envelope {
            *v /= max;
        }
        envelope
    }

    /// Hann-windowed STFT magnitudes, one `Vec<f32>` of bins per frame.
    fn stft_magnitude(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        if samples.len() < self.n_fft {
            return Vec::new();
        }

        let window: Vec<f32> = (0..self.n_fft)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let phase = 2.0 * PI * i as f32 / self.n_fft as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(self.n_fft);
        let num_bins = self.n_fft / 2 + 1;

        let mut frames = Vec::new();
        let mut buffer = vec![Complex::new(0.0_f32, 0.0_f32); self.n_fft];

        let mut start = 0;
        while start + self.n_fft <= samples.len() {
            for (slot, (&s, &w)) in buffer
                .iter_mut()
                .zip(samples[start..start + self.n_fft].iter().zip(window.iter()))
            {
                *slot = Complex::new(s * w, 0.0);
            }
            fft.process(&mut buffer);
            frames.push(buffer[..num_bins].iter().map(|c| c.norm()).collect());
            start += self.hop_length;
        }

        frames
    }
}

/// Pick peak indices from an envelope.
///
/// A frame `i` is a peak when it is the maximum of
/// `[i - pre_max, i + post_max]`, exceeds the mean of
/// `[i - pre_avg, i + post_avg]` by at least `delta`, and lies more than
/// `wait` frames after the previously selected peak. Windows are clipped at
/// the array bounds.
#[must_use]
pub(crate) fn pick_peaks(envelope: &[f32], p: PeakPicking) -> Vec<usize> {
    let n = envelope.len();
    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;

    for i in 0..n {
        if let Some(last) = last_peak {
            if i - last <= p.wait {
                continue;
            }
        }

        let max_lo = i.saturating_sub(p.pre_max);
        let max_hi = (i + p.post_max + 1).min(n);
        let window_max = envelope[max_lo..max_hi]
            .iter()
            .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        if envelope[i] < window_max {
            continue;
        }

        let avg_lo = i.saturating_sub(p.pre_avg);
        let avg_hi = (i + p.post_avg + 1).min(n);
        #[allow(clippy::cast_precision_loss)]
        let window_mean =
            envelope[avg_lo..avg_hi].iter().sum::<f32>() / (avg_hi - avg_lo) as f32;
        if envelope[i] < window_mean + p.delta {
            continue;
        }

        peaks.push(i);
        last_peak = Some(i);
    }

    peaks
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn policy() -> PeakPicking {
        PeakPicking {
            pre_max: 3,
            post_max: 3,
            pre_avg: 3,
            post_avg: 5,
            delta: 0.5,
            wait: 10,
        }
    }

    #[test]
    fn test_pick_peaks_empty_envelope() {
        assert!(pick_peaks(&[], policy()).is_empty());
    }

    #[test]
    fn test_pick_peaks_flat_envelope_has_no_peaks() {
        let env = vec![0.2_f32; 64];
        assert!(pick_peaks(&env, policy()).is_empty());
    }

    #[test]
    fn test_pick_peaks_single_impulse() {
        let mut env = vec![0.0_f32; 64];
        env[20] = 1.0;
        assert_eq!(pick_peaks(&env, policy()), vec![20]);
    }

    #[test]
    fn test_pick_peaks_respects_wait() {
        let mut env = vec![0.0_f32; 64];
        env[20] = 1.0;
        env[25] = 1.0; // within wait=10 of the first peak
        env[40] = 1.0;
        assert_eq!(pick_peaks(&env, policy()), vec![20, 40]);
    }

    #[test]
    fn test_pick_peaks_requires_prominence() {
        // Peak sits on a high plateau; local mean + delta is not exceeded.
        let mut env = vec![0.9_f32; 64];
        env[20] = 1.0;
        assert!(pick_peaks(&env, policy()).is_empty());
    }

    #[test]
    fn test_detect_silent_waveform_is_empty() {
        let waveform = Waveform {
            samples: vec![0.0; 44_100],
            sample_rate: 44_100,
        };
        let detector = OnsetDetector::default();
        assert!(detector.detect(&waveform).is_empty());
    }

    #[test]
    fn test_detect_empty_waveform_is_empty() {
        let waveform = Waveform {
            samples: Vec::new(),
            sample_rate: 44_100,
        };
        let detector = OnsetDetector::default();
        assert!(detector.detect(&waveform).is_empty());
    }

    #[test]
    fn test_detect_finds_burst_in_silence() {
        // 3 seconds of silence with a short loud noise burst at t=1.5s.
        let sr = 22_050_u32;
        let mut samples = vec![0.0_f32; (sr * 3) as usize];
        let burst_start = (f64::from(sr) * 1.5) as usize;
        for (i, s) in samples[burst_start..burst_start + 2048].iter_mut().enumerate() {
            // Noisy burst; deterministic pseudo-noise to avoid a rand dep.
            #[allow(clippy::cast_precision_loss)]
            let x = (i as f32 * 12.9898).sin() * 43_758.547;
            *s = (x - x.floor()) * 2.0 - 1.0;
        }
        let waveform = Waveform {
            samples,
            sample_rate: sr,
        };

        let times = OnsetDetector::default().detect(&waveform);
        assert_eq!(times.len(), 1);
        assert!((times[0] - 1.5).abs() < 0.1, "onset at {}", times[0]);
    }
}

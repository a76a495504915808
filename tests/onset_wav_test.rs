//! End-to-end onset detection on a synthesized WAV file.

use reelcut::analysis::{OnsetDetector, decode_waveform};

/// Write a mono 16-bit WAV: silence with a short noise burst at `burst_at`
/// seconds.
fn write_burst_wav(path: &std::path::Path, sample_rate: u32, total_secs: f64, burst_at: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    let total = (total_secs * f64::from(sample_rate)) as usize;
    let burst_start = (burst_at * f64::from(sample_rate)) as usize;
    let burst_len = sample_rate as usize / 10;

    // Deterministic pseudo-noise so the burst has broadband energy.
    let mut state = 0x2545_f491_u32;
    for i in 0..total {
        let sample = if (burst_start..burst_start + burst_len).contains(&i) {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 16) as i16) / 2
        } else {
            0
        };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_burst_onset_detected_near_its_start() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("burst.wav");
    write_burst_wav(&wav, 22_050, 3.0, 1.5);

    let waveform = decode_waveform(&wav).unwrap();
    assert_eq!(waveform.sample_rate, 22_050);
    assert!((waveform.duration_secs() - 3.0).abs() < 0.05);

    let onsets = OnsetDetector::default().detect(&waveform);

    assert!(!onsets.is_empty(), "expected an onset for the noise burst");
    assert!(
        (onsets[0] - 1.5).abs() < 0.15,
        "onset at {} too far from burst start",
        onsets[0]
    );
}

#[test]
fn test_silence_has_no_onsets() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("silence.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav, spec).unwrap();
    for _ in 0..22_050 * 2 {
        writer.write_sample(0_i16).unwrap();
    }
    writer.finalize().unwrap();

    let waveform = decode_waveform(&wav).unwrap();
    let onsets = OnsetDetector::default().detect(&waveform);

    assert!(onsets.is_empty());
}

//! Waveform decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded waveform as mono f32 samples in [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Mono samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Duration of the waveform in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.samples.len() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Decode an audio file to a mono waveform.
///
/// The extraction step upstream writes mono 16-bit PCM, but any format
/// symphonia understands (WAV, FLAC, MP3, AAC) is accepted; multi-channel
/// input is mixed down. An empty file yields an empty sample vector, not an
/// error.
pub fn decode_waveform(path: &Path) -> Result<Waveform> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        mix_to_mono(&decoded, &mut samples);
    }

    Ok(Waveform {
        samples,
        sample_rate,
    })
}

/// Downmix a decoded buffer to mono and append to `output`.
fn mix_to_mono(buffer: &AudioBufferRef, output: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::F32(buf) => {
            let channels = buf.spec().channels.count();
            append_frames(output, buf.frames(), channels, |ch, i| buf.chan(ch)[i]);
        }
        AudioBufferRef::S16(buf) => {
            let channels = buf.spec().channels.count();
            append_frames(output, buf.frames(), channels, |ch, i| {
                f32::from(buf.chan(ch)[i]) / 32768.0
            });
        }
        AudioBufferRef::S32(buf) => {
            let channels = buf.spec().channels.count();
            append_frames(output, buf.frames(), channels, |ch, i| {
                #[allow(clippy::cast_precision_loss)]
                {
                    buf.chan(ch)[i] as f32 / 2_147_483_648.0
                }
            });
        }
        // Other sample formats do not occur in the PCM waveforms we extract.
        _ => {}
    }
}

fn append_frames<F>(output: &mut Vec<f32>, frames: usize, channels: usize, sample: F)
where
    F: Fn(usize, usize) -> f32,
{
    if channels <= 1 {
        output.extend((0..frames).map(|i| sample(0, i)));
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let norm = channels as f32;
    for i in 0..frames {
        let sum: f32 = (0..channels).map(|ch| sample(ch, i)).sum();
        output.push(sum / norm);
    }
}

use super::{AudioSink, AudioUnit, PlaybackOutcome};
use crate::state::AppEvent;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::Cursor;
use std::sync::mpsc::Sender as EventSender;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid wav: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported wav: {0}")]
    Unsupported(String),
    #[error("audio clip is empty")]
    Empty,
    #[error("output device: {0}")]
    Device(String),
}

/// Interleaved samples in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate.max(1) as f64)
    }
}

pub fn decode_unit(payload: &str) -> Result<DecodedAudio, PlaybackError> {
    let bytes = BASE64.decode(payload.trim())?;
    decode_wav(&bytes)
}

pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, PlaybackError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(PlaybackError::Unsupported(format!(
            "{} channels at {}Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if bits == 0 || bits > 32 {
                return Err(PlaybackError::Unsupported(format!(
                    "{} bits per sample",
                    bits
                )));
            }
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    if samples.is_empty() {
        return Err(PlaybackError::Empty);
    }
    Ok(DecodedAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Linear interpolation over one channel of a complete clip.
pub fn resample_linear(samples: &[f32], input_rate: u32, target_rate: u32) -> Vec<f32> {
    if samples.is_empty() || input_rate == target_rate || input_rate == 0 || target_rate == 0 {
        return samples.to_vec();
    }
    let step = input_rate as f64 / target_rate as f64;
    let out_len = ((samples.len() as f64 / step).floor() as usize).max(1);
    let last = samples.len() - 1;
    let mut out = Vec::with_capacity(out_len);
    for n in 0..out_len {
        let pos = n as f64 * step;
        let i = (pos.floor() as usize).min(last);
        let frac = (pos - i as f64) as f32;
        let s0 = samples[i];
        let s1 = samples[(i + 1).min(last)];
        out.push(s0 + (s1 - s0) * frac);
    }
    out
}

/// Resamples and remaps a decoded clip to the device's rate and channel count.
pub fn prepare_for_device(audio: &DecodedAudio, out_rate: u32, out_channels: u16) -> Vec<f32> {
    let src_channels = audio.channels.max(1) as usize;
    let out_channels = out_channels.max(1) as usize;

    let planes: Vec<Vec<f32>> = (0..src_channels)
        .map(|c| {
            let plane: Vec<f32> = audio
                .samples
                .iter()
                .skip(c)
                .step_by(src_channels)
                .copied()
                .collect();
            resample_linear(&plane, audio.sample_rate, out_rate)
        })
        .collect();
    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);

    let mut out = Vec::with_capacity(frames * out_channels);
    for n in 0..frames {
        if out_channels == 1 && src_channels > 1 {
            let sum: f32 = planes.iter().map(|p| p[n]).sum();
            out.push(sum / src_channels as f32);
            continue;
        }
        for c in 0..out_channels {
            out.push(planes[c % src_channels][n]);
        }
    }
    out
}

/// Sink used when no output device is available: every unit fails at once,
/// so the queue keeps draining.
pub struct NullSink {
    events: EventSender<AppEvent>,
    reason: String,
}

impl NullSink {
    pub fn new(events: EventSender<AppEvent>, reason: impl Into<String>) -> Self {
        Self {
            events,
            reason: reason.into(),
        }
    }
}

impl AudioSink for NullSink {
    fn play(&mut self, unit: AudioUnit) {
        let _ = self.events.send(AppEvent::PlaybackFinished {
            unit_id: unit.id,
            outcome: PlaybackOutcome::Failed(self.reason.clone()),
        });
    }
}

/// Opens the configured output device, or a `NullSink` when that fails.
pub fn open_sink(output_device: &str, events: EventSender<AppEvent>) -> Box<dyn AudioSink> {
    #[cfg(feature = "audio-output")]
    {
        let name = Some(output_device.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        match device::DevicePlayer::start(name, events.clone()) {
            Ok(player) => Box::new(player),
            Err(e) => {
                log::warn!("[audio] playback unavailable: {}", e);
                Box::new(NullSink::new(events, e))
            }
        }
    }
    #[cfg(not(feature = "audio-output"))]
    {
        let _ = output_device;
        Box::new(NullSink::new(events, "audio output disabled"))
    }
}

#[cfg(feature = "audio-output")]
pub use device::DevicePlayer;

#[cfg(feature = "audio-output")]
mod device {
    use super::{decode_unit, prepare_for_device, PlaybackError};
    use crate::audio::{AudioSink, AudioUnit, PlaybackOutcome};
    use crate::state::AppEvent;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::Sample;
    use std::sync::mpsc::{self, Sender as EventSender, SyncSender};
    use std::time::Duration;

    /// Slack on top of the clip length before a unit is declared stuck.
    const PLAYBACK_GRACE: Duration = Duration::from_secs(2);
    /// Lets the device buffer empty after the last sample is handed over.
    const TAIL_PADDING: Duration = Duration::from_millis(120);

    /// Plays units one at a time on a dedicated thread and reports each
    /// completion back as an `AppEvent`.
    pub struct DevicePlayer {
        tx: mpsc::Sender<AudioUnit>,
        events: EventSender<AppEvent>,
        _worker: std::thread::JoinHandle<()>,
    }

    impl DevicePlayer {
        pub fn start(
            device_name: Option<String>,
            events: EventSender<AppEvent>,
        ) -> Result<Self, String> {
            let (tx, rx) = mpsc::channel::<AudioUnit>();
            let worker_events = events.clone();
            let worker = std::thread::Builder::new()
                .name("jarvis-playback".into())
                .spawn(move || {
                    // cpal streams are not Send, so the device lives on this thread.
                    let device = find_output_device(device_name.as_deref());
                    match &device {
                        Ok(d) => log::info!(
                            "[audio] output device: {}",
                            d.name().unwrap_or_else(|_| "unknown".into())
                        ),
                        Err(e) => log::warn!("[audio] {}", e),
                    }
                    while let Ok(unit) = rx.recv() {
                        let result = match &device {
                            Ok(d) => play_payload(d, &unit.payload),
                            Err(e) => Err(PlaybackError::Device(e.clone())),
                        };
                        let outcome = match result {
                            Ok(()) => PlaybackOutcome::Finished,
                            Err(e) => {
                                log::warn!("[audio] unit {} skipped: {}", unit.id, e);
                                PlaybackOutcome::Failed(e.to_string())
                            }
                        };
                        if worker_events
                            .send(AppEvent::PlaybackFinished {
                                unit_id: unit.id,
                                outcome,
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                    log::info!("[audio] playback thread stopped");
                })
                .map_err(|e| format!("Failed to spawn playback thread: {}", e))?;

            Ok(Self {
                tx,
                events,
                _worker: worker,
            })
        }
    }

    impl AudioSink for DevicePlayer {
        fn play(&mut self, unit: AudioUnit) {
            if let Err(mpsc::SendError(unit)) = self.tx.send(unit) {
                let _ = self.events.send(AppEvent::PlaybackFinished {
                    unit_id: unit.id,
                    outcome: PlaybackOutcome::Failed("playback thread stopped".into()),
                });
            }
        }
    }

    fn find_output_device(name: Option<&str>) -> Result<cpal::Device, String> {
        let host = cpal::default_host();
        match name {
            Some(name) => host
                .output_devices()
                .map_err(|e| format!("Failed to list devices: {}", e))?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| format!("Device '{}' not found", name)),
            None => host
                .default_output_device()
                .ok_or_else(|| "No default output device".to_string()),
        }
    }

    fn play_payload(device: &cpal::Device, payload: &str) -> Result<(), PlaybackError> {
        let decoded = decode_unit(payload)?;
        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        let config: cpal::StreamConfig = supported.config();
        let samples = prepare_for_device(&decoded, config.sample_rate.0, config.channels);
        let expected = decoded.duration();

        let (done_tx, done_rx) = mpsc::sync_channel::<Result<(), String>>(2);
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, samples, done_tx)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, samples, done_tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(device, &config, samples, done_tx)?,
            other => {
                return Err(PlaybackError::Device(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };
        stream
            .play()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;

        let result = done_rx.recv_timeout(expected + PLAYBACK_GRACE);
        if matches!(result, Ok(Ok(()))) {
            std::thread::sleep(TAIL_PADDING);
        }
        drop(stream);
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(msg)) => Err(PlaybackError::Device(msg)),
            Err(_) => Err(PlaybackError::Device("playback timed out".into())),
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        samples: Vec<f32>,
        done_tx: SyncSender<Result<(), String>>,
    ) -> Result<cpal::Stream, PlaybackError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32> + Send + 'static,
    {
        let err_tx = done_tx.clone();
        let mut position = 0usize;
        let mut signalled = false;
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    for slot in data.iter_mut() {
                        *slot = match samples.get(position) {
                            Some(&s) => {
                                position += 1;
                                T::from_sample(s)
                            }
                            None => T::EQUILIBRIUM,
                        };
                    }
                    if position >= samples.len() && !signalled {
                        signalled = true;
                        let _ = done_tx.try_send(Ok(()));
                    }
                },
                move |err| {
                    log::warn!("[audio] stream error: {}", err);
                    let _ = err_tx.try_send(Err(err.to_string()));
                },
                None,
            )
            .map_err(|e| PlaybackError::Device(format!("Failed to build stream: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buf
    }

    fn pcm16(channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn decodes_base64_pcm16_wav() {
        let bytes = wav_bytes(pcm16(1, 22050), &[0, 16384, -16384, 32767]);
        let decoded = decode_unit(&BASE64.encode(&bytes)).unwrap();

        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.frames(), 4);
        assert_eq!(decoded.samples[0], 0.0);
        assert!((decoded.samples[1] - 0.5).abs() < 1e-4);
        assert!((decoded.samples[2] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn decodes_float_wav() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut buf = Vec::new();
        {
            let mut writer = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for s in [0.25f32, -0.25, 0.5, -0.5] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        let decoded = decode_wav(&buf).unwrap();
        assert_eq!(decoded.frames(), 2);
        assert_eq!(decoded.samples, vec![0.25, -0.25, 0.5, -0.5]);
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(matches!(
            decode_unit("***not base64***"),
            Err(PlaybackError::Base64(_))
        ));
        let not_wav = BASE64.encode(b"definitely not a riff header");
        assert!(matches!(decode_unit(&not_wav), Err(PlaybackError::Wav(_))));

        let empty = BASE64.encode(wav_bytes(pcm16(1, 16000), &[]));
        assert!(matches!(decode_unit(&empty), Err(PlaybackError::Empty)));
    }

    #[test]
    fn resample_changes_length_by_rate_ratio() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        assert_eq!(resample_linear(&input, 16000, 16000).len(), 100);
        assert_eq!(resample_linear(&input, 16000, 48000).len(), 300);
        assert_eq!(resample_linear(&input, 48000, 16000).len(), 33);

        let up = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(up, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn prepare_maps_channels() {
        let mono = DecodedAudio {
            samples: vec![0.1, 0.2],
            channels: 1,
            sample_rate: 16000,
        };
        assert_eq!(prepare_for_device(&mono, 16000, 2), vec![0.1, 0.1, 0.2, 0.2]);

        let stereo = DecodedAudio {
            samples: vec![0.2, 0.4, -0.2, -0.4],
            channels: 2,
            sample_rate: 16000,
        };
        let down = prepare_for_device(&stereo, 16000, 1);
        assert_eq!(down.len(), 2);
        assert!((down[0] - 0.3).abs() < 1e-6);
        assert!((down[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn null_sink_reports_failure_immediately() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut sink = NullSink::new(tx, "no device");
        sink.play(AudioUnit {
            id: 9,
            payload: String::new(),
        });
        match rx.try_recv().unwrap() {
            AppEvent::PlaybackFinished { unit_id, outcome } => {
                assert_eq!(unit_id, 9);
                assert_eq!(outcome, PlaybackOutcome::Failed("no device".into()));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}

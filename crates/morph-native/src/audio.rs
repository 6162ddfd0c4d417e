//! WAV playback through cpal with a mono tap for the analyser.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use particle_morph::constants::ANALYSER_FFT_SIZE;
use particle_morph::signal::{publish_cell, Publisher, Subscriber};
use particle_morph::FrequencySource;

/// Mono samples kept for the analyser; a few windows so a slow frame never
/// starves it.
const TAP_LEN: usize = ANALYSER_FFT_SIZE * 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    Playing,
    Paused,
    Stopped,
    Error(String),
}

/// Decoded file, interleaved `f32` in `[-1, 1]`.
struct Track {
    samples: Vec<f32>,
    channels: usize,
    sample_rate: u32,
}

impl Track {
    fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }
}

fn decode_wav(path: &Path) -> anyhow::Result<Track> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(Track {
        samples,
        channels: spec.channels.max(1) as usize,
        sample_rate: spec.sample_rate,
    })
}

struct Playback {
    track: Option<Track>,
    /// Position in source frames.
    cursor: f64,
    status: PlayerStatus,
    status_tx: Publisher<PlayerStatus>,
    playing: Arc<AtomicBool>,
    tap: VecDeque<f32>,
    tap_version: u64,
}

impl Playback {
    fn new(status_tx: Publisher<PlayerStatus>, playing: Arc<AtomicBool>) -> Self {
        Self {
            track: None,
            cursor: 0.0,
            status: PlayerStatus::Idle,
            status_tx,
            playing,
            tap: VecDeque::with_capacity(TAP_LEN),
            tap_version: 0,
        }
    }

    /// Every status change goes through here so readers on the frame loop
    /// never need the playback lock.
    fn set_status(&mut self, status: PlayerStatus) {
        if status == self.status {
            return;
        }
        self.playing
            .store(status == PlayerStatus::Playing, Ordering::Release);
        self.status_tx.publish(status.clone());
        self.status = status;
    }

    /// Produce one output frame into `frame` (one slot per device channel).
    fn next_frame(&mut self, frame: &mut [f32], device_rate: f32) {
        frame.fill(0.0);
        if self.status != PlayerStatus::Playing {
            return;
        }
        let Some(track) = self.track.as_ref() else {
            return;
        };
        let index = self.cursor as usize;
        if index >= track.frames() {
            self.cursor = 0.0;
            self.set_status(PlayerStatus::Stopped);
            return;
        }
        let src = &track.samples[index * track.channels..(index + 1) * track.channels];
        for (c, out) in frame.iter_mut().enumerate() {
            *out = src[c.min(track.channels - 1)];
        }
        let mono = src.iter().sum::<f32>() / track.channels as f32;
        self.cursor += track.sample_rate as f64 / device_rate as f64;

        if self.tap.len() == TAP_LEN {
            self.tap.pop_front();
        }
        self.tap.push_back(mono);
    }
}

fn lock(state: &Mutex<Playback>) -> MutexGuard<'_, Playback> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct AudioPlayer {
    state: Arc<Mutex<Playback>>,
    status: Subscriber<PlayerStatus>,
    playing: Arc<AtomicBool>,
    seen_version: u64,
    _stream: cpal::Stream,
}

impl AudioPlayer {
    /// Open the default output device. Nothing plays until a file is loaded.
    pub fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("No audio output device"))?;
        let config = device.default_output_config()?;
        log::info!(
            "audio output: {} Hz, {} channels, {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let (status_tx, status) = publish_cell(PlayerStatus::Idle);
        let playing = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(Playback::new(status_tx, Arc::clone(&playing))));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), Arc::clone(&state))?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), Arc::clone(&state))?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), Arc::clone(&state))?,
            other => anyhow::bail!("Unsupported sample format {other:?}"),
        };
        stream.play()?;

        Ok(Self {
            state,
            status,
            playing,
            seen_version: 0,
            _stream: stream,
        })
    }

    /// Decode `path` and make it the current track, stopped at the start.
    pub fn load(&mut self, path: &Path) -> anyhow::Result<()> {
        let track = match decode_wav(path) {
            Ok(t) => t,
            Err(e) => {
                lock(&self.state).set_status(PlayerStatus::Error(format!("{e:#}")));
                return Err(e);
            }
        };
        log::info!(
            "loaded {}: {} frames, {} channels, {} Hz",
            path.display(),
            track.frames(),
            track.channels,
            track.sample_rate
        );
        let mut s = lock(&self.state);
        s.track = Some(track);
        s.cursor = 0.0;
        s.tap.clear();
        s.set_status(PlayerStatus::Stopped);
        Ok(())
    }

    pub fn play(&mut self) {
        let mut s = lock(&self.state);
        if s.track.is_some() && s.status != PlayerStatus::Playing {
            s.set_status(PlayerStatus::Playing);
            log::info!("playback started");
        }
    }

    pub fn pause(&mut self) {
        let mut s = lock(&self.state);
        if s.status == PlayerStatus::Playing {
            s.set_status(PlayerStatus::Paused);
            log::info!("playback paused");
        }
    }

    pub fn toggle(&mut self) {
        if self.playing.load(Ordering::Acquire) {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn stop(&mut self) {
        let mut s = lock(&self.state);
        if s.track.is_some() {
            s.set_status(PlayerStatus::Stopped);
            s.cursor = 0.0;
            s.tap.clear();
            log::info!("playback stopped");
        }
    }

    /// Latest published status. Never waits on the audio thread.
    pub fn status(&mut self) -> PlayerStatus {
        self.status.get()
    }
}

impl FrequencySource for AudioPlayer {
    fn is_active(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    fn recent_samples(&mut self, out: &mut Vec<f32>) -> bool {
        // the frame loop must not wait on the audio thread
        let Ok(s) = self.state.try_lock() else {
            return false;
        };
        if s.tap_version == self.seen_version {
            return false;
        }
        self.seen_version = s.tap_version;
        out.clear();
        out.extend(s.tap.iter().copied());
        true
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    state: Arc<Mutex<Playback>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let device_rate = config.sample_rate.0 as f32;
    let err_state = Arc::clone(&state);
    let err_fn = move |err: cpal::StreamError| {
        log::error!("audio stream error: {err}");
        lock(&err_state).set_status(PlayerStatus::Error(err.to_string()));
    };
    let mut frame = vec![0.0f32; channels];

    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut s = lock(&state);
            for out in data.chunks_mut(channels) {
                s.next_frame(&mut frame, device_rate);
                for (o, &v) in out.iter_mut().zip(frame.iter()) {
                    *o = <T as Sample>::from_sample(v.clamp(-1.0, 1.0));
                }
            }
            if s.status == PlayerStatus::Playing {
                s.tap_version = s.tap_version.wrapping_add(1);
            }
        },
        err_fn,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playback() -> (Playback, Subscriber<PlayerStatus>, Arc<AtomicBool>) {
        let (tx, rx) = publish_cell(PlayerStatus::Idle);
        let playing = Arc::new(AtomicBool::new(false));
        (Playback::new(tx, Arc::clone(&playing)), rx, playing)
    }

    #[test]
    fn status_changes_reach_readers_without_the_lock() {
        let (mut pb, mut status, playing) = playback();
        pb.track = Some(Track {
            samples: vec![0.5, -0.5],
            channels: 1,
            sample_rate: 48_000,
        });
        pb.set_status(PlayerStatus::Playing);
        assert_eq!(status.latest(), (&PlayerStatus::Playing, true));
        assert!(playing.load(Ordering::Acquire));

        let mut frame = [0.0f32; 2];
        pb.next_frame(&mut frame, 48_000.0);
        assert_eq!(frame, [0.5, 0.5]);
        pb.next_frame(&mut frame, 48_000.0);
        pb.next_frame(&mut frame, 48_000.0);
        // ran off the end of the track
        assert_eq!(status.get(), PlayerStatus::Stopped);
        assert!(!playing.load(Ordering::Acquire));
        assert_eq!(pb.tap.len(), 2);
    }

    #[test]
    fn repeated_status_is_not_republished() {
        let (mut pb, mut status, _) = playback();
        pb.set_status(PlayerStatus::Paused);
        assert_eq!(status.latest(), (&PlayerStatus::Paused, true));
        pb.set_status(PlayerStatus::Paused);
        assert_eq!(status.latest(), (&PlayerStatus::Paused, false));
    }
}

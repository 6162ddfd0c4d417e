//! Per-frame audio pull: samples from a source, byte spectrum, band energies
//! and the smoothed beat level.

use crate::analyser::FrequencyAnalyser;
use crate::constants::SILENCE_DECAY;
use crate::spectrum::{AudioBands, PopFilter, SpectrumAnalyzer};

/// Anything that can hand the frame loop its most recent mono samples.
pub trait FrequencySource {
    /// True while audio is loaded and playing.
    fn is_active(&self) -> bool;

    /// Replace `out` with the newest samples (at least one analyser window
    /// when available). Returns false when nothing new arrived since the last
    /// call; the caller then reuses its previous values.
    fn recent_samples(&mut self, out: &mut Vec<f32>) -> bool;
}

/// Audio-derived values for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFrame {
    pub bands: AudioBands,
    pub audio_level: f32,
}

pub struct AudioSession {
    analyser: FrequencyAnalyser,
    spectrum: SpectrumAnalyzer,
    pop: PopFilter,
    bands: AudioBands,
    samples: Vec<f32>,
    bins: Vec<u8>,
}

impl AudioSession {
    pub fn new() -> Self {
        Self::with_analyser(FrequencyAnalyser::new())
    }

    pub fn with_analyser(analyser: FrequencyAnalyser) -> Self {
        Self {
            samples: Vec::with_capacity(analyser.fft_size()),
            bins: Vec::with_capacity(analyser.bin_count()),
            analyser,
            spectrum: SpectrumAnalyzer::new(),
            pop: PopFilter::new(),
            bands: AudioBands::SILENT,
        }
    }

    /// Pull once from `source` (if any) and advance the band and level state.
    ///
    /// No source, or an inactive one, decays the previous bands by
    /// `SILENCE_DECAY`. An active source without new samples keeps them.
    pub fn get_frequency_data(&mut self, source: Option<&mut dyn FrequencySource>) -> AudioFrame {
        match source {
            Some(src) if src.is_active() => {
                if src.recent_samples(&mut self.samples) {
                    self.analyser.process(&self.samples, &mut self.bins);
                    self.bands = self.spectrum.analyze(&self.bins);
                }
            }
            _ => self.bands = self.bands.decayed(SILENCE_DECAY),
        }
        self.advance_level()
    }

    /// Same as [`get_frequency_data`](Self::get_frequency_data) for callers
    /// that already have a byte spectrum (`None` meaning no active audio).
    pub fn update_from_bins(&mut self, bins: Option<&[u8]>) -> AudioFrame {
        self.bands = match bins {
            Some(b) => self.spectrum.analyze(b),
            None => self.bands.decayed(SILENCE_DECAY),
        };
        self.advance_level()
    }

    fn advance_level(&mut self) -> AudioFrame {
        let audio_level = self.pop.update(self.bands.bass);
        AudioFrame {
            bands: self.bands,
            audio_level,
        }
    }

    pub fn bands(&self) -> AudioBands {
        self.bands
    }

    /// Drop all audio state, e.g. after playback is stopped.
    pub fn reset(&mut self) {
        self.analyser.reset();
        self.pop.reset();
        self.bands = AudioBands::SILENT;
        self.bins.clear();
    }
}

impl Default for AudioSession {
    fn default() -> Self {
        Self::new()
    }
}

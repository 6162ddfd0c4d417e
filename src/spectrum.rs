//! Band energies and the percussive "pop" signal derived from a byte spectrum.

use crate::constants::*;

/// Mean normalized magnitude of the low, middle and high thirds of the spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl AudioBands {
    pub const SILENT: AudioBands = AudioBands {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
    };

    /// Scale all bands by `factor`, used to fade out when audio stops.
    pub fn decayed(self, factor: f32) -> AudioBands {
        AudioBands {
            bass: self.bass * factor,
            mid: self.mid * factor,
            treble: self.treble * factor,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.bass, self.mid, self.treble]
    }
}

/// Splits a byte frequency buffer into bass/mid/treble band energies.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectrumAnalyzer;

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Band energies for a buffer of byte magnitudes (0..=255).
    pub fn analyze(&self, bins: &[u8]) -> AudioBands {
        let [bass, mid, treble] = band_ranges(bins.len());
        let whole = mean_normalized(bins);
        let band = |r: std::ops::Range<usize>| {
            if r.is_empty() {
                whole
            } else {
                mean_normalized(&bins[r])
            }
        };
        AudioBands {
            bass: band(bass),
            mid: band(mid),
            treble: band(treble),
        }
    }
}

/// Index ranges of the three bands for a buffer of `len` bins.
///
/// Boundaries sit at 10% and 50% of the buffer, nudged so that every band
/// owns at least one bin once there are three or more bins.
pub fn band_ranges(len: usize) -> [std::ops::Range<usize>; 3] {
    let mut bass_end = (len as f32 * BASS_END_FRACTION) as usize;
    let mut mid_end = (len as f32 * MID_END_FRACTION) as usize;
    if len >= 3 {
        bass_end = bass_end.clamp(1, len - 2);
        mid_end = mid_end.clamp(bass_end + 1, len - 1);
    } else {
        mid_end = mid_end.max(bass_end);
    }
    [0..bass_end, bass_end..mid_end, mid_end..len]
}

fn mean_normalized(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&b| b as u32).sum();
    sum as f32 / bins.len() as f32 / 255.0
}

/// Gate and cube the bass energy: sharp peaks on beats, zero below the gate.
#[inline]
pub fn pop(bass: f32) -> f32 {
    if bass < POP_NOISE_GATE {
        0.0
    } else {
        bass.powi(POP_EXPONENT)
    }
}

/// First-order low-pass over the pop signal. Sharp attack, smooth decay.
#[derive(Clone, Copy, Debug, Default)]
pub struct PopFilter {
    smoothed: f32,
}

impl PopFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's bass energy and return the smoothed audio level.
    pub fn update(&mut self, bass: f32) -> f32 {
        self.smoothed += (pop(bass) - self.smoothed) * POP_SMOOTHING;
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_buffer_without_overlap() {
        for len in 0..64 {
            let [a, b, c] = band_ranges(len);
            assert_eq!(a.start, 0);
            assert_eq!(a.end, b.start);
            assert_eq!(b.end, c.start);
            assert_eq!(c.end, len);
            if len >= 3 {
                assert!(!a.is_empty() && !b.is_empty() && !c.is_empty(), "len {len}");
            }
        }
    }

    #[test]
    fn ranges_match_fractions_for_typical_lengths() {
        let [a, b, c] = band_ranges(256);
        assert_eq!(a, 0..25);
        assert_eq!(b, 25..128);
        assert_eq!(c, 128..256);
    }
}

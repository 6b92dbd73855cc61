//! Signal level measurement over extracted audio.
//!
//! [`Levels`] is the canonical downstream consumer of the extraction
//! buffer: measure the valid prefix after each tick and feed the result
//! to a meter UI, a squelch, or a recording trigger.

/// Effective silence floor in dB for level reporting.
pub const SILENCE_FLOOR_DB: f32 = -96.0;

/// Peak and RMS levels over one block of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    /// Largest absolute sample value in the block.
    pub peak: f32,
    /// Root-mean-square level of the block.
    pub rms: f32,
}

impl Levels {
    /// Measures a block of samples, typically [`ChannelRouter::extracted`].
    ///
    /// An empty block measures as silence rather than an error - a quiet
    /// tick is a normal condition.
    ///
    /// [`ChannelRouter::extracted`]: crate::ChannelRouter::extracted
    #[must_use]
    pub fn measure(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }

        let mut peak = 0.0f32;
        let mut sum_squares = 0.0f64;
        for &s in samples {
            let abs = s.abs();
            if abs > peak {
                peak = abs;
            }
            sum_squares += f64::from(s) * f64::from(s);
        }

        Self {
            peak,
            rms: (sum_squares / samples.len() as f64).sqrt() as f32,
        }
    }

    /// RMS level in dB relative to full scale (1.0).
    #[must_use]
    pub fn rms_db(&self) -> f32 {
        amplitude_db(self.rms)
    }

    /// Peak level in dB relative to full scale (1.0).
    #[must_use]
    pub fn peak_db(&self) -> f32 {
        amplitude_db(self.peak)
    }
}

fn amplitude_db(amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        let db = 20.0 * f64::from(amplitude).log10();
        (db as f32).max(SILENCE_FLOOR_DB)
    } else {
        SILENCE_FLOOR_DB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_block_is_silence() {
        let levels = Levels::measure(&[]);
        assert_eq!(levels.peak, 0.0);
        assert_eq!(levels.rms, 0.0);
        assert_eq!(levels.rms_db(), SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_all_zero_block_is_silence() {
        let levels = Levels::measure(&[0.0; 64]);
        assert_eq!(levels.rms_db(), SILENCE_FLOOR_DB);
        assert_eq!(levels.peak_db(), SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_full_scale_is_zero_db() {
        let levels = Levels::measure(&[1.0; 64]);
        assert_eq!(levels.peak, 1.0);
        assert!((levels.rms - 1.0).abs() < 1e-6);
        assert!(levels.rms_db().abs() < 0.01);
    }

    #[test]
    fn test_half_scale_is_minus_six_db() {
        let levels = Levels::measure(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(levels.peak, 0.5);
        assert!((levels.peak_db() - (-6.02)).abs() < 0.01);
    }

    #[test]
    fn test_peak_tracks_largest_magnitude() {
        let levels = Levels::measure(&[0.1, -0.8, 0.3]);
        assert_eq!(levels.peak, 0.8);
    }

    #[test]
    fn test_sine_rms() {
        let sine: Vec<f32> = (0..4800)
            .map(|i| (2.0 * std::f64::consts::PI * 440.0 * f64::from(i) / 48_000.0).sin() as f32)
            .collect();
        let levels = Levels::measure(&sine);
        // RMS of a sine is amplitude / sqrt(2).
        assert!((levels.rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn test_floor_clamps_tiny_signals() {
        let levels = Levels::measure(&[1e-9; 16]);
        assert_eq!(levels.rms_db(), SILENCE_FLOOR_DB);
    }
}

//! Spectrum bucketing and leveling
//!
//! Reduces a raw magnitude spectrum (two interleaved channels per bin) into a
//! fixed number of dB level bars, keeping the previous frame's bars around for
//! delta-driven consumers.

use serde::{Deserialize, Serialize};

/// Loudest representable level (dB)
pub const MAX_LEVEL: f32 = 96.0;

/// Quietest representable level (dB)
pub const MIN_LEVEL: f32 = 0.0;

/// Upper bound on the configured bar count
pub const MAX_BARS: usize = 720;

/// Lowest allowed frequency (Hz)
pub const MIN_FREQUENCY: f32 = 1.0;

/// Highest allowed frequency (Hz)
pub const MAX_FREQUENCY: f32 = 24000.0;

/// Almost zero, keeps the logarithm finite for silent bars
const MAGNITUDE_FLOOR: f32 = 0.000001;

/// Raw samples 0 and 1 hold the constant (DC) term
const FIRST_BIN: usize = 2;

/// How bar edges are spread across the frequency range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrequencyScale {
    /// Equal-width bars
    #[default]
    Linear,
    /// Bars widen geometrically toward the top of the range
    Logarithmic,
}

/// Spectrum analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Number of level bars
    pub bars: usize,
    /// Bar edge distribution
    pub scale: FrequencyScale,
    /// Lower edge of the first bar (Hz)
    pub min_frequency: f32,
    /// Upper edge of the last bar (Hz)
    pub max_frequency: f32,
    /// User floor for levels (dB)
    pub min_level: f32,
    /// User ceiling for levels (dB)
    pub max_level: f32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            bars: 12,
            scale: FrequencyScale::Linear,
            min_frequency: 200.0,
            max_frequency: MAX_FREQUENCY,
            min_level: MIN_LEVEL,
            max_level: MAX_LEVEL,
        }
    }
}

impl SpectrumConfig {
    /// Frequency (Hz) of edge `k` out of `bars`
    pub fn edge_frequency(&self, k: usize) -> f32 {
        let bars = self.bars.max(1) as f32;
        let t = k as f32 / bars;
        let min = self.min_frequency.max(MIN_FREQUENCY);
        let max = self.max_frequency.max(min);
        match self.scale {
            FrequencyScale::Linear => min + (max - min) * t,
            FrequencyScale::Logarithmic => min * (max / min).powf(t),
        }
    }

    /// Convert a mean magnitude into a level in dB, clamped to both the
    /// absolute and the user range
    pub fn to_level(&self, mean_magnitude: f32) -> f32 {
        let db = 10.0 * mean_magnitude.max(MAGNITUDE_FLOOR).log10();
        // max/min rather than clamp: a misordered user range must not panic
        db.max(MIN_LEVEL)
            .min(MAX_LEVEL)
            .max(self.min_level)
            .min(self.max_level)
    }

    /// Level reported for silent or absent input
    pub fn floor_level(&self) -> f32 {
        self.to_level(MAGNITUDE_FLOOR)
    }
}

/// Current and previous bar levels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumLevels {
    current: Vec<f32>,
    previous: Vec<f32>,
}

impl SpectrumLevels {
    /// Create zeroed levels for `bars` bars
    pub fn new(bars: usize) -> Self {
        Self {
            current: vec![0.0; bars],
            previous: vec![0.0; bars],
        }
    }

    /// Create levels from explicit frames
    pub fn from_frames(current: Vec<f32>, previous: Vec<f32>) -> Self {
        let mut previous = previous;
        previous.resize(current.len(), 0.0);
        Self { current, previous }
    }

    /// Bars of the latest update
    pub fn current(&self) -> &[f32] {
        &self.current
    }

    /// Bars of the update before the latest
    pub fn previous(&self) -> &[f32] {
        &self.previous
    }

    /// Number of bars
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// True if no bars are configured
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Current level of bar `index` (clamped to the valid range)
    pub fn level(&self, index: usize) -> f32 {
        clamped_get(&self.current, index)
    }

    /// Previous level of bar `index` (clamped to the valid range)
    pub fn previous_level(&self, index: usize) -> f32 {
        clamped_get(&self.previous, index)
    }

    /// Absolute frame-to-frame change of bar `index`
    pub fn delta(&self, index: usize) -> f32 {
        (self.level(index) - self.previous_level(index)).abs()
    }

    /// Map a 1-based band selector onto a bar index.
    ///
    /// Band 0 and band 1 both select the first bar; bands past the end select
    /// the last one.
    pub fn band_index(&self, band: usize) -> usize {
        band.clamp(1, self.len().max(1)) - 1
    }

    /// Forget the previous frame (used when a new track starts)
    pub fn reset_previous(&mut self) {
        self.previous.fill(0.0);
    }

    /// Current becomes previous; both are resized to `bars`
    fn advance(&mut self, bars: usize) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.resize(bars, 0.0);
        self.previous.resize(bars, 0.0);
    }
}

fn clamped_get(values: &[f32], index: usize) -> f32 {
    match values.len() {
        0 => 0.0,
        len => values[index.min(len - 1)],
    }
}

/// Groups raw FFT magnitudes into level bars
#[derive(Debug, Clone, Default)]
pub struct SpectrumBinner {
    config: SpectrumConfig,
}

impl SpectrumBinner {
    /// Create a binner with the given settings
    pub fn new(config: SpectrumConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Replace the settings; takes effect on the next `process`
    pub fn set_config(&mut self, config: SpectrumConfig) {
        self.config = config;
    }

    /// Bin `magnitudes` into `levels`.
    ///
    /// Bar `i` ends at edge `i + 1`, and bar 0 starts at the first bin above
    /// DC rather than at edge 0, so content below `min_frequency` is counted
    /// in the first bar.
    ///
    /// The old current frame becomes the previous frame. Missing or malformed
    /// input (no samples, no bars, non-positive sample rate) produces floor
    /// levels instead of failing.
    pub fn process(&self, magnitudes: &[f32], sample_rate: f32, levels: &mut SpectrumLevels) {
        let bars = self.config.bars;
        levels.advance(bars);

        let len = magnitudes.len();
        let valid_rate = sample_rate.is_finite() && sample_rate > 0.0;
        if bars == 0 || len < FIRST_BIN + 2 || !valid_rate {
            levels.current.fill(self.config.floor_level());
            return;
        }

        let mut lo = FIRST_BIN;
        for (i, bar) in levels.current.iter_mut().enumerate() {
            let mut hi = self
                .sample_index(self.config.edge_frequency(i + 1), sample_rate, len)
                .max(FIRST_BIN + 2)
                .min(len);
            if hi <= lo {
                // Collapsed range: reuse the last bin of the previous bar
                lo = hi - 2;
            }

            let sum: f32 = magnitudes[lo..hi]
                .iter()
                .map(|m| if m.is_finite() { m.abs() } else { 0.0 })
                .sum();
            let mean = sum / (hi - lo) as f32;

            *bar = self.config.to_level(mean);
            lo = hi;
        }
    }

    /// Raw sample index of `frequency`, rounded to a bin and scaled to the
    /// two-channel layout
    fn sample_index(&self, frequency: f32, sample_rate: f32, len: usize) -> usize {
        let bin = (frequency / sample_rate * len as f32 + 0.5) as usize;
        bin.saturating_mul(2)
    }
}

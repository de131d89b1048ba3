//! Waveform analysis: baseline, peak, charge and hit time.
//!
//! The quantities computed here are the minimum a downstream telescope
//! analysis needs per pixel. Times come from a constant-fraction crossing
//! with linear interpolation between samples.

use serde::{Deserialize, Serialize};

use super::config::ConverterConfig;

/// Pulse polarity of the recorded signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    fn sign(&self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// Baseline estimate over the leading pre-trigger samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub mean: f64,
    pub sigma: f64,
}

/// Everything extracted from a single waveform that passed the hit threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseSummary {
    /// Peak amplitude over baseline, always positive regardless of polarity
    pub amplitude: f64,
    /// Baseline-subtracted sample sum over the pulse extent
    pub charge: f64,
    /// Constant-fraction crossing time in nanoseconds from the record start
    pub time_ns: f64,
    /// Sample index of the peak
    pub peak_sample: usize,
    pub baseline: Baseline,
}

/// A borrowed view of one channel's samples plus the time axis scale.
#[derive(Debug, Clone, Copy)]
pub struct Waveform<'a> {
    samples: &'a [f32],
    sample_period_ns: f64,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [f32], sample_period_ns: f64) -> Self {
        Self {
            samples,
            sample_period_ns,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Baseline mean and sigma over the first `window` samples (clamped to
    /// the record length).
    pub fn baseline(&self, window: usize) -> Baseline {
        let window = window.clamp(1, self.samples.len().max(1));
        let mut sum = 0.0f64;
        let mut sum2 = 0.0f64;
        for sample in self.samples.iter().take(window) {
            let value = *sample as f64;
            sum += value;
            sum2 += value * value;
        }
        let n = window as f64;
        let mean = sum / n;
        let sigma = (sum2 / n - mean * mean).max(0.0).sqrt();
        Baseline { mean, sigma }
    }

    /// Baseline-subtracted sample value, flipped so pulses always point up
    fn deviation(&self, index: usize, baseline: f64, polarity: Polarity) -> f64 {
        (self.samples[index] as f64 - baseline) * polarity.sign()
    }

    /// Analyze the waveform with the given settings.
    ///
    /// Returns None if the waveform is empty or its peak amplitude stays
    /// below the hit threshold.
    pub fn analyze(&self, config: &ConverterConfig) -> Option<PulseSummary> {
        if self.samples.is_empty() {
            return None;
        }
        let baseline = self.baseline(config.pedestal_window);

        let mut peak_sample = 0;
        let mut amplitude = self.deviation(0, baseline.mean, config.polarity);
        for index in 1..self.samples.len() {
            let deviation = self.deviation(index, baseline.mean, config.polarity);
            if deviation > amplitude {
                amplitude = deviation;
                peak_sample = index;
            }
        }
        if amplitude < config.hit_threshold_adcu {
            return None;
        }

        // Pulse extent: walk away from the peak until crossing the baseline
        let mut begin = peak_sample;
        while begin > 0 && self.deviation(begin - 1, baseline.mean, config.polarity) > 0.0 {
            begin -= 1;
        }
        let mut end = peak_sample + 1;
        while end < self.samples.len()
            && self.deviation(end, baseline.mean, config.polarity) > 0.0
        {
            end += 1;
        }

        let charge: f64 = (begin..end)
            .map(|index| self.deviation(index, baseline.mean, config.polarity))
            .sum();

        let time_ns = self.constant_fraction_time(
            baseline.mean,
            config.polarity,
            config.cfd_fraction * amplitude,
            begin,
            peak_sample,
        );

        Some(PulseSummary {
            amplitude,
            charge,
            time_ns,
            peak_sample,
            baseline,
        })
    }

    /// Walk back from the peak to the last sample below `threshold` and
    /// interpolate the crossing time linearly between it and its neighbor.
    fn constant_fraction_time(
        &self,
        baseline: f64,
        polarity: Polarity,
        threshold: f64,
        begin: usize,
        peak_sample: usize,
    ) -> f64 {
        let mut low_bin = None;
        let mut index = peak_sample;
        while index > begin {
            index -= 1;
            if self.deviation(index, baseline, polarity) < threshold {
                low_bin = Some(index);
                break;
            }
        }
        match low_bin {
            Some(low) => {
                let low_value = self.deviation(low, baseline, polarity);
                let high_value = self.deviation(low + 1, baseline, polarity);
                let fraction = if high_value > low_value {
                    (threshold - low_value) / (high_value - low_value)
                } else {
                    0.0
                };
                (low as f64 + fraction) * self.sample_period_ns
            }
            // Pulse truncated at the record start; best we can do
            None => begin as f64 * self.sample_period_ns,
        }
    }
}

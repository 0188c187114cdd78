//! Volatility-regime circuit breaker
//!
//! Watches an auxiliary risk-index price series and compares short-horizon
//! volatility against its own recent baseline. A ratio above the alert
//! threshold marks the market unsafe: correlation-driven pricing is exactly
//! what breaks first in an event shock, so the engine refuses new entries
//! until the ratio settles.
//!
//! The feed is down-sampled to one price per second before any statistics:
//! tick-rate variance estimates are unstable and the sampling bounds compute
//! cost per event.
//!
//! The safe flag has no hysteresis; it may oscillate while the ratio rides
//! the threshold.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ConfigError;
use meridian_core::TimestampMs;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Samples in the short (alert) window.
    pub short_window: usize,
    /// Samples retained overall; the baseline window.
    pub long_window: usize,
    /// Unsafe when short vol exceeds baseline vol by this factor.
    pub alert_threshold: f64,
    /// Down-sampling interval.
    pub sample_interval_ms: i64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            short_window: 60,
            long_window: 600,
            alert_threshold: 3.0,
            sample_interval_ms: 1_000,
        }
    }
}

/// Monitor state for logs and dashboards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeStats {
    pub safe: bool,
    pub vol_ratio: f64,
    pub short_vol: f64,
    pub baseline_vol: f64,
    pub samples: usize,
}

/// Rolling volatility-ratio monitor.
pub struct RegimeMonitor {
    cfg: RegimeConfig,
    /// Once-per-second price samples, oldest first, capped at `long_window`.
    samples: VecDeque<f64>,
    last_sample_ms: Option<TimestampMs>,
    safe: bool,
    vol_ratio: f64,
    short_vol: f64,
    baseline_vol: f64,
}

/// Baseline volatility floor; keeps the ratio finite on a dead-flat series.
const MIN_BASELINE_VOL: f64 = 1e-9;

impl RegimeMonitor {
    pub fn new(cfg: RegimeConfig) -> Result<Self, ConfigError> {
        if cfg.short_window < 2 {
            return Err(ConfigError::Window("short_window must be at least 2"));
        }
        if cfg.long_window < cfg.short_window {
            return Err(ConfigError::Window(
                "long_window must be at least short_window",
            ));
        }
        if cfg.sample_interval_ms <= 0 {
            return Err(ConfigError::NonPositive("sample_interval_ms"));
        }
        Ok(Self {
            cfg,
            samples: VecDeque::with_capacity(cfg.long_window),
            last_sample_ms: None,
            safe: true,
            vol_ratio: 1.0,
            short_vol: 0.0,
            baseline_vol: 0.0,
        })
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_sample_ms = None;
        self.safe = true;
        self.vol_ratio = 1.0;
        self.short_vol = 0.0;
        self.baseline_vol = 0.0;
    }

    /// Feed one risk-index price at event time `now_ms`.
    ///
    /// Prices arrive at arbitrary rate; at most one per sample interval is
    /// kept. Non-finite and non-positive prices are ignored.
    pub fn on_price(&mut self, price: f64, now_ms: TimestampMs) {
        if !price.is_finite() || price <= 0.0 {
            return;
        }
        match self.last_sample_ms {
            Some(last) if now_ms - last < self.cfg.sample_interval_ms => {}
            _ => {
                self.accept_sample(price);
                self.last_sample_ms = Some(now_ms);
            }
        }
    }

    fn accept_sample(&mut self, price: f64) {
        if self.samples.len() == self.cfg.long_window {
            self.samples.pop_front();
        }
        self.samples.push_back(price);

        // Fail open until the short window is populated.
        if self.samples.len() < self.cfg.short_window {
            self.safe = true;
            self.vol_ratio = 1.0;
            return;
        }

        let returns: Vec<f64> = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| (b / a).ln())
            .collect();
        if returns.is_empty() {
            return;
        }

        let short_start = returns.len().saturating_sub(self.cfg.short_window);
        let short_vol = sample_std(&returns[short_start..]);
        let baseline_vol = sample_std(&returns).max(MIN_BASELINE_VOL);

        self.short_vol = short_vol;
        self.baseline_vol = baseline_vol;
        self.vol_ratio = short_vol / baseline_vol;

        let was_safe = self.safe;
        self.safe = self.vol_ratio <= self.cfg.alert_threshold;
        if was_safe && !self.safe {
            log::warn!(
                "volatility regime unsafe: ratio {:.2} > {:.2}",
                self.vol_ratio,
                self.cfg.alert_threshold
            );
        } else if !was_safe && self.safe {
            log::info!("volatility regime recovered: ratio {:.2}", self.vol_ratio);
        }
    }

    /// True when trading is allowed.
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn vol_ratio(&self) -> f64 {
        self.vol_ratio
    }

    pub fn stats(&self) -> RegimeStats {
        RegimeStats {
            safe: self.safe,
            vol_ratio: self.vol_ratio,
            short_vol: self.short_vol,
            baseline_vol: self.baseline_vol,
            samples: self.samples.len(),
        }
    }
}

/// Bessel-corrected standard deviation; 0.0 below two samples.
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

//! Online Kalman filter pricing model
//!
//! Estimates the primary instrument's fair value as a linear function of the
//! two auxiliary instruments' moves, with the coefficient vector as the
//! filter state and each tick's primary delta as a scalar observation.
//!
//! The priors are deliberately de-sensitized. The slope coefficients act on
//! raw auxiliary deltas that run orders of magnitude larger than the primary
//! instrument's moves; a uniform prior lets the filter chase the observed
//! price and collapse the spread to zero. Near-zero initial slope variance
//! with a wide intercept variance keeps the slopes anchored to the warm-start
//! prior while the intercept stays free to absorb level drift.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::{FeatureState, Observation, PricingModel, Valuation, WARM_START_THETA};
use meridian_core::TickEvent;

/// Innovation variance below this is treated as numerically degenerate and
/// the learning step is skipped for the tick.
const MIN_INNOVATION_VAR: f64 = 1e-12;

const INIT_SLOPE_VAR: f64 = 1e-8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Process noise on the slope coefficients.
    pub q_slope: f64,
    /// Process noise on the intercept.
    pub q_intercept: f64,
    /// Scalar observation-noise variance.
    pub r_obs: f64,
    /// Initial variance of the intercept coefficient.
    pub init_intercept_var: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            q_slope: 1e-10,
            q_intercept: 1e-4,
            r_obs: 1.0,
            init_intercept_var: 100.0,
        }
    }
}

/// Online Kalman fair-value estimator.
pub struct OnlineKalman {
    cfg: KalmanConfig,
    /// Coefficients [slope_aux1, slope_aux2, intercept].
    theta: Vector3<f64>,
    /// Error covariance.
    p: Matrix3<f64>,
    /// Diagonal process noise.
    q: Matrix3<f64>,
    features: FeatureState,
}

impl OnlineKalman {
    pub fn new(cfg: KalmanConfig) -> Self {
        Self {
            cfg,
            theta: Vector3::from(WARM_START_THETA),
            p: Matrix3::from_diagonal(&Vector3::new(
                INIT_SLOPE_VAR,
                INIT_SLOPE_VAR,
                cfg.init_intercept_var,
            )),
            q: Matrix3::from_diagonal(&Vector3::new(cfg.q_slope, cfg.q_slope, cfg.q_intercept)),
            features: FeatureState::default(),
        }
    }

    /// Current coefficient vector [slope_aux1, slope_aux2, intercept].
    pub fn coefficients(&self) -> [f64; 3] {
        self.theta.into()
    }
}

impl Default for OnlineKalman {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

impl PricingModel for OnlineKalman {
    fn update(&mut self, tick: &TickEvent) -> Valuation {
        let deltas = match self.features.observe(tick) {
            Observation::Incomplete => {
                return Valuation {
                    fair: self.features.last_fair,
                    spread: None,
                };
            }
            Observation::BaselineSet(price) => {
                // First fully-populated tick only anchors the baseline;
                // there is no prior error to learn from.
                return Valuation {
                    fair: Some(price),
                    spread: Some(0.0),
                };
            }
            Observation::Ready(d) => d,
        };

        let x = Vector3::new(deltas.aux1, deltas.aux2, 1.0);
        let y = deltas.primary;

        // Predict with the pre-update coefficients; the spread signal is the
        // model's opinion before it has seen this tick's error.
        let fair_delta = x.dot(&self.theta);
        let spread = fair_delta - y;

        // Scalar-observation update.
        let pht = self.p * x;
        let s = x.dot(&pht) + self.cfg.r_obs;
        if s > MIN_INNOVATION_VAR {
            let k = pht / s;
            let residual = y - fair_delta;
            self.theta += k * residual;
            self.p = (Matrix3::identity() - k * x.transpose()) * self.p + self.q;
        } else {
            log::warn!("kalman: non-positive innovation variance {s}, skipping update");
        }

        let fair_abs = fair_delta + self.features.baseline_primary();
        self.features.last_fair = Some(fair_abs);
        Valuation {
            fair: Some(fair_abs),
            spread: Some(spread),
        }
    }

    fn reset(&mut self) {
        self.theta = Vector3::from(WARM_START_THETA);
        self.p = Matrix3::from_diagonal(&Vector3::new(
            INIT_SLOPE_VAR,
            INIT_SLOPE_VAR,
            self.cfg.init_intercept_var,
        ));
        self.features.clear();
    }

    fn name(&self) -> &str {
        "OnlineKalman"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(ts_ms: i64, primary: f64, aux1: f64, aux2: f64) -> TickEvent {
        TickEvent {
            ts_ms,
            primary,
            aux1: Some(aux1),
            aux2: Some(aux2),
            risk_index: None,
        }
    }

    #[test]
    fn first_full_tick_returns_actual_and_zero_spread() {
        let mut model = OnlineKalman::default();
        let v = model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        assert_eq!(v.fair, Some(6800.0));
        assert_eq!(v.spread, Some(0.0));
    }

    #[test]
    fn no_valuation_before_aux_observed() {
        let mut model = OnlineKalman::default();
        let v = model.update(&TickEvent {
            ts_ms: 0,
            primary: 6800.0,
            aux1: None,
            aux2: None,
            risk_index: None,
        });
        assert_eq!(v.fair, None);
        assert_eq!(v.spread, None);
    }

    #[test]
    fn fair_repeats_last_known_when_aux_goes_missing_pre_baseline() {
        let mut model = OnlineKalman::default();
        model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        // aux gaps after baseline still price off cached values
        let v = model.update(&TickEvent {
            ts_ms: 1,
            primary: 6801.0,
            aux1: None,
            aux2: None,
            risk_index: None,
        });
        assert!(v.defined());
    }

    #[test]
    fn aux_rally_lifts_fair_above_actual() {
        let mut model = OnlineKalman::default();
        model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        // aux1 +100 with primary unchanged: warm-start slope 0.30 puts fair
        // 30 points above actual
        let v = model.update(&tick(1, 6800.0, 24_100.0, 42_000.0));
        let spread = v.spread.unwrap();
        assert!((spread - 30.0).abs() < 1e-9, "spread = {spread}");
        assert!((v.fair.unwrap() - 6830.0).abs() < 1e-9);
    }

    #[test]
    fn learning_shrinks_repeated_error() {
        let mut model = OnlineKalman::default();
        model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        // primary pops 5 points with aux flat: the intercept should absorb
        // most of it in one step given its wide prior
        let v1 = model.update(&tick(1, 6805.0, 24_000.0, 42_000.0));
        let v2 = model.update(&tick(2, 6805.0, 24_000.0, 42_000.0));
        assert!(v2.spread.unwrap().abs() < v1.spread.unwrap().abs());
    }

    #[test]
    fn slopes_stay_anchored_to_prior() {
        let mut model = OnlineKalman::default();
        model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        for i in 1..200 {
            let drift = i as f64;
            model.update(&tick(i, 6800.0 + 0.3 * drift, 24_000.0 + drift, 42_000.0 + drift));
        }
        let [b1, b2, _] = model.coefficients();
        // tiny slope variance keeps the betas near the warm start
        assert!((b1 - 0.30).abs() < 0.05, "b1 = {b1}");
        assert!((b2 - 0.05).abs() < 0.05, "b2 = {b2}");
    }

    #[test]
    fn reset_restores_prior() {
        let mut model = OnlineKalman::default();
        model.update(&tick(0, 6800.0, 24_000.0, 42_000.0));
        model.update(&tick(1, 6805.0, 24_050.0, 42_100.0));
        model.reset();
        assert_eq!(model.coefficients(), WARM_START_THETA);
        // next full tick is a fresh baseline
        let v = model.update(&tick(2, 6900.0, 25_000.0, 43_000.0));
        assert_eq!(v.spread, Some(0.0));
    }
}

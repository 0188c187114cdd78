//! Online ridge regression pricing model
//!
//! Recursive least squares with an exponential forgetting factor and an
//! explicit L2 shrinkage applied to the slope coefficients after every
//! update. The shrinkage is what keeps a tradable spread alive: the two
//! auxiliary instruments are near-collinear, and plain RLS will happily fit
//! the primary price exactly, driving the spread to zero.
//!
//! The intercept is never shrunk; decaying it would re-introduce the level
//! error the baseline centering already removed.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::{FeatureState, Observation, PricingModel, Valuation, WARM_START_THETA};
use meridian_core::TickEvent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RidgeConfig {
    /// Forgetting factor λ. 0.999 remembers ~1000 ticks, 0.99 ~100.
    pub forgetting: f64,
    /// L2 shrinkage per step on the slope coefficients. Zero degenerates to
    /// plain RLS and the spread gets fitted away.
    pub ridge_alpha: f64,
    /// Initial covariance scale.
    pub init_cov: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            forgetting: 0.995,
            ridge_alpha: 1e-4,
            init_cov: 100.0,
        }
    }
}

/// Online ridge-regularized RLS fair-value estimator.
pub struct OnlineRidge {
    cfg: RidgeConfig,
    /// Coefficients [slope_aux1, slope_aux2, intercept].
    theta: Vector3<f64>,
    /// RLS information matrix.
    p: Matrix3<f64>,
    features: FeatureState,
}

impl OnlineRidge {
    pub fn new(cfg: RidgeConfig) -> Self {
        Self {
            cfg,
            theta: Vector3::from(WARM_START_THETA),
            p: Matrix3::identity() * cfg.init_cov,
            features: FeatureState::default(),
        }
    }

    /// Current coefficient vector [slope_aux1, slope_aux2, intercept].
    pub fn coefficients(&self) -> [f64; 3] {
        self.theta.into()
    }
}

impl Default for OnlineRidge {
    fn default() -> Self {
        Self::new(RidgeConfig::default())
    }
}

impl PricingModel for OnlineRidge {
    fn update(&mut self, tick: &TickEvent) -> Valuation {
        let deltas = match self.features.observe(tick) {
            Observation::Incomplete => {
                return Valuation {
                    fair: self.features.last_fair,
                    spread: None,
                };
            }
            Observation::BaselineSet(price) => {
                return Valuation {
                    fair: Some(price),
                    spread: Some(0.0),
                };
            }
            Observation::Ready(d) => d,
        };

        let x = Vector3::new(deltas.aux1, deltas.aux2, 1.0);
        let y = deltas.primary;

        // A-priori prediction: the signal comes from the coefficients as
        // they stood before this observation.
        let predicted = x.dot(&self.theta);
        let fair = predicted + self.features.baseline_primary();
        let spread = predicted - y;

        // RLS gain and covariance roll-forward with forgetting.
        let px = self.p * x;
        let g = self.cfg.forgetting + x.dot(&px);
        let k = px / g;
        self.p = (self.p - k * px.transpose()) / self.cfg.forgetting;

        // Learn, then shrink the slopes toward zero.
        let residual = y - predicted;
        self.theta += k * residual;
        if self.cfg.ridge_alpha > 0.0 {
            let keep = 1.0 - self.cfg.ridge_alpha;
            self.theta.x *= keep;
            self.theta.y *= keep;
        }

        self.features.last_fair = Some(fair);
        Valuation {
            fair: Some(fair),
            spread: Some(spread),
        }
    }

    fn reset(&mut self) {
        self.theta = Vector3::from(WARM_START_THETA);
        self.p = Matrix3::identity() * self.cfg.init_cov;
        self.features.clear();
    }

    fn name(&self) -> &str {
        "OnlineRidge"
    }
}

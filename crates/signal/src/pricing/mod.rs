//! Fair-value pricing models
//!
//! Two interchangeable online estimators of the primary instrument's fair
//! value from correlated instrument moves:
//! - [`OnlineKalman`]: scalar-observation Kalman filter over the coefficient
//!   vector, de-sensitized priors
//! - [`OnlineRidge`]: recursive least squares with exponential forgetting and
//!   slope-only L2 shrinkage
//!
//! Consumers depend only on the [`PricingModel`] trait; the two estimators
//! are drop-in substitutes for each other.

mod kalman;
mod ridge;

pub use kalman::{KalmanConfig, OnlineKalman};
pub use ridge::{OnlineRidge, RidgeConfig};

use meridian_core::TickEvent;

/// Result of one pricing update.
///
/// `spread = fair - actual`: positive means the primary instrument trades
/// below fair value (bias long), negative means above (bias short).
/// Both fields are `None` until the model has seen enough data; `fair`
/// repeats the last known value and `spread` is undefined whenever an
/// auxiliary series is still missing on the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Valuation {
    pub fair: Option<f64>,
    pub spread: Option<f64>,
}

impl Valuation {
    pub fn defined(&self) -> bool {
        self.fair.is_some() && self.spread.is_some()
    }
}

/// Online fair-value estimator contract.
pub trait PricingModel: Send {
    /// Fold one tick into the model and return the current valuation.
    fn update(&mut self, tick: &TickEvent) -> Valuation;

    /// Restore the warm-start prior, dropping baselines and caches.
    fn reset(&mut self);

    /// Model name for logging.
    fn name(&self) -> &str;
}

/// Per-instrument baseline prices captured from the first fully-populated
/// tick. All regression happens on deltas from these, re-centering the
/// large-magnitude auxiliary prices near zero.
#[derive(Debug, Clone, Copy)]
struct Baseline {
    primary: f64,
    aux1: f64,
    aux2: f64,
}

/// One regression-ready observation in delta coordinates.
#[derive(Debug, Clone, Copy)]
struct Deltas {
    aux1: f64,
    aux2: f64,
    primary: f64,
}

/// Outcome of aligning one tick against the baseline and caches.
enum Observation {
    /// An input series has never been observed; nothing to learn from.
    Incomplete,
    /// First fully-populated tick; baseline captured, no learning step.
    BaselineSet(f64),
    /// Regular observation in delta coordinates.
    Ready(Deltas),
}

/// Shared data-alignment state for both estimators: last-known auxiliary
/// prices (missing values are filled from here, never with zero) and the
/// baseline capture.
#[derive(Debug, Default)]
struct FeatureState {
    last_aux1: Option<f64>,
    last_aux2: Option<f64>,
    baseline: Option<Baseline>,
    last_fair: Option<f64>,
}

impl FeatureState {
    fn clear(&mut self) {
        *self = Self::default();
    }

    /// Align a tick: refresh caches, fill gaps with last-known values, and
    /// either capture the baseline or produce delta coordinates.
    fn observe(&mut self, tick: &TickEvent) -> Observation {
        if let Some(p) = tick.aux1 {
            self.last_aux1 = Some(p);
        }
        if let Some(p) = tick.aux2 {
            self.last_aux2 = Some(p);
        }

        let (Some(aux1), Some(aux2)) = (self.last_aux1, self.last_aux2) else {
            return Observation::Incomplete;
        };
        let primary = tick.primary;

        match self.baseline {
            None => {
                self.baseline = Some(Baseline {
                    primary,
                    aux1,
                    aux2,
                });
                self.last_fair = Some(primary);
                Observation::BaselineSet(primary)
            }
            Some(base) => Observation::Ready(Deltas {
                aux1: aux1 - base.aux1,
                aux2: aux2 - base.aux2,
                primary: primary - base.primary,
            }),
        }
    }

    fn baseline_primary(&self) -> f64 {
        self.baseline.map(|b| b.primary).unwrap_or(0.0)
    }
}

/// Warm-start coefficient prior: an order-of-magnitude-correct guess for the
/// auxiliary slopes keeps the early spread from exploding while the filter
/// settles.
const WARM_START_THETA: [f64; 3] = [0.30, 0.05, 0.0];

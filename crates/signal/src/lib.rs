//! Meridian Signal Components
//!
//! The online statistical building blocks of the decision pipeline:
//! - Pricing models: interchangeable fair-value estimators (`OnlineKalman`,
//!   `OnlineRidge`) behind the `PricingModel` trait
//! - Order-book imbalance (`ObiCalculator`)
//! - Hidden-liquidity detection (`IcebergDetector`)
//! - Volatility-regime circuit breaker (`RegimeMonitor`)
//!
//! All components are single-threaded owned state: they are mutated through
//! their update methods by whoever owns them, and never lock.

pub mod error;
pub mod iceberg;
pub mod obi;
pub mod pricing;
pub mod regime;

pub use error::ConfigError;
pub use iceberg::{IcebergConfig, IcebergDetector, IcebergLevel};
pub use obi::{ObiBreakdown, ObiCalculator, ObiConfig, simple_obi};
pub use pricing::{KalmanConfig, OnlineKalman, OnlineRidge, PricingModel, RidgeConfig, Valuation};
pub use regime::{RegimeConfig, RegimeMonitor, RegimeStats};

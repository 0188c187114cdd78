//! Bootstrap - configuration loading and engine construction

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use meridian_core::Clock;
use meridian_engine::{DecisionEngine, EngineConfig, OrderSink, config::EngineConfigError};
use meridian_gateway::SymbolMap;
use meridian_signal::{
    ConfigError, IcebergConfig, IcebergDetector, KalmanConfig, ObiCalculator, ObiConfig,
    OnlineKalman, OnlineRidge, PricingModel, RegimeConfig, RegimeMonitor, RidgeConfig,
};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("engine config: {0}")]
    Engine(#[from] EngineConfigError),

    #[error("signal config: {0}")]
    Signal(#[from] ConfigError),
}

/// Which pricing model the engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Kalman,
    Ridge,
}

/// Complete runner configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub model: ModelKind,
    pub queue_capacity: usize,
    pub symbols: SymbolMap,
    pub engine: EngineConfig,
    pub kalman: KalmanConfig,
    pub ridge: RidgeConfig,
    pub obi: ObiConfig,
    pub iceberg: IcebergConfig,
    pub regime: RegimeConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Kalman,
            queue_capacity: 10_000,
            symbols: SymbolMap::default(),
            engine: EngineConfig::default(),
            kalman: KalmanConfig::default(),
            ridge: RidgeConfig::default(),
            obi: ObiConfig::default(),
            iceberg: IcebergConfig::default(),
            regime: RegimeConfig::default(),
        }
    }
}

/// Initialize env_logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Load a [`RunnerConfig`] from a JSON file. Missing fields fall back to
/// defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<RunnerConfig, BootstrapError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Build a ready-to-run engine from config, sink and clock.
pub fn build_engine(
    cfg: &RunnerConfig,
    sink: Box<dyn OrderSink>,
    clock: Arc<dyn Clock>,
) -> Result<DecisionEngine, BootstrapError> {
    let model: Box<dyn PricingModel> = match cfg.model {
        ModelKind::Kalman => Box::new(OnlineKalman::new(cfg.kalman)),
        ModelKind::Ridge => Box::new(OnlineRidge::new(cfg.ridge)),
    };
    let engine = DecisionEngine::new(
        cfg.engine,
        model,
        ObiCalculator::new(cfg.obi)?,
        IcebergDetector::new(cfg.iceberg),
        RegimeMonitor::new(cfg.regime)?,
        sink,
        clock,
    )?;
    Ok(engine)
}

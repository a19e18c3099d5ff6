//! Simulation settings.
//!
//! Defaults mirror the classic demo setup: 32 qubits per round, five rounds,
//! Eve adding 10% flips. Settings can be loaded from a JSON file, e.g.
//!
//! ```json
//! { "num_qubits": 64, "error_rate": 0.05, "seed": 7 }
//! ```

use crate::core::errors::{ConfigError, ProtocolError};
use crate::protocols::bb84::channel::validate_rate;
use crate::protocols::bb84::{DEFAULT_EAVESDROP_ERROR_RATE, DEFAULT_NUM_QUBITS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Channel error rates offered by the interactive menu.
pub mod presets {
    pub const NO_ERROR: f64 = 0.0;
    pub const LOW_ERROR: f64 = 0.05;
    pub const HIGH_ERROR: f64 = 0.2;
    pub const MENU_ITERATIONS: usize = 5;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Qubits sent per round.
    pub num_qubits: usize,
    /// Bit-flip probability of the channel on the normal path.
    pub error_rate: f64,
    pub num_iterations: usize,
    /// Extra bit-flip probability Eve introduces on the eavesdropping path.
    pub eavesdrop_error_rate: f64,
    /// Fixed seed for reproducible runs; fresh entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_qubits: DEFAULT_NUM_QUBITS,
            error_rate: presets::NO_ERROR,
            num_iterations: presets::MENU_ITERATIONS,
            eavesdrop_error_rate: DEFAULT_EAVESDROP_ERROR_RATE,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.num_qubits == 0 {
            return Err(ProtocolError::invalid(
                "num_qubits",
                "a round needs at least one qubit",
            ));
        }
        if self.num_iterations == 0 {
            return Err(ProtocolError::invalid(
                "num_iterations",
                "must be a positive number of rounds",
            ));
        }
        validate_rate("error_rate", self.error_rate)?;
        validate_rate("eavesdrop_error_rate", self.eavesdrop_error_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("bb84-sim-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.num_qubits, 32);
        assert_eq!(config.num_iterations, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = write_temp("partial.json", r#"{ "num_qubits": 8, "seed": 3 }"#);
        let config = SimulationConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.num_qubits, 8);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.eavesdrop_error_rate, 0.1);
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        let path = write_temp("unknown.json", r#"{ "qubits": 8 }"#);
        assert!(matches!(
            SimulationConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
        std::fs::remove_file(&path).ok();

        let path = write_temp("invalid.json", r#"{ "error_rate": 2.0 }"#);
        assert!(matches!(
            SimulationConfig::load(&path),
            Err(ConfigError::Invalid(ProtocolError::InvalidParameter {
                name: "error_rate",
                ..
            }))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_out_of_range_eavesdrop_rate() {
        let config = SimulationConfig {
            eavesdrop_error_rate: -0.5,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            ProtocolError::InvalidParameter {
                name: "eavesdrop_error_rate",
                reason: "-0.5 must be between 0.0 and 1.0".to_string(),
            }
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("bb84-sim-does-not-exist.json");
        assert!(matches!(
            SimulationConfig::load(&path),
            Err(ConfigError::Io(_))
        ));
    }
}

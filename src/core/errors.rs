use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions: a single-qubit gate must be 2x2")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Number of operators ({ops}) does not match number of outcomes ({vals})")]
    CountMismatch { ops: usize, vals: usize },

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Dimension mismatch")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Selected outcome {0} has zero probability")]
    ImpossibleOutcome(usize),

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

/// Failure reported by a quantum backend, tagged with the operation that failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Failed to build backend operators: {0}")]
    Setup(StateError),

    #[error("Failed to prepare qubit: {0}")]
    Prepare(StateError),

    #[error("Failed to transform qubit: {0}")]
    Transform(StateError),

    #[error("Failed to measure qubit: {0}")]
    Measure(StateError),
}

/// Errors surfaced by the BB84 protocol stages and runner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Shape mismatch in {stage}: expected {expected} positions, got {got}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Quantum backend failure: {0}")]
    BackendFailure(#[from] BackendError),
}

impl ProtocolError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ProtocolError),
}

//! Simulation of the BB84 quantum key distribution protocol.
//!
//! Qubits are simulated exactly as single-qubit density matrices. The
//! protocol itself lives in [`protocols::bb84`]; its entry point is
//! [`ProtocolRunner`].

pub mod backend;
pub mod config;
mod core;
pub mod protocols;
pub mod random;
pub mod request;
pub mod tracing_init;

pub use crate::backend::{Basis, DensityMatrixBackend, QuantumBackend, QubitSpec, Transform};
pub use crate::config::SimulationConfig;
pub use crate::core::{Gate, Measurement, Outcome, QuantumState, errors, utils};
pub use crate::protocols::bb84::{PipelineMode, ProtocolReport, ProtocolRunner, RoundReport};
pub use crate::random::RandomnessSource;
pub use crate::request::SimulationRequest;

pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use gates::Gate;
pub use measurements::{Measurement, Outcome};
pub use state::QuantumState;

//! Bob's single-shot readout.

use super::types::{BasisString, Message, MeasurementResult, ensure_len};
use crate::backend::{Basis, QuantumBackend, Transform};
use crate::core::errors::ProtocolError;
use crate::random::RandomnessSource;

/// Reads every qubit once in `basis[i]`, consuming the message.
///
/// X-basis positions are rotated back with a Hadamard before the
/// computational-basis readout. The backend is asked for exactly one shot per
/// position.
pub fn measure<B: QuantumBackend>(
    backend: &mut B,
    message: Message<B::Handle>,
    basis: &BasisString,
    rng: &mut RandomnessSource,
) -> Result<MeasurementResult, ProtocolError> {
    ensure_len("measurer", message.len(), basis.len())?;

    message
        .into_iter()
        .zip(basis.iter())
        .map(|(qubit, basis)| -> Result<bool, ProtocolError> {
            let mut handle = qubit.into_handle();
            if basis == Basis::X {
                backend.apply_transform(&mut handle, Transform::BasisChange)?;
            }
            Ok(backend.measure_once(handle, rng)?)
        })
        .collect()
}

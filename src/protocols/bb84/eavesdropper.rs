//! Intercept-resend attack by Eve.

use super::channel::validate_rate;
use super::types::{BasisString, Message, MeasurementResult, ensure_len};
use crate::backend::{Basis, QuantumBackend, Transform};
use crate::core::errors::ProtocolError;
use crate::random::RandomnessSource;

/// What Eve forwards to Bob, plus what she learned on the way.
#[derive(Debug)]
pub struct Interception<H> {
    pub message: Message<H>,
    pub eve_results: MeasurementResult,
}

/// Measures every qubit in `eve_basis[i]` and forwards it.
///
/// The measurement collapses the qubit, which is then left in the eigenstate
/// of Eve's basis matching her outcome (the resend). Each forwarded qubit is
/// additionally flipped with probability `error_rate`.
pub fn intercept<B: QuantumBackend>(
    backend: &mut B,
    message: Message<B::Handle>,
    eve_basis: &BasisString,
    error_rate: f64,
    rng: &mut RandomnessSource,
) -> Result<Interception<B::Handle>, ProtocolError> {
    validate_rate("eavesdrop_error_rate", error_rate)?;
    ensure_len("eavesdropper", message.len(), eve_basis.len())?;

    let mut eve_results = Vec::with_capacity(message.len());
    let mut forwarded = Vec::with_capacity(message.len());

    for (mut qubit, basis) in message.into_iter().zip(eve_basis.iter()) {
        let handle = qubit.handle_mut();

        if basis == Basis::X {
            backend.apply_transform(handle, Transform::BasisChange)?;
        }
        eve_results.push(backend.collapse(handle, rng)?);
        if basis == Basis::X {
            backend.apply_transform(handle, Transform::BasisChange)?;
        }

        if rng.chance(error_rate) {
            backend.apply_transform(handle, Transform::BitFlip)?;
        }
        forwarded.push(qubit);
    }

    Ok(Interception {
        message: forwarded.into_iter().collect(),
        eve_results: eve_results.into(),
    })
}

//! Alice's state preparation.

use super::types::{BasisString, BitString, Message, PreparedQubit, ensure_len};
use crate::backend::{QuantumBackend, QubitSpec};
use crate::core::errors::ProtocolError;

/// Prepares one qubit per position:
///
/// | bit | basis | state |
/// |-----|-------|-------|
/// | 0   | Z     | $|0\rangle$ |
/// | 1   | Z     | $|1\rangle$ |
/// | 0   | X     | $|+\rangle$ |
/// | 1   | X     | $|-\rangle$ |
pub fn encode<B: QuantumBackend>(
    backend: &mut B,
    bits: &BitString,
    basis: &BasisString,
) -> Result<Message<B::Handle>, ProtocolError> {
    ensure_len("encoder", bits.len(), basis.len())?;

    bits.iter()
        .zip(basis.iter())
        .map(|(bit, basis)| -> Result<_, ProtocolError> {
            let handle = backend.prepare(QubitSpec { bit, basis })?;
            Ok(PreparedQubit::new(handle, bit, basis))
        })
        .collect()
}

//! Basis reconciliation ("sifting").

use super::types::{BasisString, SiftedKey, ensure_len};
use crate::core::errors::ProtocolError;

/// Positions where both parties chose the same basis.
///
/// Built once per round and applied to both Alice's bits and Bob's results,
/// so the two keys are guaranteed to be cut from the same positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftMask {
    keep: Vec<bool>,
}

impl SiftMask {
    pub fn new(basis_a: &BasisString, basis_b: &BasisString) -> Result<Self, ProtocolError> {
        ensure_len("reconciler", basis_a.len(), basis_b.len())?;

        Ok(Self {
            keep: basis_a
                .iter()
                .zip(basis_b.iter())
                .map(|(a, b)| a == b)
                .collect(),
        })
    }

    /// Number of positions that survive sifting.
    pub fn kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    pub fn len(&self) -> usize {
        self.keep.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    /// Whether position `i` survives sifting.
    pub fn keeps(&self, i: usize) -> bool {
        self.keep.get(i).copied().unwrap_or(false)
    }

    pub fn apply(&self, values: &[bool]) -> Result<SiftedKey, ProtocolError> {
        ensure_len("reconciler", self.keep.len(), values.len())?;

        Ok(values
            .iter()
            .zip(&self.keep)
            .filter_map(|(&value, &keep)| keep.then_some(value))
            .collect())
    }
}

/// Keeps `values[i]` for every `i` where `basis_a[i] == basis_b[i]`, in order.
pub fn sift(
    basis_a: &BasisString,
    basis_b: &BasisString,
    values: &[bool],
) -> Result<SiftedKey, ProtocolError> {
    SiftMask::new(basis_a, basis_b)?.apply(values)
}

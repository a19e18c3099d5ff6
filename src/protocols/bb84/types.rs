//! Round data model: bit and basis strings, qubit messages and keys.

use crate::backend::Basis;
use crate::core::errors::ProtocolError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Defines an immutable sequence of bits with the shared accessors,
/// `0101`-style `Display` and serialization as a list of 0/1.
macro_rules! bit_sequence {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name(Vec<bool>);

        impl $name {
            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_slice(&self) -> &[bool] {
                &self.0
            }

            pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
                self.0.iter().copied()
            }
        }

        impl From<Vec<bool>> for $name {
            fn from(bits: Vec<bool>) -> Self {
                Self(bits)
            }
        }

        impl FromIterator<bool> for $name {
            fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for &bit in &self.0 {
                    f.write_str(if bit { "1" } else { "0" })?;
                }
                Ok(())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.0.iter().map(|&bit| u8::from(bit)))
            }
        }
    };
}

bit_sequence! {
    /// Alice's raw bits for one round.
    BitString
}

bit_sequence! {
    /// Bob's single-shot readouts, one per message position.
    MeasurementResult
}

bit_sequence! {
    /// Bits kept after discarding positions where the bases disagree.
    SiftedKey
}

/// One basis choice per qubit position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BasisString(Vec<Basis>);

impl BasisString {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Basis] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Basis> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<Basis>> for BasisString {
    fn from(bases: Vec<Basis>) -> Self {
        Self(bases)
    }
}

impl FromIterator<Basis> for BasisString {
    fn from_iter<I: IntoIterator<Item = Basis>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for BasisString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for basis in &self.0 {
            write!(f, "{basis}")?;
        }
        Ok(())
    }
}

/// A backend qubit handle tagged with the (bit, basis) it was prepared from.
///
/// Deliberately neither `Clone` nor `Copy`: each stage takes the qubit by
/// value and hands it on.
#[derive(Debug)]
pub struct PreparedQubit<H> {
    handle: H,
    bit: bool,
    basis: Basis,
}

impl<H> PreparedQubit<H> {
    pub fn new(handle: H, bit: bool, basis: Basis) -> Self {
        Self { handle, bit, basis }
    }

    pub fn bit(&self) -> bool {
        self.bit
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn handle_mut(&mut self) -> &mut H {
        &mut self.handle
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}

/// Ordered qubits in transit; the index is the only link back to the
/// originating bit and basis.
#[derive(Debug)]
pub struct Message<H>(Vec<PreparedQubit<H>>);

impl<H> Message<H> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreparedQubit<H>> {
        self.0.iter()
    }
}

impl<H> FromIterator<PreparedQubit<H>> for Message<H> {
    fn from_iter<I: IntoIterator<Item = PreparedQubit<H>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<H> IntoIterator for Message<H> {
    type Item = PreparedQubit<H>;
    type IntoIter = std::vec::IntoIter<PreparedQubit<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Fails with `ShapeMismatch` unless `got == expected`.
pub(crate) fn ensure_len(
    stage: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), ProtocolError> {
    if expected != got {
        return Err(ProtocolError::ShapeMismatch {
            stage,
            expected,
            got,
        });
    }
    Ok(())
}

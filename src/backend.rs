//! Quantum backend contract and its density-matrix implementation.
//!
//! The protocol stages never touch amplitudes directly. They go through
//! [`QuantumBackend`], which hands out owned qubit handles: a handle is moved
//! from stage to stage and consumed by the final readout.

use crate::core::errors::BackendError;
use crate::core::{Gate, Measurement, QuantumState};
use crate::random::RandomnessSource;
use serde::Serialize;
use std::fmt;

/// Preparation / measurement frame of a single qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Basis {
    /// Computational basis {|0>, |1>}.
    Z,
    /// Hadamard basis {|+>, |->}.
    X,
}

impl Basis {
    /// Maps a random bit to a basis: 0 -> Z, 1 -> X.
    pub fn from_bit(bit: bool) -> Self {
        if bit { Basis::X } else { Basis::Z }
    }

    pub fn as_bit(self) -> bool {
        matches!(self, Basis::X)
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Z => f.write_str("Z"),
            Basis::X => f.write_str("X"),
        }
    }
}

/// Which of the four BB84 states to prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QubitSpec {
    pub bit: bool,
    pub basis: Basis,
}

/// In-place mutations a backend must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Pauli-X.
    BitFlip,
    /// Hadamard: swaps the Z and X frames.
    BasisChange,
}

/// Executes single-qubit preparations, transforms and readouts.
///
/// Randomness needed by a readout comes from the caller's
/// [`RandomnessSource`], so a seeded source makes a whole run reproducible.
pub trait QuantumBackend {
    /// Owned handle to one qubit's state.
    type Handle;

    /// Prepares one of |0>, |1>, |+>, |-> according to `spec`.
    fn prepare(&mut self, spec: QubitSpec) -> Result<Self::Handle, BackendError>;

    fn apply_transform(
        &mut self,
        handle: &mut Self::Handle,
        kind: Transform,
    ) -> Result<(), BackendError>;

    /// Computational-basis measurement that leaves the handle usable, now in
    /// the basis state matching the returned bit.
    fn collapse(
        &mut self,
        handle: &mut Self::Handle,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError>;

    /// Single-shot computational-basis readout. Consumes the handle.
    fn measure_once(
        &mut self,
        handle: Self::Handle,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError>;
}

/// Qubit handle of the [`DensityMatrixBackend`].
#[derive(Debug)]
pub struct Qubit {
    state: QuantumState,
}

impl Qubit {
    pub fn state(&self) -> &QuantumState {
        &self.state
    }
}

/// Exact simulation of each qubit as a 2x2 density matrix.
///
/// Gates and the readout are validated once, at construction.
#[derive(Debug)]
pub struct DensityMatrixBackend {
    bit_flip: Gate,
    basis_change: Gate,
    readout: Measurement,
}

impl DensityMatrixBackend {
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            bit_flip: Gate::x().map_err(|e| BackendError::Setup(e.into()))?,
            basis_change: Gate::h().map_err(|e| BackendError::Setup(e.into()))?,
            readout: Measurement::z_basis().map_err(|e| BackendError::Setup(e.into()))?,
        })
    }

    fn gate(&self, kind: Transform) -> &Gate {
        match kind {
            Transform::BitFlip => &self.bit_flip,
            Transform::BasisChange => &self.basis_change,
        }
    }
}

impl QuantumBackend for DensityMatrixBackend {
    type Handle = Qubit;

    fn prepare(&mut self, spec: QubitSpec) -> Result<Qubit, BackendError> {
        let mut state = QuantumState::new();

        if spec.bit {
            state
                .apply(self.gate(Transform::BitFlip))
                .map_err(BackendError::Prepare)?;
        }
        if spec.basis == Basis::X {
            state
                .apply(self.gate(Transform::BasisChange))
                .map_err(BackendError::Prepare)?;
        }

        Ok(Qubit { state })
    }

    fn apply_transform(&mut self, handle: &mut Qubit, kind: Transform) -> Result<(), BackendError> {
        let gate = self.gate(kind);
        handle.state.apply(gate).map_err(BackendError::Transform)
    }

    fn collapse(
        &mut self,
        handle: &mut Qubit,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        let outcome = handle
            .state
            .measure(&self.readout, rng)
            .map_err(BackendError::Measure)?;
        Ok(outcome.bit)
    }

    fn measure_once(
        &mut self,
        mut handle: Qubit,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        self.collapse(&mut handle, rng)
    }
}

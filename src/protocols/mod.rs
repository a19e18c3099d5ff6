//! Quantum cryptography protocols.

pub mod bb84;

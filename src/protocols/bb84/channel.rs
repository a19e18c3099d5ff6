//! Noisy quantum channel between Alice and Bob.

use super::types::Message;
use crate::backend::{QuantumBackend, Transform};
use crate::core::errors::ProtocolError;
use crate::random::RandomnessSource;

/// Passes every qubit through, flipping each one independently with
/// probability `error_rate`.
pub fn transmit<B: QuantumBackend>(
    backend: &mut B,
    message: Message<B::Handle>,
    error_rate: f64,
    rng: &mut RandomnessSource,
) -> Result<Message<B::Handle>, ProtocolError> {
    validate_rate("error_rate", error_rate)?;

    let mut flips = 0usize;
    let noisy = message
        .into_iter()
        .map(|mut qubit| -> Result<_, ProtocolError> {
            if rng.chance(error_rate) {
                flips += 1;
                backend.apply_transform(qubit.handle_mut(), Transform::BitFlip)?;
            }
            Ok(qubit)
        })
        .collect::<Result<Message<_>, ProtocolError>>()?;

    tracing::trace!(flips, qubits = noisy.len(), "channel noise applied");
    Ok(noisy)
}

/// Validate a probability parameter
pub(crate) fn validate_rate(name: &'static str, p: f64) -> Result<(), ProtocolError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ProtocolError::invalid(
            name,
            format!("{p} must be between 0.0 and 1.0"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Basis, DensityMatrixBackend};
    use crate::protocols::bb84::encoder::encode;
    use crate::protocols::bb84::types::{BasisString, BitString};

    fn z_zeros(backend: &mut DensityMatrixBackend, n: usize) -> Message<crate::backend::Qubit> {
        let bits = BitString::from(vec![false; n]);
        let basis = BasisString::from(vec![Basis::Z; n]);
        encode(backend, &bits, &basis).unwrap()
    }

    fn read_all(
        backend: &mut DensityMatrixBackend,
        message: Message<crate::backend::Qubit>,
        rng: &mut RandomnessSource,
    ) -> Vec<bool> {
        message
            .into_iter()
            .map(|q| backend.measure_once(q.into_handle(), rng).unwrap())
            .collect()
    }

    #[test]
    fn zero_rate_is_lossless() {
        let mut backend = DensityMatrixBackend::new().unwrap();
        let mut rng = RandomnessSource::from_seed(1);
        let message = z_zeros(&mut backend, 16);

        let out = transmit(&mut backend, message, 0.0, &mut rng).unwrap();
        assert!(read_all(&mut backend, out, &mut rng).iter().all(|&b| !b));
    }

    #[test]
    fn full_rate_flips_every_qubit() {
        let mut backend = DensityMatrixBackend::new().unwrap();
        let mut rng = RandomnessSource::from_seed(1);
        let message = z_zeros(&mut backend, 16);

        let out = transmit(&mut backend, message, 1.0, &mut rng).unwrap();
        assert_eq!(out.len(), 16);
        assert!(read_all(&mut backend, out, &mut rng).iter().all(|&b| b));
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        let mut backend = DensityMatrixBackend::new().unwrap();
        let mut rng = RandomnessSource::from_seed(1);

        for rate in [-0.1, 1.5, f64::NAN] {
            let message = z_zeros(&mut backend, 2);
            let err = transmit(&mut backend, message, rate, &mut rng).unwrap_err();
            assert!(matches!(
                err,
                ProtocolError::InvalidParameter { name: "error_rate", .. }
            ));
        }
    }
}

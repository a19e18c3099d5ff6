use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;

#[derive(Clone, Debug)]
pub struct Measurement {
    /// List of measurement operators
    pub operators: Vec<Array2<Complex64>>,
    /// Classical bit reported for each operator
    pub outcomes: Vec<bool>,
}

impl Measurement {
    pub fn new(
        operators: Vec<Array2<Complex64>>,
        outcomes: Vec<bool>,
    ) -> Result<Self, MeasurementError> {
        if operators.len() != outcomes.len() {
            return Err(MeasurementError::CountMismatch {
                ops: operators.len(),
                vals: outcomes.len(),
            });
        }

        if operators.iter().any(|op| op.dim() != (2, 2)) || operators.is_empty() {
            return Err(MeasurementError::InvalidDimensions);
        }

        if !utils::check_completeness(&operators, 2) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self {
            operators,
            outcomes,
        })
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    ///
    /// Every readout in the simulator happens in this basis; X-basis readouts
    /// rotate the state with a Hadamard first.
    pub fn z_basis() -> Result<Measurement, MeasurementError> {
        let v0: Array1<Complex64> = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
        let v1: Array1<Complex64> = array![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];

        Measurement::new(
            vec![utils::outer_product(&v0, &v0), utils::outer_product(&v1, &v1)],
            vec![false, true],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Applied measurement operator index
    pub index: usize,
    /// Classical bit read out
    pub bit: bool,
}

use crate::core::errors::StateError;
use crate::core::gates::Gate;
use crate::core::measurements::{Measurement, Outcome};
use crate::core::utils::{self, PROBABILITY_EPSILON, dagger, trace};
use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;

/// Density matrix of a single qubit.
#[derive(Debug)]
pub struct QuantumState {
    density_matrix: Array2<Complex64>,
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0>.
    pub fn new() -> Self {
        let mut density_matrix = Array2::<Complex64>::zeros((2, 2));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self { density_matrix }
    }

    pub fn density_matrix(&self) -> &Array2<Complex64> {
        &self.density_matrix
    }

    /// Checks the validity of the density matrix
    pub fn is_valid(&self) -> Result<(), StateError> {
        let (rows, cols) = self.density_matrix.dim();

        if rows != 2 || cols != 2 {
            return Err(StateError::DimensionMismatch {
                expected: 2,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let tr = trace(&self.density_matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > 1e-9 {
            return Err(StateError::InvalidTrace(tr));
        }

        Ok(())
    }

    /// Applies a unitary gate: rho' = U * rho * U†
    pub fn apply(&mut self, gate: &Gate) -> Result<(), StateError> {
        let (rows, cols) = gate.matrix.dim();
        if rows != 2 || cols != 2 {
            return Err(StateError::DimensionMismatch {
                expected: 2,
                got_rows: rows,
                got_cols: cols,
            });
        }

        let temp = gate.matrix.dot(&self.density_matrix);
        self.density_matrix = temp.dot(&dagger(&gate.matrix));

        Ok(())
    }

    /// Returns the probability of each measurement operator.
    ///
    /// Probabilities below `PROBABILITY_EPSILON` are snapped to zero so that
    /// basis states read out deterministically.
    pub fn probabilities(&self, measurement: &Measurement) -> Result<Vec<f64>, StateError> {
        self.is_valid()?;

        let mut probs = Vec::with_capacity(measurement.operators.len());
        let mut sum_probs = 0.0;

        for op in &measurement.operators {
            let unnormalized_rho_prime = op.dot(&self.density_matrix).dot(&dagger(op));
            let p_k = trace(&unnormalized_rho_prime).re;
            let p_k = if p_k < PROBABILITY_EPSILON { 0.0 } else { p_k };

            probs.push(p_k);
            sum_probs += p_k;
        }

        if sum_probs < PROBABILITY_EPSILON {
            return Err(StateError::InvalidTrace(Complex64::new(sum_probs, 0.0)));
        }

        // Due to float, renormalization of probabilities to ensure completeness
        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok(probs)
    }

    /// Randomly selects operator index weighted by `probs`
    fn pick_outcome<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
        let roll: f64 = rng.random();

        let mut cumulative = 0.0;
        for (i, &p) in probs.iter().enumerate() {
            cumulative += p;
            if p > 0.0 && roll < cumulative {
                return i;
            }
        }
        // Rounding left the roll past the last bucket; fall back to the last possible outcome.
        probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
    }

    /// Physical measurement which changes the state irretrievably
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        measurement: &Measurement,
        rng: &mut R,
    ) -> Result<Outcome, StateError> {
        let probs = self.probabilities(measurement)?;

        let outcome_idx = Self::pick_outcome(&probs, rng);
        let p_selected = probs[outcome_idx];

        if p_selected <= 0.0 {
            return Err(StateError::ImpossibleOutcome(outcome_idx));
        }

        // rho' = (M_k * rho * M_k†) / p_k
        let m_k = &measurement.operators[outcome_idx];
        let numerator = m_k.dot(&self.density_matrix).dot(&dagger(m_k));
        self.density_matrix = numerator.mapv(|val| val / Complex64::new(p_selected, 0.0));

        Ok(Outcome {
            index: outcome_idx,
            bit: measurement.outcomes[outcome_idx],
        })
    }

    /// Fidelity-style overlap <psi|rho|psi> with a pure reference state.
    pub fn overlap(&self, reference: &ndarray::Array1<Complex64>) -> f64 {
        let projector = utils::outer_product(reference, reference);
        trace(&projector.dot(&self.density_matrix)).re
    }
}

impl Default for QuantumState {
    fn default() -> Self {
        Self::new()
    }
}

//! End-to-end pipeline behaviour: round trips, full-noise channel, backend
//! call accounting and fail-fast parameter validation.

use bb84_sim::backend::Qubit;
use bb84_sim::errors::{BackendError, ProtocolError};
use bb84_sim::protocols::bb84::{BasisString, BitString, encode, measure, transmit};
use bb84_sim::{
    Basis, DensityMatrixBackend, QuantumBackend, QubitSpec, RandomnessSource, SimulationRequest,
    Transform,
};
use bb84_sim::{ProtocolRunner, RoundReport, SimulationConfig};

/// Backend wrapper counting every call, by operation.
#[derive(Debug)]
struct CountingBackend {
    inner: DensityMatrixBackend,
    prepares: usize,
    transforms: usize,
    collapses: usize,
    readouts: usize,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            inner: DensityMatrixBackend::new().unwrap(),
            prepares: 0,
            transforms: 0,
            collapses: 0,
            readouts: 0,
        }
    }

    fn total(&self) -> usize {
        self.prepares + self.transforms + self.collapses + self.readouts
    }
}

impl QuantumBackend for CountingBackend {
    type Handle = Qubit;

    fn prepare(&mut self, spec: QubitSpec) -> Result<Qubit, BackendError> {
        self.prepares += 1;
        self.inner.prepare(spec)
    }

    fn apply_transform(&mut self, handle: &mut Qubit, kind: Transform) -> Result<(), BackendError> {
        self.transforms += 1;
        self.inner.apply_transform(handle, kind)
    }

    fn collapse(
        &mut self,
        handle: &mut Qubit,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        self.collapses += 1;
        self.inner.collapse(handle, rng)
    }

    fn measure_once(
        &mut self,
        handle: Qubit,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        self.readouts += 1;
        self.inner.measure_once(handle, rng)
    }
}

/// Backend whose readouts always fail.
#[derive(Debug)]
struct BrokenReadout {
    inner: DensityMatrixBackend,
}

impl BrokenReadout {
    fn new() -> Self {
        Self {
            inner: DensityMatrixBackend::new().unwrap(),
        }
    }
}

impl QuantumBackend for BrokenReadout {
    type Handle = Qubit;

    fn prepare(&mut self, spec: QubitSpec) -> Result<Qubit, BackendError> {
        self.inner.prepare(spec)
    }

    fn apply_transform(&mut self, handle: &mut Qubit, kind: Transform) -> Result<(), BackendError> {
        self.inner.apply_transform(handle, kind)
    }

    fn collapse(
        &mut self,
        handle: &mut Qubit,
        rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        self.inner.collapse(handle, rng)
    }

    fn measure_once(
        &mut self,
        _handle: Qubit,
        _rng: &mut RandomnessSource,
    ) -> Result<bool, BackendError> {
        Err(BackendError::Measure(
            bb84_sim::errors::StateError::ImpossibleOutcome(0),
        ))
    }
}

fn single(bit: bool, basis: Basis, rng: &mut RandomnessSource) -> bool {
    let mut backend = DensityMatrixBackend::new().unwrap();
    let bits = BitString::from(vec![bit]);
    let bases = BasisString::from(vec![basis]);

    let message = encode(&mut backend, &bits, &bases).unwrap();
    let message = transmit(&mut backend, message, 0.0, rng).unwrap();
    measure(&mut backend, message, &bases, rng).unwrap().as_slice()[0]
}

#[test]
fn zero_in_z_round_trips() {
    let mut rng = RandomnessSource::from_seed(10);
    for _ in 0..200 {
        assert!(!single(false, Basis::Z, &mut rng));
    }
}

#[test]
fn one_in_x_round_trips() {
    let mut rng = RandomnessSource::from_seed(11);
    for _ in 0..200 {
        assert!(single(true, Basis::X, &mut rng));
    }
}

#[test]
fn full_noise_flips_every_z_position_and_spares_x() {
    let mut backend = DensityMatrixBackend::new().unwrap();
    let mut rng = RandomnessSource::from_seed(12);
    let n = 256;

    let bits = rng.generate_bits(n);
    let bases = rng.generate_basis(n);
    let message = encode(&mut backend, &bits, &bases).unwrap();
    let message = transmit(&mut backend, message, 1.0, &mut rng).unwrap();
    // Bob picks Alice's bases everywhere, so every position survives sifting.
    let results = measure(&mut backend, message, &bases, &mut rng).unwrap();

    for ((sent, got), basis) in bits.iter().zip(results.iter()).zip(bases.iter()) {
        match basis {
            Basis::Z => assert_ne!(sent, got),
            // Pauli-X leaves |+> and |-> unchanged up to a global phase.
            Basis::X => assert_eq!(sent, got),
        }
    }
}

#[test]
fn measurer_reads_each_qubit_exactly_once() {
    let n = 32;
    let mut runner =
        ProtocolRunner::new(CountingBackend::new(), RandomnessSource::from_seed(13), n)
            .unwrap();

    runner.run_protocol(0.0, 4).unwrap();
    assert_eq!(runner.backend().prepares, 4 * n);
    assert_eq!(runner.backend().readouts, 4 * n);
    assert_eq!(runner.backend().collapses, 0);
}

#[test]
fn eve_collapses_each_qubit_once() {
    let n = 16;
    let mut runner =
        ProtocolRunner::new(CountingBackend::new(), RandomnessSource::from_seed(14), n)
            .unwrap();

    runner.run_eavesdropping(3, 0.0).unwrap();
    assert_eq!(runner.backend().collapses, 3 * n);
    assert_eq!(runner.backend().readouts, 3 * n);
}

#[test]
fn invalid_error_rate_fails_before_any_backend_call() {
    let mut runner =
        ProtocolRunner::new(CountingBackend::new(), RandomnessSource::from_seed(15), 32)
            .unwrap();

    let err = runner.run_protocol(-0.1, 5).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::InvalidParameter {
            name: "error_rate",
            ..
        }
    ));
    assert_eq!(runner.backend().total(), 0);

    let err = runner
        .execute(&SimulationRequest::eavesdropping(0, 0.1))
        .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::InvalidParameter {
            name: "num_iterations",
            ..
        }
    ));
    assert_eq!(runner.backend().total(), 0);
}

#[test]
fn backend_failure_aborts_the_run() {
    let mut runner =
        ProtocolRunner::new(BrokenReadout::new(), RandomnessSource::from_seed(16), 8).unwrap();

    let err = runner.run_protocol(0.0, 3).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::BackendFailure(BackendError::Measure(_))
    ));
}

#[test]
fn form_request_runs_intercept_path() {
    let request = SimulationRequest::from_query("error_rate=0&num_iterations=2&eavesdrop=on").unwrap();
    let mut runner =
        ProtocolRunner::from_config(&SimulationConfig {
            seed: Some(17),
            ..SimulationConfig::default()
        })
        .unwrap();

    let report = runner.execute(&request).unwrap();
    assert_eq!(report.rounds.len(), 2);
    assert!(
        report
            .rounds
            .iter()
            .all(|r: &RoundReport| r.stages.contains(&bb84_sim::protocols::bb84::RoundStage::Intercept))
    );
}

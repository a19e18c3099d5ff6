//! BB84 Quantum Key Distribution.
//!
//! Alice encodes random bits in randomly chosen Z/X bases, Bob measures in
//! his own random bases, and both keep only the positions where the bases
//! agreed. A round runs through a fixed state machine:
//!
//! ```text
//! GENERATE -> ENCODE -> CHANNEL   -> MEASURE -> SIFT -> COMPARE -> REPORT
//!                    \-> INTERCEPT -/
//! ```
//!
//! CHANNEL (noisy transmission) and INTERCEPT (intercept-resend by Eve) are
//! alternative paths selected by the [`PipelineMode`]; a round never takes
//! both.

pub mod channel;
pub mod eavesdropper;
pub mod encoder;
pub mod measurer;
pub mod reconciler;
pub mod report;
pub mod types;

pub use channel::transmit;
pub use eavesdropper::{Interception, intercept};
pub use encoder::encode;
pub use measurer::measure;
pub use reconciler::{SiftMask, sift};
pub use report::{PipelineMode, ProtocolReport, RoundReport, RoundStage, Summary};
pub use types::{BasisString, BitString, MeasurementResult, Message, PreparedQubit, SiftedKey};

use crate::backend::{DensityMatrixBackend, QuantumBackend};
use crate::config::SimulationConfig;
use crate::core::errors::ProtocolError;
use crate::random::RandomnessSource;
use channel::validate_rate;
use tracing::{debug, info, trace};

/// Round width used by the reference setup.
pub const DEFAULT_NUM_QUBITS: usize = 32;

/// Extra flip probability Eve introduces when none is given.
pub const DEFAULT_EAVESDROP_ERROR_RATE: f64 = 0.1;

/// Runs independent BB84 rounds against a backend.
///
/// The runner owns the backend and the single randomness stream. Nothing but
/// those two carries over from one round to the next.
#[derive(Debug)]
pub struct ProtocolRunner<B: QuantumBackend = DensityMatrixBackend> {
    backend: B,
    rng: RandomnessSource,
    num_qubits: usize,
}

impl ProtocolRunner<DensityMatrixBackend> {
    /// Density-matrix runner with the width and seed from `config`.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ProtocolError> {
        Self::new(
            DensityMatrixBackend::new()?,
            RandomnessSource::seeded_or_random(config.seed),
            config.num_qubits,
        )
    }
}

impl<B: QuantumBackend> ProtocolRunner<B> {
    pub fn new(
        backend: B,
        rng: RandomnessSource,
        num_qubits: usize,
    ) -> Result<Self, ProtocolError> {
        if num_qubits == 0 {
            return Err(ProtocolError::invalid(
                "num_qubits",
                "a round needs at least one qubit",
            ));
        }

        Ok(Self {
            backend,
            rng,
            num_qubits,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs `num_iterations` rounds over the noisy channel.
    pub fn run_protocol(
        &mut self,
        error_rate: f64,
        num_iterations: usize,
    ) -> Result<ProtocolReport, ProtocolError> {
        self.run(PipelineMode::Normal { error_rate }, num_iterations)
    }

    /// Runs `num_iterations` rounds with Eve intercepting every qubit.
    pub fn run_eavesdropping(
        &mut self,
        num_iterations: usize,
        eavesdrop_error_rate: f64,
    ) -> Result<ProtocolReport, ProtocolError> {
        self.run(
            PipelineMode::Eavesdropping {
                eavesdrop_error_rate,
            },
            num_iterations,
        )
    }

    /// Validates all parameters, then runs the rounds.
    ///
    /// Nothing reaches the backend unless every parameter is valid. A failing
    /// round aborts the remaining ones.
    pub fn run(
        &mut self,
        mode: PipelineMode,
        num_iterations: usize,
    ) -> Result<ProtocolReport, ProtocolError> {
        validate_mode(mode)?;
        if num_iterations == 0 {
            return Err(ProtocolError::invalid(
                "num_iterations",
                "must be a positive number of rounds",
            ));
        }

        let span = tracing::debug_span!("bb84", %mode, num_iterations, num_qubits = self.num_qubits);
        let _guard = span.enter();

        let rounds = (0..num_iterations)
            .map(|round| self.run_round(round, mode))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProtocolReport::new(mode, self.num_qubits, rounds))
    }

    /// Executes a single round through the state machine.
    pub fn run_round(
        &mut self,
        round: usize,
        mode: PipelineMode,
    ) -> Result<RoundReport, ProtocolError> {
        validate_mode(mode)?;

        let n = self.num_qubits;
        let mut path = StagePath::new(round);

        path.enter(RoundStage::Generate);
        debug!(round, %mode, num_qubits = n, "round started");
        let alice_bits = self.rng.generate_bits(n);
        let alice_basis = self.rng.generate_basis(n);
        let route = match mode {
            PipelineMode::Normal { error_rate } => Route::Channel { error_rate },
            PipelineMode::Eavesdropping {
                eavesdrop_error_rate,
            } => Route::Intercept {
                eve_basis: self.rng.generate_basis(n),
                error_rate: eavesdrop_error_rate,
            },
        };
        let bob_basis = self.rng.generate_basis(n);

        path.enter(RoundStage::Encode);
        let message = encode(&mut self.backend, &alice_bits, &alice_basis)?;

        let message = match route {
            Route::Channel { error_rate } => {
                path.enter(RoundStage::Channel);
                transmit(&mut self.backend, message, error_rate, &mut self.rng)?
            }
            Route::Intercept {
                eve_basis,
                error_rate,
            } => {
                path.enter(RoundStage::Intercept);
                intercept(
                    &mut self.backend,
                    message,
                    &eve_basis,
                    error_rate,
                    &mut self.rng,
                )?
                .message
            }
        };

        path.enter(RoundStage::Measure);
        let bob_results = measure(&mut self.backend, message, &bob_basis, &mut self.rng)?;

        path.enter(RoundStage::Sift);
        let mask = SiftMask::new(&alice_basis, &bob_basis)?;
        let alice_key = mask.apply(alice_bits.as_slice())?;
        let bob_key = mask.apply(bob_results.as_slice())?;

        path.enter(RoundStage::Compare);
        path.enter(RoundStage::Report);
        let report = RoundReport::new(round, alice_key, bob_key, path.into_stages());

        debug!(
            round,
            keys_match = report.keys_match,
            sifted = report.sifted_length,
            "round finished"
        );
        if !report.keys_match {
            info!(
                round,
                sifted = report.sifted_length,
                mismatches = report.mismatches,
                qber = report.qber,
                "keys differ"
            );
        }

        Ok(report)
    }
}

/// Transmission path chosen at GENERATE time.
enum Route {
    Channel {
        error_rate: f64,
    },
    Intercept {
        eve_basis: BasisString,
        error_rate: f64,
    },
}

pub(crate) fn validate_mode(mode: PipelineMode) -> Result<(), ProtocolError> {
    match mode {
        PipelineMode::Normal { error_rate } => validate_rate("error_rate", error_rate),
        PipelineMode::Eavesdropping {
            eavesdrop_error_rate,
        } => validate_rate("eavesdrop_error_rate", eavesdrop_error_rate),
    }
}

/// Records the states a round passes through.
struct StagePath {
    round: usize,
    stages: Vec<RoundStage>,
}

impl StagePath {
    fn new(round: usize) -> Self {
        Self {
            round,
            stages: Vec::with_capacity(7),
        }
    }

    fn enter(&mut self, stage: RoundStage) {
        trace!(round = self.round, %stage, "entering stage");
        self.stages.push(stage);
    }

    fn into_stages(self) -> Vec<RoundStage> {
        self.stages
    }
}

//! Typed simulation requests.
//!
//! Front ends (the web form, the CLI) describe a run with loose string
//! fields; this module turns them into a validated [`SimulationRequest`]
//! before any round is started.

use crate::backend::QuantumBackend;
use crate::core::errors::ProtocolError;
use crate::protocols::bb84::{
    DEFAULT_EAVESDROP_ERROR_RATE, PipelineMode, ProtocolReport, ProtocolRunner, validate_mode,
};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationRequest {
    #[serde(flatten)]
    pub mode: PipelineMode,
    pub num_iterations: usize,
}

impl SimulationRequest {
    pub fn normal(error_rate: f64, num_iterations: usize) -> Self {
        Self {
            mode: PipelineMode::Normal { error_rate },
            num_iterations,
        }
    }

    pub fn eavesdropping(num_iterations: usize, eavesdrop_error_rate: f64) -> Self {
        Self {
            mode: PipelineMode::Eavesdropping {
                eavesdrop_error_rate,
            },
            num_iterations,
        }
    }

    /// Builds a request from submitted form fields.
    ///
    /// `error_rate` and `num_iterations` are required. A field `eavesdrop`
    /// with value `on` selects the eavesdropping path, which uses the default
    /// Eve error rate and ignores `error_rate` beyond checking it parses.
    pub fn from_form<'a, I>(fields: I) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields: HashMap<&str, &str> = fields.into_iter().collect();

        let error_rate: f64 = required(&fields, "error_rate")?;
        let num_iterations: i64 = required(&fields, "num_iterations")?;
        let num_iterations = usize::try_from(num_iterations)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                ProtocolError::invalid(
                    "num_iterations",
                    format!("{num_iterations} is not a positive number of rounds"),
                )
            })?;

        let request = if fields.get("eavesdrop").is_some_and(|v| *v == "on") {
            Self::eavesdropping(num_iterations, DEFAULT_EAVESDROP_ERROR_RATE)
        } else {
            Self::normal(error_rate, num_iterations)
        };
        request.validate()?;
        Ok(request)
    }

    /// Parses plain `key=value` pairs joined by `&`, such as
    /// `error_rate=0.1&num_iterations=3&eavesdrop=on`. Values are taken
    /// verbatim: no percent-decoding is done.
    pub fn from_query(query: &str) -> Result<Self, ProtocolError> {
        Self::from_form(
            query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split_once('=').unwrap_or((pair, ""))),
        )
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        validate_mode(self.mode)?;
        if self.num_iterations == 0 {
            return Err(ProtocolError::invalid(
                "num_iterations",
                "must be a positive number of rounds",
            ));
        }
        Ok(())
    }
}

fn required<T: std::str::FromStr>(
    fields: &HashMap<&str, &str>,
    name: &'static str,
) -> Result<T, ProtocolError> {
    let raw = fields
        .get(name)
        .ok_or_else(|| ProtocolError::invalid(name, "missing field"))?;
    raw.trim()
        .parse()
        .map_err(|_| ProtocolError::invalid(name, format!("cannot parse `{raw}`")))
}

impl<B: QuantumBackend> ProtocolRunner<B> {
    /// Runs the pipeline `request` selects.
    pub fn execute(&mut self, request: &SimulationRequest) -> Result<ProtocolReport, ProtocolError> {
        request.validate()?;
        self.run(request.mode, request.num_iterations)
    }
}

//! Structured results of protocol runs.

use super::types::SiftedKey;
use serde::Serialize;
use std::fmt;

/// Which of the two pipeline configurations a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PipelineMode {
    /// GENERATE -> ENCODE -> CHANNEL -> MEASURE -> ...
    Normal { error_rate: f64 },
    /// GENERATE -> ENCODE -> INTERCEPT -> MEASURE -> ...
    Eavesdropping { eavesdrop_error_rate: f64 },
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineMode::Normal { error_rate } => write!(f, "normal (error rate {error_rate})"),
            PipelineMode::Eavesdropping {
                eavesdrop_error_rate,
            } => write!(f, "eavesdropping (Eve error rate {eavesdrop_error_rate})"),
        }
    }
}

/// States of the per-round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStage {
    Generate,
    Encode,
    Intercept,
    Channel,
    Measure,
    Sift,
    Compare,
    Report,
}

impl fmt::Display for RoundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundStage::Generate => "GENERATE",
            RoundStage::Encode => "ENCODE",
            RoundStage::Intercept => "INTERCEPT",
            RoundStage::Channel => "CHANNEL",
            RoundStage::Measure => "MEASURE",
            RoundStage::Sift => "SIFT",
            RoundStage::Compare => "COMPARE",
            RoundStage::Report => "REPORT",
        };
        f.write_str(name)
    }
}

/// Outcome of one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    /// Zero-based round index within the run.
    pub round: usize,
    pub alice_key: SiftedKey,
    pub bob_key: SiftedKey,
    pub keys_match: bool,
    pub sifted_length: usize,
    /// Sifted positions where the keys disagree.
    pub mismatches: usize,
    /// Quantum bit error rate in percent; 0 for an empty sifted key.
    pub qber: f64,
    /// States visited, in order.
    pub stages: Vec<RoundStage>,
}

impl RoundReport {
    pub fn new(
        round: usize,
        alice_key: SiftedKey,
        bob_key: SiftedKey,
        stages: Vec<RoundStage>,
    ) -> Self {
        let mismatches = alice_key
            .iter()
            .zip(bob_key.iter())
            .filter(|(a, b)| a != b)
            .count();
        let sifted_length = alice_key.len();
        let qber = if sifted_length > 0 {
            (mismatches as f64 / sifted_length as f64) * 100.0
        } else {
            0.0
        };

        Self {
            round,
            keys_match: alice_key == bob_key,
            alice_key,
            bob_key,
            sifted_length,
            mismatches,
            qber,
            stages,
        }
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Alice's key: {}", self.alice_key)?;
        writeln!(f, "Bob's key:   {}", self.bob_key)?;
        if self.keys_match {
            write!(f, "Keys are the same and secure.")
        } else {
            write!(
                f,
                "Error: keys are different. ({} of {} bits, QBER {:.1}%)",
                self.mismatches, self.sifted_length, self.qber
            )
        }
    }
}

/// Aggregate figures over all rounds of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub rounds: usize,
    pub matching_rounds: usize,
    pub sifted_bits: usize,
    pub mismatched_bits: usize,
    /// Fraction of sifted bits that disagree, over the whole run.
    pub mismatch_rate: f64,
    /// Mean of the per-round QBER values, in percent.
    pub mean_qber: f64,
}

impl Summary {
    fn of(rounds: &[RoundReport]) -> Self {
        let sifted_bits: usize = rounds.iter().map(|r| r.sifted_length).sum();
        let mismatched_bits: usize = rounds.iter().map(|r| r.mismatches).sum();

        Self {
            rounds: rounds.len(),
            matching_rounds: rounds.iter().filter(|r| r.keys_match).count(),
            sifted_bits,
            mismatched_bits,
            mismatch_rate: if sifted_bits > 0 {
                mismatched_bits as f64 / sifted_bits as f64
            } else {
                0.0
            },
            mean_qber: if rounds.is_empty() {
                0.0
            } else {
                rounds.iter().map(|r| r.qber).sum::<f64>() / rounds.len() as f64
            },
        }
    }
}

/// Everything a caller needs to present a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolReport {
    #[serde(flatten)]
    pub mode: PipelineMode,
    pub num_qubits: usize,
    pub rounds: Vec<RoundReport>,
    pub summary: Summary,
}

impl ProtocolReport {
    pub fn new(mode: PipelineMode, num_qubits: usize, rounds: Vec<RoundReport>) -> Self {
        Self {
            summary: Summary::of(&rounds),
            mode,
            num_qubits,
            rounds,
        }
    }

    pub fn all_match(&self) -> bool {
        self.summary.matching_rounds == self.summary.rounds
    }
}

impl fmt::Display for ProtocolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for round in &self.rounds {
            writeln!(f)?;
            writeln!(f, "{round}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "{} of {} rounds agreed [{}], {} of {} sifted bits differ ({:.1}%)",
            self.summary.matching_rounds,
            self.summary.rounds,
            self.mode,
            self.summary.mismatched_bits,
            self.summary.sifted_bits,
            self.summary.mismatch_rate * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(bits: &[u8]) -> SiftedKey {
        bits.iter().map(|&b| b == 1).collect()
    }

    #[test]
    fn round_report_counts_mismatches() {
        let report = RoundReport::new(0, key(&[1, 0, 1, 1]), key(&[1, 1, 1, 0]), vec![]);

        assert!(!report.keys_match);
        assert_eq!(report.sifted_length, 4);
        assert_eq!(report.mismatches, 2);
        assert!((report.qber - 50.0).abs() < 1e-12);
    }

    #[test]
    fn empty_keys_match_with_zero_qber() {
        let report = RoundReport::new(0, key(&[]), key(&[]), vec![]);
        assert!(report.keys_match);
        assert_eq!(report.qber, 0.0);
    }

    #[test]
    fn display_uses_verdict_wording() {
        let ok = RoundReport::new(0, key(&[0, 1]), key(&[0, 1]), vec![]);
        assert_eq!(
            ok.to_string(),
            "Alice's key: 01\nBob's key:   01\nKeys are the same and secure."
        );

        let bad = RoundReport::new(0, key(&[0, 1]), key(&[1, 1]), vec![]);
        assert!(bad.to_string().contains("Error: keys are different."));
    }

    #[test]
    fn summary_aggregates_rounds() {
        let rounds = vec![
            RoundReport::new(0, key(&[1, 1]), key(&[1, 1]), vec![]),
            RoundReport::new(1, key(&[1, 0, 0, 0]), key(&[0, 0, 0, 0]), vec![]),
        ];
        let report = ProtocolReport::new(PipelineMode::Normal { error_rate: 0.1 }, 8, rounds);

        assert_eq!(report.summary.matching_rounds, 1);
        assert_eq!(report.summary.sifted_bits, 6);
        assert_eq!(report.summary.mismatched_bits, 1);
        assert!((report.summary.mean_qber - 12.5).abs() < 1e-12);
        assert!(!report.all_match());
    }

    #[test]
    fn serializes_mode_inline() {
        let report = ProtocolReport::new(
            PipelineMode::Eavesdropping {
                eavesdrop_error_rate: 0.1,
            },
            4,
            vec![RoundReport::new(
                0,
                key(&[1]),
                key(&[1]),
                vec![RoundStage::Generate, RoundStage::Intercept],
            )],
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["mode"], "eavesdropping");
        assert_eq!(json["eavesdrop_error_rate"], 0.1);
        assert_eq!(json["rounds"][0]["alice_key"], serde_json::json!([1]));
        assert_eq!(json["rounds"][0]["stages"][1], "INTERCEPT");
    }
}

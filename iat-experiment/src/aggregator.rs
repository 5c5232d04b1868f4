use std::collections::HashSet;

use iat_core::{ConfigurationError, TrialResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DELIMITER: &str = ",";

/// Append-only store of one result per trial.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    results: Vec<TrialResult>,
    recorded: HashSet<String>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            results: Vec::with_capacity(n),
            recorded: HashSet::with_capacity(n),
        }
    }

    pub fn record(&mut self, result: TrialResult) -> Result<(), ConfigurationError> {
        if !self.recorded.insert(result.trial_id.clone()) {
            return Err(ConfigurationError::DuplicateResult {
                trial_id: result.trial_id,
            });
        }
        self.results.push(result);
        Ok(())
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn sequences(&self) -> ResultSequences {
        let n = self.results.len();
        let mut out = ResultSequences {
            trial_ids: Vec::with_capacity(n),
            input_codes: Vec::with_capacity(n),
            reaction_times_ms: Vec::with_capacity(n),
            correct: Vec::with_capacity(n),
        };
        for r in &self.results {
            out.trial_ids.push(r.trial_id.clone());
            out.input_codes.push(r.input_code.to_string());
            out.reaction_times_ms.push(r.reaction_time_ms.to_string());
            out.correct.push(if r.correct { "1" } else { "0" }.to_owned());
        }
        out
    }

    pub fn serialize(&self, delimiter: &str) -> SerializedResults {
        self.sequences().join(delimiter)
    }
}

/// The four aligned result columns, in trial order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultSequences {
    pub trial_ids: Vec<String>,
    pub input_codes: Vec<String>,
    pub reaction_times_ms: Vec<String>,
    pub correct: Vec<String>,
}

impl ResultSequences {
    pub fn len(&self) -> usize {
        self.trial_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trial_ids.is_empty()
    }

    pub fn join(&self, delimiter: &str) -> SerializedResults {
        SerializedResults {
            trial_ids: self.trial_ids.join(delimiter),
            input_codes: self.input_codes.join(delimiter),
            reaction_times_ms: self.reaction_times_ms.join(delimiter),
            correct: self.correct.join(delimiter),
        }
    }
}

/// Submission payload handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedResults {
    pub trial_ids: String,
    pub input_codes: String,
    pub reaction_times_ms: String,
    pub correct: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, code: &str, rt: u64, correct: bool) -> TrialResult {
        TrialResult {
            trial_id: id.into(),
            input_code: code.into(),
            reaction_time_ms: rt,
            correct,
        }
    }

    #[test]
    fn keeps_trial_order_in_all_columns() {
        let mut agg = ResultAggregator::new();
        agg.record(result("1", "KeyE", 512, true)).unwrap();
        agg.record(result("2", "KeyE", 730, false)).unwrap();
        agg.record(result("3", "KeyI", 401, true)).unwrap();

        let seq = agg.sequences();
        assert_eq!(seq.trial_ids, ["1", "2", "3"]);
        assert_eq!(seq.input_codes, ["KeyE", "KeyE", "KeyI"]);
        assert_eq!(seq.reaction_times_ms, ["512", "730", "401"]);
        assert_eq!(seq.correct, ["1", "0", "1"]);
    }

    #[test]
    fn rejects_second_result_for_a_trial() {
        let mut agg = ResultAggregator::new();
        agg.record(result("1", "KeyI", 300, false)).unwrap();
        let err = agg.record(result("1", "KeyE", 900, true)).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateResult {
                trial_id: "1".into()
            }
        );
        assert_eq!(agg.len(), 1);
        assert!(!agg.results()[0].correct);
    }

    #[test]
    fn joins_with_host_delimiter() {
        let mut agg = ResultAggregator::new();
        agg.record(result("7", "A", 500, true)).unwrap();
        agg.record(result("8", "L", 650, false)).unwrap();
        let out = agg.serialize(";");
        assert_eq!(out.trial_ids, "7;8");
        assert_eq!(out.input_codes, "A;L");
        assert_eq!(out.reaction_times_ms, "500;650");
        assert_eq!(out.correct, "1;0");
    }

    #[test]
    fn empty_aggregator_serializes_to_empty_strings() {
        let out = ResultAggregator::new().serialize(DEFAULT_DELIMITER);
        assert_eq!(out.trial_ids, "");
        assert_eq!(out.correct, "");
    }
}

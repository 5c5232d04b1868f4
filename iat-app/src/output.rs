use anyhow::{Context, Result};
use iat_experiment::SerializedResults;
use std::path::Path;

/// Hands the block's results to the host: a JSON file, or stdout.
pub fn write_results(results: &SerializedResults, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results).context("serializing results")?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("writing results to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iat_experiment::ResultSequences;

    #[test]
    fn writes_four_aligned_fields() {
        let seq = ResultSequences {
            trial_ids: vec!["1".into(), "2".into()],
            input_codes: vec!["KeyE".into(), "KeyI".into()],
            reaction_times_ms: vec!["512".into(), "640".into()],
            correct: vec!["1".into(), "0".into()],
        };
        let path = std::env::temp_dir().join(format!("iat-results-{}.json", std::process::id()));
        write_results(&seq.join(","), Some(&path)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let back: SerializedResults = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.trial_ids, "1,2");
        assert_eq!(back.input_codes, "KeyE,KeyI");
        assert_eq!(back.reaction_times_ms, "512,640");
        assert_eq!(back.correct, "1,0");
    }
}

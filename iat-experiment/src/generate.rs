//! Builds a shuffled trial list from a stimulus pool.

use std::collections::BTreeMap;

use iat_core::{Category, ConfigurationError, Trial};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Words per stimulus class and level: `pool[class][level] = [words]`.
pub type StimulusPool = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Which categories belong to which side, and how many trials that yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub n: usize,
    pub left: Vec<Category>,
    pub right: Vec<Category>,
}

impl BlockDefinition {
    /// Every word of every listed category becomes one trial. Ids run from
    /// `1` in presentation order.
    pub fn generate<R>(&self, pool: &StimulusPool, rng: &mut R) -> Result<Vec<Trial>, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        let mut stimuli: Vec<(&Category, &String)> = Vec::with_capacity(self.n);
        for category in self.left.iter().chain(&self.right) {
            let words = pool
                .get(&category.class)
                .and_then(|levels| levels.get(&category.level))
                .ok_or_else(|| ConfigurationError::UnknownPoolEntry {
                    class: category.class.clone(),
                    level: category.level.clone(),
                })?;
            stimuli.extend(words.iter().map(|w| (category, w)));
        }

        if stimuli.len() != self.n {
            return Err(ConfigurationError::StimulusCountMismatch {
                expected: self.n,
                found: stimuli.len(),
            });
        }

        stimuli.shuffle(rng);

        Ok(stimuli
            .into_iter()
            .enumerate()
            .map(|(i, (category, word))| {
                Trial::new(
                    (i + 1).to_string(),
                    word.as_str(),
                    category.class.as_str(),
                    category.level.as_str(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool() -> StimulusPool {
        let mut pool = StimulusPool::new();
        pool.entry("words".into()).or_default().insert(
            "positive".into(),
            vec!["joy".into(), "love".into(), "peace".into()],
        );
        pool.entry("words".into()).or_default().insert(
            "negative".into(),
            vec!["agony".into(), "awful".into(), "pain".into()],
        );
        pool
    }

    fn definition(n: usize) -> BlockDefinition {
        BlockDefinition {
            n,
            left: vec![Category::new("words", "negative")],
            right: vec![Category::new("words", "positive")],
        }
    }

    #[test]
    fn generates_one_trial_per_word() {
        let mut rng = StdRng::seed_from_u64(7);
        let trials = definition(6).generate(&pool(), &mut rng).unwrap();
        assert_eq!(trials.len(), 6);

        let ids: Vec<_> = trials.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);

        let words: HashSet<_> = trials.iter().map(|t| t.stimulus.as_str()).collect();
        assert_eq!(words.len(), 6);
        assert!(trials.iter().all(|t| t.stimulus_class == "words"));
    }

    #[test]
    fn same_seed_gives_same_order() {
        let a = definition(6)
            .generate(&pool(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        let b = definition(6)
            .generate(&pool(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let err = definition(10)
            .generate(&pool(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::StimulusCountMismatch {
                expected: 10,
                found: 6
            }
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut def = definition(6);
        def.left.push(Category::new("names", "ours"));
        let err = def
            .generate(&pool(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownPoolEntry { .. }));
    }
}

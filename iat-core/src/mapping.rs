use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::ConfigurationError;
use crate::side::{InputCode, Side};
use crate::trial::{Category, Trial};

/// Binds the two sides to input codes and categories to their correct side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMapping {
    left: InputCode,
    right: InputCode,
    correct_sides: HashMap<Category, Side>,
}

impl ResponseMapping {
    pub fn new<I>(left: InputCode, right: InputCode, table: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (Category, Side)>,
    {
        if left == right {
            return Err(ConfigurationError::IdenticalResponseCodes {
                code: left.to_string(),
            });
        }

        let mut correct_sides = HashMap::new();
        for (category, side) in table {
            match correct_sides.entry(category) {
                Entry::Vacant(slot) => {
                    slot.insert(side);
                }
                Entry::Occupied(slot) if *slot.get() != side => {
                    let category = slot.key();
                    return Err(ConfigurationError::CategoryOnBothSides {
                        class: category.class.clone(),
                        level: category.level.clone(),
                    });
                }
                Entry::Occupied(_) => {}
            }
        }

        Ok(Self {
            left,
            right,
            correct_sides,
        })
    }

    /// Builds the table from the categories listed on each side of a block.
    pub fn from_sides(
        left: InputCode,
        right: InputCode,
        left_categories: &[Category],
        right_categories: &[Category],
    ) -> Result<Self, ConfigurationError> {
        let table = left_categories
            .iter()
            .map(|c| (c.clone(), Side::Left))
            .chain(right_categories.iter().map(|c| (c.clone(), Side::Right)));
        Self::new(left, right, table)
    }

    pub fn side_of(&self, code: &str) -> Option<Side> {
        if self.left.as_str() == code {
            Some(Side::Left)
        } else if self.right.as_str() == code {
            Some(Side::Right)
        } else {
            None
        }
    }

    pub fn code_for(&self, side: Side) -> &InputCode {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn codes(&self) -> [&InputCode; 2] {
        [&self.left, &self.right]
    }

    pub fn correct_side_for(&self, class: &str, level: &str) -> Result<Side, ConfigurationError> {
        self.correct_sides
            .get(&Category::new(class, level))
            .copied()
            .ok_or_else(|| ConfigurationError::UnmappedCategory {
                class: class.to_owned(),
                level: level.to_owned(),
            })
    }

    pub fn correct_side_for_trial(&self, trial: &Trial) -> Result<Side, ConfigurationError> {
        self.correct_side_for(&trial.stimulus_class, &trial.stimulus_level)
    }

    /// Checks that every trial's category resolves to a side.
    pub fn validate_trials<'a, I>(&self, trials: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a Trial>,
    {
        for trial in trials {
            self.correct_side_for_trial(trial)?;
        }
        Ok(())
    }
}

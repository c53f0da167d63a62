use std::collections::HashMap;

use log::warn;

use crate::{Catalog, ExerciseID, normalize};

/// Curated names which generated plans tend to use for catalog exercises.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, ExerciseID>,
}

impl AliasTable {
    /// Aliases pointing to exercises missing in the catalog are skipped.
    pub fn new<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        catalog: &Catalog,
    ) -> Self {
        let mut aliases = HashMap::new();
        for (alias, id) in entries {
            match catalog.get(id) {
                Some(record) => {
                    aliases.insert(normalize(alias), record.id.clone());
                }
                None => warn!("ignoring alias \"{alias}\" for unknown exercise {id}"),
            }
        }
        Self { aliases }
    }

    #[must_use]
    pub fn builtin(catalog: &Catalog) -> Self {
        Self::new(ALIASES, catalog)
    }

    #[must_use]
    pub fn get(&self, normalized: &str) -> Option<&ExerciseID> {
        self.aliases.get(normalized)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

const ALIASES: [(&str, &str); 12] = [
    ("Air Squat", "squat01"),
    ("Bent Over Row", "bRow001"),
    ("Bodyweight Squat", "squat01"),
    ("Forward Lunge", "lunge01"),
    ("Front Plank", "plank01"),
    ("Hip Thrust", "gBrdg02"),
    ("Military Press", "ohPrs01"),
    ("Press Ups", "pushU01"),
    ("Shoulder Press", "ohPrs02"),
    ("Skull Crushers", "ltExt01"),
    ("Star Jumps", "jJack01"),
    ("Triceps Pushdown", "tPush01"),
];

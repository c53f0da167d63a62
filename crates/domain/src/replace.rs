use std::collections::HashSet;

use derive_more::Display;

use crate::{
    Catalog, Classification, ExerciseHint, ExerciseID, ExerciseRecord, ExerciseReference,
    FilteredSet, Name, SectionKind,
};

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReplacementStrategy {
    #[display("full match")]
    FullMatch,
    #[display("partial match")]
    PartialMatch,
    #[display("arbitrary fallback")]
    Arbitrary,
}

impl ReplacementStrategy {
    pub const ALL: [ReplacementStrategy; 3] = [
        ReplacementStrategy::FullMatch,
        ReplacementStrategy::PartialMatch,
        ReplacementStrategy::Arbitrary,
    ];

    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            ReplacementStrategy::FullMatch => {
                "shares target muscles and body parts with compatible equipment"
            }
            ReplacementStrategy::PartialMatch => "shares body parts",
            ReplacementStrategy::Arbitrary => "no eligible exercise shares body parts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementDecision {
    pub section: SectionKind,
    pub position: usize,
    pub original: ExerciseReference,
    pub classification: Classification,
    pub substitute: ExerciseID,
    pub substitute_name: Name,
    pub strategy: ReplacementStrategy,
    pub reason: String,
}

impl ReplacementDecision {
    #[must_use]
    pub fn warning(&self) -> String {
        format!(
            "replaced {} {} in {} at position {} by {} ({}) using {}: {}",
            self.classification,
            self.original,
            self.section,
            self.position,
            self.substitute,
            self.substitute_name,
            self.strategy,
            self.reason
        )
    }
}

pub struct ReplacementSelector<'a> {
    catalog: &'a Catalog,
    filtered: &'a FilteredSet,
}

impl<'a> ReplacementSelector<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, filtered: &'a FilteredSet) -> Self {
        Self { catalog, filtered }
    }

    /// Picks a substitute matching the intended training as close as possible. Within each
    /// strategy, exercises which are not part of `used` only break ties of equally close
    /// matches. Returns `None` only if the filtered set is empty.
    #[must_use]
    pub fn select(
        &self,
        intent: &ExerciseHint,
        used: &HashSet<ExerciseID>,
    ) -> Option<(&'a ExerciseRecord, ReplacementStrategy)> {
        let candidates = self.filtered.records(self.catalog).collect::<Vec<_>>();

        ReplacementStrategy::ALL.into_iter().find_map(|strategy| {
            pick(strategy, intent, &candidates, used).map(|record| (record, strategy))
        })
    }
}

/// Candidates are in catalog order, so `min_by_key` settles remaining ties by catalog order.
fn pick<'a>(
    strategy: ReplacementStrategy,
    intent: &ExerciseHint,
    candidates: &[&'a ExerciseRecord],
    used: &HashSet<ExerciseID>,
) -> Option<&'a ExerciseRecord> {
    let candidates = candidates.iter().copied();
    match strategy {
        ReplacementStrategy::FullMatch => candidates
            .filter(|record| {
                intent.shares_muscles(record)
                    && intent.shares_body_parts(record)
                    && intent.equipment_compatible(record)
            })
            .min_by_key(|record| used.contains(&record.id)),
        ReplacementStrategy::PartialMatch => candidates
            .filter(|record| intent.shares_body_parts(record))
            .min_by_key(|record| {
                (
                    !intent.shares_muscles(record),
                    !intent.equipment_compatible(record),
                    used.contains(&record.id),
                )
            }),
        ReplacementStrategy::Arbitrary => candidates.min_by_key(|record| {
            (
                !intent.shares_muscles(record),
                !intent.equipment_compatible(record),
                used.contains(&record.id),
            )
        }),
    }
}

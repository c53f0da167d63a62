//! Classification of plan references
//!
//! Each reference of a generated plan is checked against the set of exercises the user is
//! allowed to do (the filtered set) and against the catalog. References outside of the filtered
//! set have to be replaced later on.

use std::collections::HashSet;

use derive_more::Display;
use log::warn;

use crate::{
    Catalog, ExerciseID, ExerciseRecord, ExerciseReference, Plan, ReplacementDecision,
    SectionKind,
};

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Part of the filtered set.
    #[display("ideal")]
    Ideal,
    /// Part of the catalog, but not of the filtered set.
    #[display("recoverable")]
    Recoverable,
    /// Unknown to the catalog.
    #[display("fabricated")]
    Fabricated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub section: SectionKind,
    pub position: usize,
    pub reference: ExerciseReference,
    /// Canonical ID the reference was resolved to, if any.
    pub id: Option<ExerciseID>,
    pub classification: Classification,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub entries: Vec<ReportEntry>,
    pub replacements: Vec<ReplacementDecision>,
    /// Problems not tied to a single reference.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn needs_replacement(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.classification != Classification::Ideal)
    }

    #[must_use]
    pub fn count(&self, classification: Classification) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.classification == classification)
            .count()
    }

    /// General warnings followed by one warning per replaced reference.
    #[must_use]
    pub fn all_warnings(&self) -> Vec<String> {
        self.warnings
            .iter()
            .cloned()
            .chain(self.replacements.iter().map(ReplacementDecision::warning))
            .collect()
    }
}

/// IDs a plan may contain, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredSet {
    ids: Vec<ExerciseID>,
    members: HashSet<String>,
}

impl FilteredSet {
    /// IDs which are not part of the catalog are dropped. A warning is returned for each of them.
    pub fn new<S: AsRef<str>>(ids: &[S], catalog: &Catalog) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let mut positions = Vec::with_capacity(ids.len());

        for id in ids {
            let id = id.as_ref().trim();
            match catalog.position(id) {
                Some(pos) => positions.push(pos),
                None => {
                    let warning = format!("ignoring unknown ID \"{id}\" in filtered set");
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        positions.sort_unstable();
        positions.dedup();

        let ids = positions
            .into_iter()
            .map(|pos| catalog.record(pos).id.clone())
            .collect::<Vec<_>>();
        let members = ids.iter().map(ToString::to_string).collect();

        (Self { ids, members }, warnings)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn records<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = &'a ExerciseRecord> + 'a {
        self.ids.iter().filter_map(|id| catalog.get(id))
    }
}

pub struct IdValidator<'a> {
    catalog: &'a Catalog,
    filtered: &'a FilteredSet,
}

impl<'a> IdValidator<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, filtered: &'a FilteredSet) -> Self {
        Self { catalog, filtered }
    }

    #[must_use]
    pub fn classify(&self, id: Option<&str>) -> Classification {
        match id {
            Some(id) if self.filtered.contains(id) => Classification::Ideal,
            Some(id) if self.catalog.contains(id) => Classification::Recoverable,
            _ => Classification::Fabricated,
        }
    }

    /// Classifies all references of a plan. For name references, `resolved` gives the canonical
    /// ID found for the entry at the given index in plan order.
    pub fn validate(
        &self,
        plan: &Plan,
        resolved: impl Fn(usize) -> Option<ExerciseID>,
    ) -> Vec<ReportEntry> {
        plan.entries()
            .enumerate()
            .map(|(index, (section, position, entry))| {
                let id = match &entry.reference {
                    ExerciseReference::Id(id) => self
                        .catalog
                        .get(id.trim())
                        .map(|record| record.id.clone()),
                    ExerciseReference::Name(_) => resolved(index),
                };
                let classification = self.classify(id.as_ref().map(ExerciseID::as_str));
                let reason = reason(&entry.reference, id.as_ref(), classification);
                ReportEntry {
                    section,
                    position,
                    reference: entry.reference.clone(),
                    id,
                    classification,
                    reason,
                }
            })
            .collect()
    }
}

fn reason(
    reference: &ExerciseReference,
    id: Option<&ExerciseID>,
    classification: Classification,
) -> String {
    match (classification, id) {
        (Classification::Ideal, Some(id)) => format!("{reference} refers to eligible {id}"),
        (Classification::Recoverable, Some(id)) => {
            format!("{reference} refers to {id} which is not eligible")
        }
        (_, _) => match reference {
            ExerciseReference::Id(_) => format!("{reference} does not exist in catalog"),
            ExerciseReference::Name(_) => format!("{reference} matches no catalog exercise"),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{PlanEntry, PlanSection};

    #[fixture]
    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[rstest]
    fn test_filtered_set_new(catalog: Catalog) {
        let (filtered, warnings) =
            FilteredSet::new(&["squat01", "zzzzzzz", " bkExt01", "squat01"], &catalog);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.contains("squat01"));
        assert!(filtered.contains("bkExt01"));
        assert!(!filtered.contains("zzzzzzz"));
        assert_eq!(
            filtered
                .records(&catalog)
                .map(|record| record.id.as_str())
                .collect::<Vec<_>>(),
            vec!["bkExt01", "squat01"]
        );
        assert_eq!(
            warnings,
            vec!["ignoring unknown ID \"zzzzzzz\" in filtered set".to_string()]
        );
    }

    #[rstest]
    #[case(Some("pushU01"), Classification::Ideal)]
    #[case(Some("plank01"), Classification::Recoverable)]
    #[case(Some("zzzzzzz"), Classification::Fabricated)]
    #[case(None, Classification::Fabricated)]
    fn test_classify(
        catalog: Catalog,
        #[case] id: Option<&str>,
        #[case] expected: Classification,
    ) {
        let (filtered, _) = FilteredSet::new(&["pushU01"], &catalog);
        let validator = IdValidator::new(&catalog, &filtered);

        assert_eq!(validator.classify(id), expected);
    }

    #[rstest]
    fn test_validate(catalog: Catalog) {
        let (filtered, _) = FilteredSet::new(&["pushU01", "mClmb01"], &catalog);
        let validator = IdValidator::new(&catalog, &filtered);
        let plan = Plan {
            sections: vec![
                PlanSection {
                    kind: SectionKind::WarmUp,
                    entries: vec![PlanEntry::name("mountain climbers")],
                },
                PlanSection {
                    kind: SectionKind::Main,
                    entries: vec![
                        PlanEntry::id("pushU01"),
                        PlanEntry::id("plank01"),
                        PlanEntry::id("zzzzzzz"),
                        PlanEntry::name("Moon Walk"),
                    ],
                },
            ],
        };

        let report = ValidationReport {
            entries: validator.validate(&plan, |index| match index {
                0 => Some(ExerciseID::new("mClmb01").unwrap()),
                _ => None,
            }),
            ..ValidationReport::default()
        };

        assert_eq!(
            report
                .entries
                .iter()
                .map(|entry| (entry.section, entry.position, entry.classification))
                .collect::<Vec<_>>(),
            vec![
                (SectionKind::WarmUp, 0, Classification::Ideal),
                (SectionKind::Main, 0, Classification::Ideal),
                (SectionKind::Main, 1, Classification::Recoverable),
                (SectionKind::Main, 2, Classification::Fabricated),
                (SectionKind::Main, 3, Classification::Fabricated),
            ]
        );
        assert_eq!(
            report
                .entries
                .iter()
                .map(|entry| entry.reason.as_str())
                .collect::<Vec<_>>(),
            vec![
                "name \"mountain climbers\" refers to eligible mClmb01",
                "ID \"pushU01\" refers to eligible pushU01",
                "ID \"plank01\" refers to plank01 which is not eligible",
                "ID \"zzzzzzz\" does not exist in catalog",
                "name \"Moon Walk\" matches no catalog exercise",
            ]
        );
        assert_eq!(report.count(Classification::Ideal), 2);
        assert_eq!(report.count(Classification::Recoverable), 1);
        assert_eq!(report.count(Classification::Fabricated), 2);
        assert_eq!(report.needs_replacement().count(), 3);
    }

    #[rstest]
    fn test_validate_with_empty_filtered_set(catalog: Catalog) {
        let filtered = FilteredSet::default();
        let validator = IdValidator::new(&catalog, &filtered);
        let plan = Plan {
            sections: vec![PlanSection {
                kind: SectionKind::Main,
                entries: vec![PlanEntry::id("pushU01"), PlanEntry::id("zzzzzzz")],
            }],
        };

        assert_eq!(
            validator
                .validate(&plan, |_| None)
                .into_iter()
                .map(|entry| entry.classification)
                .collect::<Vec<_>>(),
            vec![Classification::Recoverable, Classification::Fabricated]
        );
    }
}

use derive_more::Display;

use crate::{ExerciseHint, ExerciseID, Name, Tier};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub sections: Vec<PlanSection>,
}

impl Plan {
    /// All entries with their section and position inside the section.
    pub fn entries(&self) -> impl Iterator<Item = (SectionKind, usize, &PlanEntry)> {
        self.sections.iter().flat_map(|section| {
            section
                .entries
                .iter()
                .enumerate()
                .map(|(position, entry)| (section.kind, position, entry))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSection {
    pub kind: SectionKind,
    pub entries: Vec<PlanEntry>,
}

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    #[display("warm-up")]
    WarmUp,
    #[display("main")]
    Main,
    #[display("cool-down")]
    CoolDown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub reference: ExerciseReference,
    pub hint: ExerciseHint,
    /// Sets, repetitions or durations as produced upstream, passed through unchanged.
    pub prescription: Option<String>,
}

impl PlanEntry {
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(ExerciseReference::Id(id.into()))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(ExerciseReference::Name(name.into()))
    }

    fn new(reference: ExerciseReference) -> Self {
        Self {
            reference,
            hint: ExerciseHint::default(),
            prescription: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: ExerciseHint) -> Self {
        self.hint = hint;
        self
    }

    #[must_use]
    pub fn with_prescription(mut self, prescription: impl Into<String>) -> Self {
        self.prescription = Some(prescription.into());
        self
    }
}

#[derive(Display, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExerciseReference {
    #[display("ID \"{_0}\"")]
    Id(String),
    #[display("name \"{_0}\"")]
    Name(String),
}

impl ExerciseReference {
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            ExerciseReference::Id(raw) | ExerciseReference::Name(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedPlan {
    pub sections: Vec<ValidatedSection>,
    pub metadata: PlanMetadata,
}

impl ValidatedPlan {
    pub fn exercises(&self) -> impl Iterator<Item = (SectionKind, usize, &ValidatedExercise)> {
        self.sections.iter().flat_map(|section| {
            section
                .exercises
                .iter()
                .enumerate()
                .map(|(position, exercise)| (section.kind, position, exercise))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSection {
    pub kind: SectionKind,
    pub exercises: Vec<ValidatedExercise>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExercise {
    pub id: ExerciseID,
    pub name: Name,
    pub media_url: String,
    pub tier: Tier,
    pub confidence: f32,
    /// Whether the exercise substitutes the one referenced in the plan.
    pub replaced: bool,
    pub prescription: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanMetadata {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plan_entries() {
        let plan = Plan {
            sections: vec![
                PlanSection {
                    kind: SectionKind::WarmUp,
                    entries: vec![PlanEntry::id("jJack01")],
                },
                PlanSection {
                    kind: SectionKind::Main,
                    entries: vec![
                        PlanEntry::id("pushU01").with_prescription("3x12"),
                        PlanEntry::name("Goblet Squats"),
                    ],
                },
            ],
        };

        assert_eq!(
            plan.entries()
                .map(|(kind, position, entry)| (kind, position, entry.reference.raw()))
                .collect::<Vec<_>>(),
            vec![
                (SectionKind::WarmUp, 0, "jJack01"),
                (SectionKind::Main, 0, "pushU01"),
                (SectionKind::Main, 1, "Goblet Squats"),
            ]
        );
    }

    #[test]
    fn test_exercise_reference_display() {
        assert_eq!(
            ExerciseReference::Id("zzzzzzz".to_string()).to_string(),
            "ID \"zzzzzzz\""
        );
        assert_eq!(
            ExerciseReference::Name("Moon Walk".to_string()).to_string(),
            "name \"Moon Walk\""
        );
        assert_eq!(SectionKind::CoolDown.to_string(), "cool-down");
    }
}

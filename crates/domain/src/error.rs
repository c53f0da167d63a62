use crate::{PlanMetadata, SectionKind, ValidationReport};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error(
        "no eligible substitute for {} of {} references",
        .report.needs_replacement().count(),
        .report.entries.len()
    )]
    NoEligibleSubstitute { report: ValidationReport },
    #[error("no media for {name} in {section} at position {position}")]
    MissingMedia {
        section: SectionKind,
        position: usize,
        name: String,
        warnings: Vec<String>,
    },
}

impl ValidationError {
    /// Error block for the caller, including the warnings collected before the failure.
    #[must_use]
    pub fn metadata(&self) -> PlanMetadata {
        PlanMetadata {
            errors: vec![self.to_string()],
            warnings: match self {
                ValidationError::NoEligibleSubstitute { report } => report
                    .warnings
                    .iter()
                    .cloned()
                    .chain(report.needs_replacement().map(|entry| {
                        format!(
                            "{} {} in {} at position {}: {}",
                            entry.classification,
                            entry.reference,
                            entry.section,
                            entry.position,
                            entry.reason
                        )
                    }))
                    .collect(),
                ValidationError::MissingMedia { warnings, .. } => warnings.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Classification, ExerciseReference, ReportEntry};

    #[test]
    fn test_read_error_from_storage_error() {
        assert!(matches!(
            ReadError::from(StorageError::NoConnection),
            ReadError::Storage(StorageError::NoConnection)
        ));
        assert_eq!(
            ReadError::from(StorageError::NoConnection).to_string(),
            "no connection"
        );
    }

    #[test]
    fn test_no_eligible_substitute_metadata() {
        let error = ValidationError::NoEligibleSubstitute {
            report: ValidationReport {
                entries: vec![ReportEntry {
                    section: SectionKind::Main,
                    position: 0,
                    reference: ExerciseReference::Id("zzzzzzz".to_string()),
                    id: None,
                    classification: Classification::Fabricated,
                    reason: "ID \"zzzzzzz\" does not exist in catalog".to_string(),
                }],
                replacements: vec![],
                warnings: vec!["ignoring unknown ID \"yyyyyyy\" in filtered set".to_string()],
            },
        };

        assert_eq!(
            error.metadata(),
            PlanMetadata {
                errors: vec!["no eligible substitute for 1 of 1 references".to_string()],
                warnings: vec![
                    "ignoring unknown ID \"yyyyyyy\" in filtered set".to_string(),
                    "fabricated ID \"zzzzzzz\" in main at position 0: ID \"zzzzzzz\" does not \
                     exist in catalog"
                        .to_string()
                ],
            }
        );
    }

    #[test]
    fn test_missing_media_metadata() {
        let error = ValidationError::MissingMedia {
            section: SectionKind::CoolDown,
            position: 1,
            name: "Plank".to_string(),
            warnings: vec!["replaced something".to_string()],
        };

        assert_eq!(
            error.metadata(),
            PlanMetadata {
                errors: vec!["no media for Plank in cool-down at position 1".to_string()],
                warnings: vec!["replaced something".to_string()],
            }
        );
    }
}

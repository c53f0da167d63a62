use log::error;

use crate::{ValidatedPlan, ValidationError};

/// Ensures that every exercise of a plan has a media URL.
///
/// A gap means that the media fallback chain is broken, so the whole plan is rejected.
pub fn enforce_media_coverage(plan: &ValidatedPlan) -> Result<(), ValidationError> {
    for (section, position, exercise) in plan.exercises() {
        if exercise.media_url.trim().is_empty() {
            error!(
                "no media for {} ({}) in {section} at position {position}",
                exercise.name, exercise.id
            );
            return Err(ValidationError::MissingMedia {
                section,
                position,
                name: exercise.name.to_string(),
                warnings: plan.metadata.warnings.clone(),
            });
        }
    }
    Ok(())
}

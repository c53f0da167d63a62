use std::{collections::HashSet, sync::Arc};

use futures_util::future::join_all;
use log::{debug, error, warn};

use crate::{
    AliasTable, Catalog, Classification, ExerciseID, ExerciseReference, ExerciseSearchRepository,
    FilteredSet, IdValidator, MediaError, MediaRegistry, Plan, PlanMetadata, ReplacementDecision,
    ReplacementSelector, ReportEntry, ResolutionQuery, ResolutionResult, Resolver, ResultCache,
    Settings, ValidatedExercise, ValidatedPlan, ValidatedSection, ValidationError,
    ValidationReport, coverage::enforce_media_coverage,
};

pub struct Service<R> {
    resolver: Resolver<R>,
}

impl<R: ExerciseSearchRepository> Service<R> {
    pub fn new(
        catalog: Catalog,
        aliases: AliasTable,
        settings: &Settings,
        search: R,
    ) -> Result<Self, MediaError> {
        let media = MediaRegistry::new(&settings.media)?;
        debug!(
            "initialized service with {} exercises, {} aliases and media providers {:?}",
            catalog.len(),
            aliases.len(),
            media.providers().collect::<Vec<_>>()
        );
        Ok(Self {
            resolver: Resolver::new(
                Arc::new(catalog),
                Arc::new(aliases),
                Arc::new(ResultCache::new(&settings.cache)),
                Arc::new(media),
                search,
                settings.resolver.clone(),
            ),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    pub async fn resolve(&self, query: &ResolutionQuery) -> ResolutionResult {
        self.resolver.resolve(query).await
    }

    /// Has to be called whenever the catalog data changes.
    pub fn clear_cache(&self) {
        debug!(
            "clearing {} cached resolutions",
            self.resolver.cache().len()
        );
        self.resolver.cache().clear();
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.resolver.cache().len()
    }

    /// Turns a generated plan into a plan which only contains eligible exercises with media.
    ///
    /// References to exercises outside of the filtered set are replaced, each replacement is
    /// reported as a warning. Validation fails if a replacement is needed but no exercise is
    /// eligible, or if an exercise ends up without media.
    pub async fn validate_plan<S: AsRef<str>>(
        &self,
        plan: &Plan,
        filtered_ids: &[S],
    ) -> Result<(ValidatedPlan, ValidationReport), ValidationError> {
        let catalog = self.resolver.catalog();
        let (filtered, warnings) = FilteredSet::new(filtered_ids, catalog);

        let name_results = join_all(plan.entries().map(|(_, _, entry)| async move {
            match &entry.reference {
                ExerciseReference::Name(name) => Some(
                    self.resolver
                        .resolve(
                            &ResolutionQuery::new(name.as_str()).with_hint(entry.hint.clone()),
                        )
                        .await,
                ),
                ExerciseReference::Id(_) => None,
            }
        }))
        .await;

        let mut report = ValidationReport {
            entries: IdValidator::new(catalog, &filtered).validate(plan, |index| {
                name_results
                    .get(index)
                    .and_then(Option::as_ref)
                    .and_then(|result| result.id().cloned())
            }),
            replacements: vec![],
            warnings,
        };
        debug!(
            "classified {} references: {} ideal, {} recoverable, {} fabricated",
            report.entries.len(),
            report.count(Classification::Ideal),
            report.count(Classification::Recoverable),
            report.count(Classification::Fabricated)
        );

        let Some(targets) = self.select_targets(plan, &report.entries, &filtered) else {
            error!(
                "no eligible substitute among {} filtered exercises",
                filtered.len()
            );
            return Err(ValidationError::NoEligibleSubstitute { report });
        };

        let resolved = join_all(targets.iter().zip(&name_results).map(
            |((id, decision), name_result)| async move {
                match (decision, name_result) {
                    (None, Some(result)) => result.clone(),
                    _ => {
                        self.resolver
                            .resolve(&ResolutionQuery::new(id.as_str()))
                            .await
                    }
                }
            },
        ))
        .await;

        let mut exercises = targets
            .iter()
            .zip(resolved)
            .zip(plan.entries())
            .map(|(((id, decision), result), (_, _, entry))| ValidatedExercise {
                id: id.clone(),
                name: result.display_name,
                media_url: result.media.url.to_string(),
                tier: result.tier,
                confidence: result.confidence,
                replaced: decision.is_some(),
                prescription: entry.prescription.clone(),
            });
        let sections = plan
            .sections
            .iter()
            .map(|section| ValidatedSection {
                kind: section.kind,
                exercises: exercises.by_ref().take(section.entries.len()).collect(),
            })
            .collect();

        report.replacements = targets
            .into_iter()
            .filter_map(|(_, decision)| decision)
            .collect();
        let validated_plan = ValidatedPlan {
            sections,
            metadata: PlanMetadata {
                errors: vec![],
                warnings: report.all_warnings(),
            },
        };

        enforce_media_coverage(&validated_plan)?;

        Ok((validated_plan, report))
    }

    /// Determines the exercise for each plan entry, choosing substitutes for all entries which
    /// are not eligible. Returns `None` if a substitute is needed but none is available.
    fn select_targets(
        &self,
        plan: &Plan,
        entries: &[ReportEntry],
        filtered: &FilteredSet,
    ) -> Option<Vec<(ExerciseID, Option<ReplacementDecision>)>> {
        let catalog = self.resolver.catalog();
        let selector = ReplacementSelector::new(catalog, filtered);
        let mut used = entries
            .iter()
            .filter(|entry| entry.classification == Classification::Ideal)
            .filter_map(|entry| entry.id.clone())
            .collect::<HashSet<_>>();

        entries
            .iter()
            .zip(plan.entries())
            .map(|(entry, (_, _, plan_entry))| {
                if entry.classification == Classification::Ideal {
                    return entry.id.clone().map(|id| (id, None));
                }

                let intent = match entry.id.as_ref().and_then(|id| catalog.get(id)) {
                    Some(record) => plan_entry.hint.clone().merge(&record.hint()),
                    None => plan_entry.hint.clone(),
                };
                let (substitute, strategy) = selector.select(&intent, &used)?;
                used.insert(substitute.id.clone());

                let decision = ReplacementDecision {
                    section: entry.section,
                    position: entry.position,
                    original: entry.reference.clone(),
                    classification: entry.classification,
                    substitute: substitute.id.clone(),
                    substitute_name: substitute.name.clone(),
                    strategy,
                    reason: strategy.reason().to_string(),
                };
                warn!("{}", decision.warning());

                Some((substitute.id.clone(), Some(decision)))
            })
            .collect()
    }
}

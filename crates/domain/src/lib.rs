#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod alias;
pub mod cache;
pub mod catalog;
pub mod coverage;
pub mod error;
pub mod exercise;
pub mod media;
pub mod name;
pub mod normalize;
pub mod plan;
pub mod replace;
pub mod resolver;
pub mod service;
pub mod settings;
pub mod validate;

pub use alias::AliasTable;
pub use cache::{PartialHit, ResultCache};
pub use catalog::{Catalog, CatalogError};
pub use coverage::enforce_media_coverage;
pub use error::{ReadError, StorageError, ValidationError};
pub use exercise::{
    BodyPart, Equipment, EquipmentClass, ExerciseHint, ExerciseID, ExerciseIDError,
    ExerciseRecord, MediaRef, Muscle, Property, ProviderID, parse_tag,
};
pub use media::{
    BundledProvider, CdnProvider, Media, MediaError, MediaProvider, MediaRegistry, MediaSource,
    MediaUrl,
};
pub use name::{Name, NameError};
pub use normalize::normalize;
pub use plan::{
    ExerciseReference, Plan, PlanEntry, PlanMetadata, PlanSection, SectionKind,
    ValidatedExercise, ValidatedPlan, ValidatedSection,
};
pub use replace::{ReplacementDecision, ReplacementSelector, ReplacementStrategy};
pub use resolver::{ResolutionQuery, ResolutionResult, Resolver, SearchHit, Tier};
pub use service::Service;
pub use settings::{CacheSettings, MediaSettings, ProviderSettings, ResolverSettings, Settings};
pub use validate::{Classification, FilteredSet, IdValidator, ReportEntry, ValidationReport};

/// Out-of-process index used as a last resort for names unknown to the catalog.
#[allow(async_fn_in_trait)]
pub trait ExerciseSearchRepository {
    /// Hits are ordered by relevance.
    async fn search_exercises(&self, query: &str, limit: usize)
    -> Result<Vec<SearchHit>, ReadError>;
}

/// Used when no search index is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSearch;

impl ExerciseSearchRepository for NoSearch {
    async fn search_exercises(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<SearchHit>, ReadError> {
        Err(StorageError::NoConnection.into())
    }
}

//! Tiered exercise resolution
//!
//! A reference to an exercise is resolved by trying increasingly expensive strategies in a fixed
//! order until one of them yields a canonical record. If all of them miss, a result with a
//! synthesized name and a default media asset is returned. Resolving never fails and every
//! result carries a media URL.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use derive_more::Display;
use log::{debug, warn};

use crate::{
    AliasTable, Catalog, ExerciseHint, ExerciseID, ExerciseRecord, ExerciseSearchRepository,
    Media, MediaRegistry, MediaUrl, Name, ReadError, ResolverSettings, ResultCache, StorageError,
    normalize::{display_name, keywords, normalize},
};

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    #[display("catalog exact")]
    CatalogExact,
    #[display("alias")]
    Alias,
    #[display("cache exact")]
    CacheExact,
    #[display("tag match")]
    TagMatch,
    #[display("external search")]
    ExternalSearch,
    #[display("cache partial")]
    CachePartial,
    #[display("synthesized")]
    Synthesized,
}

impl Tier {
    /// Strategies in the order they are tried.
    pub const STRATEGIES: [Tier; 6] = [
        Tier::CatalogExact,
        Tier::Alias,
        Tier::CacheExact,
        Tier::TagMatch,
        Tier::ExternalSearch,
        Tier::CachePartial,
    ];

    /// Results of these tiers are memoized, except for exact ID matches and tag matches
    /// influenced by a hint.
    #[must_use]
    pub fn is_cached(self) -> bool {
        matches!(
            self,
            Tier::CatalogExact | Tier::Alias | Tier::TagMatch | Tier::ExternalSearch
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionQuery {
    pub raw: String,
    pub hint: Option<ExerciseHint>,
}

impl ResolutionQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: ExerciseHint) -> Self {
        self.hint = if hint.is_empty() { None } else { Some(hint) };
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    /// Canonical record, `None` if the name was synthesized.
    pub record: Option<ExerciseRecord>,
    pub display_name: Name,
    pub tier: Tier,
    pub confidence: f32,
    pub media: Media,
    pub elapsed: Duration,
}

impl ResolutionResult {
    #[must_use]
    pub fn id(&self) -> Option<&ExerciseID> {
        self.record.as_ref().map(|record| &record.id)
    }

    #[must_use]
    pub fn media_url(&self) -> &MediaUrl {
        &self.media.url
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    /// Relevance in [0, 1].
    pub score: f32,
}

pub struct Resolver<R> {
    catalog: Arc<Catalog>,
    aliases: Arc<AliasTable>,
    cache: Arc<ResultCache>,
    media: Arc<MediaRegistry>,
    search: R,
    settings: ResolverSettings,
}

enum Found<'a> {
    /// Exact ID match, never memoized as cache keys are case-insensitive.
    Id(&'a ExerciseRecord),
    Record(&'a ExerciseRecord, f32),
    Cached(ResolutionResult, f32),
}

impl<R: ExerciseSearchRepository> Resolver<R> {
    pub fn new(
        catalog: Arc<Catalog>,
        aliases: Arc<AliasTable>,
        cache: Arc<ResultCache>,
        media: Arc<MediaRegistry>,
        search: R,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            catalog,
            aliases,
            cache,
            media,
            search,
            settings,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Must be awaited inside a Tokio runtime with the time driver enabled.
    pub async fn resolve(&self, query: &ResolutionQuery) -> ResolutionResult {
        let start = Instant::now();
        let key = normalize(&query.raw);

        for tier in Tier::STRATEGIES {
            let found = match tier {
                Tier::CatalogExact => self.catalog_exact(&query.raw, &key),
                Tier::Alias => self.alias(&key),
                Tier::CacheExact => self
                    .cache
                    .get_exact(&key)
                    .map(|cached| {
                        let confidence = cached.confidence;
                        Found::Cached(cached, confidence)
                    }),
                Tier::TagMatch => self.tag_match(&key, query.hint.as_ref()),
                Tier::ExternalSearch => self.external_search(&query.raw, &key).await,
                Tier::CachePartial => self
                    .cache
                    .get_partial(&key, self.settings.min_cache_overlap)
                    .map(|hit| Found::Cached(hit.result, 0.5 + 0.1 * hit.overlap)),
                Tier::Synthesized => None,
            };

            let Some(found) = found else {
                debug!(
                    "{tier} missed \"{}\" after {:?}",
                    query.raw,
                    start.elapsed()
                );
                continue;
            };

            // A hint may change which record wins a tag match, so the result is not a pure
            // function of the key.
            let cacheable = tier.is_cached()
                && !key.is_empty()
                && !matches!(found, Found::Id(_))
                && !(tier == Tier::TagMatch && query.hint.is_some());
            let result = self.finish(found, tier, start);
            debug!(
                "{tier} resolved \"{}\" to {} with confidence {:.2} after {:?}",
                query.raw, result.display_name, result.confidence, result.elapsed
            );
            if cacheable {
                self.cache.insert(key, result.clone());
            }
            return result;
        }

        let result = self.synthesize(query, start);
        debug!(
            "synthesized \"{}\" for \"{}\" after {:?}",
            result.display_name, query.raw, result.elapsed
        );
        result
    }

    fn finish(&self, found: Found<'_>, tier: Tier, start: Instant) -> ResolutionResult {
        let (record, confidence) = match found {
            Found::Id(record) => (record, 1.0),
            Found::Record(record, confidence) => (record, confidence),
            Found::Cached(cached, confidence) => {
                return ResolutionResult {
                    tier,
                    confidence,
                    elapsed: start.elapsed(),
                    ..cached
                };
            }
        };
        ResolutionResult {
            record: Some(record.clone()),
            display_name: record.name.clone(),
            tier,
            confidence,
            media: self.media.resolve(record),
            elapsed: start.elapsed(),
        }
    }

    fn catalog_exact(&self, raw: &str, key: &str) -> Option<Found<'_>> {
        if let Some(record) = self.catalog.get(raw.trim()) {
            return Some(Found::Id(record));
        }
        self.catalog
            .find_by_name(key)
            .map(|record| Found::Record(record, 0.95))
    }

    fn alias(&self, key: &str) -> Option<Found<'_>> {
        self.aliases
            .get(key)
            .and_then(|id| self.catalog.get(id))
            .map(|record| Found::Record(record, 0.9))
    }

    /// Scores records sharing at least one name keyword with the query. Query keywords found in
    /// the name of a record count fully, keywords found in its tags count half. A shared target
    /// muscle of the hint adds a bonus.
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn tag_match(&self, key: &str, hint: Option<&ExerciseHint>) -> Option<Found<'_>> {
        let query = keywords(key);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f32)> = None;

        for pos in self.catalog.candidates(&query) {
            let name_keywords = self.catalog.name_keywords(pos);
            let tag_keywords = self.catalog.tag_keywords(pos);
            let mut name_hits = 0;
            let mut tag_hits = 0;
            for keyword in &query {
                if name_keywords.iter().any(|k| k == keyword) {
                    name_hits += 1;
                } else if tag_keywords.iter().any(|k| k == keyword) {
                    tag_hits += 1;
                }
            }
            if name_hits == 0 {
                continue;
            }

            let mut score = (name_hits as f32 + 0.5 * tag_hits as f32) / query.len() as f32;
            if hint.is_some_and(|hint| hint.shares_muscles(self.catalog.record(pos))) {
                score = (score + 0.1).min(1.0);
            }

            let better = match best {
                None => true,
                Some((best_pos, best_score)) => {
                    score > best_score
                        || (score == best_score
                            && name_keywords.len() < self.catalog.name_keywords(best_pos).len())
                }
            };
            if better {
                best = Some((pos, score));
            }
        }

        best.filter(|(_, score)| *score >= self.settings.min_tag_score)
            .map(|(pos, score)| {
                Found::Record(
                    self.catalog.record(pos),
                    (0.6 + 0.25 * score).min(0.85),
                )
            })
    }

    async fn external_search(&self, raw: &str, key: &str) -> Option<Found<'_>> {
        if key.is_empty() {
            return None;
        }

        let timeout = Duration::from_millis(self.settings.search_timeout_ms);
        let hits = match tokio::time::timeout(
            timeout,
            self.search
                .search_exercises(raw.trim(), self.settings.search_limit),
        )
        .await
        {
            Ok(Ok(hits)) => hits,
            Ok(Err(ReadError::Storage(StorageError::NoConnection))) => {
                debug!("external search unavailable for \"{raw}\"");
                return None;
            }
            Ok(Err(err)) => {
                warn!("external search failed for \"{raw}\": {err}");
                return None;
            }
            Err(_) => {
                warn!("external search timed out for \"{raw}\" after {timeout:?}");
                return None;
            }
        };

        hits.into_iter().find_map(|hit| {
            let record = self
                .catalog
                .get(hit.id.trim())
                .or_else(|| self.catalog.find_by_name(&normalize(&hit.name)));
            if record.is_none() {
                debug!(
                    "ignoring search hit \"{}\" ({}) missing in catalog",
                    hit.name, hit.id
                );
            }
            record.map(|record| {
                Found::Record(record, (0.5 + 0.2 * hit.score.clamp(0.0, 1.0)).clamp(0.5, 0.7))
            })
        })
    }

    fn synthesize(&self, query: &ResolutionQuery, start: Instant) -> ResolutionResult {
        let body_part = query
            .hint
            .as_ref()
            .and_then(|hint| hint.body_parts.iter().next().copied());
        ResolutionResult {
            record: None,
            display_name: Name::truncated(&display_name(&query.raw), "Unknown Exercise"),
            tier: Tier::Synthesized,
            confidence: 0.5,
            media: self.media.fallback(body_part),
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{BodyPart, CacheSettings, MediaSettings, Muscle, ProviderID};

    #[derive(Default)]
    struct FakeSearch {
        hits: HashMap<String, Vec<SearchHit>>,
        delay: Option<Duration>,
        error: bool,
    }

    impl FakeSearch {
        fn with_hit(mut self, query: &str, id: &str, name: &str, score: f32) -> Self {
            self.hits.entry(query.to_string()).or_default().push(SearchHit {
                id: id.to_string(),
                name: name.to_string(),
                score,
            });
            self
        }
    }

    impl ExerciseSearchRepository for FakeSearch {
        async fn search_exercises(
            &self,
            query: &str,
            limit: usize,
        ) -> Result<Vec<SearchHit>, ReadError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.error {
                return Err(ReadError::Storage(StorageError::NoConnection));
            }
            Ok(self
                .hits
                .get(query)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .take(limit)
                .collect())
        }
    }

    #[fixture]
    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin().unwrap())
    }

    fn resolver(catalog: &Arc<Catalog>, search: FakeSearch) -> Resolver<FakeSearch> {
        Resolver::new(
            catalog.clone(),
            Arc::new(AliasTable::builtin(catalog)),
            Arc::new(ResultCache::new(&CacheSettings::default())),
            Arc::new(MediaRegistry::new(&MediaSettings::default()).unwrap()),
            search,
            ResolverSettings {
                search_timeout_ms: 50,
                ..ResolverSettings::default()
            },
        )
    }

    #[rstest]
    #[case("pushU01", "pushU01", Tier::CatalogExact, 1.0)]
    #[case(" pushU01 ", "pushU01", Tier::CatalogExact, 1.0)]
    #[case("mountain_climbers", "mClmb01", Tier::CatalogExact, 0.95)]
    #[case("Push-Ups", "pushU01", Tier::CatalogExact, 0.95)]
    #[case("MILITARY PRESS", "ohPrs01", Tier::Alias, 0.9)]
    #[case("skull crushers", "ltExt01", Tier::Alias, 0.9)]
    #[tokio::test]
    async fn test_resolve(
        catalog: Arc<Catalog>,
        #[case] raw: &str,
        #[case] id: &str,
        #[case] tier: Tier,
        #[case] confidence: f32,
    ) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver.resolve(&ResolutionQuery::new(raw)).await;

        assert_eq!(result.id().map(ExerciseID::as_str), Some(id));
        assert_eq!(result.tier, tier);
        assert_approx_eq!(result.confidence, confidence);
        assert!(!result.media_url().as_str().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_catalog_exact_media(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver.resolve(&ResolutionQuery::new("mClmb01")).await;

        assert_eq!(
            result.media_url().as_str(),
            "https://media.spotter.app/gif/mClmb01.gif"
        );
        assert_eq!(result.media.provider, Some(ProviderID::Free));
        assert_eq!(result.display_name.as_ref(), "Mountain Climber");
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_tag_match(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver.resolve(&ResolutionQuery::new("push ups chest")).await;

        assert_eq!(result.id().map(ExerciseID::as_str), Some("pushU01"));
        assert_eq!(result.tier, Tier::TagMatch);
        assert_approx_eq!(result.confidence, 0.6 + 0.25 * (2.5 / 3.0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_tag_match_hint_bonus(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());
        let hint = ExerciseHint {
            target_muscles: [Muscle::Pectorals].into(),
            ..ExerciseHint::default()
        };

        let result = resolver
            .resolve(&ResolutionQuery::new("push ups chest").with_hint(hint))
            .await;

        assert_eq!(result.tier, Tier::TagMatch);
        assert_approx_eq!(result.confidence, 0.6 + 0.25 * (2.5 / 3.0 + 0.1));
        assert!(resolver.cache().is_empty());

        let unhinted = resolver.resolve(&ResolutionQuery::new("push ups chest")).await;

        assert_eq!(unhinted.tier, Tier::TagMatch);
        assert_approx_eq!(unhinted.confidence, 0.6 + 0.25 * (2.5 / 3.0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_by_id_is_not_cached(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let by_id = resolver.resolve(&ResolutionQuery::new("pushU01")).await;
        let by_other_case = resolver.resolve(&ResolutionQuery::new("PUSHU01")).await;

        assert_eq!(by_id.tier, Tier::CatalogExact);
        assert!(resolver.cache().is_empty());
        assert_eq!(by_other_case.tier, Tier::Synthesized);
        assert_eq!(by_other_case.record, None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_tag_match_below_threshold(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver
            .resolve(&ResolutionQuery::new("explosive plyometric squat"))
            .await;

        assert_eq!(result.tier, Tier::Synthesized);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_cache_exact(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());
        let query = ResolutionQuery::new("push ups chest");

        let first = resolver.resolve(&query).await;
        let second = resolver.resolve(&query).await;

        assert_eq!(first.tier, Tier::TagMatch);
        assert_eq!(second.tier, Tier::CacheExact);
        assert_eq!(second.id(), first.id());
        assert_approx_eq!(second.confidence, first.confidence);
        assert_eq!(second.media, first.media);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_external_search(catalog: Arc<Catalog>) {
        let resolver = resolver(
            &catalog,
            FakeSearch::default()
                .with_hit("spiderman crawl", "xxxxxxx", "Spiderman Crawl", 0.9)
                .with_hit("spiderman crawl", "mClmb01", "Mountain Climber", 0.5),
        );

        let result = resolver
            .resolve(&ResolutionQuery::new("spiderman crawl"))
            .await;

        assert_eq!(result.id().map(ExerciseID::as_str), Some("mClmb01"));
        assert_eq!(result.tier, Tier::ExternalSearch);
        assert_approx_eq!(result.confidence, 0.6);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_external_search_by_name(catalog: Arc<Catalog>) {
        let resolver = resolver(
            &catalog,
            FakeSearch::default().with_hit("hindu dive", "", "Push-Ups", 1.0),
        );

        let result = resolver.resolve(&ResolutionQuery::new("hindu dive")).await;

        assert_eq!(result.id().map(ExerciseID::as_str), Some("pushU01"));
        assert_approx_eq!(result.confidence, 0.7);
    }

    #[rstest]
    #[case::timeout(FakeSearch {
        delay: Some(Duration::from_secs(5)),
        ..FakeSearch::default().with_hit("spiderman crawl", "mClmb01", "Mountain Climber", 1.0)
    })]
    #[case::unavailable(FakeSearch {
        error: true,
        ..FakeSearch::default()
    })]
    #[case::unknown_id(FakeSearch::default().with_hit("spiderman crawl", "zzzzzzz", "Spiderman Crawl", 1.0))]
    #[tokio::test]
    async fn test_resolve_external_search_miss(catalog: Arc<Catalog>, #[case] search: FakeSearch) {
        let resolver = resolver(&catalog, search);

        let result = resolver
            .resolve(&ResolutionQuery::new("spiderman crawl"))
            .await;

        assert_eq!(result.tier, Tier::Synthesized);
        assert_eq!(result.record, None);
        assert!(resolver.cache().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_cache_partial(catalog: Arc<Catalog>) {
        let resolver = resolver(
            &catalog,
            FakeSearch::default().with_hit("spiderman crawl", "mClmb01", "Mountain Climber", 1.0),
        );

        let _ = resolver
            .resolve(&ResolutionQuery::new("spiderman crawl"))
            .await;
        let result = resolver
            .resolve(&ResolutionQuery::new("spiderman crawl fast"))
            .await;

        assert_eq!(result.id().map(ExerciseID::as_str), Some("mClmb01"));
        assert_eq!(result.tier, Tier::CachePartial);
        assert_approx_eq!(result.confidence, 0.5 + 0.1 * (2.0 / 3.0));
        assert_eq!(resolver.cache().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_synthesized(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver
            .resolve(&ResolutionQuery::new("dynamic_elevators"))
            .await;

        assert_eq!(result.record, None);
        assert_eq!(result.display_name.as_ref(), "Dynamic Elevators");
        assert_eq!(result.tier, Tier::Synthesized);
        assert_approx_eq!(result.confidence, 0.5);
        assert_eq!(
            result.media_url().as_str(),
            "https://media.spotter.app/gif/default.gif"
        );
        assert_eq!(result.media.provider, None);
        assert!(resolver.cache().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_resolve_synthesized_with_body_part(catalog: Arc<Catalog>) {
        let resolver = resolver(&catalog, FakeSearch::default());
        let hint = ExerciseHint {
            body_parts: [BodyPart::Chest].into(),
            ..ExerciseHint::default()
        };

        let result = resolver
            .resolve(&ResolutionQuery::new("dynamic_elevators").with_hint(hint))
            .await;

        assert_eq!(
            result.media_url().as_str(),
            "https://media.spotter.app/gif/default/chest.gif"
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("!!!")]
    #[case("qwertzu")]
    #[case("🏋️‍♀️ ???")]
    #[tokio::test]
    async fn test_resolve_is_total(catalog: Arc<Catalog>, #[case] raw: &str) {
        let resolver = resolver(&catalog, FakeSearch::default());

        let result = resolver.resolve(&ResolutionQuery::new(raw)).await;

        assert!(!result.media_url().as_str().is_empty());
        assert!(!result.display_name.as_ref().is_empty());
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_query_with_empty_hint() {
        assert_eq!(
            ResolutionQuery::new("plank").with_hint(ExerciseHint::default()),
            ResolutionQuery::new("plank")
        );
    }

    #[test]
    fn test_tier_is_cached() {
        assert_eq!(
            Tier::STRATEGIES
                .into_iter()
                .filter(|tier| tier.is_cached())
                .collect::<Vec<_>>(),
            vec![
                Tier::CatalogExact,
                Tier::Alias,
                Tier::TagMatch,
                Tier::ExternalSearch
            ]
        );
    }
}

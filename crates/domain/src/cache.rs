use std::{
    collections::{HashMap, VecDeque},
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use log::debug;

use crate::{CacheSettings, ResolutionResult, normalize::keywords};

/// Resolutions by normalized name.
///
/// The number of entries is bounded, the least recently used entry is dropped first. Recently
/// inserted keys are additionally kept in a ring buffer, which is scanned when looking for
/// similar names.
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    recent_capacity: usize,
    clock: AtomicU64,
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    recent: VecDeque<String>,
}

#[derive(Debug)]
struct Entry {
    result: ResolutionResult,
    last_used: AtomicU64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartialHit {
    pub key: String,
    pub result: ResolutionResult,
    pub overlap: f32,
}

impl ResultCache {
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            capacity: settings.capacity.max(1),
            recent_capacity: settings.recent_capacity,
            clock: AtomicU64::new(0),
            inner: RwLock::new(Inner::default()),
        }
    }

    #[must_use]
    pub fn get_exact(&self, key: &str) -> Option<ResolutionResult> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(key).map(|entry| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            entry.result.clone()
        })
    }

    /// Finds the recently inserted key with the highest keyword overlap. Ties are won by the
    /// more recent key.
    #[must_use]
    pub fn get_partial(&self, key: &str, min_overlap: f32) -> Option<PartialHit> {
        let query = keywords(key);
        if query.is_empty() {
            return None;
        }

        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut best: Option<(&String, &Entry, f32)> = None;

        for recent_key in &inner.recent {
            let Some(entry) = inner.entries.get(recent_key) else {
                continue;
            };
            let overlap = overlap(&query, &keywords(recent_key));
            if overlap >= min_overlap && best.is_none_or(|(_, _, o)| overlap > o) {
                best = Some((recent_key, entry, overlap));
            }
        }

        best.map(|(recent_key, entry, overlap)| {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            PartialHit {
                key: recent_key.clone(),
                result: entry.result.clone(),
                overlap,
            }
        })
    }

    /// Concurrent inserts of the same key are allowed, the last one wins.
    pub fn insert(&self, key: String, result: ResolutionResult) {
        let now = self.tick();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("evicting \"{oldest}\" from resolution cache");
                inner.entries.remove(&oldest);
                inner.recent.retain(|k| *k != oldest);
            }
        }

        inner.recent.retain(|k| *k != key);
        if self.recent_capacity > 0 {
            inner.recent.push_front(key.clone());
            inner.recent.truncate(self.recent_capacity);
        }
        inner.entries.insert(
            key,
            Entry {
                result,
                last_used: AtomicU64::new(now),
            },
        );
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.recent.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Jaccard index of two keyword sets.
#[allow(clippy::cast_precision_loss)]
fn overlap(a: &[&str], b: &[&str]) -> f32 {
    let common = a.iter().filter(|k| b.contains(k)).count();
    let union = a.len() + b.len() - common;
    if union == 0 {
        return 0.0;
    }
    common as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{Catalog, MediaRegistry, MediaSettings, Name, Tier};

    fn result(id: &str) -> ResolutionResult {
        let catalog = Catalog::builtin().unwrap();
        let record = catalog.get(id).unwrap().clone();
        let media = MediaRegistry::new(&MediaSettings::default())
            .unwrap()
            .resolve(&record);
        ResolutionResult {
            display_name: record.name.clone(),
            record: Some(record),
            tier: Tier::CatalogExact,
            confidence: 0.95,
            media,
            elapsed: Duration::ZERO,
        }
    }

    fn cache(capacity: usize, recent_capacity: usize) -> ResultCache {
        ResultCache::new(&CacheSettings {
            capacity,
            recent_capacity,
        })
    }

    #[test]
    fn test_get_exact() {
        let cache = cache(4, 4);
        cache.insert("push up".to_string(), result("pushU01"));

        assert_eq!(cache.get_exact("push up"), Some(result("pushU01")));
        assert_eq!(cache.get_exact("push"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let cache = cache(4, 4);
        cache.insert("push up".to_string(), result("pushU01"));
        cache.insert("push up".to_string(), result("pushU02"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_exact("push up"), Some(result("pushU02")));
    }

    #[test]
    fn test_least_recently_used_entry_is_evicted() {
        let cache = cache(2, 4);
        cache.insert("push up".to_string(), result("pushU01"));
        cache.insert("squat".to_string(), result("squat01"));
        let _ = cache.get_exact("push up");
        cache.insert("plank".to_string(), result("plank01"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get_exact("push up").is_some());
        assert!(cache.get_exact("squat").is_none());
        assert!(cache.get_exact("plank").is_some());
    }

    #[rstest]
    #[case("mountain climber twist", Some(("mountain climber", 2.0 / 3.0)))]
    #[case("climber mountain", Some(("mountain climber", 1.0)))]
    #[case("mountain", None)]
    #[case("", None)]
    fn test_get_partial(#[case] key: &str, #[case] expected: Option<(&str, f32)>) {
        let cache = cache(4, 4);
        cache.insert("mountain climber".to_string(), result("mClmb01"));
        cache.insert("push up".to_string(), result("pushU01"));

        let hit = cache.get_partial(key, 0.6);

        match expected {
            Some((expected_key, expected_overlap)) => {
                let hit = hit.unwrap();
                assert_eq!(hit.key, expected_key);
                assert_approx_eq!(hit.overlap, expected_overlap);
                assert_eq!(hit.result, result("mClmb01"));
            }
            None => assert_eq!(hit, None),
        }
    }

    #[test]
    fn test_get_partial_prefers_recent_keys() {
        let cache = cache(4, 4);
        cache.insert("push up".to_string(), result("pushU01"));
        cache.insert("up push".to_string(), result("pushU02"));

        assert_eq!(
            cache.get_partial("push up", 0.5).map(|hit| hit.key),
            Some("up push".to_string())
        );
    }

    #[test]
    fn test_get_partial_only_scans_recent_keys() {
        let cache = cache(4, 1);
        cache.insert("mountain climber".to_string(), result("mClmb01"));
        cache.insert("push up".to_string(), result("pushU01"));

        assert!(cache.get_exact("mountain climber").is_some());
        assert_eq!(cache.get_partial("mountain climber twist", 0.6), None);
    }

    #[test]
    fn test_clear() {
        let cache = cache(4, 4);
        cache.insert("push up".to_string(), result("pushU01"));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get_partial("push up", 0.5), None);
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = Arc::new(cache(8, 8));
        let expected = result("pushU01");

        thread::scope(|s| {
            for _ in 0..4 {
                let cache = Arc::clone(&cache);
                let expected = expected.clone();
                s.spawn(move || {
                    for _ in 0..50 {
                        cache.insert("push up".to_string(), expected.clone());
                        assert_eq!(cache.get_exact("push up"), Some(expected.clone()));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_result_display_name() {
        assert_eq!(
            result("mClmb01").display_name,
            Name::new("Mountain Climber").unwrap()
        );
    }
}

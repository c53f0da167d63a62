//! Media providers
//!
//! Every exercise shown to a user needs playable media. Providers are consulted in priority
//! order, and if none of them covers an exercise, a default asset is used. A registry can
//! therefore never answer without a URL.

use std::collections::{BTreeMap, HashMap};

use derive_more::{AsRef, Display};
use log::debug;

use crate::{BodyPart, ExerciseRecord, MediaSettings, Property, ProviderID, ProviderSettings};

#[derive(AsRef, Display, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn new(url: &str) -> Result<Self, MediaError> {
        let trimmed_url = url.trim();

        if trimmed_url.is_empty() {
            return Err(MediaError::EmptyUrl);
        }

        Ok(Self(trimmed_url.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MediaError {
    #[error("media URL must not be empty")]
    EmptyUrl,
    #[error("invalid default asset for {0}: media URL must not be empty")]
    EmptyCategoryAsset(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: MediaUrl,
    /// Provider which covered the exercise, `None` if a default asset is used.
    pub provider: Option<ProviderID>,
}

pub trait MediaSource {
    fn provider(&self) -> ProviderID;
    fn has_media(&self, record: &ExerciseRecord) -> bool;
    fn media_url(&self, record: &ExerciseRecord) -> Option<MediaUrl>;
}

#[derive(Debug, Clone)]
pub enum MediaProvider {
    Free(CdnProvider),
    Premium(CdnProvider),
    Bundled(BundledProvider),
}

impl MediaSource for MediaProvider {
    fn provider(&self) -> ProviderID {
        match self {
            MediaProvider::Free(_) => ProviderID::Free,
            MediaProvider::Premium(_) => ProviderID::Premium,
            MediaProvider::Bundled(_) => ProviderID::Bundled,
        }
    }

    fn has_media(&self, record: &ExerciseRecord) -> bool {
        self.media_url(record).is_some()
    }

    fn media_url(&self, record: &ExerciseRecord) -> Option<MediaUrl> {
        match self {
            MediaProvider::Free(cdn) => cdn.media_url(ProviderID::Free, record),
            MediaProvider::Premium(cdn) => cdn.media_url(ProviderID::Premium, record),
            MediaProvider::Bundled(bundled) => bundled.media_url(record),
        }
    }
}

/// Serves assets referenced by the media refs of an exercise.
#[derive(Debug, Clone)]
pub struct CdnProvider {
    base_url: String,
}

impl CdnProvider {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn media_url(&self, provider: ProviderID, record: &ExerciseRecord) -> Option<MediaUrl> {
        if self.base_url.is_empty() {
            return None;
        }
        record
            .media_refs
            .iter()
            .filter(|media_ref| media_ref.provider == provider)
            .find_map(|media_ref| {
                let asset_key = media_ref.asset_key.trim().trim_start_matches('/');
                if asset_key.is_empty() {
                    None
                } else {
                    MediaUrl::new(&format!("{}/{asset_key}", self.base_url)).ok()
                }
            })
    }
}

/// Assets shipped with the application, independent of the media refs of an exercise.
#[derive(Debug, Clone, Default)]
pub struct BundledProvider {
    assets: HashMap<String, MediaUrl>,
}

impl BundledProvider {
    /// Empty asset locations are skipped.
    #[must_use]
    pub fn new(assets: &BTreeMap<String, String>) -> Self {
        Self {
            assets: assets
                .iter()
                .filter_map(|(id, url)| MediaUrl::new(url).ok().map(|url| (id.clone(), url)))
                .collect(),
        }
    }

    fn media_url(&self, record: &ExerciseRecord) -> Option<MediaUrl> {
        self.assets.get(record.id.as_str()).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct MediaRegistry {
    providers: Vec<MediaProvider>,
    default_asset: MediaUrl,
    category_assets: BTreeMap<BodyPart, MediaUrl>,
}

impl MediaRegistry {
    pub fn new(settings: &MediaSettings) -> Result<Self, MediaError> {
        let mut providers = settings
            .providers
            .iter()
            .filter(|p| {
                settings.premium_entitled || !matches!(p, ProviderSettings::Premium { .. })
            })
            .collect::<Vec<_>>();
        providers.sort_by_key(|p| p.priority());

        let category_assets = settings
            .category_assets
            .iter()
            .map(|(body_part, url)| {
                MediaUrl::new(url)
                    .map(|url| (*body_part, url))
                    .map_err(|_| MediaError::EmptyCategoryAsset(body_part.name()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            providers: providers
                .into_iter()
                .map(|p| match p {
                    ProviderSettings::Free { base_url, .. } => {
                        MediaProvider::Free(CdnProvider::new(base_url))
                    }
                    ProviderSettings::Premium { base_url, .. } => {
                        MediaProvider::Premium(CdnProvider::new(base_url))
                    }
                    ProviderSettings::Bundled { assets, .. } => {
                        MediaProvider::Bundled(BundledProvider::new(assets))
                    }
                })
                .collect(),
            default_asset: MediaUrl::new(&settings.default_asset)?,
            category_assets,
        })
    }

    /// Providers in the order they are consulted.
    pub fn providers(&self) -> impl Iterator<Item = ProviderID> + '_ {
        self.providers.iter().map(MediaSource::provider)
    }

    /// Media of the first provider covering the exercise, or the default asset of its body
    /// part.
    #[must_use]
    pub fn resolve(&self, record: &ExerciseRecord) -> Media {
        for provider in &self.providers {
            if let Some(url) = provider.media_url(record) {
                return Media {
                    url,
                    provider: Some(provider.provider()),
                };
            }
        }
        debug!("no media provider covers {} ({})", record.name, record.id);
        self.fallback(record.body_parts.iter().next().copied())
    }

    #[must_use]
    pub fn fallback(&self, body_part: Option<BodyPart>) -> Media {
        Media {
            url: body_part
                .and_then(|b| self.category_assets.get(&b))
                .unwrap_or(&self.default_asset)
                .clone(),
            provider: None,
        }
    }
}

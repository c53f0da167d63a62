use std::collections::BTreeMap;

use crate::{BodyPart, Property};

const MEDIA_BASE_URL: &str = "https://media.spotter.app";

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverSettings,
    pub cache: CacheSettings,
    pub media: MediaSettings,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    /// Minimum keyword score for a tag based match.
    pub min_tag_score: f32,
    /// Minimum keyword overlap for reusing a cached resolution of a similar name.
    pub min_cache_overlap: f32,
    pub search_timeout_ms: u64,
    pub search_limit: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            min_tag_score: 0.5,
            min_cache_overlap: 0.6,
            search_timeout_ms: 800,
            search_limit: 5,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    pub capacity: usize,
    pub recent_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 512,
            recent_capacity: 64,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MediaSettings {
    pub providers: Vec<ProviderSettings>,
    /// Premium providers are only consulted for entitled callers.
    pub premium_entitled: bool,
    pub default_asset: String,
    pub category_assets: BTreeMap<BodyPart, String>,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderSettings::Premium {
                    base_url: format!("{MEDIA_BASE_URL}/premium"),
                    priority: 1,
                },
                ProviderSettings::Free {
                    base_url: format!("{MEDIA_BASE_URL}/gif"),
                    priority: 10,
                },
            ],
            premium_entitled: false,
            default_asset: format!("{MEDIA_BASE_URL}/gif/default.gif"),
            category_assets: BodyPart::iter()
                .map(|body_part| {
                    (
                        *body_part,
                        format!(
                            "{MEDIA_BASE_URL}/gif/default/{}.gif",
                            body_part.name().to_lowercase().replace(' ', "_")
                        ),
                    )
                })
                .collect(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSettings {
    Free {
        base_url: String,
        priority: u8,
    },
    Premium {
        base_url: String,
        priority: u8,
    },
    Bundled {
        /// Asset location by exercise ID.
        assets: BTreeMap<String, String>,
        priority: u8,
    },
}

impl ProviderSettings {
    /// Lower values are consulted first.
    #[must_use]
    pub fn priority(&self) -> u8 {
        match self {
            ProviderSettings::Free { priority, .. }
            | ProviderSettings::Premium { priority, .. }
            | ProviderSettings::Bundled { priority, .. } => *priority,
        }
    }
}

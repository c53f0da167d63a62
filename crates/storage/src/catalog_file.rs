use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
    str::FromStr,
};

use anyhow::Context;
use log::{info, warn};
use serde::Deserialize;

use spotter_domain as domain;

/// Exercise data source consisting of catalog records and aliases.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogFile {
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub body_parts: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub media: Vec<MediaEntry>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MediaEntry {
    pub provider: String,
    pub asset_key: String,
}

impl CatalogFile {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Records keep the order of the file. Unknown tags and media providers are skipped.
    pub fn into_catalog(
        self,
    ) -> Result<(domain::Catalog, domain::AliasTable), domain::CatalogError> {
        let records = self
            .exercises
            .into_iter()
            .map(ExerciseEntry::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = domain::Catalog::new(records)?;
        let aliases = domain::AliasTable::new(
            self.aliases
                .iter()
                .map(|(alias, id)| (alias.as_str(), id.as_str())),
            &catalog,
        );
        Ok((catalog, aliases))
    }
}

impl ExerciseEntry {
    fn into_record(self) -> Result<domain::ExerciseRecord, domain::CatalogError> {
        let id = domain::ExerciseID::new(self.id.trim()).map_err(|source| {
            domain::CatalogError::InvalidID {
                id: self.id.clone(),
                source,
            }
        })?;
        let name =
            domain::Name::new(&self.name).map_err(|source| domain::CatalogError::InvalidName {
                id: self.id.clone(),
                source,
            })?;
        let media_refs = self
            .media
            .into_iter()
            .filter_map(|media| {
                match domain::parse_tag::<domain::ProviderID>(&media.provider) {
                    Some(provider) => Some(domain::MediaRef {
                        provider,
                        asset_key: media.asset_key,
                    }),
                    None => {
                        warn!(
                            "ignoring media of {id} from unknown provider \"{}\"",
                            media.provider
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(domain::ExerciseRecord {
            target_muscles: tags(&id, &self.target_muscles),
            body_parts: tags(&id, &self.body_parts),
            equipment: tags(&id, &self.equipment),
            id,
            name,
            media_refs,
        })
    }
}

fn tags<T: FromStr + Ord>(id: &domain::ExerciseID, tags: &[String]) -> BTreeSet<T> {
    tags.iter()
        .filter_map(|tag| {
            let parsed = domain::parse_tag::<T>(tag);
            if parsed.is_none() {
                warn!("ignoring unknown tag \"{tag}\" of {id}");
            }
            parsed
        })
        .collect()
}

/// Loads catalog and aliases from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<(domain::Catalog, domain::AliasTable)> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let (catalog, aliases) = CatalogFile::parse(&json)
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?
        .into_catalog()
        .with_context(|| format!("invalid catalog in {}", path.display()))?;
    info!(
        "loaded {} exercises and {} aliases from {}",
        catalog.len(),
        aliases.len(),
        path.display()
    );
    Ok((catalog, aliases))
}

use std::collections::{BTreeSet, HashMap};

use crate::{
    BodyPart, Equipment, ExerciseID, ExerciseIDError, ExerciseRecord, MediaRef, Muscle, Name,
    NameError, ProviderID, normalize,
};

/// Canonical exercise records together with the lookup index shared by all matching
/// strategies.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ExerciseRecord>,
    index: NameIndex,
}

impl Catalog {
    pub fn new(records: Vec<ExerciseRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        let index = NameIndex::build(&records)?;
        Ok(Self { records, index })
    }

    /// The catalog shipped with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_records()?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ExerciseRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.ids.contains_key(id)
    }

    /// Position of a record in catalog order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.ids.get(id).copied()
    }

    /// Looks up a record by its normalized name.
    #[must_use]
    pub fn find_by_name(&self, normalized: &str) -> Option<&ExerciseRecord> {
        self.index
            .names
            .get(normalized)
            .map(|pos| &self.records[*pos])
    }

    /// Records whose name contains at least one of the given keywords, in catalog order.
    #[must_use]
    pub fn candidates(&self, keywords: &[&str]) -> Vec<usize> {
        let mut positions = keywords
            .iter()
            .filter_map(|k| self.index.keywords.get(*k))
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    #[must_use]
    pub fn record(&self, pos: usize) -> &ExerciseRecord {
        &self.records[pos]
    }

    #[must_use]
    pub fn name_keywords(&self, pos: usize) -> &[String] {
        &self.index.entries[pos].name_keywords
    }

    #[must_use]
    pub fn tag_keywords(&self, pos: usize) -> &[String] {
        &self.index.entries[pos].tag_keywords
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("catalog contains no exercises")]
    Empty,
    #[error("duplicate exercise ID {0}")]
    DuplicateID(ExerciseID),
    #[error("invalid exercise ID \"{id}\": {source}")]
    InvalidID {
        id: String,
        #[source]
        source: ExerciseIDError,
    },
    #[error("invalid name for exercise {id}: {source}")]
    InvalidName {
        id: String,
        #[source]
        source: NameError,
    },
}

#[derive(Debug, Clone)]
struct NameIndex {
    ids: HashMap<String, usize>,
    names: HashMap<String, usize>,
    keywords: HashMap<String, Vec<usize>>,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    name_keywords: Vec<String>,
    tag_keywords: Vec<String>,
}

impl NameIndex {
    fn build(records: &[ExerciseRecord]) -> Result<Self, CatalogError> {
        let mut index = Self {
            ids: HashMap::with_capacity(records.len()),
            names: HashMap::with_capacity(records.len()),
            keywords: HashMap::new(),
            entries: Vec::with_capacity(records.len()),
        };

        for (pos, record) in records.iter().enumerate() {
            if index.ids.insert(record.id.to_string(), pos).is_some() {
                return Err(CatalogError::DuplicateID(record.id.clone()));
            }

            let name = normalize(record.name.as_ref());
            let name_keywords = crate::normalize::keywords(&name)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            for keyword in &name_keywords {
                index.keywords.entry(keyword.clone()).or_default().push(pos);
            }
            index.names.entry(name.clone()).or_insert(pos);

            let tags = record.tag_names().map(normalize).collect::<Vec<_>>();
            let mut tag_keywords = Vec::new();
            for tag in &tags {
                for keyword in crate::normalize::keywords(tag) {
                    if !tag_keywords.iter().any(|k| k == keyword) {
                        tag_keywords.push(keyword.to_string());
                    }
                }
            }

            index.entries.push(IndexEntry {
                name_keywords,
                tag_keywords,
            });
        }

        Ok(index)
    }
}

struct BaseExercise {
    id: &'static str,
    name: &'static str,
    target_muscles: &'static [Muscle],
    body_parts: &'static [BodyPart],
    equipment: &'static [Equipment],
    media: &'static [ProviderID],
    variants: &'static [ExerciseVariant],
}

#[cfg_attr(test, derive(Debug, PartialEq))]
struct ExerciseVariant {
    id: &'static str,
    name: &'static str,
    target_muscles: Option<&'static [Muscle]>,
    body_parts: Option<&'static [BodyPart]>,
    equipment: Option<&'static [Equipment]>,
    media: Option<&'static [ProviderID]>,
}

impl ExerciseVariant {
    const fn default() -> Self {
        Self {
            id: "",
            name: "",
            target_muscles: None,
            body_parts: None,
            equipment: None,
            media: None,
        }
    }
}

fn builtin_records() -> Result<Vec<ExerciseRecord>, CatalogError> {
    let mut records = EXERCISES
        .iter()
        .map(|e| {
            record(
                e.id,
                e.name,
                e.target_muscles,
                e.body_parts,
                e.equipment,
                e.media,
            )
        })
        .chain(EXERCISES.iter().flat_map(|e| {
            e.variants.iter().map(|v| {
                record(
                    v.id,
                    v.name,
                    v.target_muscles.unwrap_or(e.target_muscles),
                    v.body_parts.unwrap_or(e.body_parts),
                    v.equipment.unwrap_or(e.equipment),
                    v.media.unwrap_or(e.media),
                )
            })
        }))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

fn record(
    id: &str,
    name: &str,
    target_muscles: &[Muscle],
    body_parts: &[BodyPart],
    equipment: &[Equipment],
    media: &[ProviderID],
) -> Result<ExerciseRecord, CatalogError> {
    let exercise_id = ExerciseID::new(id).map_err(|source| CatalogError::InvalidID {
        id: id.to_string(),
        source,
    })?;
    let media_refs = media
        .iter()
        .map(|provider| MediaRef {
            provider: *provider,
            asset_key: match provider {
                ProviderID::Premium => format!("{id}.mp4"),
                ProviderID::Free | ProviderID::Bundled => format!("{id}.gif"),
            },
        })
        .collect();
    Ok(ExerciseRecord {
        name: Name::new(name).map_err(|source| CatalogError::InvalidName {
            id: id.to_string(),
            source,
        })?,
        id: exercise_id,
        target_muscles: target_muscles.iter().copied().collect::<BTreeSet<_>>(),
        body_parts: body_parts.iter().copied().collect(),
        equipment: equipment.iter().copied().collect(),
        media_refs,
    })
}

const FREE: &[ProviderID] = &[ProviderID::Free];
const FREE_AND_PREMIUM: &[ProviderID] = &[ProviderID::Free, ProviderID::Premium];

const EXERCISES: [BaseExercise; 23] = [
    BaseExercise {
        id: "bkExt01",
        name: "Back Extension",
        target_muscles: &[Muscle::Spine],
        body_parts: &[BodyPart::Back],
        equipment: &[Equipment::Machine],
        media: FREE,
        variants: &[],
    },
    BaseExercise {
        id: "bPull01",
        name: "Band Pull Apart",
        target_muscles: &[Muscle::UpperBack, Muscle::Delts],
        body_parts: &[BodyPart::Back, BodyPart::Shoulders],
        equipment: &[Equipment::ResistanceBand],
        media: FREE,
        variants: &[],
    },
    BaseExercise {
        id: "bBnch01",
        name: "Barbell Bench Press",
        target_muscles: &[Muscle::Pectorals],
        body_parts: &[BodyPart::Chest],
        equipment: &[Equipment::Barbell],
        media: FREE_AND_PREMIUM,
        variants: &[
            ExerciseVariant {
                id: "bBnch02",
                name: "Barbell Incline Bench Press",
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "dBnch01",
                name: "Dumbbell Bench Press",
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "mChst01",
                name: "Machine Chest Press",
                equipment: Some(&[Equipment::Machine]),
                media: Some(FREE),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "bCurl01",
        name: "Barbell Curl",
        target_muscles: &[Muscle::Biceps],
        body_parts: &[BodyPart::UpperArms],
        equipment: &[Equipment::Barbell],
        media: FREE,
        variants: &[
            ExerciseVariant {
                id: "cCurl01",
                name: "Cable Curl",
                equipment: Some(&[Equipment::Cable]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "dCurl01",
                name: "Dumbbell Curl",
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "dCurl02",
                name: "Hammer Curl",
                target_muscles: Some(&[Muscle::Biceps, Muscle::Forearms]),
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "burpe01",
        name: "Burpee",
        target_muscles: &[Muscle::CardiovascularSystem, Muscle::Quads],
        body_parts: &[BodyPart::Cardio],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[],
    },
    BaseExercise {
        id: "crnch01",
        name: "Crunch",
        target_muscles: &[Muscle::Abs],
        body_parts: &[BodyPart::Waist],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "crnch02",
            name: "Bicycle Crunch",
            target_muscles: Some(&[Muscle::Abs, Muscle::Obliques]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "dBug001",
        name: "Dead Bug",
        target_muscles: &[Muscle::Abs],
        body_parts: &[BodyPart::Waist],
        equipment: &[Equipment::BodyWeight],
        media: &[],
        variants: &[],
    },
    BaseExercise {
        id: "dLift01",
        name: "Deadlift",
        target_muscles: &[Muscle::Glutes, Muscle::Hamstrings, Muscle::Spine],
        body_parts: &[BodyPart::UpperLegs, BodyPart::Back],
        equipment: &[Equipment::Barbell],
        media: FREE_AND_PREMIUM,
        variants: &[
            ExerciseVariant {
                id: "kLift01",
                name: "Kettlebell Deadlift",
                equipment: Some(&[Equipment::Kettlebell]),
                media: Some(FREE),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "dLift02",
                name: "Romanian Deadlift",
                target_muscles: Some(&[Muscle::Hamstrings, Muscle::Glutes]),
                body_parts: Some(&[BodyPart::UpperLegs]),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "gBrdg01",
        name: "Glute Bridge",
        target_muscles: &[Muscle::Glutes],
        body_parts: &[BodyPart::UpperLegs],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "gBrdg02",
            name: "Barbell Hip Thrust",
            equipment: Some(&[Equipment::Barbell, Equipment::Box]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "jJack01",
        name: "Jumping Jack",
        target_muscles: &[Muscle::CardiovascularSystem],
        body_parts: &[BodyPart::Cardio],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[],
    },
    BaseExercise {
        id: "lPull01",
        name: "Lat Pulldown",
        target_muscles: &[Muscle::Lats],
        body_parts: &[BodyPart::Back],
        equipment: &[Equipment::Cable],
        media: FREE,
        variants: &[],
    },
    BaseExercise {
        id: "lunge01",
        name: "Lunge",
        target_muscles: &[Muscle::Quads, Muscle::Glutes],
        body_parts: &[BodyPart::UpperLegs],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[
            ExerciseVariant {
                id: "lunge02",
                name: "Dumbbell Lunge",
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "lunge03",
                name: "Reverse Lunge",
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "ltExt01",
        name: "Lying Triceps Extension",
        target_muscles: &[Muscle::Triceps],
        body_parts: &[BodyPart::UpperArms],
        equipment: &[Equipment::EzBarbell],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "tPush01",
            name: "Cable Triceps Pushdown",
            equipment: Some(&[Equipment::Cable]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "mClmb01",
        name: "Mountain Climber",
        target_muscles: &[Muscle::CardiovascularSystem, Muscle::Abs],
        body_parts: &[BodyPart::Cardio, BodyPart::Waist],
        equipment: &[Equipment::BodyWeight],
        media: FREE_AND_PREMIUM,
        variants: &[],
    },
    BaseExercise {
        id: "ohPrs01",
        name: "Overhead Press",
        target_muscles: &[Muscle::Delts],
        body_parts: &[BodyPart::Shoulders],
        equipment: &[Equipment::Barbell],
        media: FREE,
        variants: &[
            ExerciseVariant {
                id: "ohPrs02",
                name: "Dumbbell Shoulder Press",
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "ohPrs03",
                name: "Machine Shoulder Press",
                equipment: Some(&[Equipment::Machine]),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "plank01",
        name: "Plank",
        target_muscles: &[Muscle::Abs],
        body_parts: &[BodyPart::Waist],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "plank02",
            name: "Side Plank",
            target_muscles: Some(&[Muscle::Obliques]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "pullU01",
        name: "Pull Up",
        target_muscles: &[Muscle::Lats, Muscle::Biceps],
        body_parts: &[BodyPart::Back],
        equipment: &[Equipment::PullUpBar],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "chinU01",
            name: "Chin Up",
            target_muscles: Some(&[Muscle::Biceps, Muscle::Lats]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "pushU01",
        name: "Push Up",
        target_muscles: &[Muscle::Pectorals, Muscle::Triceps],
        body_parts: &[BodyPart::Chest],
        equipment: &[Equipment::BodyWeight],
        media: FREE_AND_PREMIUM,
        variants: &[
            ExerciseVariant {
                id: "pushU02",
                name: "Decline Push Up",
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "pushU03",
                name: "Incline Push Up",
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "pushU04",
                name: "Knee Push Up",
                media: Some(FREE),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "cRow001",
        name: "Seated Cable Row",
        target_muscles: &[Muscle::UpperBack, Muscle::Lats],
        body_parts: &[BodyPart::Back],
        equipment: &[Equipment::Cable],
        media: FREE,
        variants: &[
            ExerciseVariant {
                id: "bRow001",
                name: "Barbell Bent Over Row",
                equipment: Some(&[Equipment::Barbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "dRow001",
                name: "Dumbbell Row",
                equipment: Some(&[Equipment::Dumbbell]),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "squat01",
        name: "Squat",
        target_muscles: &[Muscle::Quads, Muscle::Glutes],
        body_parts: &[BodyPart::UpperLegs],
        equipment: &[Equipment::BodyWeight],
        media: FREE_AND_PREMIUM,
        variants: &[
            ExerciseVariant {
                id: "squat02",
                name: "Barbell Squat",
                equipment: Some(&[Equipment::Barbell]),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "squat03",
                name: "Goblet Squat",
                equipment: Some(&[Equipment::Kettlebell, Equipment::Dumbbell]),
                media: Some(FREE),
                ..ExerciseVariant::default()
            },
            ExerciseVariant {
                id: "squat04",
                name: "Jump Squat",
                target_muscles: Some(&[Muscle::Quads, Muscle::CardiovascularSystem]),
                body_parts: Some(&[BodyPart::UpperLegs, BodyPart::Cardio]),
                media: Some(FREE),
                ..ExerciseVariant::default()
            },
        ],
    },
    BaseExercise {
        id: "calfR01",
        name: "Standing Calf Raise",
        target_muscles: &[Muscle::Calves],
        body_parts: &[BodyPart::LowerLegs],
        equipment: &[Equipment::BodyWeight],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "calfR02",
            name: "Machine Calf Raise",
            equipment: Some(&[Equipment::Machine]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "stepU01",
        name: "Step Up",
        target_muscles: &[Muscle::Quads, Muscle::Glutes],
        body_parts: &[BodyPart::UpperLegs],
        equipment: &[Equipment::Box],
        media: FREE,
        variants: &[ExerciseVariant {
            id: "stepU02",
            name: "Dumbbell Step Up",
            equipment: Some(&[Equipment::Box, Equipment::Dumbbell]),
            ..ExerciseVariant::default()
        }],
    },
    BaseExercise {
        id: "wCurl01",
        name: "Wrist Curl",
        target_muscles: &[Muscle::Forearms],
        body_parts: &[BodyPart::LowerArms],
        equipment: &[Equipment::Dumbbell],
        media: FREE,
        variants: &[],
    },
];

use std::{collections::BTreeSet, slice::Iter, str::FromStr};

use derive_more::{AsRef, Deref, Display};
use log::warn;
use strum::EnumString;

use crate::Name;

#[derive(AsRef, Deref, Display, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl ExerciseID {
    pub const LEN: usize = 7;

    pub fn new(id: &str) -> Result<Self, ExerciseIDError> {
        let len = id.chars().count();

        if len != Self::LEN {
            return Err(ExerciseIDError::InvalidLength(len));
        }

        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExerciseIDError::InvalidCharacter);
        }

        Ok(Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseIDError {
    #[error("Exercise ID must be 7 characters long ({0} != 7)")]
    InvalidLength(usize),
    #[error("Exercise ID must only contain ASCII letters and digits")]
    InvalidCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRecord {
    pub id: ExerciseID,
    pub name: Name,
    pub target_muscles: BTreeSet<Muscle>,
    pub body_parts: BTreeSet<BodyPart>,
    pub equipment: BTreeSet<Equipment>,
    pub media_refs: Vec<MediaRef>,
}

impl ExerciseRecord {
    /// Names of all tags, used for keyword matching.
    pub fn tag_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.target_muscles
            .iter()
            .map(|m| m.name())
            .chain(self.body_parts.iter().map(|b| b.name()))
            .chain(self.equipment.iter().map(|e| e.name()))
    }

    #[must_use]
    pub fn hint(&self) -> ExerciseHint {
        ExerciseHint {
            target_muscles: self.target_muscles.clone(),
            body_parts: self.body_parts.clone(),
            equipment: self.equipment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub provider: ProviderID,
    pub asset_key: String,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProviderID {
    Free,
    Premium,
    Bundled,
}

/// Training context a plan entry was generated with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseHint {
    pub target_muscles: BTreeSet<Muscle>,
    pub body_parts: BTreeSet<BodyPart>,
    pub equipment: BTreeSet<Equipment>,
}

impl ExerciseHint {
    /// Builds a hint from free-form tags. Tags which are neither a muscle, a body part nor a
    /// piece of equipment are ignored.
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hint = Self::default();
        for tag in tags {
            if let Some(muscle) = parse_tag::<Muscle>(tag) {
                hint.target_muscles.insert(muscle);
            } else if let Some(body_part) = parse_tag::<BodyPart>(tag) {
                hint.body_parts.insert(body_part);
            } else if let Some(equipment) = parse_tag::<Equipment>(tag) {
                hint.equipment.insert(equipment);
            } else {
                warn!("ignoring unknown exercise tag \"{tag}\"");
            }
        }
        hint
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target_muscles.is_empty() && self.body_parts.is_empty() && self.equipment.is_empty()
    }

    /// Combines the tags of both hints.
    #[must_use]
    pub fn merge(mut self, other: &ExerciseHint) -> Self {
        self.target_muscles.extend(other.target_muscles.iter().copied());
        self.body_parts.extend(other.body_parts.iter().copied());
        self.equipment.extend(other.equipment.iter().copied());
        self
    }

    #[must_use]
    pub fn shares_muscles(&self, record: &ExerciseRecord) -> bool {
        !self.target_muscles.is_disjoint(&record.target_muscles)
    }

    #[must_use]
    pub fn shares_body_parts(&self, record: &ExerciseRecord) -> bool {
        !self.body_parts.is_disjoint(&record.body_parts)
    }

    /// Equipment is compatible if the hint does not require any equipment or if both sides
    /// have at least one equipment class in common.
    #[must_use]
    pub fn equipment_compatible(&self, record: &ExerciseRecord) -> bool {
        if self.equipment.is_empty() {
            return true;
        }
        let classes = self
            .equipment
            .iter()
            .map(|e| e.class())
            .collect::<BTreeSet<_>>();
        let record_classes = if record.equipment.is_empty() {
            BTreeSet::from([EquipmentClass::Bodyweight])
        } else {
            record.equipment.iter().map(|e| e.class()).collect()
        };
        !classes.is_disjoint(&record_classes)
    }
}

/// Parses a tag like `"upper_back"`, `"Upper Back"` or `"upper-back"`.
pub fn parse_tag<T: FromStr>(tag: &str) -> Option<T> {
    let tag = tag
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    T::from_str(&tag).ok()
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Muscle {
    #[strum(serialize = "abs", serialize = "abdominals", serialize = "core")]
    Abs,
    #[strum(serialize = "abductors")]
    Abductors,
    #[strum(serialize = "adductors")]
    Adductors,
    #[strum(serialize = "biceps", serialize = "bicep")]
    Biceps,
    #[strum(serialize = "calves", serialize = "calf")]
    Calves,
    #[strum(serialize = "cardiovascular_system", serialize = "cardio_system")]
    CardiovascularSystem,
    #[strum(serialize = "delts", serialize = "deltoids", serialize = "shoulder_muscles")]
    Delts,
    #[strum(serialize = "forearms", serialize = "forearm")]
    Forearms,
    #[strum(serialize = "glutes", serialize = "gluteus")]
    Glutes,
    #[strum(serialize = "hamstrings", serialize = "hamstring")]
    Hamstrings,
    #[strum(serialize = "hip_flexors")]
    HipFlexors,
    #[strum(serialize = "lats", serialize = "latissimus_dorsi")]
    Lats,
    #[strum(serialize = "obliques")]
    Obliques,
    #[strum(serialize = "pectorals", serialize = "pecs")]
    Pectorals,
    #[strum(serialize = "quads", serialize = "quadriceps")]
    Quads,
    #[strum(serialize = "spine", serialize = "erector_spinae", serialize = "lower_back")]
    Spine,
    #[strum(serialize = "traps", serialize = "trapezius")]
    Traps,
    #[strum(serialize = "triceps", serialize = "tricep")]
    Triceps,
    #[strum(serialize = "upper_back", serialize = "rhomboids")]
    UpperBack,
}

impl Property for Muscle {
    fn iter() -> Iter<'static, Muscle> {
        static MUSCLES: [Muscle; 19] = [
            Muscle::Abs,
            Muscle::Abductors,
            Muscle::Adductors,
            Muscle::Biceps,
            Muscle::Calves,
            Muscle::CardiovascularSystem,
            Muscle::Delts,
            Muscle::Forearms,
            Muscle::Glutes,
            Muscle::Hamstrings,
            Muscle::HipFlexors,
            Muscle::Lats,
            Muscle::Obliques,
            Muscle::Pectorals,
            Muscle::Quads,
            Muscle::Spine,
            Muscle::Traps,
            Muscle::Triceps,
            Muscle::UpperBack,
        ];
        MUSCLES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Muscle::Abs => "Abs",
            Muscle::Abductors => "Abductors",
            Muscle::Adductors => "Adductors",
            Muscle::Biceps => "Biceps",
            Muscle::Calves => "Calves",
            Muscle::CardiovascularSystem => "Cardiovascular System",
            Muscle::Delts => "Delts",
            Muscle::Forearms => "Forearms",
            Muscle::Glutes => "Glutes",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::HipFlexors => "Hip Flexors",
            Muscle::Lats => "Lats",
            Muscle::Obliques => "Obliques",
            Muscle::Pectorals => "Pectorals",
            Muscle::Quads => "Quads",
            Muscle::Spine => "Spine",
            Muscle::Traps => "Traps",
            Muscle::Triceps => "Triceps",
            Muscle::UpperBack => "Upper Back",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BodyPart {
    Back,
    Cardio,
    Chest,
    LowerArms,
    LowerLegs,
    Neck,
    Shoulders,
    UpperArms,
    UpperLegs,
    Waist,
}

impl Property for BodyPart {
    fn iter() -> Iter<'static, BodyPart> {
        static BODY_PARTS: [BodyPart; 10] = [
            BodyPart::Back,
            BodyPart::Cardio,
            BodyPart::Chest,
            BodyPart::LowerArms,
            BodyPart::LowerLegs,
            BodyPart::Neck,
            BodyPart::Shoulders,
            BodyPart::UpperArms,
            BodyPart::UpperLegs,
            BodyPart::Waist,
        ];
        BODY_PARTS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            BodyPart::Back => "Back",
            BodyPart::Cardio => "Cardio",
            BodyPart::Chest => "Chest",
            BodyPart::LowerArms => "Lower Arms",
            BodyPart::LowerLegs => "Lower Legs",
            BodyPart::Neck => "Neck",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::UpperArms => "Upper Arms",
            BodyPart::UpperLegs => "Upper Legs",
            BodyPart::Waist => "Waist",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Equipment {
    #[strum(serialize = "body_weight", serialize = "bodyweight", serialize = "none")]
    BodyWeight,
    #[strum(serialize = "barbell")]
    Barbell,
    #[strum(serialize = "box", serialize = "bench")]
    Box,
    #[strum(serialize = "cable")]
    Cable,
    #[strum(serialize = "dumbbell")]
    Dumbbell,
    #[strum(serialize = "ez_barbell", serialize = "ez_bar")]
    EzBarbell,
    #[strum(serialize = "kettlebell")]
    Kettlebell,
    #[strum(serialize = "machine", serialize = "leverage_machine", serialize = "smith_machine")]
    Machine,
    #[strum(serialize = "pull_up_bar")]
    PullUpBar,
    #[strum(serialize = "resistance_band", serialize = "band")]
    ResistanceBand,
    #[strum(serialize = "stability_ball", serialize = "exercise_ball")]
    StabilityBall,
}

impl Property for Equipment {
    fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 11] = [
            Equipment::BodyWeight,
            Equipment::Barbell,
            Equipment::Box,
            Equipment::Cable,
            Equipment::Dumbbell,
            Equipment::EzBarbell,
            Equipment::Kettlebell,
            Equipment::Machine,
            Equipment::PullUpBar,
            Equipment::ResistanceBand,
            Equipment::StabilityBall,
        ];
        EQUIPMENT.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Equipment::BodyWeight => "Body Weight",
            Equipment::Barbell => "Barbell",
            Equipment::Box => "Box",
            Equipment::Cable => "Cable",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::EzBarbell => "EZ Barbell",
            Equipment::Kettlebell => "Kettlebell",
            Equipment::Machine => "Machine",
            Equipment::PullUpBar => "Pull Up Bar",
            Equipment::ResistanceBand => "Resistance Band",
            Equipment::StabilityBall => "Stability Ball",
        }
    }
}

impl Equipment {
    #[must_use]
    pub fn class(self) -> EquipmentClass {
        match self {
            Equipment::BodyWeight
            | Equipment::Box
            | Equipment::PullUpBar
            | Equipment::ResistanceBand
            | Equipment::StabilityBall => EquipmentClass::Bodyweight,
            Equipment::Barbell
            | Equipment::Dumbbell
            | Equipment::EzBarbell
            | Equipment::Kettlebell => EquipmentClass::FreeWeight,
            Equipment::Cable | Equipment::Machine => EquipmentClass::Machine,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum EquipmentClass {
    Bodyweight,
    FreeWeight,
    Machine,
}

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Biography labels recognized on a character page.
///
/// Any other `Label: value` line is ignored, so the `about` map of a
/// [`Character`] can only ever hold these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BioField {
    Age,
    Birthday,
    Height,
    Weight,
    #[serde(rename = "Eye Color")]
    EyeColor,
    #[serde(rename = "Blood Type")]
    BloodType,
    Occupation,
    Team,
}

impl BioField {
    pub const ALL: &[BioField] = &[
        Self::Age,
        Self::Birthday,
        Self::Height,
        Self::Weight,
        Self::EyeColor,
        Self::BloodType,
        Self::Occupation,
        Self::Team,
    ];

    /// Label text as it appears on the page, without the colon.
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Birthday => "Birthday",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::EyeColor => "Eye Color",
            Self::BloodType => "Blood Type",
            Self::Occupation => "Occupation",
            Self::Team => "Team",
        }
    }
}

impl FromStr for BioField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.label() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for BioField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A character scraped from its profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub japanese_name: Option<String>,
    #[serde(default)]
    pub about: BTreeMap<BioField, String>,
    pub description: String,
    pub img: String,
    pub favorites: String,
    pub url: String,
}

//! Curated neighbourhood entities.

use serde::{Deserialize, Serialize};

/// Kind of neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighbourhoodType {
    /// Authoritative owner of its subzones.
    Sealed,
    Unsealed,
}

/// The application's analysis unit, aggregating one or more subzones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbourhood {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub one_liner: String,
    pub parent_subzone_id: String,
    #[serde(rename = "type")]
    pub kind: NeighbourhoodType,
    /// Additional subzones aggregated into this neighbourhood
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subzone_ids: Vec<String>,
    /// Extra free-text lookup keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Neighbourhood {
    /// All subzones this neighbourhood claims, parent first.
    pub fn subzones(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.parent_subzone_id.as_str())
            .chain(self.subzone_ids.iter().map(String::as_str))
    }

    /// All free-text lookup keys, display name first.
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn is_sealed(&self) -> bool {
        self.kind == NeighbourhoodType::Sealed
    }
}

//! Temporal group types: the tree of tours, landmark collections and sections

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::ids::{slugify, SpatialGroupId, TemporalGroupId};

/// Temporal group classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemporalGroupType {
    Tour,
    Landmark,
    Custom(String),
}

impl TemporalGroupType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tour => "tour",
            Self::Landmark => "landmark",
            Self::Custom(s) => s,
        }
    }
}

impl Default for TemporalGroupType {
    fn default() -> Self {
        Self::Tour
    }
}

impl From<String> for TemporalGroupType {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "tour" => Self::Tour,
            "landmark" => Self::Landmark,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for TemporalGroupType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TemporalGroupType> for String {
    fn from(t: TemporalGroupType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for TemporalGroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a child of a temporal group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupRef {
    Temporal(TemporalGroupId),
    Spatial(SpatialGroupId),
}

/// A node in the tree of temporal containers
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalGroup {
    pub id: TemporalGroupId,
    pub name: String,
    pub description: Option<String>,
    pub group_type: TemporalGroupType,
    /// Parent group; `None` for root groups
    pub super_group: Option<TemporalGroupId>,
    pub sub_groups: BTreeSet<GroupRef>,
    pub auto_connect_colocated: bool,
    /// Radius in metres; inherited from the nearest ancestor when unset
    pub colocated_radius: Option<f64>,
    /// Inherited from the nearest ancestor when unset
    pub multiselect: Option<bool>,
    pub path: Option<String>,
}

impl TemporalGroup {
    pub fn is_landmark(&self) -> bool {
        self.group_type == TemporalGroupType::Landmark
    }

    pub fn temporal_children(&self) -> impl Iterator<Item = &TemporalGroupId> {
        self.sub_groups.iter().filter_map(|child| match child {
            GroupRef::Temporal(id) => Some(id),
            GroupRef::Spatial(_) => None,
        })
    }

    pub fn spatial_children(&self) -> impl Iterator<Item = &SpatialGroupId> {
        self.sub_groups.iter().filter_map(|child| match child {
            GroupRef::Spatial(id) => Some(id),
            GroupRef::Temporal(_) => None,
        })
    }
}

/// Data for creating a new temporal group
#[derive(Debug, Clone, Default)]
pub struct NewTemporalGroup {
    pub id: Option<TemporalGroupId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_type: TemporalGroupType,
    pub super_group: Option<TemporalGroupId>,
    pub auto_connect_colocated: bool,
    pub colocated_radius: Option<f64>,
    pub multiselect: Option<bool>,
    pub path: Option<String>,
}

impl NewTemporalGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<TemporalGroupId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, group_type: impl Into<TemporalGroupType>) -> Self {
        self.group_type = group_type.into();
        self
    }

    pub fn with_super_group(mut self, parent: impl Into<TemporalGroupId>) -> Self {
        self.super_group = Some(parent.into());
        self
    }

    pub fn with_colocated_radius(mut self, radius: f64) -> Self {
        self.colocated_radius = Some(radius);
        self
    }

    pub fn auto_connect_colocated(mut self, enabled: bool) -> Self {
        self.auto_connect_colocated = enabled;
        self
    }

    pub fn with_multiselect(mut self, multiselect: bool) -> Self {
        self.multiselect = Some(multiselect);
        self
    }

    /// Explicit id, else a slug of the name, else a slug of the description
    pub fn derive_id(&self) -> Result<TemporalGroupId> {
        if let Some(id) = &self.id {
            return Ok(id.clone());
        }
        [self.name.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .map(slugify)
            .find(|slug| !slug.is_empty())
            .map(TemporalGroupId)
            .ok_or_else(|| {
                Error::invalid("temporal group needs an id, a name or a description")
            })
    }

    pub(crate) fn build(self, id: TemporalGroupId) -> TemporalGroup {
        let name = self
            .name
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| id.to_string());
        TemporalGroup {
            id,
            name,
            description: self.description,
            group_type: self.group_type,
            super_group: self.super_group,
            sub_groups: BTreeSet::new(),
            auto_connect_colocated: self.auto_connect_colocated,
            colocated_radius: self.colocated_radius,
            multiselect: self.multiselect,
            path: self.path,
        }
    }
}

impl From<&TemporalGroup> for NewTemporalGroup {
    fn from(group: &TemporalGroup) -> Self {
        Self {
            id: Some(group.id.clone()),
            name: Some(group.name.clone()),
            description: group.description.clone(),
            group_type: group.group_type.clone(),
            super_group: group.super_group.clone(),
            auto_connect_colocated: group.auto_connect_colocated,
            colocated_radius: group.colocated_radius,
            multiselect: group.multiselect,
            path: group.path.clone(),
        }
    }
}

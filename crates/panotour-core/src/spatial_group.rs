//! Spatial group types: named partitions of vertices sharing a timeslot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{slugify, SpatialGroupId, TemporalGroupId, VertexId};

/// Spatial group classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialGroupType {
    Route,
    Singleshot,
    Landmark,
}

impl SpatialGroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Singleshot => "singleshot",
            Self::Landmark => "landmark",
        }
    }
}

impl std::fmt::Display for SpatialGroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory that image files of a group are resolved against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDirectory {
    pub path: String,
}

impl ImageDirectory {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Image overlay drawn beneath a group on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub file: String,
    /// South-west and north-east corners as `[lat, lon]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[[f64; 2]; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Background {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            bounds: None,
            opacity: None,
        }
    }

    pub fn with_bounds(mut self, south_west: [f64; 2], north_east: [f64; 2]) -> Self {
        self.bounds = Some([south_west, north_east]);
        self
    }
}

/// A leaf container of vertices anchored to a temporal group
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGroup {
    pub id: SpatialGroupId,
    pub name: String,
    pub description: Option<String>,
    pub group_type: SpatialGroupType,
    /// Position on the timeline
    pub timeslot: DateTime<Utc>,
    pub super_group: Option<TemporalGroupId>,
    pub vertices: BTreeSet<VertexId>,
    pub images: Option<ImageDirectory>,
    pub thumbnails: Option<ImageDirectory>,
    pub background: Option<Background>,
    pub path: Option<String>,
}

impl SpatialGroup {
    pub fn is_landmark(&self) -> bool {
        self.group_type == SpatialGroupType::Landmark
    }
}

/// Data for creating a new spatial group
#[derive(Debug, Clone)]
pub struct NewSpatialGroup {
    pub id: Option<SpatialGroupId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_type: SpatialGroupType,
    pub timeslot: Option<DateTime<Utc>>,
    pub super_group: Option<TemporalGroupId>,
    /// Place the group into a default temporal group when `super_group` is unset
    pub default_parent: bool,
    pub images: Option<ImageDirectory>,
    pub thumbnails: Option<ImageDirectory>,
    pub background: Option<Background>,
    pub path: Option<String>,
}

impl Default for NewSpatialGroup {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            group_type: SpatialGroupType::Route,
            timeslot: None,
            super_group: None,
            default_parent: true,
            images: None,
            thumbnails: None,
            background: None,
            path: None,
        }
    }
}

impl NewSpatialGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<SpatialGroupId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, group_type: SpatialGroupType) -> Self {
        self.group_type = group_type;
        self
    }

    pub fn with_timeslot(mut self, timeslot: DateTime<Utc>) -> Self {
        self.timeslot = Some(timeslot);
        self
    }

    pub fn with_super_group(mut self, parent: impl Into<TemporalGroupId>) -> Self {
        self.super_group = Some(parent.into());
        self
    }

    pub fn with_images(mut self, images: impl Into<String>) -> Self {
        self.images = Some(ImageDirectory::new(images));
        self
    }

    pub fn with_thumbnails(mut self, thumbnails: impl Into<String>) -> Self {
        self.thumbnails = Some(ImageDirectory::new(thumbnails));
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    /// Explicit id, else a slug of the name, else `<type>-<timeslot>`
    pub fn derive_id(&self, timeslot: &DateTime<Utc>) -> SpatialGroupId {
        if let Some(id) = &self.id {
            return id.clone();
        }
        self.name
            .as_deref()
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .map(SpatialGroupId)
            .unwrap_or_else(|| Self::timeslot_key(self.group_type, timeslot))
    }

    pub(crate) fn timeslot_key(
        group_type: SpatialGroupType,
        timeslot: &DateTime<Utc>,
    ) -> SpatialGroupId {
        SpatialGroupId(format!(
            "{}-{}",
            group_type,
            timeslot.format("%Y%m%dT%H%M%S%3fZ")
        ))
    }

    pub(crate) fn build(self, id: SpatialGroupId, timeslot: DateTime<Utc>) -> SpatialGroup {
        let name = self.name.unwrap_or_else(|| id.to_string());
        SpatialGroup {
            id,
            name,
            description: self.description,
            group_type: self.group_type,
            timeslot,
            super_group: self.super_group,
            vertices: BTreeSet::new(),
            images: self.images,
            thumbnails: self.thumbnails,
            background: self.background,
            path: self.path,
        }
    }
}

impl From<&SpatialGroup> for NewSpatialGroup {
    fn from(group: &SpatialGroup) -> Self {
        Self {
            id: Some(group.id.clone()),
            name: Some(group.name.clone()),
            description: group.description.clone(),
            group_type: group.group_type,
            timeslot: Some(group.timeslot),
            super_group: group.super_group.clone(),
            default_parent: group.super_group.is_some(),
            images: group.images.clone(),
            thumbnails: group.thumbnails.clone(),
            background: group.background.clone(),
            path: group.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_from_name() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let group = NewSpatialGroup::new("Day 1");
        assert_eq!(group.derive_id(&ts).as_str(), "day-1");
    }

    #[test]
    fn test_id_from_type_and_timeslot() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        let group = NewSpatialGroup::default().with_type(SpatialGroupType::Singleshot);
        assert_eq!(
            group.derive_id(&ts).as_str(),
            "singleshot-20240101T083000000Z"
        );
    }

    #[test]
    fn test_snapshot_keeps_detached_state() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let group = NewSpatialGroup::new("Loose").build("loose".into(), ts);
        let restored = NewSpatialGroup::from(&group);
        assert!(!restored.default_parent);
        assert_eq!(restored.timeslot, Some(ts));
    }

    #[test]
    fn test_background_serde_skips_unset() {
        let bg = Background::new("plan.png");
        let json = serde_json::to_value(&bg).unwrap();
        assert_eq!(json, serde_json::json!({ "file": "plan.png" }));
    }
}

//! Vertex (scene) types and operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, SpatialGroupId, VertexId};

/// `[lat, lon]` in degrees
pub type Coordinates = [f64; 2];

/// Free-form JSON attributes (yaw, pitch, vaov, northOffset, ...)
pub type Data = serde_json::Map<String, serde_json::Value>;

/// Vertex classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexType {
    Panorama,
    Placeholder,
    Landmark,
}

impl VertexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panorama => "panorama",
            Self::Placeholder => "placeholder",
            Self::Landmark => "landmark",
        }
    }
}

impl std::fmt::Display for VertexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image file of a vertex; `path` overrides the group's image directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ImageFile {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: None,
        }
    }
}

/// A point in space-time, optionally carrying a panorama
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub vertex_type: VertexType,
    pub name: Option<String>,
    pub coordinates: Coordinates,
    pub timeslot: DateTime<Utc>,
    pub spatial_group: SpatialGroupId,
    pub image: Option<ImageFile>,
    pub thumbnail: Option<ImageFile>,
    pub data: Data,
    /// Edges leaving this vertex, sorted by id
    pub outgoing_edges: Vec<EdgeId>,
    pub path: Option<String>,
}

impl Vertex {
    pub fn latitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Data for creating a new vertex
#[derive(Debug, Clone)]
pub struct NewVertex {
    pub id: Option<VertexId>,
    pub vertex_type: VertexType,
    pub name: Option<String>,
    pub coordinates: Coordinates,
    /// Falls back to the spatial group's timeslot
    pub timeslot: Option<DateTime<Utc>>,
    pub spatial_group: Option<SpatialGroupId>,
    pub image: Option<ImageFile>,
    pub thumbnail: Option<ImageFile>,
    pub data: Data,
    pub path: Option<String>,
}

impl NewVertex {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            id: None,
            vertex_type: VertexType::Panorama,
            name: None,
            coordinates,
            timeslot: None,
            spatial_group: None,
            image: None,
            thumbnail: None,
            data: Data::new(),
            path: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<VertexId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, vertex_type: VertexType) -> Self {
        self.vertex_type = vertex_type;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_timeslot(mut self, timeslot: DateTime<Utc>) -> Self {
        self.timeslot = Some(timeslot);
        self
    }

    pub fn in_group(mut self, spatial_group: impl Into<SpatialGroupId>) -> Self {
        self.spatial_group = Some(spatial_group.into());
        self
    }

    pub fn with_image(mut self, file: impl Into<String>) -> Self {
        self.image = Some(ImageFile::new(file));
        self
    }

    pub fn with_thumbnail(mut self, file: impl Into<String>) -> Self {
        self.thumbnail = Some(ImageFile::new(file));
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Explicit id, else `<type>-<timeslot>-<lat>-<lon>`
    pub fn derive_id(&self, timeslot: &DateTime<Utc>) -> VertexId {
        if let Some(id) = &self.id {
            return id.clone();
        }
        VertexId(format!(
            "{}-{}-{:.6}-{:.6}",
            self.vertex_type,
            timeslot.format("%Y%m%dT%H%M%S%3fZ"),
            self.coordinates[0],
            self.coordinates[1]
        ))
    }

    pub(crate) fn build(
        self,
        id: VertexId,
        timeslot: DateTime<Utc>,
        spatial_group: SpatialGroupId,
    ) -> Vertex {
        Vertex {
            id,
            vertex_type: self.vertex_type,
            name: self.name,
            coordinates: self.coordinates,
            timeslot,
            spatial_group,
            image: self.image,
            thumbnail: self.thumbnail,
            data: self.data,
            outgoing_edges: Vec::new(),
            path: self.path,
        }
    }
}

impl From<&Vertex> for NewVertex {
    fn from(vertex: &Vertex) -> Self {
        Self {
            id: Some(vertex.id.clone()),
            vertex_type: vertex.vertex_type,
            name: vertex.name.clone(),
            coordinates: vertex.coordinates,
            timeslot: Some(vertex.timeslot),
            spatial_group: Some(vertex.spatial_group.clone()),
            image: vertex.image.clone(),
            thumbnail: vertex.thumbnail.clone(),
            data: vertex.data.clone(),
            path: vertex.path.clone(),
        }
    }
}

/// Merge `patch` into `base`, replacing keys present in both
pub(crate) fn merge_data(base: &Data, patch: Data) -> Data {
    let mut merged = base.clone();
    merged.extend(patch);
    merged
}

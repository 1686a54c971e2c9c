//! Edge (navigational connection) types and operations

use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
use crate::vertex::{Data, VertexType};

/// Edge classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Route,
    Temp,
    Spatial,
    Landmark,
    Temporal,
    Placeholder,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Temp => "temp",
            Self::Spatial => "spatial",
            Self::Landmark => "landmark",
            Self::Temporal => "temporal",
            Self::Placeholder => "placeholder",
        }
    }

    /// Type of an edge between two endpoints, first matching rule wins:
    /// landmark endpoint, placeholder endpoint, same spatial group, same
    /// parent temporal group, anything else.
    ///
    /// The rules are symmetric, so the reverse of a derived edge always has
    /// the same type. `Spatial` is never derived.
    pub fn derive(from: &Endpoint<'_>, to: &Endpoint<'_>) -> Self {
        let either = |t: VertexType| from.vertex_type == t || to.vertex_type == t;
        if either(VertexType::Landmark) {
            Self::Landmark
        } else if either(VertexType::Placeholder) {
            Self::Placeholder
        } else if from.spatial_group == to.spatial_group {
            Self::Route
        } else if from.temporal_group.is_some() && from.temporal_group == to.temporal_group {
            Self::Temporal
        } else {
            Self::Temp
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attributes of an edge endpoint that drive type derivation
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub vertex_type: VertexType,
    pub spatial_group: &'a SpatialGroupId,
    /// Parent of the vertex's spatial group
    pub temporal_group: Option<&'a TemporalGroupId>,
}

/// A directed connection between two vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub edge_type: EdgeType,
    pub data: Data,
    /// Reverse half of a bidirectional pair
    pub opposite: Option<EdgeId>,
}

impl Edge {
    pub fn derive_id(from: &VertexId, to: &VertexId, edge_type: EdgeType) -> EdgeId {
        EdgeId(format!("{}:{}:{}", from, to, edge_type))
    }

    pub fn is_bidirectional(&self) -> bool {
        self.opposite.is_some()
    }

    /// Whether `other` runs exactly against this edge
    pub fn mirrors(&self, other: &Edge) -> bool {
        self.from == other.to && self.to == other.from
    }
}

/// Data for creating a new edge
#[derive(Debug, Clone)]
pub struct NewEdge {
    pub id: Option<EdgeId>,
    pub from: VertexId,
    pub to: VertexId,
    /// Derived from the endpoints when unset
    pub edge_type: Option<EdgeType>,
    pub data: Data,
    /// Also create the reverse edge and pair the two
    pub bidirectional: bool,
    pub opposite_data: Option<Data>,
    /// Id of the reverse edge: paired with when it already exists, and the
    /// id given to the reverse half that `bidirectional` creates
    pub opposite: Option<EdgeId>,
}

impl NewEdge {
    pub fn new(from: impl Into<VertexId>, to: impl Into<VertexId>) -> Self {
        Self {
            id: None,
            from: from.into(),
            to: to.into(),
            edge_type: None,
            data: Data::new(),
            bidirectional: false,
            opposite_data: None,
            opposite: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = Some(edge_type);
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    pub fn with_opposite_data(mut self, data: Data) -> Self {
        self.opposite_data = Some(data);
        self
    }

    pub fn with_opposite(mut self, opposite: impl Into<EdgeId>) -> Self {
        self.opposite = Some(opposite.into());
        self
    }
}

impl From<&Edge> for NewEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: Some(edge.id.clone()),
            from: edge.from.clone(),
            to: edge.to.clone(),
            edge_type: Some(edge.edge_type),
            data: edge.data.clone(),
            bidirectional: false,
            opposite_data: None,
            opposite: edge.opposite.clone(),
        }
    }
}

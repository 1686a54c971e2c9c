//! The persisted tour document
//!
//! Temporal groups are listed flat; spatial groups nest their vertices, and
//! vertices nest their outgoing edges. A bidirectional pair of one type is
//! written once, on the half with the smaller id, with the other half's data
//! as `oppositeData`; `oppositeId` names the other half when its id cannot be
//! derived. Paired halves of different types are written separately and
//! linked through `oppositeId`. Records are emitted in id order so that equal
//! graphs always produce equal documents.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::edge::{Edge, EdgeType, NewEdge};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
use crate::spatial_group::{Background, ImageDirectory, NewSpatialGroup, SpatialGroup, SpatialGroupType};
use crate::temporal_group::{NewTemporalGroup, TemporalGroup, TemporalGroupType};
use crate::vertex::{Coordinates, Data, ImageFile, NewVertex, Vertex, VertexType};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDocument {
    pub version: u32,
    #[serde(default)]
    pub temporal_groups: Vec<TemporalGroupRecord>,
    #[serde(default)]
    pub spatial_groups: Vec<SpatialGroupRecord>,
}

impl Default for TourDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            temporal_groups: Vec::new(),
            spatial_groups: Vec::new(),
        }
    }
}

impl TourDocument {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn vertex_count(&self) -> usize {
        self.spatial_groups.iter().map(|g| g.vertices.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalGroupRecord {
    pub id: TemporalGroupId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub group_type: TemporalGroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_group: Option<TemporalGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_connect_colocated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colocated_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiselect: Option<bool>,
}

impl From<&TemporalGroupRecord> for NewTemporalGroup {
    fn from(record: &TemporalGroupRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            description: record.description.clone(),
            group_type: record.group_type.clone(),
            super_group: record.super_group.clone(),
            auto_connect_colocated: record.auto_connect_colocated,
            colocated_radius: record.colocated_radius,
            multiselect: record.multiselect,
            path: record.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialGroupRecord {
    pub id: SpatialGroupId,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: SpatialGroupType,
    pub timeslot: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_group: Option<TemporalGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageDirectory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<ImageDirectory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
}

impl From<&SpatialGroupRecord> for NewSpatialGroup {
    fn from(record: &SpatialGroupRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            description: record.description.clone(),
            group_type: record.group_type,
            timeslot: Some(record.timeslot),
            super_group: record.super_group.clone(),
            // A record without a parent was saved detached
            default_parent: false,
            images: record.images.clone(),
            thumbnails: record.thumbnails.clone(),
            background: record.background.clone(),
            path: record.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexRecord {
    pub id: VertexId,
    #[serde(rename = "type")]
    pub vertex_type: VertexType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub timeslot: DateTime<Utc>,
    pub coordinates: Coordinates,
    /// Only written for standalone records; nesting implies it in documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_group: Option<SpatialGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageFile>,
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
    #[serde(default)]
    pub outgoing_edges: Vec<EdgeRecord>,
}

impl VertexRecord {
    fn to_new(&self, spatial_group: &SpatialGroupId) -> NewVertex {
        NewVertex {
            id: Some(self.id.clone()),
            vertex_type: self.vertex_type,
            name: self.name.clone(),
            coordinates: self.coordinates,
            timeslot: Some(self.timeslot),
            spatial_group: Some(spatial_group.clone()),
            image: self.image.clone(),
            thumbnail: self.thumbnail.clone(),
            data: self.data.clone(),
            path: self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: EdgeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<VertexId>,
    pub to: VertexId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bidirectional: bool,
    /// Only written when the reverse edge's id cannot be derived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_id: Option<EdgeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_data: Option<Data>,
}

impl EdgeRecord {
    fn to_new(&self, from: &VertexId) -> NewEdge {
        NewEdge {
            id: Some(self.id.clone()),
            from: from.clone(),
            to: self.to.clone(),
            edge_type: Some(self.edge_type),
            data: self.data.clone(),
            bidirectional: self.bidirectional,
            opposite_data: self.opposite_data.clone(),
            opposite: self.opposite_id.clone(),
        }
    }
}

/// What a record should carry besides the entity's own attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    /// Nest child records (vertices of a group, outgoing edges of a vertex)
    pub children: bool,
    /// Name the parent (super group, owning spatial group, source vertex)
    pub parent: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            children: true,
            parent: true,
        }
    }
}

/// Conversion of a graph entity into its persisted form
pub trait ToRecord {
    type Record: Serialize;

    fn to_record(&self, graph: &Graph, options: RecordOptions) -> Self::Record;
}

impl ToRecord for TemporalGroup {
    type Record = TemporalGroupRecord;

    fn to_record(&self, _graph: &Graph, options: RecordOptions) -> TemporalGroupRecord {
        TemporalGroupRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            group_type: self.group_type.clone(),
            description: self.description.clone(),
            super_group: self.super_group.clone().filter(|_| options.parent),
            path: self.path.clone(),
            auto_connect_colocated: self.auto_connect_colocated,
            colocated_radius: self.colocated_radius,
            multiselect: self.multiselect,
        }
    }
}

impl ToRecord for SpatialGroup {
    type Record = SpatialGroupRecord;

    fn to_record(&self, graph: &Graph, options: RecordOptions) -> SpatialGroupRecord {
        let vertices = if options.children {
            let nested = RecordOptions {
                children: true,
                parent: false,
            };
            self.vertices
                .iter()
                .filter_map(|id| graph.vertices.get(id))
                .map(|v| v.to_record(graph, nested))
                .collect()
        } else {
            Vec::new()
        };
        SpatialGroupRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            group_type: self.group_type,
            timeslot: self.timeslot,
            description: self.description.clone(),
            super_group: self.super_group.clone().filter(|_| options.parent),
            path: self.path.clone(),
            images: self.images.clone(),
            thumbnails: self.thumbnails.clone(),
            background: self.background.clone(),
            vertices,
        }
    }
}

impl ToRecord for Vertex {
    type Record = VertexRecord;

    fn to_record(&self, graph: &Graph, options: RecordOptions) -> VertexRecord {
        let outgoing_edges = if options.children {
            graph.edge_records(self, |_| true)
        } else {
            Vec::new()
        };
        VertexRecord {
            id: self.id.clone(),
            vertex_type: self.vertex_type,
            name: self.name.clone(),
            timeslot: self.timeslot,
            coordinates: self.coordinates,
            spatial_group: Some(self.spatial_group.clone()).filter(|_| options.parent),
            path: self.path.clone(),
            image: self.image.clone(),
            thumbnail: self.thumbnail.clone(),
            data: self.data.clone(),
            outgoing_edges,
        }
    }
}

impl ToRecord for Edge {
    type Record = EdgeRecord;

    /// A partner of the same type folds into this record as a bidirectional
    /// pair; any other partner gets its own record and is linked by id.
    fn to_record(&self, graph: &Graph, options: RecordOptions) -> EdgeRecord {
        let partner = graph.partner_of(self);
        let folded = partner.filter(|o| o.edge_type == self.edge_type);
        let derived = Edge::derive_id(&self.to, &self.from, self.edge_type);
        let opposite_id = partner
            .map(|o| &o.id)
            .filter(|o| folded.is_none() || **o != derived)
            .cloned();
        EdgeRecord {
            id: self.id.clone(),
            from: Some(self.from.clone()).filter(|_| options.parent),
            to: self.to.clone(),
            edge_type: self.edge_type,
            data: self.data.clone(),
            bidirectional: folded.is_some(),
            opposite_id,
            opposite_data: folded
                .map(|o| o.data.clone())
                .filter(|data| !data.is_empty()),
        }
    }
}

/// Options for [`Graph::to_json`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Include landmark groups and the vertices in them
    pub persist_landmarks: bool,
}

impl Graph {
    /// Snapshot the graph as a document
    pub fn to_json(&self, options: &SerializeOptions) -> TourDocument {
        let excluded_groups: HashSet<&TemporalGroupId> = if options.persist_landmarks {
            HashSet::new()
        } else {
            self.temporal_groups
                .keys()
                .filter(|id| self.lineage(id.as_str()).iter().any(|g| g.is_landmark()))
                .collect()
        };
        let included = |group: &SpatialGroup| {
            options.persist_landmarks
                || !(group.is_landmark()
                    || group
                        .super_group
                        .as_ref()
                        .is_some_and(|p| excluded_groups.contains(p)))
        };
        let kept_vertex = |id: &VertexId| {
            self.vertices
                .get(id)
                .and_then(|v| self.spatial_groups.get(&v.spatial_group))
                .is_some_and(|g| included(g))
        };

        let flat = RecordOptions {
            children: false,
            parent: true,
        };
        let temporal_groups = self
            .temporal_groups
            .values()
            .filter(|g| !excluded_groups.contains(&g.id))
            .map(|g| g.to_record(self, flat))
            .collect();

        let nested = RecordOptions {
            children: false,
            parent: false,
        };
        let spatial_groups = self
            .spatial_groups
            .values()
            .filter(|g| included(*g))
            .map(|group| {
                let mut record = group.to_record(self, flat);
                record.vertices = group
                    .vertices
                    .iter()
                    .filter_map(|id| self.vertices.get(id))
                    .map(|vertex| {
                        let mut record = vertex.to_record(self, nested);
                        record.outgoing_edges = self.edge_records(vertex, &kept_vertex);
                        record
                    })
                    .collect();
                record
            })
            .collect();

        TourDocument {
            version: DOCUMENT_VERSION,
            temporal_groups,
            spatial_groups,
        }
    }

    /// Records of the vertex's outgoing edges that the document carries,
    /// sorted by id
    fn edge_records(&self, vertex: &Vertex, keep: impl Fn(&VertexId) -> bool) -> Vec<EdgeRecord> {
        let mut edges: Vec<&Edge> = vertex
            .outgoing_edges
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| keep(&e.to))
            .filter(|e| match self.partner_of(e) {
                Some(o) if o.edge_type == e.edge_type => e.id < o.id,
                _ => true,
            })
            .collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        let options = RecordOptions {
            children: false,
            parent: false,
        };
        edges.into_iter().map(|e| e.to_record(self, options)).collect()
    }

    fn partner_of(&self, edge: &Edge) -> Option<&Edge> {
        edge.opposite.as_ref().and_then(|o| self.edges.get(o))
    }

    /// Build a fresh graph from a document
    pub fn from_document(document: &TourDocument) -> Result<Self> {
        let mut graph = Self::new();
        graph.load_document(document)?;
        Ok(graph)
    }

    /// Add everything in `document` to the graph
    ///
    /// Parents are created before their children and edges after every
    /// vertex exists. Entities already present are left as they are.
    pub fn load_document(&mut self, document: &TourDocument) -> Result<()> {
        if document.version != DOCUMENT_VERSION {
            return Err(Error::UnsupportedVersion(document.version));
        }

        let records: HashMap<&str, &TemporalGroupRecord> = document
            .temporal_groups
            .iter()
            .map(|r| (r.id.as_str(), r))
            .collect();
        let mut visiting = HashSet::new();
        for record in &document.temporal_groups {
            self.load_temporal_group(record, &records, &mut visiting)?;
        }

        for group in &document.spatial_groups {
            self.create_spatial_group(NewSpatialGroup::from(group))?;
            for vertex in &group.vertices {
                self.create_vertex(vertex.to_new(&group.id))?;
            }
        }

        let mut edges = 0;
        for group in &document.spatial_groups {
            for vertex in &group.vertices {
                for edge in &vertex.outgoing_edges {
                    self.create_edge(edge.to_new(&vertex.id))?;
                    edges += 1;
                }
            }
        }

        info!(
            temporal_groups = document.temporal_groups.len(),
            spatial_groups = document.spatial_groups.len(),
            vertices = document.vertex_count(),
            edges,
            "loaded tour document"
        );
        Ok(())
    }

    fn load_temporal_group<'a>(
        &mut self,
        record: &'a TemporalGroupRecord,
        records: &HashMap<&str, &'a TemporalGroupRecord>,
        visiting: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if self.temporal_groups.contains_key(&record.id) {
            return Ok(());
        }
        if !visiting.insert(record.id.as_str()) {
            return Err(Error::invalid(format!(
                "temporal group '{}' is its own ancestor",
                record.id
            )));
        }
        if let Some(&parent) = records.get(record.super_group.as_ref().map_or("", |p| p.as_str())) {
            debug!(group = %record.id, parent = %parent.id, "loading parent first");
            self.load_temporal_group(parent, records, visiting)?;
        }
        self.create_temporal_group(NewTemporalGroup::from(record))?;
        visiting.remove(record.id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn tour() -> Graph {
        let mut graph = Graph::new();
        graph
            .create_temporal_group(NewTemporalGroup::new("Trip").with_colocated_radius(20.0))
            .unwrap();
        graph
            .create_temporal_group(NewTemporalGroup::new("Morning").with_super_group("trip"))
            .unwrap();
        graph
            .create_spatial_group(
                NewSpatialGroup::new("Day1")
                    .with_super_group("morning")
                    .with_timeslot(ts(9))
                    .with_images("panos"),
            )
            .unwrap();
        for (id, lat) in [("A", 1.0), ("B", 2.0)] {
            graph
                .create_vertex(
                    NewVertex::new([lat, 0.0])
                        .with_id(id)
                        .in_group("day1")
                        .with_image(format!("{id}.jpg")),
                )
                .unwrap();
        }
        graph
            .create_vertex(
                NewVertex::new([3.0, 3.0])
                    .with_id("L")
                    .with_type(VertexType::Landmark)
                    .with_timeslot(ts(10)),
            )
            .unwrap();

        let mut back = Data::new();
        back.insert("yaw".into(), json!(180));
        graph
            .create_edge(
                NewEdge::new("A", "B")
                    .with_data("yaw", json!(0))
                    .bidirectional()
                    .with_opposite_data(back),
            )
            .unwrap();
        graph.create_edge(NewEdge::new("B", "L").bidirectional()).unwrap();
        graph
    }

    #[test]
    fn test_bidirectional_pair_written_once() {
        let document = tour().to_json(&SerializeOptions::default());
        let day1 = &document.spatial_groups[0];
        let a = &day1.vertices[0];
        let b = &day1.vertices[1];
        assert_eq!(a.outgoing_edges.len(), 1);
        assert!(a.outgoing_edges[0].bidirectional);
        assert!(a.outgoing_edges[0].opposite_id.is_none());
        assert_eq!(
            a.outgoing_edges[0].opposite_data.as_ref().unwrap().get("yaw"),
            Some(&json!(180))
        );
        // B:A:route is the other half; B:L:landmark points at a dropped landmark
        assert!(b.outgoing_edges.is_empty());
    }

    #[test]
    fn test_landmarks_omitted_unless_persisted() {
        let graph = tour();
        let document = graph.to_json(&SerializeOptions::default());
        assert_eq!(document.temporal_groups.len(), 2);
        assert_eq!(document.spatial_groups.len(), 1);

        let document = graph.to_json(&SerializeOptions {
            persist_landmarks: true,
        });
        assert_eq!(document.temporal_groups.len(), 3);
        assert_eq!(document.spatial_groups.len(), 2);
        assert_eq!(document.vertex_count(), 3);
    }

    #[test]
    fn test_document_reload_is_identical() {
        let options = SerializeOptions {
            persist_landmarks: true,
        };
        let document = tour().to_json(&options);
        let json = document.to_json_pretty().unwrap();
        let parsed = TourDocument::from_json_str(&json).unwrap();

        let graph = Graph::from_document(&parsed).unwrap();
        assert!(graph.is_valid());
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.to_json(&options), document);
    }

    fn two_vertices() -> Graph {
        let mut graph = Graph::new();
        graph
            .create_spatial_group(NewSpatialGroup::new("Day1").with_timeslot(ts(9)))
            .unwrap();
        for (id, lat) in [("A", 1.0), ("B", 2.0)] {
            graph
                .create_vertex(NewVertex::new([lat, 0.0]).with_id(id).in_group("day1"))
                .unwrap();
        }
        graph
    }

    fn reload(graph: &Graph) -> Graph {
        let json = graph
            .to_json(&SerializeOptions::default())
            .to_json_pretty()
            .unwrap();
        Graph::from_document(&TourDocument::from_json_str(&json).unwrap()).unwrap()
    }

    #[test]
    fn test_explicit_edge_ids_survive_reload() {
        let mut graph = two_vertices();
        graph
            .create_edge(NewEdge::new("A", "B").with_id("x").bidirectional())
            .unwrap();

        let document = graph.to_json(&SerializeOptions::default());
        let b = &document.spatial_groups[0].vertices[1];
        assert_eq!(b.outgoing_edges[0].id.as_str(), "B:A:route");
        assert_eq!(b.outgoing_edges[0].opposite_id.as_ref().map(|o| o.as_str()), Some("x"));

        let loaded = reload(&graph);
        assert!(loaded.has_edge("x"));
        assert_eq!(
            loaded.get_edge("x").unwrap().opposite.as_ref().map(|o| o.as_str()),
            Some("B:A:route")
        );
        assert_eq!(loaded.edge_count(), 2);
        assert_eq!(loaded.to_json(&SerializeOptions::default()), document);

        let mut graph = two_vertices();
        graph
            .create_edge(
                NewEdge::new("A", "B")
                    .with_id("there")
                    .with_opposite("back")
                    .bidirectional(),
            )
            .unwrap();
        let loaded = reload(&graph);
        assert!(loaded.has_edge("there"));
        assert!(loaded.has_edge("back"));
        assert_eq!(
            loaded.get_edge("back").unwrap().opposite.as_ref().map(|o| o.as_str()),
            Some("there")
        );
    }

    #[test]
    fn test_pair_of_different_types_is_linked_by_id() {
        let mut graph = two_vertices();
        graph.create_edge(NewEdge::new("A", "B")).unwrap();
        graph
            .create_edge(
                NewEdge::new("B", "A")
                    .with_type(EdgeType::Temp)
                    .with_opposite("A:B:route"),
            )
            .unwrap();
        assert_eq!(
            graph.get_edge("A:B:route").unwrap().opposite.as_ref().map(|o| o.as_str()),
            Some("B:A:temp")
        );

        let document = graph.to_json(&SerializeOptions::default());
        let a = &document.spatial_groups[0].vertices[0].outgoing_edges[0];
        assert!(!a.bidirectional);
        assert_eq!(a.opposite_id.as_ref().map(|o| o.as_str()), Some("B:A:temp"));

        let loaded = reload(&graph);
        assert!(loaded.is_valid());
        assert_eq!(loaded.get_edge("B:A:temp").unwrap().edge_type, EdgeType::Temp);
        assert_eq!(
            loaded.get_edge("B:A:temp").unwrap().opposite.as_ref().map(|o| o.as_str()),
            Some("A:B:route")
        );
        assert_eq!(loaded.to_json(&SerializeOptions::default()), document);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let document = tour().to_json(&SerializeOptions::default());
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["temporalGroups"][1]["colocatedRadius"], json!(20.0));
        assert_eq!(value["spatialGroups"][0]["superGroup"], json!("morning"));
        assert_eq!(value["spatialGroups"][0]["type"], json!("route"));
        let edge = &value["spatialGroups"][0]["vertices"][0]["outgoingEdges"][0];
        assert_eq!(edge["type"], json!("route"));
        assert_eq!(edge["oppositeData"]["yaw"], json!(180));
    }

    #[test]
    fn test_children_are_loaded_after_parents() {
        let mut document = tour().to_json(&SerializeOptions::default());
        document.temporal_groups.reverse();
        let graph = Graph::from_document(&document).unwrap();
        assert_eq!(
            graph
                .get_temporal_group("morning")
                .unwrap()
                .super_group
                .as_ref()
                .map(|p| p.as_str()),
            Some("trip")
        );
    }

    #[test]
    fn test_rejects_bad_documents() {
        let document = TourDocument {
            version: 7,
            ..Default::default()
        };
        assert!(matches!(
            Graph::from_document(&document),
            Err(Error::UnsupportedVersion(7))
        ));

        let document = TourDocument::from_json_str(
            r#"{"version": 1, "temporalGroups": [
                {"id": "a", "name": "A", "superGroup": "b"},
                {"id": "b", "name": "B", "superGroup": "a"}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(
            Graph::from_document(&document),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_record_options() {
        let graph = tour();
        let vertex = graph.get_vertex("A").unwrap();
        let record = vertex.to_record(&graph, RecordOptions::default());
        assert_eq!(record.spatial_group.as_ref().map(|g| g.as_str()), Some("day1"));
        assert_eq!(record.outgoing_edges.len(), 1);

        let record = vertex.to_record(
            &graph,
            RecordOptions {
                children: false,
                parent: false,
            },
        );
        assert!(record.spatial_group.is_none());
        assert!(record.outgoing_edges.is_empty());

        let edge = graph.get_edge("A:B:route").unwrap();
        let record = edge.to_record(&graph, RecordOptions::default());
        assert_eq!(record.from.as_ref().map(|v| v.as_str()), Some("A"));
        assert!(record.bidirectional);
    }
}

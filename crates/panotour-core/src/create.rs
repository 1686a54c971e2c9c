//! Entity creation
//!
//! All create calls are idempotent by id: when an entity with the explicit or
//! derived id already exists it is returned untouched and no event fires.
//! CREATE is emitted only after the entity and its back-references are wired.

use chrono::Utc;
use tracing::{debug, warn};

use crate::defaults;
use crate::edge::{Edge, EdgeType, Endpoint, NewEdge};
use crate::error::{Error, Result};
use crate::event::Operation;
use crate::graph::{EntityRef, Graph};
use crate::ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
use crate::spatial_group::NewSpatialGroup;
use crate::temporal_group::{GroupRef, NewTemporalGroup};
use crate::vertex::{NewVertex, Vertex};

impl Graph {
    pub fn create_temporal_group(&mut self, new: NewTemporalGroup) -> Result<TemporalGroupId> {
        let id = new.derive_id()?;
        if self.temporal_groups.contains_key(&id) {
            return Ok(id);
        }
        if let Some(parent) = &new.super_group {
            if parent == &id {
                return Err(Error::invalid(format!(
                    "temporal group '{}' cannot be its own parent",
                    id
                )));
            }
            self.get_temporal_group(parent.as_str())?;
        }

        let group = new.build(id.clone());
        if let Some(parent) = &group.super_group {
            self.temporal_group_mut(parent.as_str())?
                .sub_groups
                .insert(GroupRef::Temporal(id.clone()));
        }
        self.temporal_groups.insert(id.clone(), group);

        debug!(group = %id, "created temporal group");
        self.notify(&EntityRef::TemporalGroup(id.clone()), Operation::Create);
        Ok(id)
    }

    /// Create a spatial group, placing it into a default root group when no
    /// parent is given
    pub fn create_spatial_group(&mut self, mut new: NewSpatialGroup) -> Result<SpatialGroupId> {
        let timeslot = new.timeslot.unwrap_or_else(Utc::now);
        let id = new.derive_id(&timeslot);
        if self.spatial_groups.contains_key(&id) {
            return Ok(id);
        }

        match &new.super_group {
            Some(parent) => {
                self.get_temporal_group(parent.as_str())?;
            }
            None if new.default_parent => {
                let parent =
                    self.create_temporal_group(defaults::temporal_group_for(new.group_type))?;
                new.super_group = Some(parent);
            }
            None => {}
        }

        let group = new.build(id.clone(), timeslot);
        if let Some(parent) = &group.super_group {
            self.temporal_group_mut(parent.as_str())?
                .sub_groups
                .insert(GroupRef::Spatial(id.clone()));
        }
        self.spatial_groups.insert(id.clone(), group);

        debug!(group = %id, "created spatial group");
        self.notify(&EntityRef::SpatialGroup(id.clone()), Operation::Create);
        Ok(id)
    }

    /// Create a vertex, placing it into a default spatial group keyed by its
    /// timeslot and type when none is given
    pub fn create_vertex(&mut self, new: NewVertex) -> Result<VertexId> {
        let group_timeslot = match &new.spatial_group {
            Some(group) => Some(self.get_spatial_group(group.as_str())?.timeslot),
            None => None,
        };
        let timeslot = new.timeslot.or(group_timeslot).unwrap_or_else(Utc::now);
        let id = new.derive_id(&timeslot);
        if self.vertices.contains_key(&id) {
            return Ok(id);
        }

        let group = match &new.spatial_group {
            Some(group) => group.clone(),
            None => self.create_spatial_group(defaults::spatial_group_for(
                new.vertex_type,
                timeslot,
            ))?,
        };

        let vertex = new.build(id.clone(), timeslot, group.clone());
        self.spatial_group_mut(group.as_str())?
            .vertices
            .insert(id.clone());
        self.vertices.insert(id.clone(), vertex);

        debug!(vertex = %id, group = %group, "created vertex");
        self.notify(&EntityRef::Vertex(id.clone()), Operation::Create);
        Ok(id)
    }

    /// Create an edge, and with `bidirectional` its paired reverse edge
    ///
    /// Returns the id of the forward edge. An existing edge with the same id
    /// is returned as is, though a missing reverse half is still added. The
    /// reverse half takes `opposite` as its id when given, else a derived one.
    pub fn create_edge(&mut self, new: NewEdge) -> Result<EdgeId> {
        if new.from == new.to {
            return Err(Error::invalid(format!(
                "edge cannot connect vertex '{}' to itself",
                new.from
            )));
        }
        let from = self.vertices.get(&new.from).ok_or_else(|| {
            Error::invalid(format!("edge source vertex '{}' does not exist", new.from))
        })?;
        let to = self.vertices.get(&new.to).ok_or_else(|| {
            Error::invalid(format!("edge target vertex '{}' does not exist", new.to))
        })?;

        let edge_type = new
            .edge_type
            .unwrap_or_else(|| self.derive_edge_type(from, to));
        let opposite_type = new
            .edge_type
            .unwrap_or_else(|| self.derive_edge_type(to, from));

        let NewEdge {
            id,
            from,
            to,
            data,
            bidirectional,
            opposite_data,
            opposite,
            ..
        } = new;
        let id = id.unwrap_or_else(|| Edge::derive_id(&from, &to, edge_type));

        let mut created = Vec::new();
        if !self.edges.contains_key(&id) {
            self.insert_edge(Edge {
                id: id.clone(),
                from: from.clone(),
                to: to.clone(),
                edge_type,
                data,
                opposite: None,
            })?;
            created.push(id.clone());
        }

        let opposite = if bidirectional {
            let opposite_id =
                opposite.unwrap_or_else(|| Edge::derive_id(&to, &from, opposite_type));
            if !self.edges.contains_key(&opposite_id) {
                self.insert_edge(Edge {
                    id: opposite_id.clone(),
                    from: to.clone(),
                    to: from.clone(),
                    edge_type: opposite_type,
                    data: opposite_data.unwrap_or_default(),
                    opposite: None,
                })?;
                created.push(opposite_id.clone());
            }
            Some(opposite_id)
        } else {
            opposite
        };

        if let Some(opposite) = &opposite {
            self.pair_edges(&id, opposite);
        }

        for edge in created {
            debug!(edge = %edge, "created edge");
            self.notify(&EntityRef::Edge(edge), Operation::Create);
        }
        Ok(id)
    }

    /// Type an edge between two existing vertices would be given
    pub fn derive_edge_type(&self, from: &Vertex, to: &Vertex) -> EdgeType {
        EdgeType::derive(&self.endpoint(from), &self.endpoint(to))
    }

    fn endpoint<'a>(&'a self, vertex: &'a Vertex) -> Endpoint<'a> {
        Endpoint {
            vertex_type: vertex.vertex_type,
            spatial_group: &vertex.spatial_group,
            temporal_group: self
                .spatial_groups
                .get(&vertex.spatial_group)
                .and_then(|g| g.super_group.as_ref()),
        }
    }

    fn insert_edge(&mut self, edge: Edge) -> Result<()> {
        let source = self.vertex_mut(edge.from.as_str())?;
        if let Err(slot) = source.outgoing_edges.binary_search(&edge.id) {
            source.outgoing_edges.insert(slot, edge.id.clone());
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Link two mirrored edges as each other's opposite
    ///
    /// Skipped when either edge is missing, they do not mirror each other, or
    /// one of them is already paired elsewhere.
    fn pair_edges(&mut self, id: &EdgeId, opposite_id: &EdgeId) {
        let (Some(edge), Some(opposite)) = (self.edges.get(id), self.edges.get(opposite_id)) else {
            return;
        };
        let unpaired_or = |e: &Edge, partner: &EdgeId| e.opposite.as_ref().map_or(true, |o| o == partner);
        if !edge.mirrors(opposite) {
            warn!(edge = %id, opposite = %opposite_id, "edges do not mirror each other, not pairing");
            return;
        }
        if !unpaired_or(edge, opposite_id) || !unpaired_or(opposite, id) {
            warn!(edge = %id, opposite = %opposite_id, "edge already paired, not pairing");
            return;
        }
        if let Some(edge) = self.edges.get_mut(id) {
            edge.opposite = Some(opposite_id.clone());
        }
        if let Some(opposite) = self.edges.get_mut(opposite_id) {
            opposite.opposite = Some(id.clone());
        }
    }
}

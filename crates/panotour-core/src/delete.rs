//! Cascading deletes
//!
//! Children go first, so DELETE events always arrive bottom-up: edges before
//! their vertices, vertices before their spatial group, descendants before
//! their temporal group. Every DELETE carries the entity exactly as it was
//! removed, which is enough to recreate it.

use tracing::debug;

use crate::edge::Edge;
use crate::error::Result;
use crate::event::{EntityState, Operation};
use crate::graph::{EntityRef, Graph};
use crate::ids::EdgeId;
use crate::temporal_group::GroupRef;

impl Graph {
    /// Delete an edge together with its opposite
    pub fn delete_edge(&mut self, id: &str) -> Result<()> {
        let edge = self.get_edge(id)?;
        let id = edge.id.clone();
        let opposite = edge.opposite.clone();

        let removed = self.remove_edge_entry(&id);
        let removed_opposite = opposite
            .filter(|o| self.edges.contains_key(o))
            .and_then(|o| self.remove_edge_entry(&o));

        if let Some(opposite) = removed_opposite {
            debug!(edge = %opposite.id, "deleted opposite edge");
            self.notify_removed(EntityState::Edge(opposite), Operation::Delete);
        }
        if let Some(edge) = removed {
            debug!(edge = %edge.id, "deleted edge");
            self.notify_removed(EntityState::Edge(edge), Operation::Delete);
        }
        Ok(())
    }

    /// Delete one half of a pair, leaving its opposite as a one-way edge
    pub fn delete_single_edge(&mut self, id: &str) -> Result<()> {
        let id = self.get_edge(id)?.id.clone();
        let Some(edge) = self.remove_edge_entry(&id) else {
            return Ok(());
        };
        if let Some(opposite) = edge.opposite.as_ref().and_then(|o| self.edges.get_mut(o)) {
            if opposite.opposite.as_ref() == Some(&id) {
                opposite.opposite = None;
            }
        }
        debug!(edge = %id, "deleted single edge");
        self.notify_removed(EntityState::Edge(edge), Operation::Delete);
        Ok(())
    }

    /// Delete a vertex and every edge leaving or entering it
    pub fn delete_vertex(&mut self, id: &str) -> Result<()> {
        let vertex = self.get_vertex(id)?;
        let id = vertex.id.clone();
        let mut doomed: Vec<EdgeId> = vertex.outgoing_edges.clone();
        doomed.extend(
            self.edges
                .values()
                .filter(|e| e.to == id)
                .map(|e| e.id.clone()),
        );
        for edge in doomed {
            // Earlier deletes may already have taken this one as an opposite
            if self.edges.contains_key(&edge) {
                self.delete_edge(edge.as_str())?;
            }
        }

        let Some(vertex) = self.vertices.remove(&id) else {
            return Ok(());
        };
        if let Some(group) = self.spatial_groups.get_mut(&vertex.spatial_group) {
            group.vertices.remove(&id);
        }
        debug!(vertex = %id, "deleted vertex");
        self.notify_removed(EntityState::Vertex(vertex), Operation::Delete);
        Ok(())
    }

    /// Delete a spatial group with all of its vertices
    pub fn delete_spatial_group(&mut self, id: &str) -> Result<()> {
        let group = self.get_spatial_group(id)?;
        let id = group.id.clone();
        let vertices: Vec<_> = group.vertices.iter().cloned().collect();
        for vertex in vertices {
            if self.vertices.contains_key(&vertex) {
                self.delete_vertex(vertex.as_str())?;
            }
        }

        let Some(group) = self.spatial_groups.remove(&id) else {
            return Ok(());
        };
        if let Some(parent) = group
            .super_group
            .as_ref()
            .and_then(|p| self.temporal_groups.get_mut(p))
        {
            parent.sub_groups.remove(&GroupRef::Spatial(id.clone()));
        }
        debug!(group = %id, "deleted spatial group");
        self.notify_removed(EntityState::SpatialGroup(group), Operation::Delete);
        Ok(())
    }

    /// Delete a temporal group and, bottom-up, everything beneath it
    pub fn delete_temporal_group(&mut self, id: &str) -> Result<()> {
        let group = self.get_temporal_group(id)?;
        let id = group.id.clone();
        let children: Vec<_> = group.sub_groups.iter().cloned().collect();
        for child in children {
            match child {
                GroupRef::Temporal(child) if self.temporal_groups.contains_key(&child) => {
                    self.delete_temporal_group(child.as_str())?
                }
                GroupRef::Spatial(child) if self.spatial_groups.contains_key(&child) => {
                    self.delete_spatial_group(child.as_str())?
                }
                _ => {}
            }
        }

        let Some(group) = self.temporal_groups.remove(&id) else {
            return Ok(());
        };
        if let Some(parent) = group
            .super_group
            .as_ref()
            .and_then(|p| self.temporal_groups.get_mut(p))
        {
            parent.sub_groups.remove(&GroupRef::Temporal(id.clone()));
        }
        debug!(group = %id, "deleted temporal group");
        self.notify_removed(EntityState::TemporalGroup(group), Operation::Delete);
        Ok(())
    }

    /// Delete any entity, cascading as its kind does
    pub fn delete_entity(&mut self, entity: &EntityRef) -> Result<()> {
        match entity {
            EntityRef::TemporalGroup(id) => self.delete_temporal_group(id.as_str()),
            EntityRef::SpatialGroup(id) => self.delete_spatial_group(id.as_str()),
            EntityRef::Vertex(id) => self.delete_vertex(id.as_str()),
            EntityRef::Edge(id) => self.delete_edge(id.as_str()),
        }
    }

    /// Remove an edge from the registry and its source vertex without
    /// touching its opposite or emitting anything
    fn remove_edge_entry(&mut self, id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        if let Some(source) = self.vertices.get_mut(&edge.from) {
            source.outgoing_edges.retain(|e| e != id);
        }
        Some(edge)
    }
}

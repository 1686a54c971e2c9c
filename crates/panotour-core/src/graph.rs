//! The tour graph: sole owner and mutator of all entities
//!
//! Entities refer to each other by id only. Every public mutation leaves the
//! graph consistent (parents and children agree, edges exist in their source
//! vertex's outgoing list, opposite edges mirror each other) before it
//! returns, and announces itself through the [`EventHub`].

use std::collections::BTreeMap;

use crate::edge::Edge;
use crate::error::{Error, Result};
use crate::event::{EntityKind, EntityState, Event, Operation, Topic};
use crate::hub::{EventHub, EventStream, SubscriptionId};
use crate::ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
use crate::spatial_group::SpatialGroup;
use crate::temporal_group::TemporalGroup;
use crate::vertex::Vertex;

/// Typed reference to any graph entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    TemporalGroup(TemporalGroupId),
    SpatialGroup(SpatialGroupId),
    Vertex(VertexId),
    Edge(EdgeId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::TemporalGroup(_) => EntityKind::TemporalGroup,
            Self::SpatialGroup(_) => EntityKind::SpatialGroup,
            Self::Vertex(_) => EntityKind::Vertex,
            Self::Edge(_) => EntityKind::Edge,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::TemporalGroup(id) => id.as_str(),
            Self::SpatialGroup(id) => id.as_str(),
            Self::Vertex(id) => id.as_str(),
            Self::Edge(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Graph of temporal groups, spatial groups, vertices and edges
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) temporal_groups: BTreeMap<TemporalGroupId, TemporalGroup>,
    pub(crate) spatial_groups: BTreeMap<SpatialGroupId, SpatialGroup>,
    pub(crate) vertices: BTreeMap<VertexId, Vertex>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    events: EventHub,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_temporal_group(&self, id: &str) -> Result<&TemporalGroup> {
        self.temporal_groups
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::TemporalGroup, id))
    }

    pub fn get_spatial_group(&self, id: &str) -> Result<&SpatialGroup> {
        self.spatial_groups
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::SpatialGroup, id))
    }

    pub fn get_vertex(&self, id: &str) -> Result<&Vertex> {
        self.vertices
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Vertex, id))
    }

    pub fn get_edge(&self, id: &str) -> Result<&Edge> {
        self.edges
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Edge, id))
    }

    pub fn has_temporal_group(&self, id: &str) -> bool {
        self.temporal_groups.contains_key(id)
    }

    pub fn has_spatial_group(&self, id: &str) -> bool {
        self.spatial_groups.contains_key(id)
    }

    pub fn has_vertex(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::TemporalGroup(id) => self.has_temporal_group(id.as_str()),
            EntityRef::SpatialGroup(id) => self.has_spatial_group(id.as_str()),
            EntityRef::Vertex(id) => self.has_vertex(id.as_str()),
            EntityRef::Edge(id) => self.has_edge(id.as_str()),
        }
    }

    pub(crate) fn temporal_group_mut(&mut self, id: &str) -> Result<&mut TemporalGroup> {
        self.temporal_groups
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::TemporalGroup, id))
    }

    pub(crate) fn spatial_group_mut(&mut self, id: &str) -> Result<&mut SpatialGroup> {
        self.spatial_groups
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::SpatialGroup, id))
    }

    pub(crate) fn vertex_mut(&mut self, id: &str) -> Result<&mut Vertex> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Vertex, id))
    }

    pub(crate) fn edge_mut(&mut self, id: &str) -> Result<&mut Edge> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Edge, id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Iteration and queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn temporal_groups(&self) -> impl Iterator<Item = &TemporalGroup> {
        self.temporal_groups.values()
    }

    pub fn spatial_groups(&self) -> impl Iterator<Item = &SpatialGroup> {
        self.spatial_groups.values()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn temporal_group_count(&self) -> usize {
        self.temporal_groups.len()
    }

    pub fn spatial_group_count(&self) -> usize {
        self.spatial_groups.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temporal_groups.is_empty()
            && self.spatial_groups.is_empty()
            && self.vertices.is_empty()
            && self.edges.is_empty()
    }

    /// Temporal groups without a parent
    pub fn root_groups(&self) -> impl Iterator<Item = &TemporalGroup> {
        self.temporal_groups
            .values()
            .filter(|g| g.super_group.is_none())
    }

    pub fn outgoing_edges(&self, vertex: &str) -> Result<Vec<&Edge>> {
        let vertex = self.get_vertex(vertex)?;
        Ok(vertex
            .outgoing_edges
            .iter()
            .filter_map(|id| self.edges.get(id))
            .collect())
    }

    pub fn incoming_edges(&self, vertex: &str) -> Vec<&Edge> {
        self.edges
            .values()
            .filter(|e| e.to.as_str() == vertex)
            .collect()
    }

    pub fn vertices_of(&self, spatial_group: &str) -> Result<Vec<&Vertex>> {
        let group = self.get_spatial_group(spatial_group)?;
        Ok(group
            .vertices
            .iter()
            .filter_map(|id| self.vertices.get(id))
            .collect())
    }

    /// Parent temporal group of the vertex's spatial group
    pub fn temporal_group_of(&self, vertex: &str) -> Result<Option<&TemporalGroupId>> {
        let vertex = self.get_vertex(vertex)?;
        let group = self.get_spatial_group(vertex.spatial_group.as_str())?;
        Ok(group.super_group.as_ref())
    }

    /// The group and its ancestors, nearest first
    pub fn lineage(&self, group: &str) -> Vec<&TemporalGroup> {
        let mut lineage = Vec::new();
        let mut current = self.temporal_groups.get(group);
        while let Some(g) = current {
            // Guards against a cycle slipping in through a bad document
            if lineage.len() > self.temporal_groups.len() {
                break;
            }
            lineage.push(g);
            current = g.super_group.as_ref().and_then(|p| self.temporal_groups.get(p));
        }
        lineage
    }

    /// Colocation radius of the group or its nearest ancestor that sets one
    pub fn colocated_radius(&self, group: &str) -> Option<f64> {
        self.lineage(group)
            .into_iter()
            .find_map(|g| g.colocated_radius)
    }

    /// Multiselect flag of the group or its nearest ancestor that sets one
    pub fn multiselect(&self, group: &str) -> bool {
        self.lineage(group)
            .into_iter()
            .find_map(|g| g.multiselect)
            .unwrap_or(false)
    }

    /// Whether `candidate` is `group` or one of its descendants
    pub fn is_within(&self, candidate: &str, group: &str) -> bool {
        self.lineage(candidate)
            .iter()
            .any(|g| g.id.as_str() == group)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Hub access for collaborators that subscribe or emit their own events
    pub fn events_mut(&mut self) -> &mut EventHub {
        &mut self.events
    }

    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.events.subscribe(topic, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn observe(&mut self, kind: EntityKind, operation: Operation) -> EventStream {
        self.events.observe(kind, operation)
    }

    /// Emit `operation` with a copy of the entity's current state
    pub(crate) fn notify(&mut self, entity: &EntityRef, operation: Operation) {
        let topic = Topic::new(entity.kind(), operation);
        if !self.events.has_subscribers(&topic) {
            return;
        }
        let state = match entity {
            EntityRef::TemporalGroup(id) => self
                .temporal_groups
                .get(id)
                .cloned()
                .map(EntityState::TemporalGroup),
            EntityRef::SpatialGroup(id) => self
                .spatial_groups
                .get(id)
                .cloned()
                .map(EntityState::SpatialGroup),
            EntityRef::Vertex(id) => self.vertices.get(id).cloned().map(EntityState::Vertex),
            EntityRef::Edge(id) => self.edges.get(id).cloned().map(EntityState::Edge),
        };
        if let Some(state) = state {
            self.events.emit(state, operation, None);
        }
    }

    /// Emit `operation` for an entity that is no longer in the graph
    pub(crate) fn notify_removed(&mut self, state: EntityState, operation: Operation) {
        if self
            .events
            .has_subscribers(&Topic::new(state.kind(), operation))
        {
            self.events.emit(state, operation, None);
        }
    }
}

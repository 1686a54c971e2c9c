//! Typed change-notification topics and payloads

use crate::edge::Edge;
use crate::graph::EntityRef;
use crate::spatial_group::SpatialGroup;
use crate::temporal_group::TemporalGroup;
use crate::vertex::Vertex;

/// The four kinds of graph entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    TemporalGroup,
    SpatialGroup,
    Vertex,
    Edge,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::TemporalGroup => "temporal group",
            Self::SpatialGroup => "spatial group",
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        })
    }
}

/// Mutable attributes that carry before/after update notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Coordinates,
    Data,
    Timeslot,
    Background,
    /// `super_group` of groups, `spatial_group` of vertices
    Parent,
}

/// What happened to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Delete,
    BeforeUpdate(Attribute),
    AfterUpdate(Attribute),
    /// Collaborator-defined operation, e.g. linking a file to a vertex
    Custom(&'static str),
}

/// Subscription key: entity kind plus operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    pub kind: EntityKind,
    pub operation: Operation,
}

impl Topic {
    pub fn new(kind: EntityKind, operation: Operation) -> Self {
        Self { kind, operation }
    }

    pub fn before_update(kind: EntityKind, attribute: Attribute) -> Self {
        Self::new(kind, Operation::BeforeUpdate(attribute))
    }

    pub fn after_update(kind: EntityKind, attribute: Attribute) -> Self {
        Self::new(kind, Operation::AfterUpdate(attribute))
    }
}

/// Copy of an entity as it was when the event fired
///
/// For before-update events this is the pre-mutation state; for delete
/// events it is the entity as it was removed.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState {
    TemporalGroup(TemporalGroup),
    SpatialGroup(SpatialGroup),
    Vertex(Vertex),
    Edge(Edge),
}

impl EntityState {
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
            Self::TemporalGroup(g) => g.id.as_str(),
            Self::SpatialGroup(g) => g.id.as_str(),
            Self::Vertex(v) => v.id.as_str(),
            Self::Edge(e) => e.id.as_str(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        match self {
            Self::TemporalGroup(g) => EntityRef::TemporalGroup(g.id.clone()),
            Self::SpatialGroup(g) => EntityRef::SpatialGroup(g.id.clone()),
            Self::Vertex(v) => EntityRef::Vertex(v.id.clone()),
            Self::Edge(e) => EntityRef::Edge(e.id.clone()),
        }
    }
}

/// A single notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: Topic,
    pub entity: EntityState,
}

impl Event {
    /// Event on the entity's own kind unless `kind_override` says otherwise
    pub fn new(entity: EntityState, operation: Operation, kind_override: Option<EntityKind>) -> Self {
        let kind = kind_override.unwrap_or_else(|| entity.kind());
        Self {
            topic: Topic::new(kind, operation),
            entity,
        }
    }

    pub fn operation(&self) -> Operation {
        self.topic.operation
    }

    pub fn as_vertex(&self) -> Option<&Vertex> {
        match &self.entity {
            EntityState::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.entity {
            EntityState::Edge(e) => Some(e),
            _ => None,
        }
    }
}

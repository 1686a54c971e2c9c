//! Panotour Core - Tour graph engine
//!
//! This crate provides the graph of temporal groups, spatial groups,
//! vertices and edges behind a panorama tour, the typed events announcing
//! every change, the undo/redo history built on those events, and the
//! persisted document format.

pub mod colocation;
pub mod create;
pub mod defaults;
pub mod delete;
pub mod document;
pub mod edge;
pub mod error;
pub mod event;
pub mod graph;
pub mod history;
pub mod hub;
pub mod ids;
pub mod log;
pub mod media;
pub mod spatial_group;
pub mod temporal_group;
pub mod update;
pub mod validate;
pub mod vertex;

pub use colocation::haversine_distance;
pub use document::{
    EdgeRecord, RecordOptions, SerializeOptions, SpatialGroupRecord, TemporalGroupRecord,
    ToRecord, TourDocument, VertexRecord, DOCUMENT_VERSION,
};
pub use edge::{Edge, EdgeType, NewEdge};
pub use error::{Error, Result, StackKind};
pub use event::{Attribute, EntityKind, EntityState, Event, Operation, Topic};
pub use graph::{EntityRef, Graph};
pub use history::{Command, CommandHistory, Mode};
pub use hub::{EventHub, EventStream, SubscriptionId};
pub use ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
pub use log::{LogRecord, LogSink, MemorySink, Severity, TracingSink};
pub use spatial_group::{Background, ImageDirectory, NewSpatialGroup, SpatialGroup, SpatialGroupType};
pub use temporal_group::{GroupRef, NewTemporalGroup, TemporalGroup, TemporalGroupType};
pub use validate::Violation;
pub use vertex::{Coordinates, Data, ImageFile, NewVertex, Vertex, VertexType};

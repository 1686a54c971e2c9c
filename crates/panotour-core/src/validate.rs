//! Structural integrity checks
//!
//! Mutations through [`Graph`] never produce these; they catch graphs
//! assembled from hand-edited or truncated documents.

use thiserror::Error;

use crate::graph::Graph;
use crate::ids::{EdgeId, SpatialGroupId, TemporalGroupId, VertexId};
use crate::temporal_group::GroupRef;

/// A broken graph invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("temporal group '{group}' names missing parent '{parent}'")]
    MissingTemporalParent {
        group: String,
        parent: TemporalGroupId,
    },

    #[error("temporal group '{parent}' lists '{child}', which does not point back")]
    OrphanedChild { parent: TemporalGroupId, child: String },

    #[error("'{child}' names '{parent}' as parent but is not listed there")]
    UnlistedChild { parent: String, child: String },

    #[error("temporal group '{0}' is its own ancestor")]
    Cycle(TemporalGroupId),

    #[error("vertex '{vertex}' belongs to missing spatial group '{group}'")]
    MissingSpatialGroup {
        vertex: VertexId,
        group: SpatialGroupId,
    },

    #[error("spatial group '{group}' lists missing vertex '{vertex}'")]
    MissingVertex {
        group: SpatialGroupId,
        vertex: VertexId,
    },

    #[error("edge '{edge}' references missing vertex '{vertex}'")]
    DanglingEdge { edge: EdgeId, vertex: VertexId },

    #[error("vertex '{vertex}' lists edge '{edge}', which it does not own")]
    MisplacedEdge { vertex: VertexId, edge: EdgeId },

    #[error("edge '{0}' is missing from its source vertex")]
    UnlistedEdge(EdgeId),

    #[error("edge '{edge}' has opposite '{opposite}', which does not mirror it")]
    AsymmetricOpposite { edge: EdgeId, opposite: EdgeId },
}

impl Graph {
    /// Every broken invariant, empty for a consistent graph
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_groups(&mut violations);
        self.check_vertices(&mut violations);
        self.check_edges(&mut violations);
        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    fn check_groups(&self, violations: &mut Vec<Violation>) {
        for group in self.temporal_groups.values() {
            if let Some(parent) = &group.super_group {
                match self.temporal_groups.get(parent) {
                    None => violations.push(Violation::MissingTemporalParent {
                        group: group.id.to_string(),
                        parent: parent.clone(),
                    }),
                    Some(p) if !p.sub_groups.contains(&GroupRef::Temporal(group.id.clone())) => {
                        violations.push(Violation::UnlistedChild {
                            parent: parent.to_string(),
                            child: group.id.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            if self.has_cycle(&group.id) {
                violations.push(Violation::Cycle(group.id.clone()));
            }
            for child in &group.sub_groups {
                let parent = match child {
                    GroupRef::Temporal(id) => self
                        .temporal_groups
                        .get(id)
                        .and_then(|c| c.super_group.as_ref()),
                    GroupRef::Spatial(id) => self
                        .spatial_groups
                        .get(id)
                        .and_then(|c| c.super_group.as_ref()),
                };
                if parent != Some(&group.id) {
                    let child = match child {
                        GroupRef::Temporal(id) => id.to_string(),
                        GroupRef::Spatial(id) => id.to_string(),
                    };
                    violations.push(Violation::OrphanedChild {
                        parent: group.id.clone(),
                        child,
                    });
                }
            }
        }

        for group in self.spatial_groups.values() {
            if let Some(parent) = &group.super_group {
                match self.temporal_groups.get(parent) {
                    None => violations.push(Violation::MissingTemporalParent {
                        group: group.id.to_string(),
                        parent: parent.clone(),
                    }),
                    Some(p) if !p.sub_groups.contains(&GroupRef::Spatial(group.id.clone())) => {
                        violations.push(Violation::UnlistedChild {
                            parent: parent.to_string(),
                            child: group.id.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for vertex in &group.vertices {
                let owner = self.vertices.get(vertex).map(|v| &v.spatial_group);
                if owner != Some(&group.id) {
                    violations.push(Violation::MissingVertex {
                        group: group.id.clone(),
                        vertex: vertex.clone(),
                    });
                }
            }
        }
    }

    fn check_vertices(&self, violations: &mut Vec<Violation>) {
        for vertex in self.vertices.values() {
            match self.spatial_groups.get(&vertex.spatial_group) {
                None => violations.push(Violation::MissingSpatialGroup {
                    vertex: vertex.id.clone(),
                    group: vertex.spatial_group.clone(),
                }),
                Some(group) if !group.vertices.contains(&vertex.id) => {
                    violations.push(Violation::UnlistedChild {
                        parent: group.id.to_string(),
                        child: vertex.id.to_string(),
                    })
                }
                Some(_) => {}
            }
            for edge in &vertex.outgoing_edges {
                if self.edges.get(edge).map(|e| &e.from) != Some(&vertex.id) {
                    violations.push(Violation::MisplacedEdge {
                        vertex: vertex.id.clone(),
                        edge: edge.clone(),
                    });
                }
            }
        }
    }

    fn check_edges(&self, violations: &mut Vec<Violation>) {
        for edge in self.edges.values() {
            for endpoint in [&edge.from, &edge.to] {
                if !self.vertices.contains_key(endpoint) {
                    violations.push(Violation::DanglingEdge {
                        edge: edge.id.clone(),
                        vertex: endpoint.clone(),
                    });
                }
            }
            if let Some(source) = self.vertices.get(&edge.from) {
                if !source.outgoing_edges.contains(&edge.id) {
                    violations.push(Violation::UnlistedEdge(edge.id.clone()));
                }
            }
            if let Some(opposite) = &edge.opposite {
                let symmetric = self.edges.get(opposite).is_some_and(|o| {
                    o.opposite.as_ref() == Some(&edge.id) && o.mirrors(edge)
                });
                if !symmetric {
                    violations.push(Violation::AsymmetricOpposite {
                        edge: edge.id.clone(),
                        opposite: opposite.clone(),
                    });
                }
            }
        }
    }

    fn has_cycle(&self, start: &TemporalGroupId) -> bool {
        let mut current = self
            .temporal_groups
            .get(start)
            .and_then(|g| g.super_group.as_ref());
        let mut steps = 0;
        while let Some(id) = current {
            if id == start {
                return true;
            }
            steps += 1;
            if steps > self.temporal_groups.len() {
                // Looping above us, reported for the groups on the loop
                return false;
            }
            current = self
                .temporal_groups
                .get(id)
                .and_then(|g| g.super_group.as_ref());
        }
        false
    }
}

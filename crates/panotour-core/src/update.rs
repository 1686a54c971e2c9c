//! Attribute updates and reparenting
//!
//! Each update is a no-op without events when the new value equals the old
//! one. Otherwise subscribers see a before-update event carrying the old
//! state, then the mutation happens, then an after-update event.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::event::{Attribute, Operation};
use crate::graph::{EntityRef, Graph};
use crate::ids::{SpatialGroupId, TemporalGroupId, VertexId};
use crate::spatial_group::Background;
use crate::temporal_group::GroupRef;
use crate::vertex::{merge_data, Coordinates, Data};

impl Graph {
    pub fn update_coordinates(&mut self, vertex: &str, coordinates: Coordinates) -> Result<()> {
        let current = self.get_vertex(vertex)?;
        if current.coordinates == coordinates {
            return Ok(());
        }
        let target = EntityRef::Vertex(current.id.clone());
        self.mutate(&target, Attribute::Coordinates, |graph| {
            graph.vertex_mut(vertex)?.coordinates = coordinates;
            Ok(())
        })
    }

    /// Merge `data` into the entity's data, or replace it when `overwrite`
    ///
    /// Supported for vertices and edges.
    pub fn update_data(&mut self, target: &EntityRef, data: Data, overwrite: bool) -> Result<()> {
        let current = match target {
            EntityRef::Vertex(id) => &self.get_vertex(id.as_str())?.data,
            EntityRef::Edge(id) => &self.get_edge(id.as_str())?.data,
            other => {
                return Err(Error::invalid(format!("{} has no data to update", other)));
            }
        };
        let next = if overwrite {
            data
        } else {
            merge_data(current, data)
        };
        if *current == next {
            return Ok(());
        }
        self.mutate(target, Attribute::Data, |graph| {
            match target {
                EntityRef::Vertex(id) => graph.vertex_mut(id.as_str())?.data = next,
                EntityRef::Edge(id) => graph.edge_mut(id.as_str())?.data = next,
                _ => {}
            }
            Ok(())
        })
    }

    /// Move a vertex or spatial group on the timeline
    pub fn update_timeslot(&mut self, target: &EntityRef, timeslot: DateTime<Utc>) -> Result<()> {
        let current = match target {
            EntityRef::Vertex(id) => self.get_vertex(id.as_str())?.timeslot,
            EntityRef::SpatialGroup(id) => self.get_spatial_group(id.as_str())?.timeslot,
            other => {
                return Err(Error::invalid(format!("{} has no timeslot", other)));
            }
        };
        if current == timeslot {
            return Ok(());
        }
        self.mutate(target, Attribute::Timeslot, |graph| {
            match target {
                EntityRef::Vertex(id) => graph.vertex_mut(id.as_str())?.timeslot = timeslot,
                EntityRef::SpatialGroup(id) => {
                    graph.spatial_group_mut(id.as_str())?.timeslot = timeslot
                }
                _ => {}
            }
            Ok(())
        })
    }

    pub fn update_background(
        &mut self,
        spatial_group: &str,
        background: Option<Background>,
    ) -> Result<()> {
        let current = self.get_spatial_group(spatial_group)?;
        if current.background == background {
            return Ok(());
        }
        let target = EntityRef::SpatialGroup(current.id.clone());
        self.mutate(&target, Attribute::Background, |graph| {
            graph.spatial_group_mut(spatial_group)?.background = background;
            Ok(())
        })
    }

    /// Make `top` the parent of `bottom`, detaching it from its old parent
    ///
    /// Temporal and spatial groups go under temporal groups, vertices under
    /// spatial groups.
    pub fn add_to(&mut self, bottom: &EntityRef, top: &EntityRef) -> Result<()> {
        match (bottom, top) {
            (EntityRef::TemporalGroup(child), EntityRef::TemporalGroup(parent)) => {
                self.get_temporal_group(parent.as_str())?;
                let current = self.get_temporal_group(child.as_str())?.super_group.clone();
                if current.as_ref() == Some(parent) {
                    return Ok(());
                }
                if self.is_within(parent.as_str(), child.as_str()) {
                    return Err(Error::invalid(format!(
                        "moving temporal group '{}' under '{}' would create a cycle",
                        child, parent
                    )));
                }
                let link = GroupRef::Temporal(child.clone());
                self.mutate(bottom, Attribute::Parent, |graph| {
                    graph.relink(current.as_ref(), Some(parent), link)?;
                    graph.temporal_group_mut(child.as_str())?.super_group = Some(parent.clone());
                    Ok(())
                })
            }
            (EntityRef::SpatialGroup(child), EntityRef::TemporalGroup(parent)) => {
                self.get_temporal_group(parent.as_str())?;
                let current = self.get_spatial_group(child.as_str())?.super_group.clone();
                if current.as_ref() == Some(parent) {
                    return Ok(());
                }
                let link = GroupRef::Spatial(child.clone());
                self.mutate(bottom, Attribute::Parent, |graph| {
                    graph.relink(current.as_ref(), Some(parent), link)?;
                    graph.spatial_group_mut(child.as_str())?.super_group = Some(parent.clone());
                    Ok(())
                })
            }
            (EntityRef::Vertex(vertex), EntityRef::SpatialGroup(group)) => {
                self.get_spatial_group(group.as_str())?;
                let current = self.get_vertex(vertex.as_str())?.spatial_group.clone();
                if &current == group {
                    return Ok(());
                }
                self.mutate(bottom, Attribute::Parent, |graph| {
                    graph.move_vertex(vertex, &current, group)
                })
            }
            _ => Err(Error::invalid(format!("cannot add {} to {}", bottom, top))),
        }
    }

    /// Detach a group from its parent `top`, leaving it a root group
    pub fn remove_from(&mut self, bottom: &EntityRef, top: &EntityRef) -> Result<()> {
        let parent = match top {
            EntityRef::TemporalGroup(parent) => parent,
            EntityRef::SpatialGroup(_) if matches!(bottom, EntityRef::Vertex(_)) => {
                return Err(Error::invalid(
                    "a vertex always belongs to a spatial group; use add_to to move it",
                ));
            }
            _ => return Err(Error::invalid(format!("cannot remove {} from {}", bottom, top))),
        };
        let (current, link) = match bottom {
            EntityRef::TemporalGroup(id) => (
                self.get_temporal_group(id.as_str())?.super_group.clone(),
                GroupRef::Temporal(id.clone()),
            ),
            EntityRef::SpatialGroup(id) => (
                self.get_spatial_group(id.as_str())?.super_group.clone(),
                GroupRef::Spatial(id.clone()),
            ),
            _ => return Err(Error::invalid(format!("cannot remove {} from {}", bottom, top))),
        };
        if current.as_ref() != Some(parent) {
            return Err(Error::invalid(format!("{} is not a child of {}", bottom, top)));
        }
        self.mutate(bottom, Attribute::Parent, |graph| {
            graph.relink(Some(parent), None, link.clone())?;
            match &link {
                GroupRef::Temporal(id) => graph.temporal_group_mut(id.as_str())?.super_group = None,
                GroupRef::Spatial(id) => graph.spatial_group_mut(id.as_str())?.super_group = None,
            }
            Ok(())
        })
    }

    /// Fire before-update, apply `change`, fire after-update
    fn mutate<F>(&mut self, target: &EntityRef, attribute: Attribute, change: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.notify(target, Operation::BeforeUpdate(attribute));
        change(self)?;
        debug!(entity = %target, ?attribute, "updated");
        self.notify(target, Operation::AfterUpdate(attribute));
        Ok(())
    }

    fn relink(
        &mut self,
        from: Option<&TemporalGroupId>,
        to: Option<&TemporalGroupId>,
        child: GroupRef,
    ) -> Result<()> {
        if let Some(old) = from {
            if let Some(group) = self.temporal_groups.get_mut(old) {
                group.sub_groups.remove(&child);
            }
        }
        if let Some(new) = to {
            self.temporal_group_mut(new.as_str())?.sub_groups.insert(child);
        }
        Ok(())
    }

    fn move_vertex(
        &mut self,
        vertex: &VertexId,
        from: &SpatialGroupId,
        to: &SpatialGroupId,
    ) -> Result<()> {
        if let Some(group) = self.spatial_groups.get_mut(from) {
            group.vertices.remove(vertex);
        }
        self.spatial_group_mut(to.as_str())?
            .vertices
            .insert(vertex.clone());
        self.vertex_mut(vertex.as_str())?.spatial_group = to.clone();
        Ok(())
    }
}

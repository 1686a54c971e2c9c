//! Resolving vertex image files against their group's directories

use std::path::PathBuf;

use crate::error::Result;
use crate::graph::Graph;
use crate::spatial_group::{ImageDirectory, SpatialGroup};
use crate::vertex::ImageFile;

impl Graph {
    /// Location of the vertex's panorama, if it has one
    pub fn image_path(&self, vertex: &str) -> Result<Option<PathBuf>> {
        let vertex = self.get_vertex(vertex)?;
        let group = self.get_spatial_group(vertex.spatial_group.as_str())?;
        Ok(vertex
            .image
            .as_ref()
            .map(|image| resolve(group, group.images.as_ref(), image)))
    }

    pub fn thumbnail_path(&self, vertex: &str) -> Result<Option<PathBuf>> {
        let vertex = self.get_vertex(vertex)?;
        let group = self.get_spatial_group(vertex.spatial_group.as_str())?;
        Ok(vertex
            .thumbnail
            .as_ref()
            .map(|thumbnail| resolve(group, group.thumbnails.as_ref(), thumbnail)))
    }
}

/// `<group path>/<directory>/<file>`, where a path on the file itself
/// replaces the directory
fn resolve(group: &SpatialGroup, directory: Option<&ImageDirectory>, file: &ImageFile) -> PathBuf {
    let mut path = PathBuf::new();
    if let Some(base) = &group.path {
        path.push(base);
    }
    match (&file.path, directory) {
        (Some(own), _) => path.push(own),
        (None, Some(directory)) => path.push(&directory.path),
        (None, None) => {}
    }
    path.push(&file.file);
    path
}

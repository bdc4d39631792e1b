//! In-memory model of a Metashape marker export.
//!
//! A [`MarkerDocument`] holds the three record sets the export describes:
//! markers with world coordinates, cameras with image labels, and the
//! per-frame pixel observations that reference both by id.

use std::collections::HashMap;

use super::ids::{CameraId, MarkerId};

/// Image extension every camera label is normalized to carry.
pub const IMAGE_EXTENSION: &str = ".JPG";

/// A reference marker with known world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Marker {
    /// Creates a new marker.
    pub fn new(id: impl Into<MarkerId>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
        }
    }
}

/// A camera, i.e. one image of the chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Camera {
    pub id: CameraId,

    /// Image file name, always ending in [`IMAGE_EXTENSION`] unless empty.
    pub label: String,
}

impl Camera {
    /// Creates a new camera, normalizing the label's extension.
    pub fn new(id: impl Into<CameraId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: normalize_label(label.into()),
        }
    }
}

/// One image's measured pixel location of a marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub marker_id: MarkerId,
    pub camera_id: CameraId,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

/// A parsed marker export.
///
/// Lookups are last-write-wins on duplicate ids. `observations` keeps
/// document order and may reference ids absent from either lookup.
#[derive(Clone, Debug, Default)]
pub struct MarkerDocument {
    pub markers: HashMap<MarkerId, Marker>,
    pub cameras: HashMap<CameraId, Camera>,
    pub observations: Vec<Observation>,
}

impl MarkerDocument {
    /// Inserts a marker, replacing any previous marker with the same id.
    pub fn insert_marker(&mut self, marker: Marker) {
        self.markers.insert(marker.id.clone(), marker);
    }

    /// Inserts a camera, replacing any previous camera with the same id.
    pub fn insert_camera(&mut self, camera: Camera) {
        self.cameras.insert(camera.id.clone(), camera);
    }

    /// Iterates observations in document order, paired with their resolved
    /// marker and camera. Observations with a dangling reference are skipped.
    pub fn joined(&self) -> impl Iterator<Item = (&Marker, &Camera, &Observation)> + '_ {
        self.observations.iter().filter_map(|obs| {
            let marker = self.markers.get(&obs.marker_id)?;
            let camera = self.cameras.get(&obs.camera_id)?;
            Some((marker, camera, obs))
        })
    }
}

/// Appends [`IMAGE_EXTENSION`] to a non-empty label lacking it.
///
/// The comparison is case-sensitive: `img.jpg` becomes `img.jpg.JPG`.
pub fn normalize_label(mut label: String) -> String {
    if !label.is_empty() && !label.ends_with(IMAGE_EXTENSION) {
        label.push_str(IMAGE_EXTENSION);
    }
    label
}

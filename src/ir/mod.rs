//! In-memory representation of a marker export and its readers/writers.
//!
//! Conversion is a join over three record sets parsed out of one XML file:
//!
//! 1. **Markers** keyed by [`MarkerId`], carrying world coordinates.
//! 2. **Cameras** keyed by [`CameraId`], carrying the image label.
//! 3. **Observations** in document order, each pointing at one marker and
//!    one camera with a pixel position.
//!
//! Observations whose marker or camera is unknown are kept in the model but
//! never written; [`MarkerDocument::joined`] yields only resolvable rows.
//!
//! # Example
//!
//! ```
//! use gcpconv::ir::{Camera, Marker, MarkerDocument, Observation};
//!
//! let mut doc = MarkerDocument::default();
//! doc.insert_marker(Marker::new("1", 155000.0, 463000.0, 2.5));
//! doc.insert_camera(Camera::new("10", "IMG_0001"));
//! doc.observations.push(Observation {
//!     marker_id: "1".into(),
//!     camera_id: "10".into(),
//!     pixel_x: 1024.0,
//!     pixel_y: 768.0,
//! });
//!
//! assert_eq!(doc.joined().count(), 1);
//! ```

mod ids;
pub mod io_gcp_txt;
pub mod io_marker_xml;
mod model;

// Re-export core types for convenient access
pub use ids::{CameraId, MarkerId};
pub use model::{normalize_label, Camera, Marker, MarkerDocument, Observation, IMAGE_EXTENSION};

//! Metashape marker-export XML reader.
//!
//! The reader understands the subset of the export that carries ground
//! control information:
//! - `markers/marker[@id]/reference[@x][@y][@z]` (world coordinates)
//! - `cameras/camera[@id][@label]` (image names)
//! - `frames/frame/markers/marker[@marker_id]/location[@camera_id][@x][@y]`
//!   (pixel observations)
//!
//! Sections are matched at any depth, so both bare exports and full
//! `document/chunk` projects are accepted. Unknown elements and attributes
//! are ignored.
//!
//! Absent coordinate attributes default to `0.0`. A reference coordinate that
//! is present but not a number is a parse error. Pixel coordinates are only
//! checked for observations whose marker and camera both resolve; the pixels
//! of a dangling observation are never written and default to `0.0`.
//!
//! Documents carrying a `<!DOCTYPE>` declaration are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node, ParsingOptions};

use super::model::{Camera, Marker, MarkerDocument, Observation};
use crate::error::GcpError;

/// Read a marker export from disk.
pub fn read_marker_xml(path: &Path) -> Result<MarkerDocument, GcpError> {
    let xml = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::InvalidData {
            GcpError::MarkerXmlParse {
                path: path.to_path_buf(),
                message: format!("input is not valid UTF-8: {source}"),
            }
        } else {
            GcpError::Io(source)
        }
    })?;
    parse_marker_xml_str(&xml, path)
}

/// Parse a marker export from a string.
pub fn from_marker_xml_str(xml: &str) -> Result<MarkerDocument, GcpError> {
    parse_marker_xml_str(xml, Path::new("<string>"))
}

/// Parse a marker export from bytes (must be valid UTF-8).
pub fn from_marker_xml_slice(bytes: &[u8]) -> Result<MarkerDocument, GcpError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| GcpError::MarkerXmlParse {
        path: PathBuf::from("<bytes>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_marker_xml_str(xml, Path::new("<bytes>"))
}

fn parse_marker_xml_str(xml: &str, path: &Path) -> Result<MarkerDocument, GcpError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(xml, options).map_err(|source| GcpError::MarkerXmlParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let mut parsed = MarkerDocument::default();
    let mut frame_markers = Vec::new();

    for node in document.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "marker" if is_reference_marker(node) => {
                if let Some(marker) = parse_marker_element(node, path)? {
                    parsed.insert_marker(marker);
                }
            }
            "camera" if parent_named(node, "cameras") => {
                if let Some(camera) = parse_camera_element(node) {
                    parsed.insert_camera(camera);
                }
            }
            "marker" if is_frame_marker(node) => frame_markers.push(node),
            _ => {}
        }
    }

    // Observations are read once both lookups are complete, so pixel
    // coordinates can be validated for joinable rows only.
    for node in frame_markers {
        parse_frame_marker_element(node, path, &mut parsed)?;
    }

    log::debug!(
        "parsed {}: {} marker(s), {} camera(s), {} observation(s)",
        path.display(),
        parsed.markers.len(),
        parsed.cameras.len(),
        parsed.observations.len()
    );

    Ok(parsed)
}

/// `<marker>` in a top-level `<markers>` section, i.e. not inside a `<frame>`.
fn is_reference_marker(node: Node<'_, '_>) -> bool {
    node.parent_element()
        .filter(|markers| markers.tag_name().name() == "markers")
        .map(|markers| !parent_named(markers, "frame"))
        .unwrap_or(false)
}

/// `<marker>` at `frames/frame/markers/marker`.
fn is_frame_marker(node: Node<'_, '_>) -> bool {
    let Some(markers) = node.parent_element() else {
        return false;
    };
    let Some(frame) = markers.parent_element() else {
        return false;
    };
    markers.tag_name().name() == "markers"
        && frame.tag_name().name() == "frame"
        && parent_named(frame, "frames")
}

fn parse_marker_element(node: Node<'_, '_>, path: &Path) -> Result<Option<Marker>, GcpError> {
    let Some(id) = node.attribute("id") else {
        log::debug!("skipping <marker> without id in {}", path.display());
        return Ok(None);
    };
    // Markers without a reference have no world position to export.
    let Some(reference) = child_element(node, "reference") else {
        return Ok(None);
    };

    let context = format!("<reference> of marker '{id}'");
    let x = parse_f64_attr_or_zero(reference, "x", path, &context)?;
    let y = parse_f64_attr_or_zero(reference, "y", path, &context)?;
    let z = parse_f64_attr_or_zero(reference, "z", path, &context)?;

    Ok(Some(Marker::new(id, x, y, z)))
}

fn parse_camera_element(node: Node<'_, '_>) -> Option<Camera> {
    let id = node.attribute("id")?;
    let label = node.attribute("label").unwrap_or("");
    Some(Camera::new(id, label))
}

fn parse_frame_marker_element(
    node: Node<'_, '_>,
    path: &Path,
    parsed: &mut MarkerDocument,
) -> Result<(), GcpError> {
    let Some(marker_id) = node.attribute("marker_id") else {
        return Ok(());
    };

    for location in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "location")
    {
        let Some(camera_id) = location.attribute("camera_id") else {
            continue;
        };

        let (pixel_x, pixel_y) = if parsed.markers.contains_key(marker_id)
            && parsed.cameras.contains_key(camera_id)
        {
            let context = format!("<location> of marker '{marker_id}' in camera '{camera_id}'");
            (
                parse_f64_attr_or_zero(location, "x", path, &context)?,
                parse_f64_attr_or_zero(location, "y", path, &context)?,
            )
        } else {
            (0.0, 0.0)
        };

        parsed.observations.push(Observation {
            marker_id: marker_id.into(),
            camera_id: camera_id.into(),
            pixel_x,
            pixel_y,
        });
    }

    Ok(())
}

fn parse_f64_attr_or_zero(
    node: Node<'_, '_>,
    attr: &str,
    path: &Path,
    context: &str,
) -> Result<f64, GcpError> {
    let Some(raw) = node.attribute(attr) else {
        return Ok(0.0);
    };
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GcpError::MarkerXmlParse {
            path: path.to_path_buf(),
            message: format!("{context} has invalid {attr}='{raw}'; expected a number"),
        })
}

fn parent_named(node: Node<'_, '_>, name: &str) -> bool {
    node.parent_element()
        .map(|parent| parent.tag_name().name() == name)
        .unwrap_or(false)
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

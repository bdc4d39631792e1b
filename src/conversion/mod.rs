//! The marker-export to GCP text conversion pipeline.
//!
//! A conversion is a single linear pass: parse the XML into a
//! [`MarkerDocument`], resolve the projection header once, then write the
//! joined rows. Nothing is shared between calls, so conversions may run
//! concurrently on separate threads.

pub mod report;

pub use report::{ConversionCounts, ConversionReport};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::GcpError;
use crate::ir::io_gcp_txt::write_gcp_txt;
use crate::ir::io_marker_xml::read_marker_xml;
use crate::ir::MarkerDocument;
use crate::projection::{self, BuiltinDatabase, CrsDatabase};

const INPUT_SUFFIX: &str = ".xml";
const OUTPUT_SUFFIX: &str = "_converted.txt";

/// Options for [`convert_with`].
pub struct ConvertOptions<'a> {
    /// Destination path. Derived from the input path when `None`.
    pub output: Option<PathBuf>,
    /// EPSG code of the marker coordinates. `None` selects EPSG:28992.
    pub epsg: Option<i64>,
    /// Where projection definitions are looked up.
    pub database: &'a dyn CrsDatabase,
}

impl Default for ConvertOptions<'_> {
    fn default() -> Self {
        Self {
            output: None,
            epsg: None,
            database: &BuiltinDatabase,
        }
    }
}

/// Convert a marker export to a GCP text file using the bundled CRS table.
///
/// Returns the path of the written file.
///
/// # Errors
/// Fails if the input cannot be read, is not well-formed XML, holds a
/// non-numeric coordinate attribute, or if the output cannot be written. An
/// unresolvable `epsg` is not an error; the default projection is used.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use gcpconv::conversion::convert;
///
/// let written = convert(Path::new("markers.xml"), None, Some(28992))?;
/// assert_eq!(written, Path::new("markers_converted.txt"));
/// # Ok::<(), gcpconv::GcpError>(())
/// ```
pub fn convert(
    input: &Path,
    output: Option<&Path>,
    epsg: Option<i64>,
) -> Result<PathBuf, GcpError> {
    let options = ConvertOptions {
        output: output.map(Path::to_path_buf),
        epsg,
        ..Default::default()
    };
    convert_with(input, &options).map(|report| report.output)
}

/// Convert a marker export with explicit options, returning a full report.
pub fn convert_with(
    input: &Path,
    options: &ConvertOptions<'_>,
) -> Result<ConversionReport, GcpError> {
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(input));

    let document = read_marker_xml(input)?;
    let projection = projection::resolve(options.database, options.epsg);
    log::info!("using projection EPSG:{}", projection.identifier);

    let rows = write_gcp_txt(&output, &document, &projection.definition)?;

    let mut counts = count_records(&document);
    counts.rows = rows;

    log::info!(
        "wrote {} row(s) to {} ({} observation(s) skipped)",
        rows,
        output.display(),
        counts.dropped_unknown_marker + counts.dropped_unknown_camera
    );

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output,
        epsg: projection.identifier,
        projection: projection.definition,
        projection_warning: projection.warning.map(|w| {
            format!("could not convert requested EPSG code ({w}); used default projection")
        }),
        counts,
    })
}

/// Default output path for `input`: `foo.xml` becomes `foo_converted.txt`.
///
/// The `.xml` match is case-sensitive. Any other input gets `_converted.txt`
/// appended to its full file name.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let raw = input.as_os_str();
    let mut derived = match raw.to_str().and_then(|s| s.strip_suffix(INPUT_SUFFIX)) {
        Some(stem) => OsString::from(stem),
        None => raw.to_os_string(),
    };
    derived.push(OUTPUT_SUFFIX);
    PathBuf::from(derived)
}

fn count_records(document: &MarkerDocument) -> ConversionCounts {
    let mut counts = ConversionCounts {
        markers: document.markers.len(),
        cameras: document.cameras.len(),
        observations: document.observations.len(),
        ..Default::default()
    };

    for obs in &document.observations {
        if !document.markers.contains_key(&obs.marker_id) {
            counts.dropped_unknown_marker += 1;
        } else if !document.cameras.contains_key(&obs.camera_id) {
            counts.dropped_unknown_camera += 1;
        }
    }

    counts
}

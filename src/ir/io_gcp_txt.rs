//! GCP text writer.
//!
//! The output is a tab-separated UTF-8 file:
//!
//! ```text
//! <projection definition>\t
//! <X>\t<Y>\t<Z>\t<pixel x>\t<pixel y>\t<image label>
//! ...
//! ```
//!
//! World coordinates are written fixed-point with nine decimals, pixel
//! coordinates with six. One row is written per observation whose marker and
//! camera both resolve, in document order.
//!
//! # Atomic Output
//!
//! [`write_gcp_txt`] writes into a temporary file next to the destination and
//! renames it into place only once every row has been written, so a failed
//! conversion never leaves a truncated file behind. The file keeps the mode
//! of an existing destination; a new file gets the usual umask-derived mode.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::model::MarkerDocument;
use crate::error::GcpError;

/// Write the header and joined rows to `writer`, returning the row count.
pub fn write_gcp<W: Write>(
    writer: &mut W,
    document: &MarkerDocument,
    projection: &str,
) -> std::io::Result<usize> {
    writeln!(writer, "{projection}\t")?;

    let mut rows = 0;
    for (marker, camera, obs) in document.joined() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            Fixed(marker.x, 9),
            Fixed(marker.y, 9),
            Fixed(marker.z, 9),
            Fixed(obs.pixel_x, 6),
            Fixed(obs.pixel_y, 6),
            camera.label
        )?;
        rows += 1;
    }

    Ok(rows)
}

/// Fixed-point number with a set number of decimals. NaN is written as `nan`.
struct Fixed(f64, usize);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            f.write_str("nan")
        } else {
            write!(f, "{:.*}", self.1, self.0)
        }
    }
}

/// Serialize a document to a GCP text string.
pub fn to_gcp_string(document: &MarkerDocument, projection: &str) -> String {
    let mut out = Vec::new();
    write_gcp(&mut out, document, projection).expect("write to Vec");
    String::from_utf8(out).expect("GCP output is built from UTF-8 strings")
}

/// Write a GCP text file atomically, returning the number of rows written.
pub fn write_gcp_txt(
    path: &Path,
    document: &MarkerDocument,
    projection: &str,
) -> Result<usize, GcpError> {
    let write_err = |source: std::io::Error| GcpError::GcpWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".gcpconv-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Temp files default to 0600; 0666 is narrowed by the umask on open.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir).map_err(write_err)?;

    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            fs::set_permissions(tmp.path(), existing.permissions()).map_err(write_err)?;
        }
    }

    let mut writer = BufWriter::new(tmp);
    let rows = write_gcp(&mut writer, document, projection).map_err(write_err)?;
    let tmp = writer
        .into_inner()
        .map_err(|source| write_err(source.into_error()))?;

    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|source| write_err(source.error))?;

    Ok(rows)
}

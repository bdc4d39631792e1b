//! Conversion report types.
//!
//! Dropping observations with dangling references is expected behavior, not
//! an error, so the report records how many rows were dropped and why.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Summary of one marker-export conversion.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source marker XML.
    pub input: PathBuf,
    /// GCP text file that was written.
    pub output: PathBuf,
    /// EPSG code of the projection header.
    pub epsg: String,
    /// PROJ.4 definition written as the header.
    pub projection: String,
    /// Set when the requested code fell back to the default projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_warning: Option<String>,
    pub counts: ConversionCounts,
}

impl ConversionReport {
    /// Observations that were not written.
    pub fn dropped(&self) -> usize {
        self.counts.dropped_unknown_marker + self.counts.dropped_unknown_camera
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} -> {}",
            self.input.display(),
            self.output.display()
        )?;
        writeln!(f, "  projection: EPSG:{}", self.epsg)?;
        writeln!(
            f,
            "  {} markers, {} cameras, {} observations",
            self.counts.markers, self.counts.cameras, self.counts.observations
        )?;
        writeln!(f, "  {} rows written", self.counts.rows)?;

        if self.dropped() > 0 {
            writeln!(
                f,
                "  {} observation(s) skipped ({} unknown marker, {} unknown camera)",
                self.dropped(),
                self.counts.dropped_unknown_marker,
                self.counts.dropped_unknown_camera
            )?;
        }

        if let Some(warning) = &self.projection_warning {
            writeln!(f)?;
            writeln!(f, "Warning: {warning}")?;
        }

        Ok(())
    }
}

/// Counts of parsed records and written rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub markers: usize,
    pub cameras: usize,
    pub observations: usize,
    pub rows: usize,
    /// Observations whose marker id is not in the marker lookup.
    pub dropped_unknown_marker: usize,
    /// Observations with a known marker but an unknown camera id.
    pub dropped_unknown_camera: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_skipped_rows_and_warning() {
        let report = ConversionReport {
            input: PathBuf::from("in.xml"),
            output: PathBuf::from("in_converted.txt"),
            epsg: "28992".to_string(),
            projection: "+proj=sterea".to_string(),
            projection_warning: Some("EPSG:1 is not in the CRS database".to_string()),
            counts: ConversionCounts {
                markers: 2,
                cameras: 3,
                observations: 5,
                rows: 3,
                dropped_unknown_marker: 1,
                dropped_unknown_camera: 1,
            },
        };

        let text = report.to_string();
        assert!(text.contains("in.xml -> in_converted.txt"));
        assert!(text.contains("3 rows written"));
        assert!(text.contains("2 observation(s) skipped (1 unknown marker, 1 unknown camera)"));
        assert!(text.contains("Warning: EPSG:1 is not in the CRS database"));
    }

    #[test]
    fn json_omits_missing_warning() {
        let json = serde_json::to_string(&ConversionReport::default()).expect("serialize");
        assert!(!json.contains("projection_warning"));
        assert!(json.contains("\"rows\":0"));
    }
}

//! User-supplied CRS definition tables.
//!
//! A table is a CSV file with a `code,proj4` header:
//!
//! ```text
//! code,proj4
//! 28992,"+proj=sterea ... +towgs84=565.417,50.3319,465.552,-0.398957,0.343988,-1.8774,4.0725 +units=m +no_defs"
//! 32631,+proj=utm +zone=31 +datum=WGS84 +units=m +no_defs
//! ```
//!
//! Definitions containing commas (`+towgs84=`) must be quoted. Later rows
//! override earlier rows with the same code.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::{BuiltinDatabase, CrsDatabase, CrsLookupError};
use crate::error::GcpError;

#[derive(Debug, Deserialize)]
struct CrsRow {
    code: i64,
    proj4: String,
}

/// CRS definitions loaded from a CSV table.
#[derive(Clone, Debug, Default)]
pub struct TableDatabase {
    definitions: HashMap<i64, String>,
}

impl TableDatabase {
    /// Load a table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self, GcpError> {
        let file = File::open(path).map_err(GcpError::Io)?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Load a table from CSV text.
    pub fn from_csv_str(csv_str: &str) -> Result<Self, GcpError> {
        Self::from_reader(csv_str.as_bytes(), Path::new("<string>"))
    }

    fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self, GcpError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut definitions = HashMap::new();

        for result in csv_reader.deserialize() {
            let row: CrsRow = result.map_err(|source| GcpError::CrsTableParse {
                path: path.to_path_buf(),
                source,
            })?;

            if row.proj4.is_empty() {
                return Err(GcpError::CrsTableInvalid {
                    path: path.to_path_buf(),
                    message: format!("EPSG:{} has an empty proj4 definition", row.code),
                });
            }

            definitions.insert(row.code, row.proj4);
        }

        log::debug!(
            "loaded {} CRS definition(s) from {}",
            definitions.len(),
            path.display()
        );

        Ok(Self { definitions })
    }

    /// Number of definitions in the table.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the table holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl CrsDatabase for TableDatabase {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError> {
        self.definitions
            .get(&code)
            .cloned()
            .ok_or(CrsLookupError::UnknownCode(code))
    }
}

/// An optional user table consulted before the bundled definitions.
#[derive(Clone, Debug, Default)]
pub struct LayeredDatabase {
    table: Option<TableDatabase>,
    builtin: BuiltinDatabase,
}

impl LayeredDatabase {
    /// Layer `table` over the bundled definitions.
    pub fn new(table: Option<TableDatabase>) -> Self {
        Self {
            table,
            builtin: BuiltinDatabase,
        }
    }
}

impl CrsDatabase for LayeredDatabase {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError> {
        if let Some(definition) = self.table.as_ref().and_then(|t| t.proj4(code).ok()) {
            return Ok(definition);
        }
        self.builtin.proj4(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "code,proj4\n\
        32631, +proj=utm +zone=31 +datum=WGS84 +units=m +no_defs\n\
        900001,+proj=tmerc +lat_0=0 +lon_0=3 +k=1 +x_0=0 +y_0=0 +ellps=GRS80 +units=m +no_defs\n\
        900001,+proj=tmerc +lat_0=0 +lon_0=9 +k=1 +x_0=0 +y_0=0 +ellps=GRS80 +units=m +no_defs\n";

    #[test]
    fn table_lookup_trims_and_keeps_last_row() {
        let table = TableDatabase::from_csv_str(TABLE).expect("parse table");
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.proj4(32631).expect("known code"),
            "+proj=utm +zone=31 +datum=WGS84 +units=m +no_defs"
        );
        assert!(table.proj4(900001).expect("known code").contains("+lon_0=9"));
        assert_eq!(table.proj4(4326), Err(CrsLookupError::UnknownCode(4326)));
    }

    #[test]
    fn quoted_definition_keeps_commas() {
        let table = TableDatabase::from_csv_str(
            "code,proj4\n28992,\"+proj=sterea +towgs84=565.417,50.3319,465.552 +no_defs\"\n",
        )
        .expect("parse table");
        assert_eq!(
            table.proj4(28992).expect("known code"),
            "+proj=sterea +towgs84=565.417,50.3319,465.552 +no_defs"
        );
    }

    #[test]
    fn non_numeric_code_is_parse_error() {
        let err = TableDatabase::from_csv_str("code,proj4\nabc,+proj=longlat\n")
            .expect_err("bad code");
        assert!(matches!(err, GcpError::CrsTableParse { .. }));
    }

    #[test]
    fn empty_definition_is_invalid() {
        let err = TableDatabase::from_csv_str("code,proj4\n4326,\n").expect_err("empty proj4");
        assert!(matches!(err, GcpError::CrsTableInvalid { .. }));
    }

    #[test]
    fn layered_prefers_table_entries() {
        let table = TableDatabase::from_csv_str(TABLE).expect("parse table");
        let db = LayeredDatabase::new(Some(table));
        assert!(db.proj4(900001).expect("table code").starts_with("+proj=tmerc"));
    }

    #[cfg(feature = "builtin-crs")]
    #[test]
    fn layered_falls_through_to_builtin() {
        let db = LayeredDatabase::new(Some(TableDatabase::default()));
        assert!(db.proj4(4326).expect("bundled code").contains("+proj=longlat"));
    }

    #[test]
    fn missing_table_file_is_io_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let err = TableDatabase::from_path(&temp.path().join("crs.csv")).expect_err("missing");
        assert!(matches!(err, GcpError::Io(_)));
    }
}

//! EPSG definitions bundled at compile time.
//!
//! Backed by the `crs-definitions` crate when the `builtin-crs` feature is
//! enabled. Without it every lookup reports the database as unavailable and
//! resolution falls back to the default projection.

use super::{CrsDatabase, CrsLookupError};

/// The bundled EPSG table.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinDatabase;

#[cfg(feature = "builtin-crs")]
impl CrsDatabase for BuiltinDatabase {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError> {
        let epsg = u16::try_from(code).map_err(|_| CrsLookupError::InvalidCode(code))?;
        crs_definitions::from_code(epsg)
            .map(|def| def.proj4.trim())
            .filter(|proj4| !proj4.is_empty())
            .map(ToOwned::to_owned)
            .ok_or(CrsLookupError::UnknownCode(code))
    }
}

#[cfg(not(feature = "builtin-crs"))]
impl CrsDatabase for BuiltinDatabase {
    fn proj4(&self, _code: i64) -> Result<String, CrsLookupError> {
        Err(CrsLookupError::Unavailable(
            "gcpconv was built without the `builtin-crs` feature".to_string(),
        ))
    }
}

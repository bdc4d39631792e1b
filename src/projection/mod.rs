//! Projection header resolution.
//!
//! Every GCP file starts with a PROJ.4 definition string describing the
//! coordinate reference system the marker coordinates are nominally in.
//! [`resolve`] maps an optional EPSG code to that string through a
//! [`CrsDatabase`].
//!
//! # Fallback Policy
//!
//! Resolution never fails. Without a code, or when the database cannot
//! produce a definition for the code, the Amersfoort / RD New definition
//! ([`DEFAULT_PROJ4`], EPSG:28992) is used. A failed lookup is logged at
//! `warn` level and recorded on [`Projection::warning`] so callers can surface
//! it without aborting the conversion.

mod builtin;
mod table;

pub use builtin::BuiltinDatabase;
pub use table::{LayeredDatabase, TableDatabase};

use thiserror::Error;

/// EPSG code of the fallback projection.
pub const DEFAULT_EPSG: &str = "28992";

/// PROJ.4 definition of EPSG:28992 (Amersfoort / RD New), including the
/// seven-parameter datum shift to WGS84.
pub const DEFAULT_PROJ4: &str = "+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079 +x_0=155000 +y_0=463000 +ellps=bessel +towgs84=565.417,50.3319,465.552,-0.398957,0.343988,-1.8774,4.0725 +units=m +no_defs";

/// Why a CRS lookup produced no definition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CrsLookupError {
    #[error("EPSG:{0} is not in the CRS database")]
    UnknownCode(i64),

    #[error("{0} is not a valid EPSG code")]
    InvalidCode(i64),

    #[error("CRS database unavailable: {0}")]
    Unavailable(String),
}

/// A source of PROJ.4 definitions keyed by EPSG code.
///
/// Implementations must return the full definition with every defining
/// parameter (datum shift included), not an abbreviated form.
pub trait CrsDatabase: Send + Sync {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError>;
}

impl<T: CrsDatabase + ?Sized> CrsDatabase for &T {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError> {
        (**self).proj4(code)
    }
}

impl<T: CrsDatabase + ?Sized> CrsDatabase for Box<T> {
    fn proj4(&self, code: i64) -> Result<String, CrsLookupError> {
        (**self).proj4(code)
    }
}

/// A resolved projection header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    /// PROJ.4 definition written as the first line of the GCP file.
    pub definition: String,

    /// EPSG code the definition belongs to, as a string.
    pub identifier: String,

    /// Set when a requested code could not be resolved and the default was used.
    pub warning: Option<CrsLookupError>,
}

impl Projection {
    /// The EPSG:28992 fallback projection.
    pub fn default_rd_new() -> Self {
        Self {
            definition: DEFAULT_PROJ4.to_string(),
            identifier: DEFAULT_EPSG.to_string(),
            warning: None,
        }
    }

    /// Returns true if the requested code could not be resolved.
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Resolve an optional EPSG code into a projection header.
pub fn resolve<D: CrsDatabase + ?Sized>(db: &D, code: Option<i64>) -> Projection {
    let Some(code) = code else {
        return Projection::default_rd_new();
    };

    match db.proj4(code) {
        Ok(definition) => {
            log::debug!("resolved EPSG:{code} to '{definition}'");
            Projection {
                definition,
                identifier: code.to_string(),
                warning: None,
            }
        }
        Err(err) => {
            log::warn!("could not convert EPSG:{code} ({err}); using default projection EPSG:{DEFAULT_EPSG}");
            Projection {
                warning: Some(err),
                ..Projection::default_rd_new()
            }
        }
    }
}

//! landsat-tm: decoder for Landsat-5 Thematic Mapper products
//!
//! Reads FAST-L5 and CEOS products, plain or bundled in a zip archive:
//! header and geometry records, radiometric calibration and band rasters.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    GeoPoint, GeoPointId, GeometricData, Header, HeaderFile, Hemisphere, LandsatError, LandsatResult,
    LocationCode, ProductFormat,
};

pub use io::{ContainerClassifier, DestRegion, LandsatReader, Qualification, ReadStatus, ReaderParams, SourceRegion};
pub use crate::core::{BandCatalog, BandDescriptor, CalibrationParams, MapAnchor, RadiometricData, Representation};

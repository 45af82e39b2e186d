//! Radiometric and geometric interpretation of decoded headers

pub mod bands;
pub mod calibrate;
pub mod earth_sun;
pub mod geocoding;

// Re-export main types
pub use bands::{band_constants, nominal_radiance, BandCatalog, BandConstants, BandDescriptor, NominalRadiance, NominalRevision};
pub use calibrate::{CalibrationParams, GainFormula, RadianceRange, RadiometricBand, RadiometricCalibrator, RadiometricData, Representation};
pub use earth_sun::{earth_sun_distance, earth_sun_distance_on};
pub use geocoding::MapAnchor;

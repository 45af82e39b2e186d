use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of spectral/thermal bands a Thematic Mapper product can carry
pub const MAX_BAND_COUNT: usize = 7;

/// Index of the thermal infrared band
pub const THERMAL_BAND: u8 = 6;

/// Legacy product format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductFormat {
    /// FAST-L5 (EOSAT Fast Format, revision B) text/binary hybrid
    FastL5,
    /// CEOS volume with VDF_DAT / LEA_01.DAT / IMG_0n.DAT files
    Ceos,
    Unknown,
}

impl std::fmt::Display for ProductFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductFormat::FastL5 => write!(f, "FAST-L5"),
            ProductFormat::Ceos => write!(f, "CEOS"),
            ProductFormat::Unknown => write!(f, "unknown"),
        }
    }
}

/// Logical identity of a header file within a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderFile {
    /// The 1536-byte FAST-L5 header
    FastHeader,
    /// CEOS volume directory (`VDF_DAT`)
    VolumeDirectory,
    /// CEOS leader (`LEA_01.DAT`)
    Leader,
}

/// WRS location of a scene: `ppp/rrrffss`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCode {
    pub path: u16,
    pub row: u16,
    /// Row fraction (shift along track, in tenths of a scene)
    pub fraction: u8,
    /// Subscene identifier, blank for full scenes
    pub subscene: String,
}

/// Decoded product header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub format: ProductFormat,
    pub product_id: String,

    // Raster layout
    pub width: usize,
    pub height: usize,
    pub bytes_per_pixel: usize,
    /// Ground sampling distance in metres
    pub pixel_size: Option<f64>,
    pub record_length: usize,
    pub blocking_factor: usize,
    pub volume_number: Option<u32>,
    pub volume_count: Option<u32>,

    // Acquisition
    pub acquisition_raw: String,
    pub acquisition_date: Option<DateTime<Utc>>,
    pub earth_sun_distance: Option<f64>,

    // Identity
    pub satellite: String,
    pub instrument: String,
    pub instrument_mode: String,
    pub product_type: String,
    pub processing_type: String,
    pub resampling: String,
    pub revision: String,
    pub location: Option<LocationCode>,

    /// Present band indices in ascending order
    pub bands: Vec<u8>,
    /// Raw gain/Lmax text per present band, in band order
    pub radiometric_a: Vec<String>,
    /// Raw bias/Lmin text per present band, in band order
    pub radiometric_b: Vec<String>,
}

impl Header {
    /// Bytes in one image line of a band
    pub fn row_stride(&self) -> u64 {
        (self.width * self.bytes_per_pixel) as u64
    }

    pub fn has_band(&self, band: u8) -> bool {
        self.bands.contains(&band)
    }
}

/// Identity tag of a geo-point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoPointId {
    UpperLeft,
    UpperRight,
    LowerRight,
    LowerLeft,
    Center,
}

impl GeoPointId {
    pub const ALL: [GeoPointId; 5] = [
        GeoPointId::UpperLeft,
        GeoPointId::UpperRight,
        GeoPointId::LowerRight,
        GeoPointId::LowerLeft,
        GeoPointId::Center,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    North,
    South,
}

/// A named geodetic/map/pixel correspondence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub id: GeoPointId,
    /// Latitude as stored, e.g. `402000.0000N`
    pub latitude_raw: String,
    /// Longitude as stored, e.g. `0754321.1234W`
    pub longitude_raw: String,
    pub easting: Option<f64>,
    pub northing: Option<f64>,
    pub hemisphere: Hemisphere,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

impl GeoPoint {
    pub fn new(id: GeoPointId) -> Self {
        Self {
            id,
            latitude_raw: String::new(),
            longitude_raw: String::new(),
            easting: None,
            northing: None,
            hemisphere: Hemisphere::North,
            pixel_x: -1.0,
            pixel_y: -1.0,
        }
    }

    /// Latitude in decimal degrees, negative south of the equator
    pub fn latitude(&self) -> Option<f64> {
        crate::io::geodata::dms_to_degrees(&self.latitude_raw)
    }

    /// Longitude in decimal degrees, negative west of Greenwich
    pub fn longitude(&self) -> Option<f64> {
        crate::io::geodata::dms_to_degrees(&self.longitude_raw)
    }

    pub fn set_pixel(&mut self, x: f64, y: f64) {
        self.pixel_x = x;
        self.pixel_y = y;
    }

    pub fn has_pixel(&self) -> bool {
        self.pixel_x >= 0.0 && self.pixel_y >= 0.0
    }
}

/// Map projection and scene geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometricData {
    pub map_projection: String,
    pub ellipsoid: String,
    pub semi_major_axis: Option<f64>,
    pub semi_minor_axis: Option<f64>,
    pub map_zone: Option<i32>,
    pub usgs_projection_number: Option<i32>,
    /// Non-zero USGS projection parameters, at most 15
    pub projection_parameters: Vec<f64>,
    pub sun_elevation: Option<f64>,
    pub sun_azimuth: Option<f64>,
    pub look_angle: Option<f64>,
    pub horizontal_offset: Option<i32>,
    pub orientation_angle: Option<f64>,
    points: [GeoPoint; 5],
}

impl GeometricData {
    pub fn new() -> Self {
        Self {
            map_projection: String::new(),
            ellipsoid: String::new(),
            semi_major_axis: None,
            semi_minor_axis: None,
            map_zone: None,
            usgs_projection_number: None,
            projection_parameters: Vec::new(),
            sun_elevation: None,
            sun_azimuth: None,
            look_angle: None,
            horizontal_offset: None,
            orientation_angle: None,
            points: GeoPointId::ALL.map(GeoPoint::new),
        }
    }

    pub fn point(&self, id: GeoPointId) -> &GeoPoint {
        &self.points[id.slot()]
    }

    pub fn point_mut(&mut self, id: GeoPointId) -> &mut GeoPoint {
        &mut self.points[id.slot()]
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn center(&self) -> &GeoPoint {
        self.point(GeoPointId::Center)
    }
}

impl Default for GeometricData {
    fn default() -> Self {
        Self::new()
    }
}

/// Error types for Landsat product decoding
#[derive(Debug, thiserror::Error)]
pub enum LandsatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Field at offset {offset} with length {len} is outside source of {source_len} bytes")]
    OutOfRange {
        offset: u64,
        len: usize,
        source_len: u64,
    },

    #[error("Malformed number: '{value}'")]
    MalformedNumber { value: String },

    #[error("Malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Radiometric calibration unavailable")]
    CalibrationUnavailable,

    #[error("Invalid raster region: {0}")]
    InvalidRegion(String),

    #[error("Band {0} is not present in this product")]
    MissingBand(u8),
}

impl From<zip::result::ZipError> for LandsatError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => LandsatError::Io(e),
            other => LandsatError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, other)),
        }
    }
}

/// Result type for Landsat decoding operations
pub type LandsatResult<T> = Result<T, LandsatError>;

//! Fixed-offset tables for the FAST-L5 and CEOS header files
//!
//! All offsets are 1-based, as in the format documents.

use crate::types::{GeoPointId, HeaderFile, ProductFormat, MAX_BAND_COUNT};

/// Exact byte length of a FAST-L5 header file
pub const FAST_HEADER_SIZE: u64 = 1536;

/// Length of a CEOS volume descriptor record
pub const CEOS_VOLUME_DESCRIPTOR_SIZE: u64 = 360;

/// File name of the CEOS volume directory
pub const CEOS_VOLUME_DIRECTORY: &str = "VDF_DAT";

/// File name of the CEOS leader
pub const CEOS_LEADER: &str = "LEA_01.DAT";

/// A fixed-width field in one of the header files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub file: HeaderFile,
    pub offset: u64,
    pub len: usize,
}

const fn fast(offset: u64, len: usize) -> Field {
    Field { file: HeaderFile::FastHeader, offset, len }
}

const fn vdf(offset: u64, len: usize) -> Field {
    Field { file: HeaderFile::VolumeDirectory, offset, len }
}

const fn lea(offset: u64, len: usize) -> Field {
    Field { file: HeaderFile::Leader, offset, len }
}

/// Where satellite/instrument identity lives and what values are supported
#[derive(Debug, Clone, Copy)]
pub struct IdentityLayout {
    pub file: HeaderFile,
    /// Bytes read from the start of `file` when probing
    pub prefix_len: usize,
    pub satellite: Field,
    pub instrument: Field,
    pub supported_satellite: &'static str,
    pub supported_instrument: &'static str,
}

/// Geodetic and map coordinates of one geo-point
#[derive(Debug, Clone, Copy)]
pub struct PointLayout {
    pub longitude: Field,
    pub latitude: Field,
    pub easting: Field,
    pub northing: Field,
}

/// Offsets of the geometric record
#[derive(Debug, Clone, Copy)]
pub struct GeoLayout {
    pub map_projection: Field,
    pub ellipsoid: Field,
    pub semi_major_axis: Field,
    pub semi_minor_axis: Field,
    pub map_zone: Field,
    pub usgs_projection: Field,
    pub projection_parameters: Field,
    /// In [`GeoPointId::ALL`] order
    pub points: [PointLayout; 5],
    pub center_pixel: Field,
    pub center_line: Field,
    pub look_angle: Field,
    pub horizontal_offset: Field,
    pub orientation_angle: Field,
    pub sun_elevation: Field,
    pub sun_azimuth: Field,
}

impl GeoLayout {
    pub fn point(&self, id: GeoPointId) -> &PointLayout {
        &self.points[id.slot()]
    }
}

/// Offsets of every header field of one format
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    pub format: ProductFormat,
    pub identity: IdentityLayout,
    pub product_id: Field,
    pub location: Field,
    pub acquisition_date: Field,
    /// chrono pattern of the acquisition date
    pub date_pattern: &'static str,
    pub instrument_mode: Field,
    pub product_type: Field,
    pub processing_type: Field,
    pub resampling: Field,
    pub volume: Field,
    pub pixels_per_line: Field,
    pub lines_per_band: Field,
    pub blocking_factor: Field,
    pub record_length: Field,
    pub pixel_size: Field,
    pub bits_per_pixel: Field,
    pub bands_present: Field,
    pub revision: Field,
    /// Gain or Lmax of the n-th present band
    pub radiometric_a: [Field; MAX_BAND_COUNT],
    /// Bias or Lmin of the n-th present band
    pub radiometric_b: [Field; MAX_BAND_COUNT],
    pub geo: GeoLayout,
}

impl HeaderLayout {
    pub fn for_format(format: ProductFormat) -> Option<&'static HeaderLayout> {
        match format {
            ProductFormat::FastL5 => Some(&FAST_L5_LAYOUT),
            ProductFormat::Ceos => Some(&CEOS_LAYOUT),
            ProductFormat::Unknown => None,
        }
    }
}

const fn fast_point(lon: u64) -> PointLayout {
    PointLayout {
        longitude: fast(lon, 13),
        latitude: fast(lon + 14, 13),
        easting: fast(lon + 28, 13),
        northing: fast(lon + 42, 13),
    }
}

const fn fast_slots(first: u64) -> [Field; MAX_BAND_COUNT] {
    let mut slots = [fast(first, 12); MAX_BAND_COUNT];
    let mut i = 0;
    while i < MAX_BAND_COUNT {
        slots[i] = fast(first + 26 * i as u64, 12);
        i += 1;
    }
    slots
}

/// FAST-L5 header: administrative, radiometric and geometric records
pub static FAST_L5_LAYOUT: HeaderLayout = HeaderLayout {
    format: ProductFormat::FastL5,
    identity: IdentityLayout {
        file: HeaderFile::FastHeader,
        prefix_len: 512,
        satellite: fast(97, 10),
        instrument: fast(115, 10),
        supported_satellite: "LANDSAT5",
        supported_instrument: "TM",
    },
    product_id: fast(13, 20),
    location: fast(43, 17),
    acquisition_date: fast(78, 8),
    date_pattern: "%Y%m%d",
    instrument_mode: fast(138, 6),
    product_type: fast(176, 18),
    processing_type: fast(214, 11),
    resampling: fast(237, 2),
    volume: fast(258, 5),
    pixels_per_line: fast(280, 5),
    lines_per_band: fast(301, 5),
    blocking_factor: fast(323, 4),
    record_length: fast(342, 5),
    pixel_size: fast(359, 6),
    bits_per_pixel: fast(388, 2),
    bands_present: fast(405, 7),
    revision: fast(416, 2),
    radiometric_a: fast_slots(481),
    radiometric_b: fast_slots(468),
    geo: GeoLayout {
        map_projection: fast(668, 4),
        ellipsoid: fast(684, 18),
        semi_major_axis: fast(720, 12),
        semi_minor_axis: fast(750, 12),
        map_zone: fast(773, 3),
        usgs_projection: fast(798, 3),
        projection_parameters: fast(830, 255),
        points: [
            fast_point(1091),
            fast_point(1152),
            fast_point(1213),
            fast_point(1274),
            fast_point(1339),
        ],
        center_pixel: fast(1395, 6),
        center_line: fast(1402, 6),
        look_angle: fast(156, 6),
        horizontal_offset: fast(1417, 6),
        orientation_angle: fast(1443, 6),
        sun_elevation: fast(1471, 4),
        sun_azimuth: fast(1495, 5),
    },
};

const fn ceos_point(base: u64) -> PointLayout {
    PointLayout {
        longitude: lea(base, 16),
        latitude: lea(base + 16, 16),
        easting: lea(base + 32, 16),
        northing: lea(base + 48, 16),
    }
}

const fn ceos_slots(first: u64) -> [Field; MAX_BAND_COUNT] {
    let mut slots = [lea(first, 16); MAX_BAND_COUNT];
    let mut i = 0;
    while i < MAX_BAND_COUNT {
        slots[i] = lea(first + 32 * i as u64, 16);
        i += 1;
    }
    slots
}

/// CEOS: identity in the volume directory, everything else in the leader's
/// scene header (361), radiometric (1001) and map projection (1301) records
pub static CEOS_LAYOUT: HeaderLayout = HeaderLayout {
    format: ProductFormat::Ceos,
    identity: IdentityLayout {
        file: HeaderFile::VolumeDirectory,
        prefix_len: CEOS_VOLUME_DESCRIPTOR_SIZE as usize,
        satellite: vdf(61, 16),
        instrument: vdf(77, 8),
        supported_satellite: "LANDSAT-5",
        supported_instrument: "TM",
    },
    product_id: lea(373, 16),
    location: lea(405, 17),
    acquisition_date: lea(437, 8),
    date_pattern: "%Y%m%d",
    instrument_mode: lea(493, 8),
    product_type: lea(517, 16),
    processing_type: lea(533, 16),
    resampling: lea(549, 4),
    volume: lea(553, 5),
    pixels_per_line: lea(565, 8),
    lines_per_band: lea(573, 8),
    blocking_factor: lea(581, 4),
    record_length: lea(585, 8),
    pixel_size: lea(593, 8),
    bits_per_pixel: lea(601, 4),
    bands_present: lea(605, 7),
    revision: lea(613, 4),
    radiometric_a: ceos_slots(1029),
    radiometric_b: ceos_slots(1013),
    geo: GeoLayout {
        map_projection: lea(1313, 16),
        ellipsoid: lea(1329, 16),
        semi_major_axis: lea(1345, 16),
        semi_minor_axis: lea(1361, 16),
        map_zone: lea(1377, 4),
        usgs_projection: lea(1381, 4),
        projection_parameters: lea(1385, 255),
        points: [
            ceos_point(1641),
            ceos_point(1705),
            ceos_point(1769),
            ceos_point(1833),
            ceos_point(1897),
        ],
        center_pixel: lea(1961, 8),
        center_line: lea(1969, 8),
        look_angle: lea(1977, 8),
        horizontal_offset: lea(1985, 8),
        orientation_angle: lea(1993, 8),
        sun_elevation: lea(2001, 8),
        sun_azimuth: lea(2009, 8),
    },
};

use crate::io::header::{HeaderFields, HeaderSources};
use crate::io::layout::GeoLayout;
use crate::types::{GeoPointId, GeometricData, Hemisphere};
use regex::Regex;

/// Width of one USGS projection parameter token
const PROJECTION_PARAMETER_WIDTH: usize = 16;

/// Number of USGS projection parameters
const MAX_PROJECTION_PARAMETERS: usize = 15;

/// Extracts the geometric record: geo-points, projection and sun angles
pub struct GeoDataDecoder;

impl GeoDataDecoder {
    /// Decode everything but the center pixel position, which the caller
    /// sets once the image-space anchor is known
    pub fn decode(sources: &mut HeaderSources, layout: &GeoLayout) -> GeometricData {
        let mut fields = HeaderFields::new(sources);
        let mut geo = GeometricData::new();

        geo.map_projection = fields.soft_text(&layout.map_projection, "map_projection");
        geo.ellipsoid = fields.soft_text(&layout.ellipsoid, "ellipsoid");
        geo.semi_major_axis = fields.soft_number(&layout.semi_major_axis, "semi_major_axis");
        geo.semi_minor_axis = fields.soft_number(&layout.semi_minor_axis, "semi_minor_axis");
        geo.map_zone = fields.soft_number(&layout.map_zone, "map_zone");
        geo.usgs_projection_number = fields.soft_number(&layout.usgs_projection, "usgs_projection");
        geo.projection_parameters =
            parse_projection_parameters(&fields.soft_text(&layout.projection_parameters, "projection_parameters"));
        geo.sun_elevation = fields.soft_number(&layout.sun_elevation, "sun_elevation");
        geo.sun_azimuth = fields.soft_number(&layout.sun_azimuth, "sun_azimuth");
        geo.look_angle = fields.soft_number(&layout.look_angle, "look_angle");
        geo.horizontal_offset = fields.soft_number(&layout.horizontal_offset, "horizontal_offset");
        geo.orientation_angle = fields.soft_number(&layout.orientation_angle, "orientation_angle");

        for id in GeoPointId::ALL {
            let offsets = layout.point(id);
            let point = geo.point_mut(id);
            point.longitude_raw = fields.soft_text(&offsets.longitude, "longitude");
            point.latitude_raw = fields.soft_text(&offsets.latitude, "latitude");
            point.easting = fields.soft_number(&offsets.easting, "easting");
            point.northing = fields.soft_number(&offsets.northing, "northing");
            if point.latitude_raw.ends_with('S') {
                point.hemisphere = Hemisphere::South;
            }
        }

        log::debug!(
            "{} / {} zone {:?}, {} projection parameters",
            geo.map_projection,
            geo.ellipsoid,
            geo.map_zone,
            geo.projection_parameters.len()
        );
        geo
    }

    /// 0-based pixel/line of the scene center as recorded in the header
    pub fn center_pixel_hint(sources: &mut HeaderSources, layout: &GeoLayout) -> Option<(f64, f64)> {
        let mut fields = HeaderFields::new(sources);
        let pixel: f64 = fields.soft_number(&layout.center_pixel, "center_pixel")?;
        let line: f64 = fields.soft_number(&layout.center_line, "center_line")?;
        if pixel < 1.0 || line < 1.0 {
            return None;
        }
        Some((pixel - 1.0, line - 1.0))
    }
}

/// Decimal degrees from `DDMMSS.SSSSH` (latitude) or `DDDMMSS.SSSSH` (longitude)
pub fn dms_to_degrees(text: &str) -> Option<f64> {
    let pattern = Regex::new(r"^(\d{2,3})(\d{2})(\d{2}(?:\.\d*)?)([NSEW])$").ok()?;
    let caps = pattern.captures(text.trim())?;
    let degrees: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    match &caps[4] {
        "S" | "W" => Some(-value),
        _ => Some(value),
    }
}

/// Non-zero USGS projection parameters; tokens are cut to their field width
pub fn parse_projection_parameters(text: &str) -> Vec<f64> {
    text.split_whitespace()
        .filter_map(|token| {
            let token: String = token.chars().take(PROJECTION_PARAMETER_WIDTH).collect();
            match token.parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring projection parameter '{}'", token);
                    None
                }
            }
        })
        .filter(|value| *value != 0.0)
        .take(MAX_PROJECTION_PARAMETERS)
        .collect()
}

//! Map geocoding anchored at the scene center

use crate::types::{GeoPointId, GeometricData, Header, Hemisphere};
use serde::{Deserialize, Serialize};

/// Correspondence between raster pixels and map coordinates of a
/// map-oriented product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapAnchor {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub easting: f64,
    pub northing: f64,
    /// Metres per pixel along a line
    pub pixel_size_x: f64,
    /// Metres per pixel down the image
    pub pixel_size_y: f64,
    pub zone: Option<i32>,
    pub hemisphere: Hemisphere,
    pub projection: String,
    pub ellipsoid: String,
}

impl MapAnchor {
    /// Build the anchor from the center point, which must carry both map
    /// coordinates and a pixel position
    pub fn from_geometry(geo: &GeometricData, header: &Header) -> Option<Self> {
        let center = geo.center();
        if !center.has_pixel() {
            log::debug!("Center point has no pixel position, no map anchor");
            return None;
        }
        let (easting, northing) = (center.easting?, center.northing?);
        let (pixel_size_x, pixel_size_y) = match header.pixel_size.filter(|size| *size > 0.0) {
            Some(size) => (size, size),
            None => corner_pixel_size(geo, header)?,
        };

        Some(Self {
            pixel_x: center.pixel_x,
            pixel_y: center.pixel_y,
            easting,
            northing,
            pixel_size_x,
            pixel_size_y,
            zone: geo.map_zone,
            hemisphere: center.hemisphere,
            projection: geo.map_projection.clone(),
            ellipsoid: geo.ellipsoid.clone(),
        })
    }

    /// Map coordinates of a (sub)pixel position
    pub fn pixel_to_map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.easting + (x - self.pixel_x) * self.pixel_size_x,
            self.northing - (y - self.pixel_y) * self.pixel_size_y,
        )
    }

    /// Pixel position of map coordinates
    pub fn map_to_pixel(&self, easting: f64, northing: f64) -> (f64, f64) {
        (
            self.pixel_x + (easting - self.easting) / self.pixel_size_x,
            self.pixel_y - (northing - self.northing) / self.pixel_size_y,
        )
    }
}

fn corner_pixel_size(geo: &GeometricData, header: &Header) -> Option<(f64, f64)> {
    if header.width < 2 || header.height < 2 {
        return None;
    }
    let ul = geo.point(GeoPointId::UpperLeft);
    let ur = geo.point(GeoPointId::UpperRight);
    let ll = geo.point(GeoPointId::LowerLeft);
    let size_x = (ur.easting? - ul.easting?) / (header.width - 1) as f64;
    let size_y = (ul.northing? - ll.northing?) / (header.height - 1) as f64;
    if size_x > 0.0 && size_y > 0.0 {
        Some((size_x, size_y))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductFormat;
    use approx::assert_relative_eq;

    fn header(width: usize, height: usize, pixel_size: Option<f64>) -> Header {
        Header {
            format: ProductFormat::FastL5,
            product_id: "P1".to_string(),
            width,
            height,
            bytes_per_pixel: 1,
            pixel_size,
            record_length: width,
            blocking_factor: 1,
            volume_number: None,
            volume_count: None,
            acquisition_raw: String::new(),
            acquisition_date: None,
            earth_sun_distance: None,
            satellite: "LANDSAT5".to_string(),
            instrument: "TM".to_string(),
            instrument_mode: String::new(),
            product_type: String::new(),
            processing_type: String::new(),
            resampling: String::new(),
            revision: String::new(),
            location: None,
            bands: vec![1],
            radiometric_a: Vec::new(),
            radiometric_b: Vec::new(),
        }
    }

    fn geometry() -> GeometricData {
        let mut geo = GeometricData::new();
        geo.map_zone = Some(33);
        let corners = [
            (GeoPointId::UpperLeft, 300000.0, 5000000.0),
            (GeoPointId::UpperRight, 300270.0, 5000000.0),
            (GeoPointId::LowerLeft, 300000.0, 4999730.0),
        ];
        for (id, e, n) in corners {
            let point = geo.point_mut(id);
            point.easting = Some(e);
            point.northing = Some(n);
        }
        let center = geo.point_mut(GeoPointId::Center);
        center.easting = Some(300135.0);
        center.northing = Some(4999865.0);
        center.set_pixel(4.5, 4.5);
        geo
    }

    #[test]
    fn test_anchor_uses_header_pixel_size() {
        let anchor = MapAnchor::from_geometry(&geometry(), &header(10, 10, Some(30.0))).unwrap();
        assert_eq!(anchor.zone, Some(33));
        let (e, n) = anchor.pixel_to_map(0.0, 0.0);
        assert_relative_eq!(e, 300000.0);
        assert_relative_eq!(n, 5000000.0);
        let (x, y) = anchor.map_to_pixel(300270.0, 4999730.0);
        assert_relative_eq!(x, 9.0);
        assert_relative_eq!(y, 9.0);
    }

    #[test]
    fn test_anchor_falls_back_to_corner_spacing() {
        let anchor = MapAnchor::from_geometry(&geometry(), &header(10, 10, None)).unwrap();
        assert_relative_eq!(anchor.pixel_size_x, 30.0);
        assert_relative_eq!(anchor.pixel_size_y, 30.0);
    }

    #[test]
    fn test_no_anchor_without_center_pixel() {
        let mut geo = geometry();
        geo.point_mut(GeoPointId::Center).set_pixel(-1.0, -1.0);
        assert!(MapAnchor::from_geometry(&geo, &header(10, 10, Some(30.0))).is_none());
    }
}

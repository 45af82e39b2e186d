//! Synthetic Landsat-5 TM products for integration tests

#![allow(dead_code)]

use landsat_tm::core::bands::{nominal_radiance, NominalRevision};
use landsat_tm::io::layout::{Field, CEOS_LAYOUT, FAST_L5_LAYOUT};
use landsat_tm::types::GeoPointId;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::CompressionMethod;

pub const LEADER_SIZE: usize = 2048;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic sample value of a band pixel
pub fn pixel(band: u8, x: usize, y: usize, width: usize) -> u8 {
    ((band as usize * 31 + y * width + x) % 251) as u8
}

pub fn band_samples(band: u8, width: usize, height: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| pixel(band, x, y, width)))
        .collect()
}

/// Write `value` left-aligned into a blank-padded field
pub fn put(buffer: &mut [u8], field: &Field, value: &str) {
    let start = (field.offset - 1) as usize;
    let bytes = value.as_bytes();
    assert!(bytes.len() <= field.len, "'{}' does not fit {:?}", value, field);
    buffer[start..start + bytes.len()].copy_from_slice(bytes);
}

pub struct FastProduct {
    pub width: usize,
    pub height: usize,
    pub bands: Vec<u8>,
    pub satellite: String,
}

impl Default for FastProduct {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            bands: vec![1, 2, 3, 4, 5, 6, 7],
            satellite: "LANDSAT5".to_string(),
        }
    }
}

impl FastProduct {
    pub fn band_list(&self) -> String {
        self.bands.iter().map(|b| b.to_string()).collect()
    }

    /// 1536-byte header with nominal gain/bias radiometry and a UTM scene
    pub fn header(&self) -> Vec<u8> {
        let layout = &FAST_L5_LAYOUT;
        let geo = &layout.geo;
        let mut buffer = vec![b' '; 1536];

        put(&mut buffer, &layout.identity.satellite, &self.satellite);
        put(&mut buffer, &layout.identity.instrument, "TM");
        put(&mut buffer, &layout.product_id, "P193025950701");
        put(&mut buffer, &layout.location, "193/02503");
        put(&mut buffer, &layout.acquisition_date, "19950701");
        put(&mut buffer, &layout.instrument_mode, "THEMAT");
        put(&mut buffer, &layout.product_type, "MAP ORIENTED");
        put(&mut buffer, &layout.processing_type, "SYSTEMATIC");
        put(&mut buffer, &layout.resampling, "CC");
        put(&mut buffer, &layout.volume, "1/1");
        put(&mut buffer, &layout.pixels_per_line, &self.width.to_string());
        put(&mut buffer, &layout.lines_per_band, &self.height.to_string());
        put(&mut buffer, &layout.blocking_factor, "1");
        put(&mut buffer, &layout.record_length, &self.width.to_string());
        put(&mut buffer, &layout.pixel_size, "30.00");
        put(&mut buffer, &layout.bits_per_pixel, "8");
        put(&mut buffer, &layout.bands_present, &self.band_list());
        put(&mut buffer, &layout.revision, "B");

        for (slot, &band) in self.bands.iter().enumerate() {
            let nominal = nominal_radiance(band, NominalRevision::After2003).unwrap();
            put(&mut buffer, &layout.radiometric_a[slot], &format!("{:.6}", nominal.gain()));
            put(&mut buffer, &layout.radiometric_b[slot], &format!("{:.6}", nominal.lmin));
        }

        put(&mut buffer, &geo.map_projection, "UTM");
        put(&mut buffer, &geo.ellipsoid, "WGS84");
        put(&mut buffer, &geo.semi_major_axis, "6378137.000");
        put(&mut buffer, &geo.semi_minor_axis, "6356752.314");
        put(&mut buffer, &geo.map_zone, "33");
        put(&mut buffer, &geo.usgs_projection, "1");
        put(&mut buffer, &geo.projection_parameters, "6378137.000000 6356752.314200 0.000000 0.000000");

        let points = [
            (GeoPointId::UpperLeft, "402200.0000N", "0123000.0000E", 300000.0, 5000000.0),
            (GeoPointId::UpperRight, "402200.0000N", "0124000.0000E", 301170.0, 5000000.0),
            (GeoPointId::LowerRight, "402000.0000N", "0124000.0000E", 301170.0, 4999130.0),
            (GeoPointId::LowerLeft, "402000.0000N", "0123000.0000E", 300000.0, 4999130.0),
            (GeoPointId::Center, "402100.0000N", "0123500.0000E", 300600.0, 4999550.0),
        ];
        for (id, lat, lon, easting, northing) in points {
            let offsets = geo.point(id);
            put(&mut buffer, &offsets.latitude, lat);
            put(&mut buffer, &offsets.longitude, lon);
            put(&mut buffer, &offsets.easting, &format!("{:.1}", easting));
            put(&mut buffer, &offsets.northing, &format!("{:.1}", northing));
        }

        // 1-based scene center
        put(&mut buffer, &geo.center_pixel, "11");
        put(&mut buffer, &geo.center_line, "8");
        put(&mut buffer, &geo.orientation_angle, "0.0");
        put(&mut buffer, &geo.sun_elevation, "45.0");
        put(&mut buffer, &geo.sun_azimuth, "123.4");
        buffer
    }

    /// Header plus one `band{n}.dat` file per band, named in entry order
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        let mut files = vec![("header.dat".to_string(), self.header())];
        for &band in &self.bands {
            files.push((format!("band{}.dat", band), band_samples(band, self.width, self.height)));
        }
        files
    }

    pub fn write_dir(&self, dir: &Path) -> PathBuf {
        write_files(dir, &self.files());
        dir.join("header.dat")
    }
}

pub struct CeosProduct {
    pub width: usize,
    pub height: usize,
    pub bands: Vec<u8>,
    pub record_length: usize,
}

impl Default for CeosProduct {
    fn default() -> Self {
        Self {
            width: 24,
            height: 18,
            bands: vec![1, 2, 3, 4, 5, 6, 7],
            record_length: 64,
        }
    }
}

impl CeosProduct {
    pub fn volume_directory(&self) -> Vec<u8> {
        let mut buffer = vec![b' '; 360];
        put(&mut buffer, &CEOS_LAYOUT.identity.satellite, "LANDSAT-5");
        put(&mut buffer, &CEOS_LAYOUT.identity.instrument, "TM");
        buffer
    }

    /// Leader with nominal Lmin/Lmax radiometry and no center pixel hint
    pub fn leader(&self) -> Vec<u8> {
        let layout = &CEOS_LAYOUT;
        let mut buffer = vec![b' '; LEADER_SIZE];
        put(&mut buffer, &layout.product_id, "C044034880312");
        put(&mut buffer, &layout.location, "44/034");
        put(&mut buffer, &layout.acquisition_date, "19880312");
        put(&mut buffer, &layout.pixels_per_line, &self.width.to_string());
        put(&mut buffer, &layout.lines_per_band, &self.height.to_string());
        put(&mut buffer, &layout.record_length, &self.record_length.to_string());
        put(&mut buffer, &layout.bits_per_pixel, "8");
        put(&mut buffer, &layout.bands_present, &self.bands.iter().map(|b| b.to_string()).collect::<String>());

        for (slot, &band) in self.bands.iter().enumerate() {
            let nominal = nominal_radiance(band, NominalRevision::After2003).unwrap();
            put(&mut buffer, &layout.radiometric_a[slot], &format!("{:.4}", nominal.lmax));
            put(&mut buffer, &layout.radiometric_b[slot], &format!("{:.4}", nominal.lmin));
        }

        put(&mut buffer, &layout.geo.map_projection, "SOM");
        put(&mut buffer, &layout.geo.sun_elevation, "38.5");
        buffer
    }

    /// Image file: one descriptor record, then the band raster
    pub fn image(&self, band: u8) -> Vec<u8> {
        let mut bytes = vec![0xEE; self.record_length];
        bytes.extend(band_samples(band, self.width, self.height));
        bytes
    }

    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        let mut files = vec![
            ("VDF_DAT".to_string(), self.volume_directory()),
            ("LEA_01.DAT".to_string(), self.leader()),
        ];
        for &band in &self.bands {
            files.push((format!("IMG_0{}.DAT", band), self.image(band)));
        }
        files
    }

    pub fn write_dir(&self, dir: &Path) -> PathBuf {
        write_files(dir, &self.files());
        dir.join("VDF_DAT")
    }
}

pub fn write_files(dir: &Path, files: &[(String, Vec<u8>)]) {
    for (name, bytes) in files {
        std::fs::write(dir.join(name), bytes).unwrap();
    }
}

/// Zip the files in order; entry names get an optional folder prefix
pub fn write_zip(path: &Path, files: &[(String, Vec<u8>)], method: CompressionMethod, folder: Option<&str>) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(method);
    for (name, bytes) in files {
        let entry = match folder {
            Some(folder) => format!("{}/{}", folder, name),
            None => name.clone(),
        };
        zip.start_file(entry, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

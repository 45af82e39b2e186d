use crate::core::bands::BandCatalog;
use crate::core::calibrate::{CalibrationParams, RadiometricCalibrator, RadiometricData};
use crate::core::geocoding::MapAnchor;
use crate::io::band_reader::{DestRegion, PixelBandReader, PixelStream, ReadStatus, SourceRegion};
use crate::io::container::{ContainerClassifier, DataSource, ProductLocation};
use crate::io::geodata::GeoDataDecoder;
use crate::io::header::HeaderDecoder;
use crate::io::layout::HeaderLayout;
use crate::types::{GeoPointId, GeometricData, Header, LandsatError, LandsatResult, ProductFormat};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use zip::CompressionMethod;

/// Session options
#[derive(Debug, Clone)]
pub struct ReaderParams {
    pub calibration: CalibrationParams,
    /// Directory for compressed archive entries extracted on first read
    pub temp_dir: Option<PathBuf>,
    /// Anchor the center point at the header's center pixel/line when it parses
    pub use_center_pixel_hint: bool,
}

impl Default for ReaderParams {
    fn default() -> Self {
        Self {
            calibration: CalibrationParams::default(),
            temp_dir: None,
            use_center_pixel_hint: true,
        }
    }
}

/// Decode session over one Landsat-5 TM product
pub struct LandsatReader {
    path: PathBuf,
    params: ReaderParams,
    location: ProductLocation,
    header: Header,
    geometry: GeometricData,
    radiometry: RadiometricData,
    catalog: BandCatalog,
    map_anchor: Option<MapAnchor>,
    band_sources: BTreeMap<u8, DataSource>,
    /// Compressed archive entries already extracted, by entry name
    extracted: HashMap<String, File>,
}

impl LandsatReader {
    /// Open a product from a header file, a product directory or a zip archive
    pub fn open<P: AsRef<Path>>(path: P) -> LandsatResult<Self> {
        Self::open_with_params(path, ReaderParams::default())
    }

    pub fn open_with_params<P: AsRef<Path>>(path: P, params: ReaderParams) -> LandsatResult<Self> {
        let path = path.as_ref();
        let classification = ContainerClassifier::classify(path)?;
        if !classification.is_supported() {
            return Err(LandsatError::UnsupportedFormat(format!(
                "{}: satellite '{}' instrument '{}' in {} product",
                path.display(),
                classification.satellite,
                classification.instrument,
                classification.format
            )));
        }

        let format = classification.format;
        let location = classification.location;
        let mut header_sources = classification.header_sources;
        let layout = HeaderLayout::for_format(format)
            .ok_or_else(|| LandsatError::UnsupportedFormat(format!("no layout for {} products", format)))?;

        let header = HeaderDecoder::decode(&mut header_sources, layout)?;
        if header.bands.is_empty() {
            return Err(LandsatError::MalformedField {
                field: "bands_present",
                reason: "product lists no valid bands".to_string(),
            });
        }

        let mut geometry = GeoDataDecoder::decode(&mut header_sources, &layout.geo);
        let hint = if params.use_center_pixel_hint {
            GeoDataDecoder::center_pixel_hint(&mut header_sources, &layout.geo)
                .filter(|&(x, y)| x < header.width as f64 && y < header.height as f64)
        } else {
            None
        };
        let (center_x, center_y) = hint.unwrap_or(((header.width / 2) as f64, (header.height / 2) as f64));
        geometry.point_mut(GeoPointId::Center).set_pixel(center_x, center_y);

        let calibrator = RadiometricCalibrator::new(params.calibration.clone());
        let radiometry = calibrator.calibrate_fields(&header.radiometric_a, &header.radiometric_b, &header.bands);
        if !radiometry.is_available() {
            log::warn!("{}: radiometric calibration unavailable", path.display());
        }
        let catalog = BandCatalog::new(&header.bands, &radiometry);
        let map_anchor = MapAnchor::from_geometry(&geometry, &header);

        let band_sources = locate_bands(&location, &header)?;

        log::info!(
            "Opened {} product {} ({} x {}, bands {:?}, calibration {:?})",
            format,
            path.display(),
            header.width,
            header.height,
            header.bands,
            radiometry.representation()
        );

        Ok(Self {
            path: path.to_path_buf(),
            params,
            location,
            header,
            geometry,
            radiometry,
            catalog,
            map_anchor,
            band_sources,
            extracted: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ProductFormat {
        self.header.format
    }

    pub fn is_zipped(&self) -> bool {
        self.location.is_archive()
    }

    pub fn params(&self) -> &ReaderParams {
        &self.params
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn geometry(&self) -> &GeometricData {
        &self.geometry
    }

    pub fn radiometry(&self) -> &RadiometricData {
        &self.radiometry
    }

    pub fn bands(&self) -> &BandCatalog {
        &self.catalog
    }

    pub fn map_anchor(&self) -> Option<&MapAnchor> {
        self.map_anchor.as_ref()
    }

    pub fn band_source(&self, band: u8) -> Option<&DataSource> {
        self.band_sources.get(&band)
    }

    /// Copy strided samples of `band` into `buffer`, one byte per pixel
    pub fn read_band_data(
        &mut self,
        band: u8,
        source: &SourceRegion,
        dest: &DestRegion,
        buffer: &mut [u8],
        cancel: &AtomicBool,
    ) -> LandsatResult<ReadStatus> {
        if !self.header.has_band(band) {
            return Err(LandsatError::MissingBand(band));
        }
        let data_source = self.band_sources.get(&band).cloned().ok_or_else(|| {
            LandsatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No image file for band {} in {}", band, self.path.display()),
            ))
        })?;
        let (width, height, bpp) = (self.header.width, self.header.height, self.header.bytes_per_pixel);

        match data_source {
            DataSource::PlainFile { path, offset } => {
                let file = File::open(&path)?;
                let mut stream = PixelStream::new(BufReader::new(file), width, height, bpp, offset);
                PixelBandReader::read(&mut stream, source, dest, buffer, cancel)
            }
            DataSource::ArchiveEntry { entry_name, offset } => match self.stored_entry_start(&entry_name)? {
                Some(data_start) => {
                    let file = File::open(self.archive_path()?)?;
                    let mut stream = PixelStream::new(BufReader::new(file), width, height, bpp, data_start + offset);
                    PixelBandReader::read(&mut stream, source, dest, buffer, cancel)
                }
                None => {
                    let file = self.extracted_entry(&entry_name)?;
                    let mut stream = PixelStream::new(BufReader::new(file), width, height, bpp, offset);
                    PixelBandReader::read(&mut stream, source, dest, buffer, cancel)
                }
            },
        }
    }

    /// The whole band at full resolution
    pub fn read_band_raster(&mut self, band: u8) -> LandsatResult<Array2<u8>> {
        let (width, height) = (self.header.width, self.header.height);
        let dest = DestRegion { offset_x: 0, offset_y: 0, width, height };
        let mut buffer = vec![0u8; dest.len()];
        let cancel = AtomicBool::new(false);
        self.read_band_data(band, &SourceRegion::full(width, height), &dest, &mut buffer, &cancel)?;
        Array2::from_shape_vec((height, width), buffer).map_err(|e| LandsatError::InvalidRegion(e.to_string()))
    }

    fn archive_path(&self) -> LandsatResult<&Path> {
        match &self.location {
            ProductLocation::Archive { path, .. } => Ok(path),
            ProductLocation::Directory(_) => Err(LandsatError::UnsupportedFormat(
                "archive entry in a directory product".to_string(),
            )),
        }
    }

    /// Position of an uncompressed entry's data in the archive file
    fn stored_entry_start(&mut self, entry_name: &str) -> LandsatResult<Option<u64>> {
        let archive = match &mut self.location {
            ProductLocation::Archive { archive, .. } => archive,
            ProductLocation::Directory(_) => return Ok(None),
        };
        let entry = archive.by_name(entry_name)?;
        if entry.compression() == CompressionMethod::Stored {
            Ok(Some(entry.data_start()))
        } else {
            Ok(None)
        }
    }

    /// Extract a compressed entry to a temporary file once per session
    fn extracted_entry(&mut self, entry_name: &str) -> LandsatResult<&mut File> {
        if !self.extracted.contains_key(entry_name) {
            let archive = match &mut self.location {
                ProductLocation::Archive { archive, .. } => archive,
                ProductLocation::Directory(_) => {
                    return Err(LandsatError::UnsupportedFormat(
                        "archive entry in a directory product".to_string(),
                    ))
                }
            };
            let mut entry = archive.by_name(entry_name)?;
            let mut file = match &self.params.temp_dir {
                Some(dir) => tempfile::tempfile_in(dir)?,
                None => tempfile::tempfile()?,
            };
            let copied = std::io::copy(&mut entry, &mut file)?;
            log::debug!("Extracted {} ({} bytes) to a temporary file", entry_name, copied);
            drop(entry);
            self.extracted.insert(entry_name.to_string(), file);
        }
        self.extracted.get_mut(entry_name).ok_or_else(|| {
            LandsatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Entry {} was not extracted", entry_name),
            ))
        })
    }
}

/// Image source of every present band
fn locate_bands(location: &ProductLocation, header: &Header) -> LandsatResult<BTreeMap<u8, DataSource>> {
    let mut sources = BTreeMap::new();
    for &band in &header.bands {
        let found = match header.format {
            ProductFormat::Ceos => {
                let name = format!("IMG_0{}.DAT", band);
                location
                    .find_file(|candidate| candidate.eq_ignore_ascii_case(&name))?
                    .map(|source| source.with_offset(header.record_length as u64))
            }
            _ => location.find_file(|candidate| is_fast_band_file(candidate, band))?,
        };
        match found {
            Some(source) => {
                log::debug!("Band {} at {:?}", band, source);
                sources.insert(band, source);
            }
            None => log::warn!("No image file found for band {}", band),
        }
    }
    Ok(sources)
}

/// `band{n}.dat` or `*_b{n}0.dat`, case-insensitive
fn is_fast_band_file(name: &str, band: u8) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == format!("band{}.dat", band) || lower.ends_with(&format!("_b{}0.dat", band))
}

use crate::core::earth_sun::earth_sun_distance_on;
use crate::io::field::{parse_number, ByteSource, FieldDecoder};
use crate::io::layout::{Field, HeaderLayout};
use crate::types::{Header, HeaderFile, LandsatError, LandsatResult, LocationCode, MAX_BAND_COUNT};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;

/// Opened header files of one product, keyed by their logical identity
pub type HeaderSources = HashMap<HeaderFile, ByteSource>;

/// Field access across the header files of a product
pub struct HeaderFields<'a> {
    sources: &'a mut HeaderSources,
}

impl<'a> HeaderFields<'a> {
    pub fn new(sources: &'a mut HeaderSources) -> Self {
        Self { sources }
    }

    pub fn text(&mut self, field: &Field) -> LandsatResult<String> {
        let source = self.sources.get_mut(&field.file).ok_or_else(|| {
            LandsatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Header file {:?} is not open", field.file),
            ))
        })?;
        FieldDecoder::new(source).read_string(field.offset, field.len)
    }

    pub fn trimmed(&mut self, field: &Field) -> LandsatResult<String> {
        Ok(self.text(field)?.trim().to_string())
    }

    pub fn number<T: FromStr>(&mut self, field: &Field) -> LandsatResult<T> {
        let text = self.trimmed(field)?;
        parse_number(&text)
    }

    /// Trimmed text, or empty with a warning when the field cannot be read
    pub fn soft_text(&mut self, field: &Field, name: &str) -> String {
        self.trimmed(field).unwrap_or_else(|e| {
            log::warn!("Cannot read {}: {}", name, e);
            String::new()
        })
    }

    /// Parsed value, or `None` when the field is blank or malformed
    pub fn soft_number<T: FromStr>(&mut self, field: &Field, name: &str) -> Option<T> {
        match self.trimmed(field) {
            Ok(text) if text.is_empty() => None,
            Ok(text) => match parse_number(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Ignoring {}: {}", name, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {}", name, e);
                None
            }
        }
    }

    fn mandatory<T: FromStr>(&mut self, field: &Field, name: &'static str) -> LandsatResult<T> {
        self.number(field).map_err(|e| LandsatError::MalformedField {
            field: name,
            reason: e.to_string(),
        })
    }
}

/// Populates a [`Header`] from a format's offset table
pub struct HeaderDecoder;

impl HeaderDecoder {
    pub fn decode(sources: &mut HeaderSources, layout: &HeaderLayout) -> LandsatResult<Header> {
        let mut fields = HeaderFields::new(sources);

        let width: usize = fields.mandatory(&layout.pixels_per_line, "pixels_per_line")?;
        let height: usize = fields.mandatory(&layout.lines_per_band, "lines_per_band")?;
        let record_length: usize = fields.mandatory(&layout.record_length, "record_length")?;
        if width == 0 || height == 0 {
            return Err(LandsatError::MalformedField {
                field: "image_dimensions",
                reason: format!("{} x {} is not a valid image size", width, height),
            });
        }
        log::debug!("Image {} x {}, record length {}", width, height, record_length);

        let bits: u32 = fields.soft_number(&layout.bits_per_pixel, "bits_per_pixel").unwrap_or(8);
        let bytes_per_pixel = (bits.max(1) as usize + 7) / 8;

        let (volume_number, volume_count) = parse_volume(&fields.soft_text(&layout.volume, "volume"));

        let acquisition_raw = fields.soft_text(&layout.acquisition_date, "acquisition_date");
        let acquisition_date = parse_date(&acquisition_raw, layout.date_pattern);
        let earth_sun_distance = acquisition_date.as_ref().map(earth_sun_distance_on);

        let location_text = fields.soft_text(&layout.location, "location");
        let location = parse_location(&location_text);
        if location.is_none() && !location_text.is_empty() {
            log::warn!("Unrecognized location code '{}'", location_text);
        }

        let bands = parse_band_presence(&fields.soft_text(&layout.bands_present, "bands_present"));

        let mut radiometric_a = Vec::with_capacity(bands.len());
        let mut radiometric_b = Vec::with_capacity(bands.len());
        for slot in 0..bands.len() {
            radiometric_a.push(fields.soft_text(&layout.radiometric_a[slot], "radiometric field A"));
            radiometric_b.push(fields.soft_text(&layout.radiometric_b[slot], "radiometric field B"));
        }

        let header = Header {
            format: layout.format,
            product_id: fields.soft_text(&layout.product_id, "product_id"),
            width,
            height,
            bytes_per_pixel,
            pixel_size: fields.soft_number(&layout.pixel_size, "pixel_size"),
            record_length,
            blocking_factor: fields.soft_number(&layout.blocking_factor, "blocking_factor").unwrap_or(1),
            volume_number,
            volume_count,
            acquisition_raw,
            acquisition_date,
            earth_sun_distance,
            satellite: fields.soft_text(&layout.identity.satellite, "satellite"),
            instrument: fields.soft_text(&layout.identity.instrument, "instrument"),
            instrument_mode: fields.soft_text(&layout.instrument_mode, "instrument_mode"),
            product_type: fields.soft_text(&layout.product_type, "product_type"),
            processing_type: fields.soft_text(&layout.processing_type, "processing_type"),
            resampling: fields.soft_text(&layout.resampling, "resampling"),
            revision: fields.soft_text(&layout.revision, "revision"),
            location,
            bands,
            radiometric_a,
            radiometric_b,
        };

        log::info!(
            "Decoded {} header of {}: bands {:?}, acquired {}",
            header.format,
            header.product_id,
            header.bands,
            header.acquisition_raw
        );
        Ok(header)
    }
}

/// Present bands from a string of single digits, e.g. `1234567`.
///
/// Anything that is not a list of at most seven band digits yields an empty list.
pub fn parse_band_presence(text: &str) -> Vec<u8> {
    let text = text.trim();
    if text.chars().count() > MAX_BAND_COUNT {
        log::warn!("Band presence field '{}' lists more than {} bands", text, MAX_BAND_COUNT);
        return Vec::new();
    }
    let mut bands = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c.to_digit(10) {
            Some(digit @ 1..=7) => bands.push(digit as u8),
            _ => {
                log::warn!("Band presence field '{}' contains invalid band '{}'", text, c);
                return Vec::new();
            }
        }
    }
    bands.sort_unstable();
    bands.dedup();
    bands
}

/// Acquisition date at midnight UTC
pub fn parse_date(text: &str, pattern: &str) -> Option<DateTime<Utc>> {
    let date = match NaiveDate::parse_from_str(text.trim(), pattern) {
        Ok(date) => date,
        Err(e) => {
            log::warn!("Could not parse acquisition date '{}': {}", text, e);
            return None;
        }
    };
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// WRS location `ppp/rrrffss`
pub fn parse_location(text: &str) -> Option<LocationCode> {
    let pattern = Regex::new(r"^(\d{1,3})/(\d{3})(\d{2})?\s*(\S*)$").ok()?;
    let caps = pattern.captures(text.trim())?;
    Some(LocationCode {
        path: caps[1].parse().ok()?,
        row: caps[2].parse().ok()?,
        fraction: caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?,
        subscene: caps.get(4).map_or(String::new(), |m| m.as_str().to_string()),
    })
}

/// Volume `n/m` of a multi-volume set
fn parse_volume(text: &str) -> (Option<u32>, Option<u32>) {
    let mut parts = text.split('/');
    let number = parts.next().and_then(|p| p.trim().parse().ok());
    let count = parts.next().and_then(|p| p.trim().parse().ok());
    (number, count)
}

//! Thematic Mapper band constants and the per-product band catalog

use crate::core::calibrate::{RadianceRange, RadiometricData};
use crate::types::{LandsatError, LandsatResult, THERMAL_BAND};
use serde::Serialize;

/// Static physical constants of one TM band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandConstants {
    pub index: u8,
    /// Central wavelength in nm
    pub wavelength: f64,
    /// Spectral bandwidth in nm
    pub bandwidth: f64,
    /// Ground resolution in metres
    pub resolution: f64,
    /// Mean exoatmospheric solar irradiance in W/(m² µm); none for the thermal band
    pub solar_flux: Option<f64>,
    pub description: &'static str,
}

const BAND_CONSTANTS: [BandConstants; 7] = [
    BandConstants { index: 1, wavelength: 485.0, bandwidth: 66.0, resolution: 30.0, solar_flux: Some(1983.0), description: "Visible blue" },
    BandConstants { index: 2, wavelength: 569.0, bandwidth: 81.0, resolution: 30.0, solar_flux: Some(1796.0), description: "Visible green" },
    BandConstants { index: 3, wavelength: 660.0, bandwidth: 67.0, resolution: 30.0, solar_flux: Some(1536.0), description: "Visible red" },
    BandConstants { index: 4, wavelength: 840.0, bandwidth: 128.0, resolution: 30.0, solar_flux: Some(1031.0), description: "Near infrared" },
    BandConstants { index: 5, wavelength: 1676.0, bandwidth: 217.0, resolution: 30.0, solar_flux: Some(220.0), description: "Shortwave infrared" },
    BandConstants { index: 6, wavelength: 11435.0, bandwidth: 2100.0, resolution: 120.0, solar_flux: None, description: "Thermal infrared" },
    BandConstants { index: 7, wavelength: 2223.0, bandwidth: 252.0, resolution: 30.0, solar_flux: Some(83.44), description: "Shortwave infrared" },
];

/// Constants for band `index` (1..=7)
pub fn band_constants(index: u8) -> Option<&'static BandConstants> {
    BAND_CONSTANTS.get(usize::from(index).checked_sub(1)?)
}

/// Revision of the published nominal radiance table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NominalRevision {
    /// Products processed up to 4 May 2003
    Before2003,
    /// Products processed from 5 May 2003
    After2003,
}

/// Nominal post-calibration dynamic range in W/(m² sr µm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NominalRadiance {
    pub lmin: f64,
    pub lmax: f64,
}

impl NominalRadiance {
    pub fn gain(&self) -> f64 {
        (self.lmax - self.lmin) / 255.0
    }

    pub fn bias(&self) -> f64 {
        self.lmin
    }
}

const fn nominal_range(lmin: f64, lmax: f64) -> NominalRadiance {
    NominalRadiance { lmin, lmax }
}

const NOMINAL_BEFORE_2003: [NominalRadiance; 7] = [
    nominal_range(-1.52, 152.10),
    nominal_range(-2.84, 296.81),
    nominal_range(-1.17, 204.30),
    nominal_range(-1.51, 206.20),
    nominal_range(-0.37, 27.19),
    nominal_range(1.2378, 15.303),
    nominal_range(-0.15, 14.38),
];

const NOMINAL_AFTER_2003: [NominalRadiance; 7] = [
    nominal_range(-1.5, 193.0),
    nominal_range(-2.8, 365.0),
    nominal_range(-1.2, 264.0),
    nominal_range(-1.5, 221.0),
    nominal_range(-0.37, 30.2),
    nominal_range(1.2378, 15.303),
    nominal_range(-0.15, 16.5),
];

/// Nominal range of band `index` in the given table revision
pub fn nominal_radiance(index: u8, revision: NominalRevision) -> Option<NominalRadiance> {
    let table = match revision {
        NominalRevision::Before2003 => &NOMINAL_BEFORE_2003,
        NominalRevision::After2003 => &NOMINAL_AFTER_2003,
    };
    table.get(usize::from(index).checked_sub(1)?).copied()
}

/// Everything known about one present band
#[derive(Debug, Clone, Serialize)]
pub struct BandDescriptor {
    pub constants: BandConstants,
    pub radiance: Option<RadianceRange>,
}

impl BandDescriptor {
    pub fn index(&self) -> u8 {
        self.constants.index
    }

    pub fn name(&self) -> String {
        format!("radiance_{}", self.constants.index)
    }

    pub fn is_thermal(&self) -> bool {
        self.constants.index == THERMAL_BAND
    }

    /// Radiance per digital number: (max - min) / 255
    pub fn gain(&self) -> LandsatResult<f64> {
        self.radiance
            .map(|r| (r.max - r.min) / 255.0)
            .ok_or(LandsatError::CalibrationUnavailable)
    }

    /// Radiance at digital number zero
    pub fn bias(&self) -> LandsatResult<f64> {
        self.radiance
            .map(|r| r.min)
            .ok_or(LandsatError::CalibrationUnavailable)
    }

    /// Convert a digital number to radiance
    pub fn to_radiance(&self, dn: u8) -> LandsatResult<f64> {
        Ok(self.gain()? * f64::from(dn) + self.bias()?)
    }

    pub fn nominal(&self, revision: NominalRevision) -> Option<NominalRadiance> {
        nominal_radiance(self.constants.index, revision)
    }
}

/// Descriptors of the present bands of one product
#[derive(Debug, Clone, Serialize)]
pub struct BandCatalog {
    bands: Vec<BandDescriptor>,
}

impl BandCatalog {
    /// Join the static constants of every present band with its calibration
    pub fn new(present: &[u8], radiometry: &RadiometricData) -> Self {
        let bands = present
            .iter()
            .filter_map(|&index| {
                let constants = match band_constants(index) {
                    Some(constants) => *constants,
                    None => {
                        log::warn!("Ignoring unknown band index {}", index);
                        return None;
                    }
                };
                Some(BandDescriptor {
                    constants,
                    radiance: radiometry.band(index).and_then(|band| band.radiance),
                })
            })
            .collect();
        Self { bands }
    }

    pub fn get(&self, index: u8) -> Option<&BandDescriptor> {
        self.bands.iter().find(|band| band.index() == index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BandDescriptor> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

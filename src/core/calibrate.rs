use crate::core::bands::{band_constants, nominal_radiance, NominalRevision};
use crate::io::field::parse_number;
use crate::types::{LandsatError, LandsatResult, THERMAL_BAND};
use serde::{Deserialize, Serialize};

/// How Lmax is derived from a recorded gain and Lmin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainFormula {
    /// Products processed before 1990
    Before1990,
    /// Products processed from 1990
    After1990,
}

impl GainFormula {
    pub fn lmax(self, gain: f64, lmin: f64) -> f64 {
        match self {
            GainFormula::Before1990 => gain * 254.0 + lmin,
            GainFormula::After1990 => gain * 255.0 + lmin,
        }
    }
}

/// Convention the radiometric header fields were written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Representation {
    /// Field A is the gain, field B the bias (Lmin)
    GainBias,
    /// Field A is Lmax, field B is Lmin, band-integrated in mW/(cm² sr)
    LminLmax,
}

/// Radiance range of one band in W/(m² sr µm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadianceRange {
    pub min: f64,
    pub max: f64,
}

/// Calibration of one present band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiometricBand {
    pub index: u8,
    /// `None` when the session could not classify the header fields
    pub radiance: Option<RadianceRange>,
}

impl RadiometricBand {
    pub fn is_valid(&self) -> bool {
        self.radiance.is_some()
    }

    pub fn min_radiance(&self) -> LandsatResult<f64> {
        self.radiance.map(|r| r.min).ok_or(LandsatError::CalibrationUnavailable)
    }

    pub fn max_radiance(&self) -> LandsatResult<f64> {
        self.radiance.map(|r| r.max).ok_or(LandsatError::CalibrationUnavailable)
    }
}

/// Calibration of every present band, resolved once per decode session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiometricData {
    representation: Option<Representation>,
    bands: Vec<RadiometricBand>,
}

impl RadiometricData {
    /// Every band reports "no radiance"
    pub fn unavailable(present: &[u8]) -> Self {
        Self {
            representation: None,
            bands: present
                .iter()
                .map(|&index| RadiometricBand { index, radiance: None })
                .collect(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.representation.is_some()
    }

    pub fn representation(&self) -> Option<Representation> {
        self.representation
    }

    pub fn band(&self, index: u8) -> Option<&RadiometricBand> {
        self.bands.iter().find(|band| band.index == index)
    }

    pub fn bands(&self) -> &[RadiometricBand] {
        &self.bands
    }
}

/// Parameters of the representation heuristic
#[derive(Debug, Clone)]
pub struct CalibrationParams {
    /// Nominal table the recorded values are compared against
    pub revision: NominalRevision,
    pub gain_formula: GainFormula,
    /// Maximum distance of gain and bias vectors from nominal
    pub gain_bias_threshold: f64,
    /// Maximum distance of converted Lmin (and Lmax without thermal) from nominal
    pub radiance_threshold: f64,
    /// Maximum distance of converted Lmax from nominal when band 6 is present
    pub thermal_lmax_threshold: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            revision: NominalRevision::After2003,
            gain_formula: GainFormula::After1990,
            gain_bias_threshold: 0.5,
            radiance_threshold: 0.5,
            thermal_lmax_threshold: 10.0,
        }
    }
}

/// Decides whether recorded values are gain/bias or Lmin/Lmax pairs
/// and normalizes both into radiance ranges
pub struct RadiometricCalibrator {
    params: CalibrationParams,
}

impl RadiometricCalibrator {
    pub fn new(params: CalibrationParams) -> Self {
        Self { params }
    }

    pub fn standard() -> Self {
        Self::new(CalibrationParams::default())
    }

    /// Calibrate from the raw header text; one malformed number
    /// makes the whole session unavailable
    pub fn calibrate_fields(&self, field_a: &[String], field_b: &[String], present: &[u8]) -> RadiometricData {
        let parsed = parse_all(field_a).and_then(|a| parse_all(field_b).map(|b| (a, b)));
        match parsed {
            Ok((a, b)) => self.calibrate(&a, &b, present),
            Err(e) => {
                log::warn!("Radiometric fields are not numeric ({}), calibration unavailable", e);
                RadiometricData::unavailable(present)
            }
        }
    }

    pub fn calibrate(&self, field_a: &[f64], field_b: &[f64], present: &[u8]) -> RadiometricData {
        match self.classify(field_a, field_b, present) {
            Ok((representation, bands)) => {
                log::info!("Radiometric fields classified as {:?}", representation);
                RadiometricData {
                    representation: Some(representation),
                    bands,
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                RadiometricData::unavailable(present)
            }
        }
    }

    fn classify(
        &self,
        field_a: &[f64],
        field_b: &[f64],
        present: &[u8],
    ) -> LandsatResult<(Representation, Vec<RadiometricBand>)> {
        if present.is_empty() || field_a.len() != present.len() || field_b.len() != present.len() {
            log::debug!(
                "Radiometric vectors do not align: {} gains, {} biases, {} bands",
                field_a.len(),
                field_b.len(),
                present.len()
            );
            return Err(LandsatError::CalibrationUnavailable);
        }

        let revision = self.params.revision;
        let mut nominal = Vec::with_capacity(present.len());
        let mut bandwidths = Vec::with_capacity(present.len());
        for &index in present {
            let range = nominal_radiance(index, revision).ok_or(LandsatError::CalibrationUnavailable)?;
            let constants = band_constants(index).ok_or(LandsatError::CalibrationUnavailable)?;
            nominal.push(range);
            bandwidths.push(constants.bandwidth);
        }

        let nominal_gain: Vec<f64> = nominal.iter().map(|n| n.gain()).collect();
        let nominal_lmin: Vec<f64> = nominal.iter().map(|n| n.lmin).collect();
        let gain_distance = distance(field_a, &nominal_gain);
        let bias_distance = distance(field_b, &nominal_lmin);
        log::debug!("Gain distance {:.4}, bias distance {:.4}", gain_distance, bias_distance);

        if gain_distance < self.params.gain_bias_threshold && bias_distance < self.params.gain_bias_threshold {
            let bands = present
                .iter()
                .zip(field_a.iter().zip(field_b))
                .map(|(&index, (&gain, &lmin))| RadiometricBand {
                    index,
                    radiance: Some(RadianceRange {
                        min: lmin,
                        max: self.params.gain_formula.lmax(gain, lmin),
                    }),
                })
                .collect();
            return Ok((Representation::GainBias, bands));
        }

        // Band 6 is recorded in different units and stays out of the comparison
        let thermal = present.contains(&THERMAL_BAND);
        let mut lmin = Vec::new();
        let mut lmax = Vec::new();
        let mut nominal_lmin = Vec::new();
        let mut nominal_lmax = Vec::new();
        for (i, &index) in present.iter().enumerate() {
            if index == THERMAL_BAND {
                continue;
            }
            let width = bandwidths[i];
            lmin.push(to_radiance(field_b[i], width));
            lmax.push(to_radiance(field_a[i], width));
            nominal_lmin.push(to_radiance(nominal[i].lmin, width));
            nominal_lmax.push(to_radiance(nominal[i].lmax, width));
        }
        if lmin.is_empty() {
            log::debug!("Only the thermal band is present, Lmin/Lmax cannot be compared");
            return Err(LandsatError::CalibrationUnavailable);
        }
        let lmin_distance = distance(&lmin, &nominal_lmin);
        let lmax_distance = distance(&lmax, &nominal_lmax);
        log::debug!("Lmin distance {:.4}, Lmax distance {:.4}", lmin_distance, lmax_distance);

        let lmax_threshold = if thermal {
            self.params.thermal_lmax_threshold
        } else {
            self.params.radiance_threshold
        };
        if lmin_distance < self.params.radiance_threshold && lmax_distance < lmax_threshold {
            let bands = present
                .iter()
                .enumerate()
                .map(|(i, &index)| RadiometricBand {
                    index,
                    radiance: Some(RadianceRange {
                        min: to_radiance(field_b[i], bandwidths[i]),
                        max: to_radiance(field_a[i], bandwidths[i]),
                    }),
                })
                .collect();
            return Ok((Representation::LminLmax, bands));
        }

        log::debug!("Recorded values are close to neither nominal gain/bias nor Lmin/Lmax");
        Err(LandsatError::CalibrationUnavailable)
    }
}

/// Band-integrated mW/(cm² sr) to W/(m² sr µm) for a bandwidth in nm
pub fn to_radiance(value: f64, bandwidth: f64) -> f64 {
    value * 10000.0 / bandwidth
}

fn distance(values: &[f64], reference: &[f64]) -> f64 {
    values
        .iter()
        .zip(reference)
        .map(|(v, r)| (v - r) * (v - r))
        .sum::<f64>()
        .sqrt()
}

fn parse_all(fields: &[String]) -> LandsatResult<Vec<f64>> {
    fields.iter().map(|text| parse_number::<f64>(text)).collect()
}

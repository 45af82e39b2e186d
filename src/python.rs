//! Python bindings

use crate::io::{ContainerClassifier, DestRegion, LandsatReader, Qualification, SourceRegion};
use crate::types::{GeoPointId, LandsatError};
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyIOError, PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

fn to_py_err(err: LandsatError) -> PyErr {
    match err {
        LandsatError::Io(e) => PyIOError::new_err(e.to_string()),
        LandsatError::MissingBand(band) => PyKeyError::new_err(format!("band {} is not present", band)),
        LandsatError::InvalidRegion(msg) => PyValueError::new_err(msg),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyLandsatReader>()?;
    m.add_function(wrap_pyfunction!(can_decode, m)?)?;
    Ok(())
}

/// Whether the path is a supported Landsat-5 TM product
#[pyfunction]
fn can_decode(path: String) -> bool {
    ContainerClassifier::qualify(path) == Qualification::Intended
}

/// Python wrapper for LandsatReader
#[pyclass(name = "LandsatReader", unsendable)]
struct PyLandsatReader {
    inner: LandsatReader,
}

#[pymethods]
impl PyLandsatReader {
    #[new]
    fn new(path: String) -> PyResult<Self> {
        let reader = LandsatReader::open(&path).map_err(to_py_err)?;
        Ok(PyLandsatReader { inner: reader })
    }

    #[getter]
    fn format(&self) -> String {
        self.inner.format().to_string()
    }

    #[getter]
    fn product_id(&self) -> String {
        self.inner.header().product_id.clone()
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.header().width
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.header().height
    }

    #[getter]
    fn bands(&self) -> Vec<u8> {
        self.inner.header().bands.clone()
    }

    #[getter]
    fn acquisition_date(&self) -> Option<String> {
        self.inner.header().acquisition_date.map(|date| date.to_rfc3339())
    }

    #[getter]
    fn earth_sun_distance(&self) -> Option<f64> {
        self.inner.header().earth_sun_distance
    }

    #[getter]
    fn sun_angles(&self) -> (Option<f64>, Option<f64>) {
        let geo = self.inner.geometry();
        (geo.sun_elevation, geo.sun_azimuth)
    }

    /// Corner and center coordinates as (latitude, longitude) in degrees
    fn geo_points(&self) -> HashMap<String, (Option<f64>, Option<f64>)> {
        GeoPointId::ALL
            .iter()
            .map(|&id| {
                let point = self.inner.geometry().point(id);
                (format!("{:?}", id), (point.latitude(), point.longitude()))
            })
            .collect()
    }

    /// (gain, bias) of a band, `None` when calibration is unavailable
    fn calibration(&self, band: u8) -> PyResult<Option<(f64, f64)>> {
        let descriptor = self
            .inner
            .bands()
            .get(band)
            .ok_or_else(|| to_py_err(LandsatError::MissingBand(band)))?;
        Ok(match (descriptor.gain(), descriptor.bias()) {
            (Ok(gain), Ok(bias)) => Some((gain, bias)),
            _ => None,
        })
    }

    /// Read a band, optionally a window of it sub-sampled by `step`
    #[pyo3(signature = (band, window=None, step=1))]
    fn read_band<'py>(
        &mut self,
        py: Python<'py>,
        band: u8,
        window: Option<(usize, usize, usize, usize)>,
        step: usize,
    ) -> PyResult<&'py PyArray2<u8>> {
        let header = self.inner.header();
        let (x, y, width, height) = window.unwrap_or((0, 0, header.width, header.height));
        if step == 0 {
            return Err(PyValueError::new_err("step must be positive"));
        }
        let source = SourceRegion { offset_x: x, offset_y: y, width, height, step_x: step, step_y: step };
        let dest = DestRegion {
            offset_x: 0,
            offset_y: 0,
            width: (width + step - 1) / step,
            height: (height + step - 1) / step,
        };
        let mut buffer = vec![0u8; dest.len()];
        self.inner
            .read_band_data(band, &source, &dest, &mut buffer, &AtomicBool::new(false))
            .map_err(to_py_err)?;
        let array = ndarray::Array2::from_shape_vec((dest.height, dest.width), buffer)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(array.into_pyarray(py))
    }

    fn __str__(&self) -> String {
        let header = self.inner.header();
        format!(
            "LandsatReader(format='{}', product_id='{}', size={}x{}, bands={:?})",
            self.inner.format(),
            header.product_id,
            header.width,
            header.height,
            header.bands
        )
    }
}

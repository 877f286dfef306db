//! Python binding
//!
//! Exposes [`NegotiationEngine`] to Python as a class whose operations take
//! and return JSON text, so the presentation layer never sees Rust types.
//!
//! # Example (from Python)
//!
//! ```python
//! from negotiation_engine_core_rs import NegotiationEngine
//!
//! engine = NegotiationEngine()
//! engine.register_party(json.dumps({
//!     "id": "coast_guard",
//!     "batna": 0.25,
//!     "preferences": {
//!         "standoff_nm": {"weight": 1.0,
//!                         "value_function": {"shape": "linear", "worst": 0, "best": 6}},
//!     },
//! }))
//! report = json.loads(engine.evaluate_json(json.dumps({
//!     "agreement": {"standoff_nm": 3},
//! })))
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::api::NegotiationEngine;
use crate::error::EngineError;
use crate::models::{IssueCatalog, PartyProfileSpec};

/// Validation and decoding failures are the caller's fault; the rest is not
fn to_py_err(err: EngineError) -> PyErr {
    match err {
        EngineError::Validation(_) | EngineError::Serialization(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Python wrapper for [`NegotiationEngine`]
#[pyclass(name = "NegotiationEngine")]
pub struct PyNegotiationEngine {
    inner: NegotiationEngine,
}

#[pymethods]
impl PyNegotiationEngine {
    /// Create an engine over `catalog_json`, or the built-in maritime catalog
    ///
    /// # Errors
    /// Raises ValueError if the catalog JSON is malformed or invalid.
    #[new]
    #[pyo3(signature = (catalog_json = None))]
    fn new(catalog_json: Option<&str>) -> PyResult<Self> {
        let inner = match catalog_json {
            Some(json) => {
                let catalog: IssueCatalog = serde_json::from_str(json)
                    .map_err(|e| to_py_err(EngineError::from(e)))?;
                NegotiationEngine::new(catalog)
            }
            None => NegotiationEngine::maritime(),
        };
        Ok(Self { inner })
    }

    /// Register (or replace) a party profile given as JSON
    fn register_party(&mut self, spec_json: &str) -> PyResult<()> {
        let spec: PartyProfileSpec =
            serde_json::from_str(spec_json).map_err(|e| to_py_err(EngineError::from(e)))?;
        self.inner
            .register_party(spec)
            .map_err(|e| to_py_err(EngineError::from(e)))
    }

    fn party_ids(&self) -> Vec<String> {
        self.inner.party_ids().cloned().collect()
    }

    fn evaluate_json(&self, py: Python<'_>, request: &str) -> PyResult<String> {
        py.allow_threads(|| self.inner.evaluate_json(request))
            .map_err(to_py_err)
    }

    fn simulate_json(&self, py: Python<'_>, request: &str) -> PyResult<String> {
        py.allow_threads(|| self.inner.simulate_json(request))
            .map_err(to_py_err)
    }

    /// Releases the GIL for the whole search
    fn calibrate_json(&self, py: Python<'_>, request: &str) -> PyResult<String> {
        py.allow_threads(|| self.inner.calibrate_json(request))
            .map_err(to_py_err)
    }

    fn compare_json(&self, py: Python<'_>, request: &str) -> PyResult<String> {
        py.allow_threads(|| self.inner.compare_json(request))
            .map_err(to_py_err)
    }
}

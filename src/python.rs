use crate::catalog::Catalog;
use crate::extractor::Extractor;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::collections::HashMap;

/// Extracts generation parameters from ComfyUI image metadata.
///
/// The rule catalog is built once on initialization; `extract` can then be
/// called repeatedly, one metadata dictionary per image.
#[pyclass(name = "Kaiseki")]
struct KaisekiPy {
    extractor: Extractor,
}

#[pymethods]
impl KaisekiPy {
    /// Initializes the extractor.
    ///
    /// Args:
    ///     catalog_json (str | None): Extra rules in the catalog JSON format,
    ///         appended after the built-in ones.
    ///     propagate_none (bool): Drop formatted values that miss an input
    ///         instead of keeping a `{key}` placeholder. Defaults to True.
    ///
    /// Raises:
    ///     ValueError: If `catalog_json` is malformed or holds an invalid template.
    #[new]
    #[pyo3(signature = (catalog_json = None, propagate_none = true))]
    fn new(catalog_json: Option<&str>, propagate_none: bool) -> PyResult<Self> {
        let mut builder = Extractor::builder().propagate_none(propagate_none);
        if let Some(json) = catalog_json {
            let extra = Catalog::from_json(json)
                .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
            builder = builder.with_extra_rules(extra);
        }
        Ok(KaisekiPy {
            extractor: builder.build(),
        })
    }

    /// Extracts parameters from an image's metadata.
    ///
    /// Args:
    ///     metadata (dict): Text chunks of the image. Only the string values of
    ///         "prompt" and "workflow" are read; other entries are ignored.
    ///
    /// Returns:
    ///     dict[str, str]: Display name to value. Empty when nothing was found.
    fn extract(&self, metadata: &Bound<'_, PyDict>) -> PyResult<HashMap<String, String>> {
        let mut texts: HashMap<String, String> = HashMap::new();
        for (key, value) in metadata.iter() {
            if let (Ok(key), Ok(value)) = (key.extract::<String>(), value.extract::<String>()) {
                texts.insert(key, value);
            }
        }
        Ok(self.extractor.extract(&texts).into_iter().collect())
    }
}

/// ComfyUI metadata extraction.
///
/// Python bindings to the kaiseki Rust library.
#[pymodule]
fn kaiseki(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<KaisekiPy>()?;
    Ok(())
}

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Setup failures of the browser wiring. The simulation itself never fails.
#[derive(Debug, Error)]
pub enum StormError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("2d context unavailable on #{0}")]
    NoContext(String),
    #[error("element #{0} is not a <canvas>")]
    NotACanvas(String),
    #[error("audio unavailable: {0}")]
    Audio(String),
    #[error("js error: {0}")]
    Js(String),
    #[cfg(feature = "serde_json")]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for StormError {
    fn from(value: JsValue) -> Self {
        StormError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<StormError> for JsValue {
    fn from(err: StormError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

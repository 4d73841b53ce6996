/// Errors raised at the browser boundary
use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no global `window` object")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("image element is not attached to the document")]
    Detached,

    #[error("invalid tilt options: {0}")]
    Options(#[from] serde_wasm_bindgen::Error),

    #[error("DOM call failed: {0}")]
    Dom(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<WebError> for JsValue {
    fn from(error: WebError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

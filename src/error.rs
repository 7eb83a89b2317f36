/// Startup failures. Any of these leaves nothing to render, so the shell stops.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("no global `window`")]
    NoWindow,
    #[error("no document on window")]
    NoDocument,
    #[error("no body on document")]
    NoBody,
    #[error("failed to create canvas")]
    CanvasCreation,
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[cfg(target_arch = "wasm32")]
impl From<InitError> for wasm_bindgen::JsValue {
    fn from(err: InitError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for InitError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        InitError::Dom(format!("{value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_piece() {
        assert_eq!(InitError::NoBody.to_string(), "no body on document");
        assert_eq!(InitError::Dom("boom".into()).to_string(), "DOM error: boom");
    }
}

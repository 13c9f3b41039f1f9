use thiserror::Error;

/// Failures that can happen while setting the scene up.
///
/// The per-frame update has no error states; everything here is raised
/// before the first frame is scheduled.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("DOM error: {0}")]
    Dom(String),
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode gradient map: {0}")]
    Gradient(#[from] image::ImageError),
}

#[cfg(target_arch = "wasm32")]
impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

use glint_gfx::SurfaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsError {
    #[error("cannot create native window: {0}")]
    WindowCreation(String),

    #[error("event loop unavailable: {0}")]
    EventLoop(String),

    #[error("backend `{0}` is not available in this build")]
    BackendUnavailable(&'static str),

    #[error("window back-buffer: {0}")]
    Surface(#[from] SurfaceError),
}

#[cfg(feature = "winit")]
impl From<winit::error::OsError> for OsError {
    fn from(err: winit::error::OsError) -> Self {
        OsError::WindowCreation(err.to_string())
    }
}

#[cfg(feature = "winit")]
impl From<winit::error::EventLoopError> for OsError {
    fn from(err: winit::error::EventLoopError) -> Self {
        OsError::EventLoop(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OsError>;

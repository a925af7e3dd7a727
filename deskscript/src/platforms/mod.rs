use crate::element::UIElementImpl;
use crate::errors::AutomationError;
use std::sync::Arc;

/// The common trait a platform accessibility backend must implement.
///
/// The provider supplies live element handles and primitive actions; it
/// owns every OS resource behind them and is responsible for cleanup.
pub trait AccessibilityProvider: Send + Sync {
    /// All current top-level windows, in provider return order
    fn window_elements(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError>;

    /// Launch an external process at `path` without waiting for it to
    /// initialize. Callers poll/wait separately.
    fn launch(&self, path: &str) -> Result<(), AutomationError>;
}

#[cfg(target_os = "windows")]
pub mod windows;

/// Create the appropriate provider for the current platform
pub fn create_provider() -> Result<Arc<dyn AccessibilityProvider>, AutomationError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsProvider::new()?))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(AutomationError::UnsupportedPlatform(
            "no accessibility provider for this platform".to_string(),
        ))
    }
}

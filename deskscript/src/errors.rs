use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures raised by the script bridge. Compilation and execution
/// failures carry the formatted script-side exception text.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to read script source: {0}")]
    Source(#[from] std::io::Error),

    #[error("script engine error: {0}")]
    Engine(#[from] rquickjs::Error),

    #[error("dialect compilation failed: {0}")]
    Compile(String),

    #[error("script execution failed: {0}")]
    Execution(String),
}

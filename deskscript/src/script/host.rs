//! Script execution host.
//!
//! Each run gets a fresh engine: a new runtime and context are built,
//! the bindings and prelude are installed, the script body is evaluated,
//! and everything is torn down. Nothing leaks between runs.
//!
//! Two source kinds are supported. Native scripts are plain JavaScript.
//! Dialect scripts (`.coffee`) are compiled to JavaScript first, in a
//! separate throwaway context that holds only the bundled compiler.

use crate::errors::ScriptError;
use crate::Desktop;
use rquickjs::{Context, Ctx, Runtime, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::bindings;

/// How a script source should be treated before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Plain JavaScript, executed as-is.
    Native,
    /// The CoffeeScript-style dialect, compiled to JavaScript first.
    Dialect,
}

impl ScriptKind {
    /// Dispatch on the file extension: `.coffee` selects the dialect,
    /// anything else runs as native JavaScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("coffee") => ScriptKind::Dialect,
            _ => ScriptKind::Native,
        }
    }
}

/// Paths to the script-support assets loaded at run time.
#[derive(Debug, Clone)]
pub struct ScriptHostConfig {
    /// Helper library prepended to every script body.
    pub prelude_path: PathBuf,
    /// The bundled dialect-to-JavaScript compiler.
    pub compiler_path: PathBuf,
}

impl Default for ScriptHostConfig {
    fn default() -> Self {
        Self {
            prelude_path: PathBuf::from("js/prelude.js"),
            compiler_path: PathBuf::from("js/coffee-script.js"),
        }
    }
}

/// Runs user scripts against a [`Desktop`].
pub struct ScriptHost {
    desktop: Desktop,
    config: ScriptHostConfig,
}

impl ScriptHost {
    pub fn new(desktop: Desktop) -> Self {
        Self {
            desktop,
            config: ScriptHostConfig::default(),
        }
    }

    pub fn with_config(desktop: Desktop, config: ScriptHostConfig) -> Self {
        Self { desktop, config }
    }

    /// Read a script file and run it, picking the source kind from the
    /// file extension.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScriptError> {
        let path = path.as_ref();
        info!(path = %path.display(), "running script file");
        let source = fs::read_to_string(path)?;
        self.run_source(&source, ScriptKind::from_path(path))
    }

    /// Run script source of a known kind.
    pub fn run_source(&self, source: &str, kind: ScriptKind) -> Result<(), ScriptError> {
        let body = match kind {
            ScriptKind::Native => source.to_owned(),
            ScriptKind::Dialect => self.compile_dialect(source)?,
        };
        let prelude = fs::read_to_string(&self.config.prelude_path)?;
        self.execute(&format!("{prelude}\n{body}"))
    }

    /// Compile dialect source to JavaScript in a throwaway context that
    /// contains nothing but the compiler and the source (as the global
    /// `script`, so the source never needs escaping).
    fn compile_dialect(&self, source: &str) -> Result<String, ScriptError> {
        debug!(
            compiler = %self.config.compiler_path.display(),
            "compiling dialect source"
        );
        let compiler = fs::read_to_string(&self.config.compiler_path)?;
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        context.with(|ctx| {
            ctx.globals()
                .set("script", source)
                .map_err(|e| ScriptError::Compile(format_js_error(&ctx, &e)))?;
            let unit = format!("{compiler}\nCoffeeScript.compile(script, {{bare: true}});");
            ctx.eval::<String, _>(unit)
                .map_err(|e| ScriptError::Compile(format_js_error(&ctx, &e)))
        })
    }

    /// Evaluate a JavaScript unit in a fresh, fully-bound engine.
    fn execute(&self, source: &str) -> Result<(), ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;
        context.with(|ctx| {
            bindings::install(&ctx, self.desktop.clone())
                .map_err(|e| ScriptError::Execution(format_js_error(&ctx, &e)))?;
            ctx.eval::<(), _>(source)
                .map_err(|e| ScriptError::Execution(format_js_error(&ctx, &e)))
        })
    }
}

/// Render a pending script exception as `Name: message` plus the stack
/// trace when one is attached. Non-exception engine errors fall back to
/// their display text.
fn format_js_error(ctx: &Ctx<'_>, error: &rquickjs::Error) -> String {
    if !matches!(error, rquickjs::Error::Exception) {
        return error.to_string();
    }

    let exception = ctx.catch();

    if let Some(object) = exception.as_object() {
        let read = |key: &str| -> Option<String> {
            object
                .get::<_, Value>(key)
                .ok()
                .and_then(|v| v.as_string().and_then(|s| s.to_string().ok()))
        };
        let name = read("name").unwrap_or_else(|| "Error".to_string());
        let message = read("message").unwrap_or_default();
        let stack = read("stack").unwrap_or_default();

        let mut output = if message.is_empty() {
            name
        } else {
            format!("{name}: {message}")
        };
        if !stack.is_empty() {
            output.push('\n');
            output.push_str(&stack);
        }
        return output;
    }

    if let Some(text) = exception.as_string().and_then(|s| s.to_string().ok()) {
        return text;
    }

    error.to_string()
}

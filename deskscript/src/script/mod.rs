//! Embedded script engine bridge: per-run contexts, marshaling, and the
//! script-facing mirror of the host API.

mod bindings;
mod convert;
mod host;

pub use host::{ScriptHost, ScriptHostConfig, ScriptKind};

//! Script-driven desktop UI automation.
//!
//! This crate exposes a fluent, chainable query/action API over the live
//! UI-element tree of running desktop applications ([`Desktop`],
//! [`UIElement`], [`ElementCollection`]), plus a bridge that runs user
//! scripts against that API inside an embedded, per-run-isolated
//! JavaScript engine ([`script::ScriptHost`]).

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub mod collection;
pub mod element;
pub mod errors;
pub mod platforms;
pub mod script;
#[cfg(test)]
mod tests;

pub use collection::ElementCollection;
pub use element::{Bounds, UIElement, UIElementImpl};
pub use errors::{AutomationError, ScriptError};

use platforms::AccessibilityProvider;

/// The root of the UI tree: a cheap handle over the platform provider.
///
/// One `Desktop` is created at process start and passed explicitly to
/// whatever needs the root (the script bridge, tests with a provider
/// double). It carries no mutable state, so clones share everything.
pub struct Desktop {
    provider: Arc<dyn AccessibilityProvider>,
}

impl Desktop {
    /// Initialize the platform accessibility provider
    pub fn new() -> Result<Self, AutomationError> {
        info!("initializing desktop accessibility provider");
        let provider = platforms::create_provider()?;
        Ok(Self { provider })
    }

    /// Build a desktop over an explicit provider, e.g. a test double
    pub fn with_provider(provider: Arc<dyn AccessibilityProvider>) -> Self {
        Self { provider }
    }

    fn collection(&self, items: Vec<Box<dyn UIElementImpl>>) -> ElementCollection {
        let elements = items
            .into_iter()
            .map(|node| UIElement::new(self.provider.clone(), node))
            .collect();
        ElementCollection::new(self.provider.clone(), elements)
    }

    /// All current top-level windows
    pub fn windows(&self) -> Result<ElementCollection, AutomationError> {
        let windows = self.collection(self.provider.window_elements()?);
        debug!(count = windows.len(), "enumerated top-level windows");
        Ok(windows)
    }

    /// Top-level windows matching a predicate
    pub fn windows_where<F>(&self, predicate: F) -> Result<ElementCollection, AutomationError>
    where
        F: Fn(&UIElement) -> bool,
    {
        Ok(self.windows()?.filter(predicate))
    }

    /// Top-level windows whose name is one of `names`
    pub fn windows_by_name<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<ElementCollection, AutomationError> {
        Ok(self.windows()?.filter_by_name(names))
    }

    /// Minimize every current window, best-effort per window
    pub fn show_desktop(&self) -> Result<&Self, AutomationError> {
        self.windows()?.minimize();
        Ok(self)
    }

    /// Block the calling thread for `millis` milliseconds
    pub fn wait(&self, millis: u64) -> &Self {
        thread::sleep(Duration::from_millis(millis));
        self
    }

    /// Launch an external process at `path`.
    ///
    /// Returns as soon as the process is spawned; the new application's
    /// windows will not exist yet. Callers poll/wait separately.
    pub fn run(&self, path: &str) -> Result<&Self, AutomationError> {
        info!(path, "launching process");
        self.provider.launch(path)?;
        Ok(self)
    }
}

impl Clone for Desktop {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

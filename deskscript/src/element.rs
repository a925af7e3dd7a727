use crate::collection::ElementCollection;
use crate::errors::AutomationError;
use crate::platforms::AccessibilityProvider;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Screen-space rectangle of an element: position plus size, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Interface for provider-specific element implementations
pub trait UIElementImpl: Send + Sync + Debug {
    /// Stable identity of the underlying OS handle, used for deduplication.
    fn object_id(&self) -> usize;

    /// Whether the underlying OS object still exists. Elements backed by a
    /// dead handle are dropped whenever a collection is materialized.
    fn is_alive(&self) -> bool;

    fn name(&self) -> String;
    fn role(&self) -> String;
    fn bounds(&self) -> Result<Bounds, AutomationError>;
    fn is_visible(&self) -> Result<bool, AutomationError>;

    fn click(&self) -> Result<(), AutomationError>;
    fn double_click(&self) -> Result<(), AutomationError>;
    fn right_click(&self) -> Result<(), AutomationError>;
    fn focus(&self) -> Result<(), AutomationError>;
    fn set_value(&self, value: &str) -> Result<(), AutomationError>;

    fn is_window(&self) -> bool;
    fn close(&self) -> Result<(), AutomationError>;
    fn minimize(&self) -> Result<(), AutomationError>;
    fn maximize(&self) -> Result<(), AutomationError>;
    fn restore(&self) -> Result<(), AutomationError>;

    /// Direct children, or an empty list when the node has no containment.
    fn children(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError>;

    fn clone_box(&self) -> Box<dyn UIElementImpl>;
}

/// Represents one live UI element in a desktop application.
///
/// The wrapper is an immutable value; all actions delegate to the provider
/// node it was created from. Identity (equality, hashing) follows the
/// underlying handle, not the wrapper instance.
pub struct UIElement {
    inner: Box<dyn UIElementImpl>,
    provider: Arc<dyn AccessibilityProvider>,
}

impl Debug for UIElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UIElement")
            .field("name", &self.inner.name())
            .field("role", &self.inner.role())
            .finish()
    }
}

impl Clone for UIElement {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
            provider: self.provider.clone(),
        }
    }
}

impl PartialEq for UIElement {
    fn eq(&self, other: &Self) -> bool {
        self.inner.object_id() == other.inner.object_id()
    }
}

impl Eq for UIElement {}

impl Hash for UIElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.object_id().hash(state);
    }
}

impl UIElement {
    /// Create a new UI element from a provider-specific implementation
    pub(crate) fn new(
        provider: Arc<dyn AccessibilityProvider>,
        impl_: Box<dyn UIElementImpl>,
    ) -> Self {
        Self {
            inner: impl_,
            provider,
        }
    }

    pub(crate) fn object_id(&self) -> usize {
        self.inner.object_id()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Get the element's display name
    pub fn name(&self) -> String {
        self.inner.name()
    }

    /// Get the element's role (e.g., "Button", "Label", "Window")
    pub fn role(&self) -> String {
        self.inner.role()
    }

    /// Get element bounds (x, y, width, height)
    pub fn bounds(&self) -> Result<Bounds, AutomationError> {
        self.inner.bounds()
    }

    /// Check if the element is visible on screen
    pub fn visible(&self) -> Result<bool, AutomationError> {
        self.inner.is_visible()
    }

    /// Get the element's value.
    ///
    /// Quirk kept from the original tool: this returns the display name,
    /// not a semantic control value. Scripts depend on it.
    pub fn value(&self) -> String {
        self.inner.name()
    }

    /// Set the element's value through the provider's set-value primitive
    pub fn set_value(&self, value: &str) -> Result<&Self, AutomationError> {
        self.inner.set_value(value)?;
        Ok(self)
    }

    /// Click on this element
    pub fn click(&self) -> Result<&Self, AutomationError> {
        debug!(name = %self.inner.name(), "clicking element");
        self.inner.click()?;
        Ok(self)
    }

    /// Double-click on this element
    pub fn double_click(&self) -> Result<&Self, AutomationError> {
        self.inner.double_click()?;
        Ok(self)
    }

    /// Right-click on this element
    pub fn right_click(&self) -> Result<&Self, AutomationError> {
        self.inner.right_click()?;
        Ok(self)
    }

    /// Focus this element
    pub fn focus(&self) -> Result<&Self, AutomationError> {
        self.inner.focus()?;
        Ok(self)
    }

    /// Close the element's window. Best-effort: only meaningful for
    /// top-level windows, and any provider failure (wrong node type,
    /// window already gone) is discarded so the chain stays intact.
    pub fn close(&self) -> &Self {
        if let Err(e) = self.inner.close() {
            debug!(error = %e, "close ignored a provider failure");
        }
        self
    }

    /// Minimize the element's window. Best-effort, see [`UIElement::close`].
    pub fn minimize(&self) -> &Self {
        if let Err(e) = self.inner.minimize() {
            debug!(error = %e, "minimize ignored a provider failure");
        }
        self
    }

    /// Maximize the element's window. Best-effort, see [`UIElement::close`].
    pub fn maximize(&self) -> &Self {
        if let Err(e) = self.inner.maximize() {
            debug!(error = %e, "maximize ignored a provider failure");
        }
        self
    }

    /// Restore the element's window. Best-effort, see [`UIElement::close`].
    pub fn restore(&self) -> &Self {
        if let Err(e) = self.inner.restore() {
            debug!(error = %e, "restore ignored a provider failure");
        }
        self
    }

    /// Direct children as a new collection. Elements without containment
    /// yield an empty collection.
    pub fn children(&self) -> Result<ElementCollection, AutomationError> {
        let items = self
            .inner
            .children()?
            .into_iter()
            .map(|node| UIElement::new(self.provider.clone(), node))
            .collect();
        Ok(ElementCollection::new(self.provider.clone(), items))
    }

    /// Direct children matching a predicate
    pub fn children_where<F>(&self, predicate: F) -> Result<ElementCollection, AutomationError>
    where
        F: Fn(&UIElement) -> bool,
    {
        Ok(self.children()?.filter(predicate))
    }

    /// Block the calling thread for `millis` milliseconds
    pub fn wait(&self, millis: u64) -> &Self {
        thread::sleep(Duration::from_millis(millis));
        self
    }

    /// The desktop root this element was derived from
    pub fn desktop(&self) -> crate::Desktop {
        crate::Desktop::with_provider(self.provider.clone())
    }
}

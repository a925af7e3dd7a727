use crate::element::{Bounds, UIElement};
use crate::errors::AutomationError;
use crate::platforms::AccessibilityProvider;
use crate::Desktop;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// An immutable, ordered collection of UI elements with a fluent
/// query/action algebra.
///
/// Every transform returns a new collection; the receiver is never
/// modified. Order is the provider's return order, or flattening order for
/// traversal results. Elements whose underlying handle has died are
/// filtered out at construction and never appear in a collection.
#[derive(Clone)]
pub struct ElementCollection {
    provider: Arc<dyn AccessibilityProvider>,
    items: Vec<UIElement>,
}

impl std::fmt::Debug for ElementCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCollection")
            .field("len", &self.items.len())
            .finish()
    }
}

impl ElementCollection {
    /// Construct a collection, dropping members backed by dead handles.
    pub(crate) fn new(provider: Arc<dyn AccessibilityProvider>, items: Vec<UIElement>) -> Self {
        let items: Vec<UIElement> = items.into_iter().filter(|e| e.is_alive()).collect();
        Self { provider, items }
    }

    /// New collection over the same provider with different members
    pub(crate) fn with_members(&self, items: Vec<UIElement>) -> Self {
        Self::new(self.provider.clone(), items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UIElement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Materialize a fixed ordered snapshot of the current members
    pub fn to_vec(&self) -> Vec<UIElement> {
        self.items.clone()
    }

    // ---- per-member projections, in collection order ----

    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|e| e.name()).collect()
    }

    /// Display names of every member (the `value()` quirk applies
    /// per element, see [`UIElement::value`]).
    pub fn values(&self) -> Vec<String> {
        self.items.iter().map(|e| e.value()).collect()
    }

    pub fn roles(&self) -> Vec<String> {
        self.items.iter().map(|e| e.role()).collect()
    }

    pub fn visible(&self) -> Result<Vec<bool>, AutomationError> {
        self.items.iter().map(|e| e.visible()).collect()
    }

    pub fn bounds(&self) -> Result<Vec<Bounds>, AutomationError> {
        self.items.iter().map(|e| e.bounds()).collect()
    }

    // ---- queries ----

    /// For each requested name, in request order, the first
    /// self-or-descendant element (via [`ElementCollection::include_children`])
    /// whose name equals it. Unmatched names are skipped, so the result can
    /// be shorter than the request.
    pub fn find_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, AutomationError> {
        let pool = self.include_children()?;
        let found = names
            .iter()
            .filter_map(|n| pool.items.iter().find(|e| e.name() == n.as_ref()).cloned())
            .collect();
        Ok(self.with_members(found))
    }

    /// [`ElementCollection::find_by_name`] followed by a click on every
    /// found element. Returns the original membership.
    pub fn find_and_click<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, AutomationError> {
        self.find_by_name(names)?.click()?;
        Ok(self.clone())
    }

    /// Members plus the direct children of every member.
    ///
    /// Deliberately one level deep, not a recursive descent: that is the
    /// behavior scripts were written against. Original members come first,
    /// then newly-introduced children in member order, deduplicated by
    /// handle identity keeping the first occurrence.
    pub fn include_children(&self) -> Result<Self, AutomationError> {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut merged = Vec::new();
        for element in &self.items {
            if seen.insert(element.object_id()) {
                merged.push(element.clone());
            }
        }
        for element in &self.items {
            for child in element.children()?.items {
                if seen.insert(child.object_id()) {
                    merged.push(child);
                }
            }
        }
        Ok(self.with_members(merged))
    }

    /// Direct children of all members, flattened into one collection
    pub fn children(&self) -> Result<Self, AutomationError> {
        let mut flattened = Vec::new();
        for element in &self.items {
            flattened.extend(element.children()?.items);
        }
        Ok(self.with_members(flattened))
    }

    /// Direct children of all members matching a predicate
    pub fn children_where<F>(&self, predicate: F) -> Result<Self, AutomationError>
    where
        F: Fn(&UIElement) -> bool,
    {
        Ok(self.children()?.filter(predicate))
    }

    pub fn children_by_type<S: AsRef<str>>(&self, types: &[S]) -> Result<Self, AutomationError> {
        self.children_where(|e| types.iter().any(|t| t.as_ref() == e.role()))
    }

    pub fn children_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, AutomationError> {
        self.children_where(|e| names.iter().any(|n| n.as_ref() == e.name()))
    }

    /// Child labels of all members
    pub fn labels(&self) -> Result<Self, AutomationError> {
        self.children_by_type(&["Label"])
    }

    pub fn labels_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, AutomationError> {
        Ok(self.labels()?.filter_by_name(names))
    }

    /// Child buttons of all members
    pub fn buttons(&self) -> Result<Self, AutomationError> {
        self.children_by_type(&["Button"])
    }

    pub fn buttons_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, AutomationError> {
        Ok(self.buttons()?.filter_by_name(names))
    }

    /// Retain members matching the predicate, order preserved
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&UIElement) -> bool,
    {
        self.with_members(self.items.iter().filter(|e| predicate(e)).cloned().collect())
    }

    pub fn filter_by_type<S: AsRef<str>>(&self, types: &[S]) -> Self {
        self.filter(|e| types.iter().any(|t| t.as_ref() == e.role()))
    }

    pub fn filter_by_name<S: AsRef<str>>(&self, names: &[S]) -> Self {
        self.filter(|e| names.iter().any(|n| n.as_ref() == e.name()))
    }

    /// First member, or first member matching the predicate via
    /// [`ElementCollection::first_where`]. Empty input yields `None`,
    /// never an error.
    pub fn first(&self) -> Option<UIElement> {
        self.items.first().cloned()
    }

    pub fn first_where<F>(&self, predicate: F) -> Option<UIElement>
    where
        F: Fn(&UIElement) -> bool,
    {
        self.items.iter().find(|e| predicate(e)).cloned()
    }

    pub fn last(&self) -> Option<UIElement> {
        self.items.last().cloned()
    }

    pub fn last_where<F>(&self, predicate: F) -> Option<UIElement>
    where
        F: Fn(&UIElement) -> bool,
    {
        self.items.iter().rev().find(|e| predicate(e)).cloned()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&UIElement) -> bool,
    {
        self.items.iter().filter(|e| predicate(e)).count()
    }

    /// Return the element at `index` in the materialized member order
    pub fn get(&self, index: usize) -> Result<UIElement, AutomationError> {
        self.items.get(index).cloned().ok_or_else(|| {
            AutomationError::IndexOutOfRange(format!(
                "index {index} beyond collection of {} elements",
                self.items.len()
            ))
        })
    }

    // ---- bulk actions ----

    /// Apply `action` to every member in order. The first failure stops
    /// the iteration and propagates.
    pub fn each<F>(&self, mut action: F) -> Result<Self, AutomationError>
    where
        F: FnMut(&UIElement) -> Result<(), AutomationError>,
    {
        for element in &self.items {
            action(element)?;
        }
        Ok(self.clone())
    }

    /// Click every member in order. Membership is unchanged; any provider
    /// failure propagates.
    pub fn click(&self) -> Result<Self, AutomationError> {
        debug!(count = self.items.len(), "clicking collection members");
        self.each(|e| e.click().map(|_| ()))
    }

    pub fn double_click(&self) -> Result<Self, AutomationError> {
        self.each(|e| e.double_click().map(|_| ()))
    }

    pub fn right_click(&self) -> Result<Self, AutomationError> {
        self.each(|e| e.right_click().map(|_| ()))
    }

    pub fn focus(&self) -> Result<Self, AutomationError> {
        self.each(|e| e.focus().map(|_| ()))
    }

    /// Set the value of every member in order
    pub fn set_value(&self, value: &str) -> Result<Self, AutomationError> {
        self.each(|e| e.set_value(value).map(|_| ()))
    }

    /// Close every member's window, best-effort per element
    pub fn close(&self) -> Self {
        for element in &self.items {
            element.close();
        }
        self.clone()
    }

    /// Minimize every member's window, best-effort per element
    pub fn minimize(&self) -> Self {
        for element in &self.items {
            element.minimize();
        }
        self.clone()
    }

    /// Maximize every member's window, best-effort per element
    pub fn maximize(&self) -> Self {
        for element in &self.items {
            element.maximize();
        }
        self.clone()
    }

    /// Restore every member's window, best-effort per element
    pub fn restore(&self) -> Self {
        for element in &self.items {
            element.restore();
        }
        self.clone()
    }

    /// Block the calling thread for `millis` milliseconds
    pub fn wait(&self, millis: u64) -> Self {
        thread::sleep(Duration::from_millis(millis));
        self.clone()
    }

    /// The desktop root this collection was derived from
    pub fn desktop(&self) -> Desktop {
        Desktop::with_provider(self.provider.clone())
    }
}

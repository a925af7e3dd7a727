//! In-memory provider double backing the unit tests: a fixed element
//! tree plus an action log the assertions read back.

use crate::element::{Bounds, UIElementImpl};
use crate::errors::AutomationError;
use crate::platforms::AccessibilityProvider;
use std::sync::{Arc, Mutex};

/// Builder for one node of the fixture tree.
#[derive(Debug, Clone)]
pub struct MockNode {
    name: String,
    role: String,
    children: Vec<MockNode>,
    alive: bool,
    visible: bool,
    fail_actions: bool,
}

impl MockNode {
    pub fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            children: Vec::new(),
            alive: true,
            visible: true,
            fail_actions: false,
        }
    }

    pub fn window(name: &str) -> Self {
        Self::new(name, "Window")
    }

    pub fn with_children(mut self, children: Vec<MockNode>) -> Self {
        self.children = children;
        self
    }

    /// Mark the node's backing handle as dead.
    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Make every action on this node fail with a platform error.
    pub fn failing(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    fn build(self, next_id: &mut usize, log: &Arc<Mutex<Vec<String>>>) -> Arc<SharedNode> {
        let id = *next_id;
        *next_id += 1;
        let children = self
            .children
            .into_iter()
            .map(|child| child.build(next_id, log))
            .collect();
        Arc::new(SharedNode {
            id,
            name: self.name,
            role: self.role,
            alive: self.alive,
            visible: self.visible,
            fail_actions: self.fail_actions,
            children,
            log: log.clone(),
        })
    }
}

#[derive(Debug)]
struct SharedNode {
    id: usize,
    name: String,
    role: String,
    alive: bool,
    visible: bool,
    fail_actions: bool,
    children: Vec<Arc<SharedNode>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl SharedNode {
    fn record(&self, action: &str) {
        self.log.lock().unwrap().push(format!("{action}:{}", self.name));
    }
}

/// Provider double over a fixed window list.
pub struct MockProvider {
    windows: Vec<Arc<SharedNode>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new(windows: Vec<MockNode>) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut next_id = 1;
        let windows = windows
            .into_iter()
            .map(|node| node.build(&mut next_id, &log))
            .collect();
        Self { windows, log }
    }

    /// Snapshot of every action recorded so far, in order.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn logged(&self, entry: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.as_str() == entry)
            .count()
    }
}

impl AccessibilityProvider for MockProvider {
    fn window_elements(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError> {
        Ok(self
            .windows
            .iter()
            .map(|node| Box::new(MockElement { node: node.clone() }) as Box<dyn UIElementImpl>)
            .collect())
    }

    fn launch(&self, path: &str) -> Result<(), AutomationError> {
        self.log.lock().unwrap().push(format!("launch:{path}"));
        Ok(())
    }
}

#[derive(Debug)]
struct MockElement {
    node: Arc<SharedNode>,
}

impl MockElement {
    fn action(&self, name: &str) -> Result<(), AutomationError> {
        if self.node.fail_actions {
            return Err(AutomationError::PlatformError(format!(
                "injected {name} failure on {}",
                self.node.name
            )));
        }
        self.node.record(name);
        Ok(())
    }

    fn window_action(&self, name: &str) -> Result<(), AutomationError> {
        if !self.is_window() {
            return Err(AutomationError::UnsupportedOperation(format!(
                "{name} on a non-window {}",
                self.node.role
            )));
        }
        self.action(name)
    }
}

impl UIElementImpl for MockElement {
    fn object_id(&self) -> usize {
        self.node.id
    }

    fn is_alive(&self) -> bool {
        self.node.alive
    }

    fn name(&self) -> String {
        self.node.name.clone()
    }

    fn role(&self) -> String {
        self.node.role.clone()
    }

    fn bounds(&self) -> Result<Bounds, AutomationError> {
        Ok(Bounds {
            x: (self.node.id * 10) as f64,
            y: 0.0,
            width: 100.0,
            height: 30.0,
        })
    }

    fn is_visible(&self) -> Result<bool, AutomationError> {
        Ok(self.node.visible)
    }

    fn click(&self) -> Result<(), AutomationError> {
        self.action("click")
    }

    fn double_click(&self) -> Result<(), AutomationError> {
        self.action("doubleClick")
    }

    fn right_click(&self) -> Result<(), AutomationError> {
        self.action("rightClick")
    }

    fn focus(&self) -> Result<(), AutomationError> {
        self.action("focus")
    }

    fn set_value(&self, value: &str) -> Result<(), AutomationError> {
        if self.node.fail_actions {
            return Err(AutomationError::PlatformError(format!(
                "injected set_value failure on {}",
                self.node.name
            )));
        }
        self.node.record(&format!("value={value}"));
        Ok(())
    }

    fn is_window(&self) -> bool {
        self.node.role == "Window"
    }

    fn close(&self) -> Result<(), AutomationError> {
        self.window_action("close")
    }

    fn minimize(&self) -> Result<(), AutomationError> {
        self.window_action("minimize")
    }

    fn maximize(&self) -> Result<(), AutomationError> {
        self.window_action("maximize")
    }

    fn restore(&self) -> Result<(), AutomationError> {
        self.window_action("restore")
    }

    fn children(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError> {
        Ok(self
            .node
            .children
            .iter()
            .map(|child| Box::new(MockElement { node: child.clone() }) as Box<dyn UIElementImpl>)
            .collect())
    }

    fn clone_box(&self) -> Box<dyn UIElementImpl> {
        Box::new(MockElement {
            node: self.node.clone(),
        })
    }
}

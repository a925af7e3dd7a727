//! Windows provider on top of UI Automation.

use crate::element::{Bounds, UIElementImpl};
use crate::errors::AutomationError;
use crate::platforms::AccessibilityProvider;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;
use uiautomation::controls::ControlType;
use uiautomation::inputs::Mouse;
use uiautomation::patterns;
use uiautomation::types::{Point, TreeScope, UIProperty, WindowVisualState};
use uiautomation::variants::Variant;
use uiautomation::UIAutomation;

// UIA interfaces are apartment-bound; the wrappers only ever touch them
// from the scripting thread.
#[derive(Clone)]
pub struct ThreadSafeWinUIAutomation(Arc<UIAutomation>);

unsafe impl Send for ThreadSafeWinUIAutomation {}
unsafe impl Sync for ThreadSafeWinUIAutomation {}

#[derive(Clone)]
pub struct ThreadSafeWinUIElement(Arc<uiautomation::UIElement>);

unsafe impl Send for ThreadSafeWinUIElement {}
unsafe impl Sync for ThreadSafeWinUIElement {}

pub struct WindowsProvider {
    automation: ThreadSafeWinUIAutomation,
}

impl WindowsProvider {
    pub fn new() -> Result<Self, AutomationError> {
        let automation =
            UIAutomation::new().map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        Ok(Self {
            automation: ThreadSafeWinUIAutomation(Arc::new(automation)),
        })
    }

    fn wrap(&self, element: uiautomation::UIElement) -> Box<dyn UIElementImpl> {
        Box::new(WindowsElement {
            element: ThreadSafeWinUIElement(Arc::new(element)),
            automation: self.automation.clone(),
        })
    }
}

impl AccessibilityProvider for WindowsProvider {
    fn window_elements(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError> {
        let root = self
            .automation
            .0
            .get_root_element()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        let condition = self
            .automation
            .0
            .create_property_condition(
                UIProperty::ControlType,
                Variant::from(ControlType::Window as i32),
                None,
            )
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        let windows = root
            .find_all(TreeScope::Children, &condition)
            .map_err(|e| AutomationError::ElementNotFound(e.to_string()))?;
        debug!(count = windows.len(), "found top-level windows");
        Ok(windows.into_iter().map(|w| self.wrap(w)).collect())
    }

    fn launch(&self, path: &str) -> Result<(), AutomationError> {
        std::process::Command::new(path)
            .spawn()
            .map_err(|e| AutomationError::PlatformError(format!("failed to launch {path}: {e}")))?;
        Ok(())
    }
}

pub struct WindowsElement {
    element: ThreadSafeWinUIElement,
    automation: ThreadSafeWinUIAutomation,
}

impl Debug for WindowsElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsElement").finish()
    }
}

impl WindowsElement {
    fn clickable_point(&self) -> Result<Point, AutomationError> {
        if let Ok(Some(point)) = self.element.0.get_clickable_point() {
            return Ok(point);
        }
        // No clickable point, fall back to the center of the bounds.
        let rect = self
            .element
            .0
            .get_bounding_rectangle()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        Ok(Point::new(
            rect.get_left() + rect.get_width() / 2,
            rect.get_top() + rect.get_height() / 2,
        ))
    }

    fn window_pattern(&self) -> Result<patterns::UIWindowPattern, AutomationError> {
        self.element
            .0
            .get_pattern::<patterns::UIWindowPattern>()
            .map_err(|_| {
                AutomationError::UnsupportedOperation(
                    "`UIWindowPattern` is not found".to_string(),
                )
            })
    }
}

impl UIElementImpl for WindowsElement {
    fn object_id(&self) -> usize {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let runtime_id = self.element.0.get_runtime_id().unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        runtime_id.hash(&mut hasher);
        hasher.finish() as usize
    }

    fn is_alive(&self) -> bool {
        self.element.0.get_runtime_id().is_ok()
    }

    fn name(&self) -> String {
        self.element.0.get_name().unwrap_or_default()
    }

    fn role(&self) -> String {
        let control_type = self
            .element
            .0
            .get_control_type()
            .unwrap_or(ControlType::Custom);
        map_control_type_to_role(control_type)
    }

    fn bounds(&self) -> Result<Bounds, AutomationError> {
        let rect = self
            .element
            .0
            .get_bounding_rectangle()
            .map_err(|e| AutomationError::ElementNotFound(e.to_string()))?;
        Ok(Bounds {
            x: rect.get_left() as f64,
            y: rect.get_top() as f64,
            width: rect.get_width() as f64,
            height: rect.get_height() as f64,
        })
    }

    fn is_visible(&self) -> Result<bool, AutomationError> {
        let offscreen = self
            .element
            .0
            .is_offscreen()
            .map_err(|e| AutomationError::ElementNotFound(e.to_string()))?;
        Ok(!offscreen)
    }

    fn click(&self) -> Result<(), AutomationError> {
        self.element.0.try_focus();
        let point = self.clickable_point()?;
        debug!(x = point.get_x(), y = point.get_y(), "clicking");
        Mouse::default()
            .click(point)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn double_click(&self) -> Result<(), AutomationError> {
        self.element.0.try_focus();
        let point = self.clickable_point()?;
        Mouse::default()
            .double_click(point)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn right_click(&self) -> Result<(), AutomationError> {
        self.element.0.try_focus();
        let point = self.clickable_point()?;
        Mouse::default()
            .right_click(point)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn focus(&self) -> Result<(), AutomationError> {
        self.element
            .0
            .set_focus()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn set_value(&self, value: &str) -> Result<(), AutomationError> {
        let pattern = self
            .element
            .0
            .get_pattern::<patterns::UIValuePattern>()
            .map_err(|_| {
                AutomationError::UnsupportedOperation("`UIValuePattern` is not found".to_string())
            })?;
        debug!(value, "setting element value");
        pattern
            .set_value(value)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn is_window(&self) -> bool {
        matches!(self.element.0.get_control_type(), Ok(ControlType::Window))
    }

    fn close(&self) -> Result<(), AutomationError> {
        self.window_pattern()?
            .close()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn minimize(&self) -> Result<(), AutomationError> {
        self.window_pattern()?
            .set_window_visual_state(WindowVisualState::Minimized)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn maximize(&self) -> Result<(), AutomationError> {
        self.window_pattern()?
            .set_window_visual_state(WindowVisualState::Maximized)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn restore(&self) -> Result<(), AutomationError> {
        self.window_pattern()?
            .set_window_visual_state(WindowVisualState::Normal)
            .map_err(|e| AutomationError::PlatformError(e.to_string()))
    }

    fn children(&self) -> Result<Vec<Box<dyn UIElementImpl>>, AutomationError> {
        let condition = self
            .automation
            .0
            .create_true_condition()
            .map_err(|e| AutomationError::PlatformError(e.to_string()))?;
        let children = self
            .element
            .0
            .find_all(TreeScope::Children, &condition)
            .map_err(|e| AutomationError::ElementNotFound(e.to_string()))?;
        Ok(children
            .into_iter()
            .map(|child| {
                Box::new(WindowsElement {
                    element: ThreadSafeWinUIElement(Arc::new(child)),
                    automation: self.automation.clone(),
                }) as Box<dyn UIElementImpl>
            })
            .collect())
    }

    fn clone_box(&self) -> Box<dyn UIElementImpl> {
        Box::new(WindowsElement {
            element: self.element.clone(),
            automation: self.automation.clone(),
        })
    }
}

/// Control types scripts are expected to match on get friendly names;
/// everything else keeps the UIA control-type name.
fn map_control_type_to_role(control_type: ControlType) -> String {
    match control_type {
        ControlType::Window => "Window".to_string(),
        ControlType::Button => "Button".to_string(),
        ControlType::Text => "Label".to_string(),
        ControlType::Edit => "Edit".to_string(),
        ControlType::CheckBox => "CheckBox".to_string(),
        ControlType::RadioButton => "RadioButton".to_string(),
        ControlType::ComboBox => "ComboBox".to_string(),
        ControlType::List => "List".to_string(),
        ControlType::ListItem => "ListItem".to_string(),
        ControlType::Menu => "Menu".to_string(),
        ControlType::MenuItem => "MenuItem".to_string(),
        ControlType::Pane => "Pane".to_string(),
        other => other.to_string(),
    }
}

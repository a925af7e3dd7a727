mod collection_tests;
mod mock;

pub use mock::{MockNode, MockProvider};

use std::sync::Once;

static TRACING: Once = Once::new();

// Initialize tracing for tests
pub fn init_tracing() {
    TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};
        fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
            .with_target(true)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A desktop over the classic three-level fixture: one "Notepad" window
/// holding a pane, which holds an "OK" button and two labels.
pub fn notepad_desktop() -> (crate::Desktop, std::sync::Arc<MockProvider>) {
    let window = MockNode::window("Notepad").with_children(vec![MockNode::new("", "Pane")
        .with_children(vec![
            MockNode::new("OK", "Button"),
            MockNode::new("Ready", "Label"),
            MockNode::new("Ln 1, Col 1", "Label"),
        ])]);
    let provider = std::sync::Arc::new(MockProvider::new(vec![window]));
    (
        crate::Desktop::with_provider(provider.clone()),
        provider,
    )
}

#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{Action, DispatchResult, dispatch};
use core_config::Config;
use core_state::EditorState;
use core_text::{AttributeKey, Document, TextRange};

/// Editor state plus config, driven the way a host would drive it.
pub struct Session {
    pub state: EditorState,
    pub config: Config,
}

impl Session {
    pub fn new(text: &str) -> Self {
        let config = Config::default();
        let state = EditorState::with_config(Document::from_text(text), &config);
        Self { state, config }
    }

    pub fn with_config(text: &str, config: Config) -> Self {
        let state = EditorState::with_config(Document::from_text(text), &config);
        Self { state, config }
    }

    pub fn run(&mut self, action: Action) -> DispatchResult {
        dispatch(action, &mut self.state, &self.config, &[])
    }

    pub fn select(&mut self, location: usize, length: usize) {
        self.run(Action::SetSelection(TextRange::new(location, length)));
    }

    /// Type `text` one character at a time at the selection, like a keyboard.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let range = self.state.selection();
            self.run(Action::ReplaceText {
                range,
                text: ch.to_string(),
            });
        }
    }

    pub fn backspace(&mut self) -> DispatchResult {
        let sel = self.state.selection();
        let range = if sel.is_empty() && sel.location > 0 {
            TextRange::new(sel.location - 1, 1)
        } else {
            sel
        };
        self.run(Action::ReplaceText {
            range,
            text: String::new(),
        })
    }

    pub fn text(&self) -> String {
        self.state.document().text()
    }

    pub fn doc(&self) -> &Document {
        self.state.document()
    }
}

/// Ranges carrying `key`, without their values.
pub fn ranges(doc: &Document, key: AttributeKey) -> Vec<TextRange> {
    doc.ranges_with(key).into_iter().map(|(r, _)| r).collect()
}

/// Install a fmt subscriber once so `RUST_LOG` works when debugging tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

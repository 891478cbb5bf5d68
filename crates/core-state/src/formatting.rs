//! Toolbar toggle state read by the attribute resolver.

use core_config::{EditorConfig, MIN_FONT_SIZE};
use core_text::{Color, FontWeight, TextStyle};

/// Points added or removed by one font-size step.
pub const FONT_SIZE_STEP: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code_snippet: bool,
    pub font_size: u16,
    pub font_family: String,
    pub font_weight: FontWeight,
    /// Named text style overriding size and weight; `None` uses the base font.
    pub font_style: Option<TextStyle>,
    pub foreground: Color,
    pub background: Color,
}

impl Default for FormattingState {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl FormattingState {
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            code_snippet: false,
            font_size: cfg.font_size.max(MIN_FONT_SIZE),
            font_family: cfg.font_family.clone(),
            font_weight: FontWeight::Regular,
            font_style: None,
            foreground: cfg.foreground,
            background: cfg.background,
        }
    }

    pub fn increase_font_size(&mut self) {
        self.font_size = self.font_size.saturating_add(FONT_SIZE_STEP);
    }

    /// Shrink by one step, never below `MIN_FONT_SIZE`.
    pub fn decrease_font_size(&mut self) {
        self.font_size = self
            .font_size
            .saturating_sub(FONT_SIZE_STEP)
            .max(MIN_FONT_SIZE);
    }
}

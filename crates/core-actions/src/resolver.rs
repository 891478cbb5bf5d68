//! Attribute resolution from toolbar state.
//!
//! `resolve` composes in a fixed order, later steps winning:
//! 1. base font from family + size + weight
//! 2. named text style replaces size (and weight for headings), family kept
//! 3. bold and italic merged into one trait set on that font
//! 4. underline / strikethrough added, or recorded as keys to clear
//! 5. foreground and background always set
//! 6. code-snippet mode overrides font and both colors
//!
//! The preset helpers below build the fixed presentations used by markup
//! commands and the real-time formatter.

use core_config::ThemeConfig;
use core_state::FormattingState;
use core_text::{AttributeKey, AttributeSet, Font, FontTraits};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedAttributes {
    /// Keys to set over the target range.
    pub attributes: AttributeSet,
    /// Keys toggled off that must be removed from the target range.
    pub cleared: Vec<AttributeKey>,
}

pub fn resolve(state: &FormattingState, theme: &ThemeConfig) -> ResolvedAttributes {
    let mut font = body_font(state);
    if let Some(style) = state.font_style {
        font = font.with_size(style.point_size());
        if let Some(weight) = style.weight() {
            font = font.with_weight(weight);
        }
    }

    let mut traits = FontTraits::empty();
    traits.set(FontTraits::BOLD, state.bold);
    traits.set(FontTraits::ITALIC, state.italic);
    font = font.with_traits(traits);

    let mut attributes = AttributeSet::new();
    let mut cleared = Vec::new();
    if state.underline {
        attributes = attributes.with_underline();
    } else {
        cleared.push(AttributeKey::Underline);
    }
    if state.strikethrough {
        attributes = attributes.with_strikethrough();
    } else {
        cleared.push(AttributeKey::Strikethrough);
    }

    let (font, foreground, background) = if state.code_snippet {
        (code_font(theme), theme.code_foreground, theme.code_background)
    } else {
        (font, state.foreground, state.background)
    };
    attributes = attributes
        .with_font(font)
        .with_foreground(foreground)
        .with_background(background);

    ResolvedAttributes {
        attributes,
        cleared,
    }
}

/// Selected family, size and weight with no traits or named style.
pub fn body_font(state: &FormattingState) -> Font {
    Font::new(state.font_family.clone(), state.font_size).with_weight(state.font_weight)
}

pub fn code_font(theme: &ThemeConfig) -> Font {
    Font::new(theme.code_font_family.clone(), theme.code_font_size)
        .with_traits(FontTraits::MONOSPACE)
}

pub fn hashtag_attributes(state: &FormattingState, theme: &ThemeConfig) -> AttributeSet {
    AttributeSet::new()
        .with_font(body_font(state))
        .with_foreground(theme.hashtag)
}

/// Interior of a real-time matched quote pair.
pub fn quote_interior_attributes(state: &FormattingState, theme: &ThemeConfig) -> AttributeSet {
    AttributeSet::new()
        .with_font(body_font(state))
        .with_foreground(theme.quote)
}

/// Explicitly quoted text: gray italic at the quote size.
pub fn quote_attributes(state: &FormattingState, theme: &ThemeConfig) -> AttributeSet {
    let font = Font::new(state.font_family.clone(), theme.quote_font_size)
        .with_traits(FontTraits::ITALIC);
    AttributeSet::new()
        .with_font(font)
        .with_foreground(theme.quote)
}

pub fn code_attributes(theme: &ThemeConfig) -> AttributeSet {
    AttributeSet::new()
        .with_font(code_font(theme))
        .with_foreground(theme.code_foreground)
        .with_background(theme.code_background)
}

pub fn angle_bracket_attributes(state: &FormattingState, theme: &ThemeConfig) -> AttributeSet {
    let font = Font::new(state.font_family.clone(), state.font_size)
        .with_traits(FontTraits::ITALIC);
    AttributeSet::new()
        .with_font(font)
        .with_foreground(theme.angle_bracket)
}

pub fn link_attributes(target: &str, theme: &ThemeConfig) -> AttributeSet {
    AttributeSet::new()
        .with_link(target)
        .with_underline()
        .with_foreground(theme.hyperlink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::{Color, FontWeight, TextStyle};
    use pretty_assertions::assert_eq;

    fn theme() -> ThemeConfig {
        ThemeConfig::default()
    }

    #[test]
    fn defaults_resolve_to_plain_black_on_white() {
        let r = resolve(&FormattingState::default(), &theme());
        let font = r.attributes.font().unwrap();
        assert_eq!(font.family, "System");
        assert_eq!(font.size, 14);
        assert!(font.traits.is_empty());
        assert_eq!(r.attributes.foreground(), Some(Color::BLACK));
        assert_eq!(r.attributes.background(), Some(Color::WHITE));
        assert_eq!(
            r.cleared,
            vec![AttributeKey::Underline, AttributeKey::Strikethrough]
        );
    }

    #[test]
    fn bold_and_italic_combine() {
        let st = FormattingState {
            bold: true,
            italic: true,
            ..FormattingState::default()
        };
        let r = resolve(&st, &theme());
        let font = r.attributes.font().unwrap();
        assert!(font.is_bold());
        assert!(font.is_italic());
    }

    #[test]
    fn underline_and_strike_are_independent_of_font() {
        let st = FormattingState {
            underline: true,
            strikethrough: true,
            ..FormattingState::default()
        };
        let r = resolve(&st, &theme());
        assert!(r.attributes.is_underlined());
        assert!(r.attributes.is_struck());
        assert!(r.cleared.is_empty());
        assert!(r.attributes.font().unwrap().traits.is_empty());
    }

    #[test]
    fn named_style_overrides_metrics_but_keeps_family() {
        let st = FormattingState {
            font_family: "Georgia".into(),
            font_style: Some(TextStyle::Heading),
            bold: true,
            ..FormattingState::default()
        };
        let font = resolve(&st, &theme()).attributes.font().cloned().unwrap();
        assert_eq!(font.family, "Georgia");
        assert_eq!(font.size, 17);
        assert_eq!(font.weight, FontWeight::Semibold);
        assert!(font.is_bold());
    }

    #[test]
    fn code_mode_wins_over_manual_colors_and_font() {
        let st = FormattingState {
            code_snippet: true,
            bold: true,
            foreground: Color::rgb(255, 0, 0),
            background: Color::rgb(0, 255, 0),
            ..FormattingState::default()
        };
        let t = theme();
        let r = resolve(&st, &t);
        let font = r.attributes.font().unwrap();
        assert_eq!(font.family, "Courier");
        assert!(font.traits.contains(FontTraits::MONOSPACE));
        assert!(!font.is_bold());
        assert_eq!(r.attributes.foreground(), Some(t.code_foreground));
        assert_eq!(r.attributes.background(), Some(t.code_background));
    }

    #[test]
    fn link_preset_carries_target_and_underline() {
        let a = link_attributes("https://example.com", &theme());
        assert_eq!(a.link(), Some("https://example.com"));
        assert!(a.is_underlined());
    }
}

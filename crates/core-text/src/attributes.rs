//! Attribute vocabulary: keys, values, colors, fonts and paragraph styles.
//!
//! Values are plain data with value equality so whole documents can be
//! compared (undo dedup) and hashed. Nothing here knows how to render; a host
//! maps these onto its own text toolkit.

use bitflags::bitflags;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Attribute channel. Runs of the same key never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKey {
    Font,
    ForegroundColor,
    BackgroundColor,
    Underline,
    Strikethrough,
    Link,
    Paragraph,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 7] = [
        AttributeKey::Font,
        AttributeKey::ForegroundColor,
        AttributeKey::BackgroundColor,
        AttributeKey::Underline,
        AttributeKey::Strikethrough,
        AttributeKey::Link,
        AttributeKey::Paragraph,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    Font(Font),
    Color(Color),
    Line(LineStyle),
    /// Absolute, normalized link target.
    Link(String),
    Paragraph(ParagraphStyle),
}

/// Decoration style for underline / strikethrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Single,
}

// -------------------------------------------------------------------------------------------------
// Colors
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 6 or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// 8-bit RGBA color. Deserializes from `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const SYSTEM_GRAY: Color = Color::rgb(142, 142, 147);
    pub const DARK_GRAY: Color = Color::rgb(85, 85, 85);
    pub const LIGHT_GRAY: Color = Color::rgb(170, 170, 170);
    pub const LINK: Color = Color::rgb(0, 122, 255);
    pub const CODE_BACKGROUND: Color = Color::rgb(242, 242, 247);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let trimmed = s.trim();
        let Some(hex) = trimmed.strip_prefix('#') else {
            return Err(ColorParseError::MissingHash(s.to_string()));
        };
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::BadLength(s.to_string()));
        }
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ColorParseError::BadDigit(s.to_string()))
        };
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Fonts
// -------------------------------------------------------------------------------------------------

bitflags! {
    /// Symbolic traits combined onto a resolved font. Bold and italic may both be set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FontTraits: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const MONOSPACE = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    pub const ALL: [FontWeight; 9] = [
        FontWeight::UltraLight,
        FontWeight::Thin,
        FontWeight::Light,
        FontWeight::Regular,
        FontWeight::Medium,
        FontWeight::Semibold,
        FontWeight::Bold,
        FontWeight::Heavy,
        FontWeight::Black,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontWeight::UltraLight => "UltraLight",
            FontWeight::Thin => "Thin",
            FontWeight::Light => "Light",
            FontWeight::Regular => "Regular",
            FontWeight::Medium => "Medium",
            FontWeight::Semibold => "Semibold",
            FontWeight::Bold => "Bold",
            FontWeight::Heavy => "Heavy",
            FontWeight::Black => "Black",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
    }
}

/// Named text styles. Each replaces the base size (and for headings the
/// weight) while keeping the chosen family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    LargeTitle,
    Title,
    Title2,
    Title3,
    Heading,
    Subheading,
    Body,
    Footnote,
    Caption,
    Caption2,
}

impl TextStyle {
    pub const ALL: [TextStyle; 10] = [
        TextStyle::LargeTitle,
        TextStyle::Title,
        TextStyle::Title2,
        TextStyle::Title3,
        TextStyle::Heading,
        TextStyle::Subheading,
        TextStyle::Body,
        TextStyle::Footnote,
        TextStyle::Caption,
        TextStyle::Caption2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TextStyle::LargeTitle => "Large Title",
            TextStyle::Title => "Title",
            TextStyle::Title2 => "Title2",
            TextStyle::Title3 => "Title3",
            TextStyle::Heading => "Heading",
            TextStyle::Subheading => "Subheading",
            TextStyle::Body => "Body",
            TextStyle::Footnote => "Footnote",
            TextStyle::Caption => "Caption",
            TextStyle::Caption2 => "Caption2",
        }
    }

    /// Lookup ignoring case and spaces ("Large Title" == "largetitle").
    pub fn from_name(name: &str) -> Option<Self> {
        let squash = |s: &str| {
            s.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
        };
        let wanted = squash(name);
        Self::ALL.into_iter().find(|s| squash(s.name()) == wanted)
    }

    pub fn point_size(self) -> u16 {
        match self {
            TextStyle::LargeTitle => 34,
            TextStyle::Title => 28,
            TextStyle::Title2 => 22,
            TextStyle::Title3 => 20,
            TextStyle::Heading => 17,
            TextStyle::Subheading => 15,
            TextStyle::Body => 17,
            TextStyle::Footnote => 13,
            TextStyle::Caption => 12,
            TextStyle::Caption2 => 11,
        }
    }

    /// Weight implied by the style, if it overrides the selected one.
    pub fn weight(self) -> Option<FontWeight> {
        match self {
            TextStyle::Heading => Some(FontWeight::Semibold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    pub family: String,
    pub size: u16,
    pub weight: FontWeight,
    pub traits: FontTraits,
}

impl Font {
    pub fn new(family: impl Into<String>, size: u16) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Regular,
            traits: FontTraits::empty(),
        }
    }

    pub fn with_size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_traits(mut self, traits: FontTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.traits.contains(FontTraits::BOLD)
    }

    pub fn is_italic(&self) -> bool {
        self.traits.contains(FontTraits::ITALIC)
    }
}

// -------------------------------------------------------------------------------------------------
// Paragraphs
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Paragraph-level layout hints. Indents are in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParagraphStyle {
    pub alignment: Alignment,
    pub first_line_head_indent: u16,
    pub head_indent: u16,
}

// -------------------------------------------------------------------------------------------------
// Attribute sets
// -------------------------------------------------------------------------------------------------

/// Key → value map applied over a range. Applying a set touches only the keys
/// it contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeSet {
    entries: BTreeMap<AttributeKey, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AttributeKey, value: AttributeValue) -> Option<AttributeValue> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: AttributeKey) -> Option<AttributeValue> {
        self.entries.remove(&key)
    }

    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: AttributeKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.entries.insert(AttributeKey::Font, AttributeValue::Font(font));
        self
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.entries
            .insert(AttributeKey::ForegroundColor, AttributeValue::Color(color));
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.entries
            .insert(AttributeKey::BackgroundColor, AttributeValue::Color(color));
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.entries.insert(
            AttributeKey::Underline,
            AttributeValue::Line(LineStyle::Single),
        );
        self
    }

    pub fn with_strikethrough(mut self) -> Self {
        self.entries.insert(
            AttributeKey::Strikethrough,
            AttributeValue::Line(LineStyle::Single),
        );
        self
    }

    pub fn with_link(mut self, target: impl Into<String>) -> Self {
        self.entries
            .insert(AttributeKey::Link, AttributeValue::Link(target.into()));
        self
    }

    pub fn with_paragraph(mut self, style: ParagraphStyle) -> Self {
        self.entries
            .insert(AttributeKey::Paragraph, AttributeValue::Paragraph(style));
        self
    }

    pub fn font(&self) -> Option<&Font> {
        match self.entries.get(&AttributeKey::Font) {
            Some(AttributeValue::Font(f)) => Some(f),
            _ => None,
        }
    }

    pub fn foreground(&self) -> Option<Color> {
        match self.entries.get(&AttributeKey::ForegroundColor) {
            Some(AttributeValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn background(&self) -> Option<Color> {
        match self.entries.get(&AttributeKey::BackgroundColor) {
            Some(AttributeValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<&str> {
        match self.entries.get(&AttributeKey::Link) {
            Some(AttributeValue::Link(url)) => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn paragraph(&self) -> Option<ParagraphStyle> {
        match self.entries.get(&AttributeKey::Paragraph) {
            Some(AttributeValue::Paragraph(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn is_underlined(&self) -> bool {
        self.contains(AttributeKey::Underline)
    }

    pub fn is_struck(&self) -> bool {
        self.contains(AttributeKey::Strikethrough)
    }
}

impl FromIterator<(AttributeKey, AttributeValue)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (AttributeKey, AttributeValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_round_trip_forms() {
        assert_eq!(Color::from_hex("#FF8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(
            Color::from_hex("#00000080").unwrap(),
            Color::rgba(0, 0, 0, 128)
        );
        assert_eq!(Color::rgb(0, 122, 255).to_string(), "#007AFF");
    }

    #[test]
    fn color_hex_rejects_garbage() {
        assert!(matches!(
            Color::from_hex("FF8000"),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            Color::from_hex("#FFF"),
            Err(ColorParseError::BadLength(_))
        ));
        assert!(matches!(
            Color::from_hex("#GG0000"),
            Err(ColorParseError::BadDigit(_))
        ));
    }

    #[test]
    fn weight_and_style_names_resolve() {
        assert_eq!(FontWeight::from_name("semibold"), Some(FontWeight::Semibold));
        assert_eq!(FontWeight::from_name("Condensed"), None);
        assert_eq!(TextStyle::from_name("Large Title"), Some(TextStyle::LargeTitle));
        assert_eq!(TextStyle::from_name("largetitle"), Some(TextStyle::LargeTitle));
        assert_eq!(TextStyle::from_name("Caption2"), Some(TextStyle::Caption2));
        assert_eq!(TextStyle::Heading.weight(), Some(FontWeight::Semibold));
    }

    #[test]
    fn set_builders_fill_typed_getters() {
        let set = AttributeSet::new()
            .with_font(Font::new("Courier", 14))
            .with_foreground(Color::LINK)
            .with_underline()
            .with_link("https://example.com");
        assert_eq!(set.font().map(|f| f.family.as_str()), Some("Courier"));
        assert_eq!(set.foreground(), Some(Color::LINK));
        assert!(set.is_underlined());
        assert!(!set.is_struck());
        assert_eq!(set.link(), Some("https://example.com"));
        assert_eq!(set.len(), 4);
    }
}

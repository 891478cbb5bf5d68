//! Line-oriented edit scripts.
//!
//! Each line names one command, which `ScriptParser` classifies into a
//! `ParsedCommand`. Most map straight onto an `Action`; host-style typing
//! and backspace need the current selection, and images need their bytes
//! loaded, so those stay distinct for the caller to resolve.
//!
//! ```text
//! # comment
//! type Hello\nworld        (\n, \t and \\ are unescaped; the rest is literal)
//! select 0 5               (location length)
//! caret 3
//! bold | italic | underline | strike | font-size-up | font-size-down
//! fg #FF0000 | bg #FFFFFF | font Menlo | weight bold | style title2
//! align center | indent | outdent | bullets | numbers | return
//! quote | hashtag | code | code-snippet | angle-brackets
//! link example.com [text]  | image 640x480 [path] | file path
//! undo | redo | show camera | dismiss camera
//! ```
//!
//! Parsing is pure; malformed lines come back as `ParsedCommand::Unknown`.

use crate::Action;
use core_events::PickerKind;
use core_text::{Alignment, Color, FileAttachment, FontWeight, TextRange, TextStyle};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Action(Action),
    /// Replace the current selection with this text, like host typing.
    Type(String),
    /// Delete the selection, or the character before the caret.
    Backspace,
    Image {
        width: u32,
        height: u32,
        path: Option<PathBuf>,
    },
    Empty,
    Unknown(String),
}

pub struct ScriptParser;

impl ScriptParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let line = raw.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return ParsedCommand::Empty;
        }
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r),
            None => (trimmed, ""),
        };
        // `type` keeps its payload verbatim apart from escapes.
        if word == "type" {
            return ParsedCommand::Type(unescape(rest));
        }
        let args = rest.trim();
        Self::parse_command(word, args).unwrap_or_else(|| ParsedCommand::Unknown(trimmed.to_string()))
    }

    fn parse_command(word: &str, args: &str) -> Option<ParsedCommand> {
        let action = match (word, args) {
            ("newline", "") => return Some(ParsedCommand::Type("\n".into())),
            ("backspace", "") => return Some(ParsedCommand::Backspace),
            ("image", _) => return parse_image(args),

            ("select", _) => {
                let (loc, len) = args.split_once(char::is_whitespace)?;
                Action::SetSelection(TextRange::new(loc.parse().ok()?, len.trim().parse().ok()?))
            }
            ("caret", _) => Action::SetSelection(TextRange::caret(args.parse().ok()?)),
            ("bold", "") => Action::ToggleBold,
            ("italic", "") => Action::ToggleItalic,
            ("underline", "") => Action::ToggleUnderline,
            ("strike", "") => Action::ToggleStrikethrough,
            ("font-size-up", "") => Action::IncreaseFontSize,
            ("font-size-down", "") => Action::DecreaseFontSize,
            ("fg", _) => Action::SetForegroundColor(Color::from_hex(args).ok()?),
            ("bg", _) => Action::SetBackgroundColor(Color::from_hex(args).ok()?),
            ("font", _) if !args.is_empty() => Action::SetFontFamily(args.to_string()),
            ("weight", _) => Action::SetFontWeight(FontWeight::from_name(args)?),
            ("style", _) => Action::SetFontStyle(TextStyle::from_name(args)?),
            ("apply", "") => Action::ApplyFormatting,
            ("align", _) => Action::Align(parse_alignment(args)?),
            ("indent", "") => Action::Indent,
            ("outdent", "") => Action::Outdent,
            ("bullets", "") => Action::ToggleBulletList,
            ("numbers", "") => Action::ToggleNumberedList,
            ("return", "") => Action::ReturnKey,
            ("quote", "") => Action::ToggleQuote,
            ("hashtag", "") => Action::ToggleHashtag,
            ("code", "") => Action::ToggleCodeSnippet,
            ("code-snippet", "") => Action::AddCodeSnippet,
            ("angle-brackets", "") => Action::StyleAngleBrackets,
            ("link", _) if !args.is_empty() => {
                let (url, text) = match args.split_once(char::is_whitespace) {
                    Some((u, t)) => (u, Some(t.trim().to_string())),
                    None => (args, None),
                };
                Action::AddHyperlink {
                    url: url.to_string(),
                    text,
                }
            }
            ("file", _) if !args.is_empty() => Action::InsertFile(FileAttachment::from_path(args)),
            ("undo", "") => Action::Undo,
            ("redo", "") => Action::Redo,
            ("show", _) => Action::ShowPicker(parse_picker(args)?),
            ("dismiss", _) => Action::DismissPicker(parse_picker(args)?),
            _ => return None,
        };
        Some(ParsedCommand::Action(action))
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_image(args: &str) -> Option<ParsedCommand> {
    let (size, path) = match args.split_once(char::is_whitespace) {
        Some((s, p)) => (s, Some(PathBuf::from(p.trim()))),
        None => (args, None),
    };
    let (w, h) = size.split_once(['x', 'X'])?;
    Some(ParsedCommand::Image {
        width: w.parse().ok()?,
        height: h.parse().ok()?,
        path,
    })
}

fn parse_alignment(s: &str) -> Option<Alignment> {
    match s.to_ascii_lowercase().as_str() {
        "left" => Some(Alignment::Left),
        "center" | "centre" => Some(Alignment::Center),
        "right" => Some(Alignment::Right),
        _ => None,
    }
}

fn parse_picker(s: &str) -> Option<PickerKind> {
    Some(match s {
        "text-color" => PickerKind::TextColor,
        "background-color" => PickerKind::BackgroundColor,
        "font-menu" => PickerKind::FontMenu,
        "indent-menu" => PickerKind::IndentMenu,
        "file" => PickerKind::File,
        "camera" => PickerKind::Camera,
        "photo-library" => PickerKind::PhotoLibrary,
        "image-dropdown" => PickerKind::ImageDropdown,
        "hyperlink" => PickerKind::Hyperlink,
        _ => return None,
    })
}

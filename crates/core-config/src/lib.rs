//! Configuration loading and parsing.
//!
//! Parses `richtext.toml` (or an override path supplied by the host) into a
//! `ConfigFile`. Every section and field is optional; absent values take the
//! defaults below, and unknown fields are ignored so hosts can carry their own
//! keys in the same file.
//!
//! ```toml
//! [editor]
//! font_family = "Helvetica"
//! font_size = 16
//! foreground = "#000000"
//! background = "#FFFFFF"
//!
//! [undo]
//! history_limit = 500      # absent or 0 = unbounded
//!
//! [image]
//! max_width = 320          # widest rendered image, further clamped to the host
//!
//! [theme]
//! hashtag = "#555555"
//! hyperlink = "#007AFF"
//! quote = "#8E8E93"
//! angle_bracket = "#8E8E93"
//! code_foreground = "#1C1C1E"
//! code_background = "#F2F2F7"
//! code_font_family = "Courier"
//! code_font_size = 14
//! quote_font_size = 14
//! ```
//!
//! The raw image width is kept alongside the effective one: the host reports
//! its content width through `HostContext` and `Config::apply_context`
//! clamps, so later resizes can re-clamp from the raw value.

use anyhow::Result;
use core_text::Color;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Smallest font size the editor will produce.
pub const MIN_FONT_SIZE: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostContext {
    /// Width of the hosting text widget in points.
    pub width: u32,
    /// Horizontal padding applied on each side of the text container.
    pub horizontal_inset: u32,
}

impl HostContext {
    pub fn new(width: u32, horizontal_inset: u32) -> Self {
        Self {
            width,
            horizontal_inset,
        }
    }

    pub fn content_width(&self) -> u32 {
        self.width
            .saturating_sub(self.horizontal_inset.saturating_mul(2))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_font_family")]
    pub font_family: String,
    #[serde(default = "EditorConfig::default_font_size")]
    pub font_size: u16,
    #[serde(default = "EditorConfig::default_foreground")]
    pub foreground: Color,
    #[serde(default = "EditorConfig::default_background")]
    pub background: Color,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_family: Self::default_font_family(),
            font_size: Self::default_font_size(),
            foreground: Self::default_foreground(),
            background: Self::default_background(),
        }
    }
}

impl EditorConfig {
    fn default_font_family() -> String {
        "System".to_string()
    }
    const fn default_font_size() -> u16 {
        14
    }
    const fn default_foreground() -> Color {
        Color::BLACK
    }
    const fn default_background() -> Color {
        Color::WHITE
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct UndoConfig {
    #[serde(default)]
    pub history_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "ImageConfig::default_max_width")]
    pub max_width: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: Self::default_max_width(),
        }
    }
}

impl ImageConfig {
    const fn default_max_width() -> u32 {
        320
    }
}

/// Colors and fonts the engine stamps onto markup it recognizes.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeConfig {
    pub hashtag: Color,
    pub hyperlink: Color,
    pub quote: Color,
    pub angle_bracket: Color,
    pub code_foreground: Color,
    pub code_background: Color,
    pub code_font_family: String,
    pub code_font_size: u16,
    pub quote_font_size: u16,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            hashtag: Color::DARK_GRAY,
            hyperlink: Color::LINK,
            quote: Color::SYSTEM_GRAY,
            angle_bracket: Color::SYSTEM_GRAY,
            code_foreground: Color::rgb(28, 28, 30),
            code_background: Color::CODE_BACKGROUND,
            code_font_family: "Courier".to_string(),
            code_font_size: 14,
            quote_font_size: 14,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub undo: UndoConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>,       // original file string (optional)
    pub file: ConfigFile,          // parsed (or default) data
    pub effective_image_width: u32, // clamped to host semantics
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), None)
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("richtext.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("richtext").join("richtext.toml");
    }
    PathBuf::from("richtext.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    parse_str(&content).or_else(|e| {
        // Parse errors fall back to defaults so a bad file never blocks editing.
        warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
        Ok(Config::default())
    })
}

/// Parse a config from an in-memory TOML string.
pub fn parse_str(content: &str) -> Result<Config> {
    let file = toml::from_str::<ConfigFile>(content)?;
    Ok(Config::from_file(file, Some(content.to_string())))
}

impl Config {
    fn from_file(file: ConfigFile, raw: Option<String>) -> Self {
        let effective_image_width = file.image.max_width.max(1);
        Self {
            raw,
            file,
            effective_image_width,
        }
    }

    /// Undo bound; `None` means unbounded (also for an explicit `0`).
    pub fn undo_limit(&self) -> Option<usize> {
        self.file.undo.history_limit.filter(|n| *n > 0)
    }

    /// Configured base font size, floored at `MIN_FONT_SIZE`.
    pub fn font_size(&self) -> u16 {
        self.file.editor.font_size.max(MIN_FONT_SIZE)
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.file.theme
    }

    /// Apply host metrics to compute the widest image the editor will insert.
    /// Returns the effective (possibly clamped) value.
    pub fn apply_context(&mut self, ctx: HostContext) -> u32 {
        let raw = self.file.image.max_width;
        let content = ctx.content_width();
        let clamped = if content == 0 { raw } else { raw.min(content) }.max(1);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                content_width = content,
                host_width = ctx.width,
                horizontal_inset = ctx.horizontal_inset,
                "image_max_width_clamped"
            );
        }
        self.effective_image_width = clamped;
        clamped
    }

    /// Recompute the effective image width after a host resize. Returns
    /// `Some(new_width)` when the effective value changed, else `None`.
    pub fn recompute_with_context(&mut self, ctx: HostContext) -> Option<u32> {
        let prev = self.effective_image_width;
        let current = self.apply_context(ctx);
        if current != prev { Some(current) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn capture<F: FnOnce()>(level: Level, f: F) -> String {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();
        with_default(subscriber, f);
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file.editor.font_family, "System");
        assert_eq!(cfg.font_size(), 14);
        assert_eq!(cfg.file.editor.foreground, Color::BLACK);
        assert_eq!(cfg.file.editor.background, Color::WHITE);
        assert_eq!(cfg.undo_limit(), None);
        assert_eq!(cfg.effective_image_width, 320);
        assert_eq!(cfg.theme(), &ThemeConfig::default());
    }

    #[test]
    fn parses_all_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editor]\nfont_family = \"Helvetica\"\nfont_size = 18\nforeground = \"#112233\"\n\
             [undo]\nhistory_limit = 50\n\
             [image]\nmax_width = 640\n\
             [theme]\nhashtag = \"#FF0000\"\ncode_font_family = \"Menlo\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.editor.font_family, "Helvetica");
        assert_eq!(cfg.font_size(), 18);
        assert_eq!(cfg.file.editor.foreground, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(cfg.file.editor.background, Color::WHITE);
        assert_eq!(cfg.undo_limit(), Some(50));
        assert_eq!(cfg.effective_image_width, 640);
        assert_eq!(cfg.theme().hashtag, Color::rgb(255, 0, 0));
        assert_eq!(cfg.theme().code_font_family, "Menlo");
        // untouched theme fields keep defaults
        assert_eq!(cfg.theme().hyperlink, Color::LINK);
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn zero_history_limit_means_unbounded() {
        let cfg = parse_str("[undo]\nhistory_limit = 0\n").unwrap();
        assert_eq!(cfg.undo_limit(), None);
    }

    #[test]
    fn tiny_font_size_is_floored() {
        let cfg = parse_str("[editor]\nfont_size = 0\n").unwrap();
        assert_eq!(cfg.font_size(), MIN_FONT_SIZE);
    }

    #[test]
    fn bad_color_falls_back_to_defaults_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[theme]\nhashtag = \"red\"\n").unwrap();
        let path = tmp.path().to_path_buf();
        let mut cfg = None;
        let log = capture(Level::WARN, || {
            cfg = Some(load_from(Some(path)).unwrap());
        });
        let cfg = cfg.unwrap();
        assert_eq!(cfg.theme().hashtag, Color::DARK_GRAY);
        assert!(cfg.raw.is_none());
        assert!(log.contains("WARN config:"));
        assert!(log.contains("config_parse_failed"));
    }

    #[test]
    fn host_width_clamps_image_width() {
        let mut cfg = parse_str("[image]\nmax_width = 600\n").unwrap();
        // 400 wide host with 16pt insets -> 368 usable
        let eff = cfg.apply_context(HostContext::new(400, 16));
        assert_eq!(eff, 368);
        assert_eq!(cfg.effective_image_width, 368);
        // unknown host width keeps the configured value
        assert_eq!(cfg.apply_context(HostContext::default()), 600);
    }

    #[test]
    fn recompute_reports_only_changes() {
        let mut cfg = parse_str("[image]\nmax_width = 300\n").unwrap();
        cfg.apply_context(HostContext::new(1000, 0));
        assert_eq!(cfg.effective_image_width, 300);
        assert_eq!(cfg.recompute_with_context(HostContext::new(200, 0)), Some(200));
        assert_eq!(cfg.recompute_with_context(HostContext::new(200, 0)), None);
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let mut cfg = parse_str("[image]\nmax_width = 800\n").unwrap();
        let log = capture(Level::INFO, || {
            cfg.apply_context(HostContext::new(375, 20));
        });
        assert!(log.contains("INFO config:"));
        assert!(log.contains("image_max_width_clamped"));
        assert_eq!(cfg.effective_image_width, 335);
    }
}

//! richtext entrypoint: replay an edit script against the engine and print
//! the resulting attributed document.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_actions::{ParsedCommand, ScriptParser};
use core_config::load_from;
use core_events::{Event, PickerKind, PickerResult};
use core_model::EditorModel;
use core_text::{Attachment, Document, ImageAttachment};
use std::fmt::{self, Write as _};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "richtext", version, about = "Replay rich-text edit scripts")]
struct Args {
    /// Edit script to replay. Read from stdin when omitted.
    pub script: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `richtext.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Plain-text file to start from instead of an empty document.
    #[arg(long = "open")]
    pub open: Option<PathBuf>,
    /// Host widget width in points; inserted images are clamped to it.
    #[arg(long = "width")]
    pub width: Option<u32>,
    #[arg(long = "inset", default_value_t = 0)]
    pub inset: u32,
    /// Fail on the first line that does not parse instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReplayStats {
    lines: usize,
    applied: usize,
    skipped: usize,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("richtext.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "richtext.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    // Fails only if a global subscriber is already installed; the guard is
    // dropped then so the writer shuts down.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Run the photo-library picker flow: bytes load on a runtime task that
/// completes the picker, and the result is applied back here on poll.
async fn insert_image(
    model: &mut EditorModel,
    width: u32,
    height: u32,
    path: Option<PathBuf>,
) -> Result<bool> {
    let responder = model.open_picker(PickerKind::PhotoLibrary);
    let loader = tokio::spawn(async move {
        let data = match &path {
            Some(p) => tokio::fs::read(p)
                .await
                .with_context(|| format!("reading image {}", p.display()))?,
            None => Vec::new(),
        };
        responder.complete(PickerResult::Image(ImageAttachment::new(data, width, height)));
        anyhow::Ok(())
    });
    if let Err(e) = loader.await.context("image loader task")? {
        warn!(target: "runtime.script", error = %e, "image_load_failed");
    }
    Ok(model.poll_pickers().changes.contains(core_events::ChangeFlags::TEXT))
}

async fn replay(
    model: &mut EditorModel,
    script: impl BufRead,
    base: &Path,
    strict: bool,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (idx, line) in script.lines().enumerate() {
        let line = line.with_context(|| format!("reading script line {}", idx + 1))?;
        stats.lines += 1;
        let changed = match ScriptParser::parse(&line) {
            ParsedCommand::Empty => continue,
            ParsedCommand::Unknown(cmd) => {
                if strict {
                    bail!("line {}: unknown command {cmd:?}", idx + 1);
                }
                warn!(target: "runtime.script", line = idx + 1, command = %cmd, "unknown_command");
                false
            }
            ParsedCommand::Action(action) => model.dispatch(action).is_dirty(),
            ParsedCommand::Type(text) => {
                let mut any = false;
                let mut buf = [0u8; 4];
                for ch in text.chars() {
                    any |= model.type_text(ch.encode_utf8(&mut buf)).is_dirty();
                }
                any
            }
            ParsedCommand::Backspace => model.backspace().is_dirty(),
            ParsedCommand::Image {
                width,
                height,
                path,
            } => insert_image(model, width, height, path.map(|p| base.join(p))).await?,
        };
        if changed {
            stats.applied += 1;
        } else {
            stats.skipped += 1;
        }
    }
    Ok(stats)
}

fn render_document(doc: &Document) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{:?}", doc.text())?;
    for (key, run) in doc.runs().iter() {
        writeln!(out, "  {key:?} {}..{} {:?}", run.start, run.end(), run.value)?;
    }
    for (at, attachment) in doc.attachments() {
        match attachment {
            Attachment::Image(img) => writeln!(
                out,
                "  @{at} image {}x{} ({} bytes)",
                img.width,
                img.height,
                img.data.len()
            )?,
            Attachment::File(file) => writeln!(out, "  @{at} {}", file.label())?,
        }
    }
    Ok(out)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let document = match &args.open {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("opening {}", path.display()))?;
            Document::from_text(&text)
        }
        None => Document::new(),
    };
    let mut model = EditorModel::new(document, config);
    if let Some(width) = args.width {
        model.handle_event(Event::HostResized {
            width,
            horizontal_inset: args.inset,
        });
    }

    let stats = match &args.script {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            replay(&mut model, BufReader::new(file), &base, args.strict).await?
        }
        None => replay(&mut model, std::io::stdin().lock(), Path::new("."), args.strict).await?,
    };
    info!(
        target: "runtime",
        lines = stats.lines,
        applied = stats.applied,
        skipped = stats.skipped,
        "replay_complete"
    );

    print!("{}", render_document(model.document())?);
    let sel = model.selection();
    println!(
        "selection {}+{} undo {} redo {}",
        sel.location,
        sel.length,
        model.state().undo_depth(),
        model.state().redo_depth()
    );
    Ok(())
}

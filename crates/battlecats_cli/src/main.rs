use std::fs;
use std::path::PathBuf;
use std::process;

use battlecats_core::chapter::{LOGICAL_CHAPTER_COUNT, chapter_name};
use battlecats_core::core_api::{CountryCode, Engine, Host, Session};
use battlecats_core::editor::{BulkReport, StageEdit};
use battlecats_core::progress::MAX_CHAPTER_PROGRESS;
use battlecats_render::{
    JsonStyle, TextRenderOptions, render_json_full_with_options, render_story_table_with_options,
};
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChapterSelection {
    All,
    Listed(Vec<usize>),
}

impl ChapterSelection {
    /// 0-based logical indices.
    fn logical_indices(&self) -> Vec<usize> {
        match self {
            Self::All => (0..LOGICAL_CHAPTER_COUNT).collect(),
            Self::Listed(ordinals) => ordinals.iter().map(|n| n - 1).collect(),
        }
    }
}

/// 1-based stage ordinals in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StageList(Vec<usize>);

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("edit").multiple(false)))]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long, value_name = "en|jp|kr|tw", value_parser = parse_country)]
    country: Option<CountryCode>,
    #[arg(long, value_name = "1,2,5|all", value_parser = parse_chapters)]
    chapters: Option<ChapterSelection>,
    #[arg(long, value_name = "1-10,12", value_parser = parse_stages, requires = "set_clears")]
    stages: Option<StageList>,
    #[arg(long = "set-clears", value_name = "N", group = "edit")]
    set_clears: Option<u32>,
    #[arg(
        long = "clear-up-to",
        value_name = "P",
        allow_hyphen_values = true,
        group = "edit"
    )]
    clear_up_to: Option<i64>,
    #[arg(long = "clear-chapters", group = "edit")]
    clear_chapters: bool,
    #[arg(long = "reset-chapters", group = "edit")]
    reset_chapters: bool,
    /// Include per-stage clear counts in the output.
    #[arg(long)]
    verbose: bool,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoryEdit {
    SetClears { stages: Vec<usize>, value: u32 },
    ClearUpTo(i64),
    ClearChapters,
    ResetChapters,
}

impl Cli {
    fn requested_edit(&self) -> Option<StoryEdit> {
        if let Some(value) = self.set_clears {
            let stages = match &self.stages {
                Some(StageList(stages)) => stages.clone(),
                None => (1..=MAX_CHAPTER_PROGRESS as usize).collect(),
            };
            return Some(StoryEdit::SetClears { stages, value });
        }
        if let Some(progress) = self.clear_up_to {
            return Some(StoryEdit::ClearUpTo(progress));
        }
        if self.clear_chapters {
            return Some(StoryEdit::ClearChapters);
        }
        if self.reset_chapters {
            return Some(StoryEdit::ResetChapters);
        }
        None
    }
}

/// Prints core progress messages to stderr so stdout stays parseable.
struct TerminalHost;

impl Host for TerminalHost {
    fn output(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let edit = cli.requested_edit();

    if edit.is_some() && cli.output.is_none() {
        eprintln!("edit flags require --output <PATH>");
        process::exit(2);
    }
    if edit.is_none() && cli.output.is_some() {
        eprintln!("--output requires an edit flag");
        process::exit(2);
    }
    if edit.is_some() && cli.chapters.is_none() {
        eprintln!("edit flags require --chapters <1,2,5|all>");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let engine = Engine::new().with_host(TerminalHost);
    let mut session = engine.open_bytes(bytes, cli.country).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {}", e);
        process::exit(1);
    });

    if let (Some(edit), Some(chapters)) = (&edit, &cli.chapters) {
        let report = apply_edit(&mut session, edit, &chapters.logical_indices());
        if !report.skipped.is_empty() {
            eprintln!(
                "Skipped chapters missing from this save: {}",
                format_ordinals(&report.skipped)
            );
        }

        let out_path = cli.output.as_ref().expect("checked above");
        let edited_bytes = session.to_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    let options = TextRenderOptions {
        verbose: cli.verbose,
    };

    if cli.json {
        let json = render_json_full_with_options(&session, JsonStyle::CanonicalV1, options);
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if let Some(out_path) = cli.output.as_ref() {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print!("{}", render_story_table_with_options(&session, options));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn apply_edit(session: &mut Session, edit: &StoryEdit, chapters: &[usize]) -> BulkReport {
    match edit {
        StoryEdit::SetClears { stages, value } => {
            session.set_stage_clear_counts_for_chapters(chapters, &stage_edits(stages, *value))
        }
        StoryEdit::ClearUpTo(progress) => session.clear_up_to_for_chapters(chapters, *progress),
        StoryEdit::ClearChapters => session.clear_chapters(chapters),
        StoryEdit::ResetChapters => session.reset_chapters(chapters),
    }
}

/// Expands 1-based stage ordinals into a positional edit list.
fn stage_edits(stages: &[usize], value: u32) -> Vec<StageEdit> {
    let len = stages.iter().copied().max().unwrap_or(0);
    let mut edits = vec![None; len];
    for &stage in stages {
        edits[stage - 1] = Some(value);
    }
    edits
}

fn format_ordinals(logical_indices: &[usize]) -> String {
    logical_indices
        .iter()
        .map(|i| match chapter_name(*i) {
            Some(name) => format!("{} ({name})", i + 1),
            None => (i + 1).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_country(value: &str) -> Result<CountryCode, String> {
    CountryCode::parse(value).ok_or_else(|| {
        format!("invalid country value '{value}', expected one of: en, jp, kr, tw")
    })
}

fn parse_chapters(value: &str) -> Result<ChapterSelection, String> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(ChapterSelection::All);
    }

    let mut ordinals = Vec::new();
    for part in value.split(',') {
        let ordinal = parse_ordinal(part, LOGICAL_CHAPTER_COUNT, "chapter")?;
        if !ordinals.contains(&ordinal) {
            ordinals.push(ordinal);
        }
    }
    Ok(ChapterSelection::Listed(ordinals))
}

fn parse_stages(value: &str) -> Result<StageList, String> {
    let max_stage = MAX_CHAPTER_PROGRESS as usize;
    let mut stages = Vec::new();
    for part in value.split(',') {
        let (first, last) = match part.split_once('-') {
            Some((start, end)) => (
                parse_ordinal(start, max_stage, "stage")?,
                parse_ordinal(end, max_stage, "stage")?,
            ),
            None => {
                let stage = parse_ordinal(part, max_stage, "stage")?;
                (stage, stage)
            }
        };
        if first > last {
            return Err(format!("invalid stage range '{}'", part.trim()));
        }
        for stage in first..=last {
            if !stages.contains(&stage) {
                stages.push(stage);
            }
        }
    }
    Ok(StageList(stages))
}

fn parse_ordinal(raw: &str, max: usize, what: &str) -> Result<usize, String> {
    let raw = raw.trim();
    match raw.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(format!("invalid {what} '{raw}', expected a number from 1 to {max}")),
    }
}

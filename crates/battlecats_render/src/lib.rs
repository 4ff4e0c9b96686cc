use std::fmt::Write as _;

use battlecats_core::core_api::{Session, StoryChapterEntry};
use battlecats_core::progress::MAX_CHAPTER_PROGRESS;
use serde_json::{Map as JsonMap, Value as JsonValue};

const SHEET_WIDTH: usize = 60;
const NAME_COL_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Also list every chapter's per-stage clear counts.
    pub verbose: bool,
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    render_json_full_with_options(session, style, TextRenderOptions::default())
}

pub fn render_json_full_with_options(
    session: &Session,
    style: JsonStyle,
    options: TextRenderOptions,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session, options)),
    }
}

pub fn render_story_table(session: &Session) -> String {
    render_story_table_with_options(session, TextRenderOptions::default())
}

pub fn render_story_table_with_options(session: &Session, options: TextRenderOptions) -> String {
    let mut out = String::new();
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("THE BATTLE CATS", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing(
            &format!("MAIN STORY PROGRESS ({})", session.country()),
            SHEET_WIDTH
        )
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(
        &mut out,
        "  {:>2}  {:<width$}  {:>8}  {:>7}",
        "#",
        "Chapter",
        "Progress",
        "Cleared",
        width = NAME_COL_WIDTH
    )
    .expect("writing to String cannot fail");

    for entry in session.story_chapters() {
        let line = format!(
            "  {:>2}  {:<width$}  {:>8}  {:>7}",
            entry.logical_index + 1,
            fit_column(&chapter_label(&entry), NAME_COL_WIDTH),
            format!("{}/{}", entry.progress, MAX_CHAPTER_PROGRESS),
            if entry.cleared { "yes" } else { "no" },
            width = NAME_COL_WIDTH
        );
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");

        if options.verbose {
            if let Ok(counts) = session.chapter_clear_counts(entry.logical_index) {
                let joined = counts
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(&mut out, "      clears: {joined}")
                    .expect("writing to String cannot fail");
            }
        }
    }

    out
}

fn default_json(session: &Session, options: TextRenderOptions) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "country".to_string(),
        JsonValue::String(session.country().to_string()),
    );
    out.insert(
        "game_version".to_string(),
        JsonValue::from(session.game_version()),
    );
    out.insert(
        "chapters".to_string(),
        JsonValue::Array(
            session
                .story_chapters()
                .iter()
                .map(|entry| chapter_to_json(session, entry, options))
                .collect(),
        ),
    );
    out
}

fn chapter_to_json(
    session: &Session,
    entry: &StoryChapterEntry,
    options: TextRenderOptions,
) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("chapter".to_string(), JsonValue::from(entry.logical_index + 1));
    m.insert(
        "name".to_string(),
        match &entry.name {
            Some(name) => JsonValue::String(name.clone()),
            None => JsonValue::Null,
        },
    );
    m.insert(
        "storage_index".to_string(),
        JsonValue::from(entry.storage_index),
    );
    m.insert("progress".to_string(), JsonValue::from(entry.progress));
    m.insert(
        "total_stages".to_string(),
        JsonValue::from(entry.total_stages),
    );
    m.insert(
        "stages_cleared".to_string(),
        JsonValue::from(entry.stages_cleared),
    );
    m.insert(
        "highest_cleared_stage".to_string(),
        JsonValue::from(entry.highest_cleared_stage),
    );
    m.insert("cleared".to_string(), JsonValue::Bool(entry.cleared));
    if options.verbose {
        m.insert(
            "clear_counts".to_string(),
            match session.chapter_clear_counts(entry.logical_index) {
                Ok(counts) => JsonValue::from(counts),
                Err(_) => JsonValue::Null,
            },
        );
    }
    JsonValue::Object(m)
}

fn chapter_label(entry: &StoryChapterEntry) -> String {
    match &entry.name {
        Some(name) => name.clone(),
        None => format!("Chapter {}", entry.logical_index + 1),
    }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out: String = value.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

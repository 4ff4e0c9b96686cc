//! The boundary between raw save bytes and the structured record the editor
//! works on.
//!
//! The game's own container (checksum, encryption, the many unrelated
//! tables) lives behind [`SaveCodec`]. [`StoryBlockCodec`] is the built-in
//! implementation: a little-endian block holding the story tables, with any
//! bytes after them carried through untouched.

use std::io::{self, Cursor};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_api::{CoreError, CoreErrorCode, CountryCode};
use crate::progress::{
    BONUS_STAGE_SLOT_COUNT, ChapterClears, MAX_CHAPTER_PROGRESS, ProgressStore, StoryChapter,
};
use crate::reader::LittleEndianReader;

pub const MAX_CHAPTER_SLOTS: usize = 64;
pub const MAX_LIST_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveRecord {
    pub country: CountryCode,
    pub game_version: u32,
    pub story: ProgressStore,
    #[serde(with = "base64_text")]
    pub trailing: Vec<u8>,
}

pub trait SaveCodec {
    fn decode(&self, bytes: &[u8], country: CountryCode) -> Result<SaveRecord, CoreError>;
    fn encode(&self, record: &SaveRecord) -> Result<Vec<u8>, CoreError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StoryBlockCodec;

impl SaveCodec for StoryBlockCodec {
    fn decode(&self, bytes: &[u8], country: CountryCode) -> Result<SaveRecord, CoreError> {
        decode_story_block(bytes, country)
            .map_err(|e| CoreError::decode(format!("failed to decode story block: {e}")))
    }

    fn encode(&self, record: &SaveRecord) -> Result<Vec<u8>, CoreError> {
        let chapters = record.story.chapters();
        let mut out = Vec::new();
        push_u32(&mut out, record.game_version);
        push_len(&mut out, chapters.len(), MAX_CHAPTER_SLOTS, "chapter table")?;
        for chapter in chapters {
            push_u32(&mut out, chapter.progress);
        }
        for chapter in chapters {
            let slots = chapter.clears.to_slots();
            push_len(&mut out, slots.len(), MAX_LIST_LEN, "clear count list")?;
            for count in slots {
                push_u32(&mut out, count);
            }
        }
        for chapter in chapters {
            push_len(&mut out, chapter.treasures.len(), MAX_LIST_LEN, "treasure list")?;
            for &flag in &chapter.treasures {
                push_u32(&mut out, flag);
            }
        }
        out.extend_from_slice(&record.trailing);
        Ok(out)
    }
}

fn decode_story_block(bytes: &[u8], country: CountryCode) -> io::Result<SaveRecord> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "save payload is empty",
        ));
    }

    let mut r = LittleEndianReader::new(Cursor::new(bytes));
    let game_version = r.read_u32()?;
    let chapter_count = r.read_len(MAX_CHAPTER_SLOTS, "chapter table")?;
    let progress = r.read_u32_vec(chapter_count)?;

    let mut clears = Vec::with_capacity(chapter_count);
    for index in 0..chapter_count {
        let len = r.read_len(MAX_LIST_LEN, "clear count list")?;
        let slots = r.read_u32_vec(len)?;
        let chapter_clears = ChapterClears::from_slots(&slots).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "chapter {index} has {len} clear count slots, expected at least {BONUS_STAGE_SLOT_COUNT}"
                ),
            )
        })?;
        clears.push(chapter_clears);
    }

    let mut treasures = Vec::with_capacity(chapter_count);
    for _ in 0..chapter_count {
        let len = r.read_len(MAX_LIST_LEN, "treasure list")?;
        treasures.push(r.read_u32_vec(len)?);
    }

    let mut chapters = Vec::with_capacity(chapter_count);
    for (index, ((progress, clears), treasures)) in
        progress.into_iter().zip(clears).zip(treasures).enumerate()
    {
        if progress > MAX_CHAPTER_PROGRESS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("chapter {index} progress {progress} exceeds {MAX_CHAPTER_PROGRESS}"),
            ));
        }
        chapters.push(StoryChapter {
            progress,
            clears,
            treasures,
        });
    }

    let consumed = r.position()?;
    let trailing = r.read_to_end()?;
    debug!(
        game_version,
        chapter_count,
        consumed,
        trailing = trailing.len(),
        "decoded story block"
    );

    Ok(SaveRecord {
        country,
        game_version,
        story: ProgressStore::new(chapters),
        trailing,
    })
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_len(out: &mut Vec<u8>, len: usize, max_len: usize, what: &str) -> Result<(), CoreError> {
    if len > max_len {
        return Err(CoreError::new(
            CoreErrorCode::Io,
            format!("cannot encode {what}: length {len} exceeds limit {max_len}"),
        ));
    }
    push_u32(out, len as u32);
    Ok(())
}

/// Opaque byte payloads travel as base64 text in transport trees.
mod base64_text {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

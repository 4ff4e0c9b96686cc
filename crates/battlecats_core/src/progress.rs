use serde::{Deserialize, Serialize};

use crate::chapter::STORAGE_CHAPTER_COUNT;
use crate::codec::{MAX_CHAPTER_SLOTS, MAX_LIST_LEN};
use crate::core_api::CoreError;

pub const MAX_CHAPTER_PROGRESS: u32 = 48;
pub const BONUS_STAGE_SLOT_COUNT: usize = 3;
pub const DEFAULT_STAGE_COUNT: usize = 48;

/// Per-stage clear counts of one chapter.
///
/// Slot numbering is positional: real stages first, then the three bonus
/// slots. The bonus slots never count toward chapter progress but are kept
/// in place so the record re-encodes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChapterClears {
    pub stages: Vec<u32>,
    pub bonus_stage_slots: [u32; BONUS_STAGE_SLOT_COUNT],
}

impl ChapterClears {
    pub fn zeroed(stage_count: usize) -> Self {
        Self {
            stages: vec![0; stage_count],
            bonus_stage_slots: [0; BONUS_STAGE_SLOT_COUNT],
        }
    }

    /// Splits a flat slot list into real stages and bonus slots. Returns
    /// `None` when the list is too short to hold the bonus slots.
    pub fn from_slots(slots: &[u32]) -> Option<Self> {
        let stage_count = slots.len().checked_sub(BONUS_STAGE_SLOT_COUNT)?;
        let (stages, bonus) = slots.split_at(stage_count);
        let mut bonus_stage_slots = [0; BONUS_STAGE_SLOT_COUNT];
        bonus_stage_slots.copy_from_slice(bonus);
        Some(Self {
            stages: stages.to_vec(),
            bonus_stage_slots,
        })
    }

    pub fn real_stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn slot_count(&self) -> usize {
        self.stages.len() + BONUS_STAGE_SLOT_COUNT
    }

    pub fn slot(&self, slot: usize) -> Option<u32> {
        match slot.checked_sub(self.stages.len()) {
            None => self.stages.get(slot).copied(),
            Some(bonus) => self.bonus_stage_slots.get(bonus).copied(),
        }
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut u32> {
        match slot.checked_sub(self.stages.len()) {
            None => self.stages.get_mut(slot),
            Some(bonus) => self.bonus_stage_slots.get_mut(bonus),
        }
    }

    pub fn to_slots(&self) -> Vec<u32> {
        let mut slots = Vec::with_capacity(self.slot_count());
        slots.extend_from_slice(&self.stages);
        slots.extend_from_slice(&self.bonus_stage_slots);
        slots
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryChapter {
    pub progress: u32,
    pub clears: ChapterClears,
    pub treasures: Vec<u32>,
}

impl StoryChapter {
    pub fn empty(stage_count: usize) -> Self {
        Self {
            progress: 0,
            clears: ChapterClears::zeroed(stage_count),
            treasures: vec![0; stage_count + 1],
        }
    }
}

/// Story progress of every chapter slot in a save, indexed by storage index.
///
/// Chapters are fixed for the lifetime of the store: no operation adds or
/// removes a chapter or changes the length of its clear-count slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    chapters: Vec<StoryChapter>,
}

impl ProgressStore {
    pub fn new(chapters: Vec<StoryChapter>) -> Self {
        Self { chapters }
    }

    pub fn with_default_layout() -> Self {
        Self::new(
            (0..STORAGE_CHAPTER_COUNT)
                .map(|_| StoryChapter::empty(DEFAULT_STAGE_COUNT))
                .collect(),
        )
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapters(&self) -> &[StoryChapter] {
        &self.chapters
    }

    pub fn chapter(&self, storage_index: usize) -> Result<&StoryChapter, CoreError> {
        self.chapters
            .get(storage_index)
            .ok_or_else(|| CoreError::chapter_out_of_range(storage_index, self.chapters.len()))
    }

    pub(crate) fn chapter_mut(
        &mut self,
        storage_index: usize,
    ) -> Result<&mut StoryChapter, CoreError> {
        let count = self.chapters.len();
        self.chapters
            .get_mut(storage_index)
            .ok_or_else(|| CoreError::chapter_out_of_range(storage_index, count))
    }

    pub fn clear_counts(&self, storage_index: usize) -> Result<Vec<u32>, CoreError> {
        Ok(self.chapter(storage_index)?.clears.to_slots())
    }

    /// Writes one clear-count slot. Slots past the end of the chapter are
    /// ignored so callers may hand over more values than the chapter holds.
    pub fn set_clear_count(
        &mut self,
        storage_index: usize,
        slot: usize,
        value: u32,
    ) -> Result<(), CoreError> {
        if let Some(count) = self.chapter_mut(storage_index)?.clears.slot_mut(slot) {
            *count = value;
        }
        Ok(())
    }

    pub fn total_real_stages(&self, storage_index: usize) -> Result<usize, CoreError> {
        Ok(self.chapter(storage_index)?.clears.real_stage_count())
    }

    pub fn progress(&self, storage_index: usize) -> Result<u32, CoreError> {
        Ok(self.chapter(storage_index)?.progress)
    }

    pub fn set_progress(&mut self, storage_index: usize, value: u32) -> Result<(), CoreError> {
        self.chapter_mut(storage_index)?.progress = value.min(MAX_CHAPTER_PROGRESS);
        Ok(())
    }

    pub fn treasures(&self, storage_index: usize) -> Result<&[u32], CoreError> {
        Ok(&self.chapter(storage_index)?.treasures)
    }

    /// Zero-fills a chapter's treasure flags at their stored length.
    pub fn reset_treasures(&mut self, storage_index: usize) -> Result<(), CoreError> {
        self.chapter_mut(storage_index)?.treasures.fill(0);
        Ok(())
    }

    /// Checks the progress bound and the encodable table sizes. Used on
    /// records that did not come out of the codec, such as an edited
    /// transport tree.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.chapters.len() > MAX_CHAPTER_SLOTS {
            return Err(CoreError::decode(format!(
                "chapter table length {} exceeds limit {MAX_CHAPTER_SLOTS}",
                self.chapters.len()
            )));
        }
        for (index, chapter) in self.chapters.iter().enumerate() {
            if chapter.progress > MAX_CHAPTER_PROGRESS {
                return Err(CoreError::decode(format!(
                    "chapter {index} progress {} exceeds {MAX_CHAPTER_PROGRESS}",
                    chapter.progress
                )));
            }
            for (what, len) in [
                ("clear count list", chapter.clears.slot_count()),
                ("treasure list", chapter.treasures.len()),
            ] {
                if len > MAX_LIST_LEN {
                    return Err(CoreError::decode(format!(
                        "chapter {index} {what} length {len} exceeds limit {MAX_LIST_LEN}"
                    )));
                }
            }
        }
        Ok(())
    }
}

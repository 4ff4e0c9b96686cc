//! Consistency rules between per-stage clear counts and chapter progress.
//!
//! Two directions exist:
//! [`ChapterEditor::apply_explicit_counts`] derives progress from the counts,
//! while [`ChapterEditor::clear_up_to`] and
//! [`ChapterEditor::bulk_set_chapters`] take progress as given and synthesize
//! the counts from it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::progress::{ChapterClears, MAX_CHAPTER_PROGRESS, ProgressStore};

/// One requested stage value; `None` leaves the stage untouched.
pub type StageEdit = Option<u32>;

/// Transport encoding of "leave this stage alone".
pub const NO_CHANGE: i64 = -1;

pub fn stage_edit_from_raw(raw: i64) -> Result<StageEdit, CoreError> {
    if raw == NO_CHANGE {
        return Ok(None);
    }
    u32::try_from(raw).map(Some).map_err(|_| {
        CoreError::new(
            CoreErrorCode::InvalidRequest,
            format!("invalid clear count {raw}, expected {NO_CHANGE} or 0..={}", u32::MAX),
        )
    })
}

/// What a bulk chapter edit does to the chapter's treasure flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasureBehavior {
    Preserve,
    Reset,
}

/// Storage indices a multi-chapter edit touched, and those it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    pub applied: Vec<usize>,
    pub skipped: Vec<usize>,
}

impl BulkReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn record(&mut self, storage_index: usize, result: Result<(), CoreError>) {
        match result {
            Ok(()) => self.applied.push(storage_index),
            Err(err) => {
                warn!(storage_index, %err, "skipping story chapter");
                self.skipped.push(storage_index);
            }
        }
    }
}

/// Clamps a requested progress value into `0..=48`.
pub fn clamp_progress(progress: i64) -> u32 {
    progress.clamp(0, i64::from(MAX_CHAPTER_PROGRESS)) as u32
}

/// One past the last real stage with a positive clear count, or 0.
pub fn derived_progress(clears: &ChapterClears) -> u32 {
    let reached = clears
        .stages
        .iter()
        .rposition(|&count| count > 0)
        .map_or(0, |index| index + 1);
    clamp_progress(reached as i64)
}

pub struct ChapterEditor<'a> {
    store: &'a mut ProgressStore,
}

impl<'a> ChapterEditor<'a> {
    pub fn new(store: &'a mut ProgressStore) -> Self {
        Self { store }
    }

    /// Overwrites the given slots, then recomputes progress from the real
    /// stages. Values past the chapter's last slot are dropped.
    pub fn apply_explicit_counts(
        &mut self,
        storage_index: usize,
        counts: &[StageEdit],
    ) -> Result<u32, CoreError> {
        let chapter = self.store.chapter_mut(storage_index)?;
        for (slot, edit) in counts.iter().enumerate() {
            let Some(value) = *edit else {
                continue;
            };
            if let Some(count) = chapter.clears.slot_mut(slot) {
                *count = value;
            }
        }

        chapter.progress = derived_progress(&chapter.clears);
        debug!(
            storage_index,
            progress = chapter.progress,
            "applied explicit clear counts"
        );
        Ok(chapter.progress)
    }

    /// Applies the same per-stage values to several chapters.
    pub fn apply_explicit_counts_to_chapters(
        &mut self,
        storage_indices: &[usize],
        counts: &[StageEdit],
    ) -> BulkReport {
        let mut report = BulkReport::default();
        for &storage_index in storage_indices {
            let result = self
                .apply_explicit_counts(storage_index, counts)
                .map(|_| ());
            report.record(storage_index, result);
        }
        report
    }

    /// Marks the first `progress` stages cleared once and zeroes every later
    /// slot, bonus slots included. A progress of 0 resets the whole chapter.
    pub fn clear_up_to(&mut self, storage_index: usize, progress: i64) -> Result<(), CoreError> {
        let progress = clamp_progress(progress);
        let chapter = self.store.chapter_mut(storage_index)?;
        chapter.progress = progress;

        let cleared = progress as usize;
        for slot in 0..chapter.clears.slot_count() {
            if let Some(count) = chapter.clears.slot_mut(slot) {
                *count = u32::from(slot < cleared);
            }
        }

        debug!(storage_index, progress, "cleared story chapter up to stage");
        Ok(())
    }

    /// Rewrites whole chapters: `chapter_progress` leading slots get
    /// `per_stage_value`, the rest of the chapter is zeroed.
    pub fn bulk_set_chapters(
        &mut self,
        storage_indices: &[usize],
        per_stage_value: u32,
        chapter_progress: u32,
        treasures: TreasureBehavior,
    ) -> BulkReport {
        let progress = chapter_progress.min(MAX_CHAPTER_PROGRESS);
        let mut report = BulkReport::default();

        for &storage_index in storage_indices {
            let result = self.store.chapter_mut(storage_index).map(|chapter| {
                chapter.progress = progress;
                let filled = progress as usize;
                for slot in 0..chapter.clears.slot_count() {
                    if let Some(count) = chapter.clears.slot_mut(slot) {
                        *count = if slot < filled { per_stage_value } else { 0 };
                    }
                }
            });
            let result = match (result, treasures) {
                (Ok(()), TreasureBehavior::Reset) => self.store.reset_treasures(storage_index),
                (result, _) => result,
            };
            report.record(storage_index, result);
        }

        debug!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            progress,
            ?treasures,
            "bulk set story chapters"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::StoryChapter;

    fn store_with_stages(stage_count: usize) -> ProgressStore {
        ProgressStore::new(vec![StoryChapter::empty(stage_count)])
    }

    #[test]
    fn clamp_progress_bounds_both_ends() {
        assert_eq!(clamp_progress(-4), 0);
        assert_eq!(clamp_progress(17), 17);
        assert_eq!(clamp_progress(900), MAX_CHAPTER_PROGRESS);
    }

    #[test]
    fn derived_progress_ignores_bonus_slots() {
        let mut clears = ChapterClears::zeroed(5);
        clears.bonus_stage_slots = [1, 1, 1];
        assert_eq!(derived_progress(&clears), 0);

        clears.stages[2] = 4;
        assert_eq!(derived_progress(&clears), 3);
    }

    #[test]
    fn explicit_counts_recompute_progress_downward() {
        let mut store = store_with_stages(6);
        let mut editor = ChapterEditor::new(&mut store);
        editor.clear_up_to(0, 5).expect("clear");

        let progress = editor
            .apply_explicit_counts(0, &[None, None, None, Some(0), Some(0)])
            .expect("explicit counts");
        assert_eq!(progress, 3);
        assert_eq!(store.progress(0).unwrap(), 3);
    }

    #[test]
    fn clear_up_to_short_chapter_stays_in_bounds() {
        let mut store = store_with_stages(10);
        ChapterEditor::new(&mut store)
            .clear_up_to(0, 48)
            .expect("clear");

        assert_eq!(store.progress(0).unwrap(), 48);
        assert_eq!(store.clear_counts(0).unwrap(), vec![1; 13]);
    }

    #[test]
    fn bulk_report_lists_skipped_chapters() {
        let mut store = store_with_stages(4);
        let report =
            ChapterEditor::new(&mut store).bulk_set_chapters(&[3, 0], 2, 2, TreasureBehavior::Preserve);

        assert_eq!(report.applied, vec![0]);
        assert_eq!(report.skipped, vec![3]);
        assert!(!report.is_complete());
        assert_eq!(store.clear_counts(0).unwrap(), vec![2, 2, 0, 0, 0, 0, 0]);
    }
}

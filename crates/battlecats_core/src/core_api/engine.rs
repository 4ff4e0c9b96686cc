use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::chapter;
use crate::codec::{SaveCodec, SaveRecord, StoryBlockCodec};
use crate::editor::{
    self, BulkReport, ChapterEditor, StageEdit, TreasureBehavior, derived_progress,
};
use crate::progress::{MAX_CHAPTER_PROGRESS, ProgressStore};

use super::error::CoreError;
use super::host::{Host, SilentHost};
use super::types::{CountryCode, StoryChapterEntry, StoryEditRequest};

const STORY_EDITED_MESSAGE: &str = "Successfully set main story chapters";

type SharedHost = Arc<dyn Host + Send + Sync>;
type SharedCodec = Arc<dyn SaveCodec + Send + Sync>;

#[derive(Clone)]
pub struct Engine {
    host: SharedHost,
    codec: SharedCodec,
}

/// One loaded save. Owns its record exclusively; share it across threads
/// only behind a lock.
pub struct Session {
    record: SaveRecord,
    host: SharedHost,
    codec: SharedCodec,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            host: Arc::new(SilentHost),
            codec: Arc::new(StoryBlockCodec),
        }
    }

    pub fn with_host(mut self, host: impl Host + Send + Sync + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    pub fn with_codec(mut self, codec: impl SaveCodec + Send + Sync + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<CountryCode>,
    ) -> Result<Session, CoreError> {
        let bytes = bytes.as_ref();
        let country = match hint.or_else(|| self.host.resolve_country(bytes)) {
            Some(country) => country,
            None => {
                warn!("save country not detected, assuming {}", CountryCode::default());
                CountryCode::default()
            }
        };

        let record = self.codec.decode(bytes, country)?;
        debug!(
            %country,
            chapters = record.story.chapter_count(),
            "opened save"
        );
        Ok(self.open_record(record))
    }

    pub fn open_record(&self, record: SaveRecord) -> Session {
        Session {
            record,
            host: Arc::clone(&self.host),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn country(&self) -> CountryCode {
        self.record.country
    }

    pub fn game_version(&self) -> u32 {
        self.record.game_version
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn into_record(self) -> SaveRecord {
        self.record
    }

    pub fn story(&self) -> &ProgressStore {
        &self.record.story
    }

    /// Overview rows for every story chapter slot except the gap slot,
    /// including slots past the known catalog.
    pub fn story_chapters(&self) -> Vec<StoryChapterEntry> {
        self.record
            .story
            .chapters()
            .iter()
            .enumerate()
            .filter_map(|(storage_index, chapter)| {
                let logical_index = chapter::to_logical_index(storage_index)?;
                Some(StoryChapterEntry {
                    logical_index,
                    storage_index,
                    name: chapter::chapter_name(logical_index).map(str::to_string),
                    progress: chapter.progress,
                    total_stages: chapter.clears.real_stage_count(),
                    stages_cleared: chapter.clears.stages.iter().filter(|&&c| c > 0).count(),
                    highest_cleared_stage: derived_progress(&chapter.clears) as usize,
                    cleared: chapter.progress >= MAX_CHAPTER_PROGRESS,
                })
            })
            .collect()
    }

    pub fn chapter_clear_counts(&self, logical_index: usize) -> Result<Vec<u32>, CoreError> {
        self.record
            .story
            .clear_counts(chapter::to_storage_index(logical_index))
    }

    pub fn total_stages(&self, logical_index: usize) -> Result<usize, CoreError> {
        self.record
            .story
            .total_real_stages(chapter::to_storage_index(logical_index))
    }

    pub fn has_cleared_chapter(&self, logical_index: usize) -> Result<bool, CoreError> {
        let progress = self
            .record
            .story
            .progress(chapter::to_storage_index(logical_index))?;
        Ok(progress >= MAX_CHAPTER_PROGRESS)
    }

    /// Returns the chapter's recomputed progress.
    pub fn set_stage_clear_counts(
        &mut self,
        logical_index: usize,
        counts: &[StageEdit],
    ) -> Result<u32, CoreError> {
        let progress = self
            .editor()
            .apply_explicit_counts(chapter::to_storage_index(logical_index), counts)?;
        self.host.output(STORY_EDITED_MESSAGE);
        Ok(progress)
    }

    pub fn set_stage_clear_counts_for_chapters(
        &mut self,
        logical_indices: &[usize],
        counts: &[StageEdit],
    ) -> BulkReport {
        let storage = chapter::to_storage_indices(logical_indices);
        let report = self
            .editor()
            .apply_explicit_counts_to_chapters(&storage, counts);
        self.finish_bulk(report)
    }

    pub fn clear_up_to(&mut self, logical_index: usize, progress: i64) -> Result<(), CoreError> {
        self.editor()
            .clear_up_to(chapter::to_storage_index(logical_index), progress)?;
        self.host.output(STORY_EDITED_MESSAGE);
        Ok(())
    }

    pub fn clear_up_to_for_chapters(
        &mut self,
        logical_indices: &[usize],
        progress: i64,
    ) -> BulkReport {
        let mut report = BulkReport::default();
        let mut editor = self.editor();
        for storage_index in chapter::to_storage_indices(logical_indices) {
            let result = editor.clear_up_to(storage_index, progress);
            report.record(storage_index, result);
        }
        self.finish_bulk(report)
    }

    /// Marks every stage of the chapters cleared once, keeping treasures.
    pub fn clear_chapters(&mut self, logical_indices: &[usize]) -> BulkReport {
        self.set_whole_chapters(logical_indices, 1, MAX_CHAPTER_PROGRESS, TreasureBehavior::Preserve)
    }

    /// Returns the chapters to a never-played state, treasures included.
    pub fn reset_chapters(&mut self, logical_indices: &[usize]) -> BulkReport {
        self.set_whole_chapters(logical_indices, 0, 0, TreasureBehavior::Reset)
    }

    pub fn set_whole_chapters(
        &mut self,
        logical_indices: &[usize],
        per_stage_value: u32,
        chapter_progress: u32,
        treasures: TreasureBehavior,
    ) -> BulkReport {
        let storage = chapter::to_storage_indices(logical_indices);
        let report = self.editor().bulk_set_chapters(
            &storage,
            per_stage_value,
            chapter_progress,
            treasures,
        );
        self.finish_bulk(report)
    }

    /// Runs one transport-level edit request. Bad sentinel values reject the
    /// whole request; missing chapters are only skipped.
    pub fn apply_request(&mut self, request: &StoryEditRequest) -> Result<BulkReport, CoreError> {
        match request {
            StoryEditRequest::SetClearCounts { chapters, counts } => {
                let edits = counts
                    .iter()
                    .map(|&raw| editor::stage_edit_from_raw(raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.set_stage_clear_counts_for_chapters(chapters, &edits))
            }
            StoryEditRequest::ClearUpTo { chapters, progress } => {
                Ok(self.clear_up_to_for_chapters(chapters, *progress))
            }
            StoryEditRequest::ClearChapters { chapters } => Ok(self.clear_chapters(chapters)),
            StoryEditRequest::ResetChapters { chapters } => Ok(self.reset_chapters(chapters)),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.codec.encode(&self.record)
    }

    fn editor(&mut self) -> ChapterEditor<'_> {
        ChapterEditor::new(&mut self.record.story)
    }

    fn finish_bulk(&self, report: BulkReport) -> BulkReport {
        if !report.applied.is_empty() {
            self.host.output(STORY_EDITED_MESSAGE);
        }
        to_logical_report(report)
    }
}

fn to_logical_report(report: BulkReport) -> BulkReport {
    let to_logical = |indices: Vec<usize>| -> Vec<usize> {
        indices
            .into_iter()
            .filter_map(chapter::to_logical_index)
            .collect()
    };
    BulkReport {
        applied: to_logical(report.applied),
        skipped: to_logical(report.skipped),
    }
}

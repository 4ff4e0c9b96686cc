use battlecats_core::chapter::{self, GAP_STORAGE_INDEX};
use battlecats_core::core_api::CoreErrorCode;
use battlecats_core::editor::{ChapterEditor, StageEdit, TreasureBehavior};
use battlecats_core::progress::{MAX_CHAPTER_PROGRESS, ProgressStore, StoryChapter};
use proptest::prelude::*;

fn store_with_stage_counts(stage_counts: &[usize]) -> ProgressStore {
    ProgressStore::new(
        stage_counts
            .iter()
            .map(|&count| StoryChapter::empty(count))
            .collect(),
    )
}

fn sentinel_counts(raw: &[i64]) -> Vec<StageEdit> {
    raw.iter()
        .map(|&value| u32::try_from(value).ok())
        .collect()
}

#[test]
fn clear_up_to_six_on_full_chapter() {
    let mut store = ProgressStore::with_default_layout();
    ChapterEditor::new(&mut store)
        .clear_up_to(0, 6)
        .expect("clear up to stage 6");

    let counts = store.clear_counts(0).expect("chapter 0");
    assert_eq!(counts.len(), 51);
    assert!(counts[..6].iter().all(|&c| c == 1));
    assert!(counts[6..].iter().all(|&c| c == 0));
    assert_eq!(store.progress(0).unwrap(), 6);
}

#[test]
fn clear_up_to_zero_resets_bonus_slots_too() {
    let mut store = ProgressStore::with_default_layout();
    {
        let mut editor = ChapterEditor::new(&mut store);
        editor
            .apply_explicit_counts(1, &vec![Some(4); 51])
            .expect("fill every slot");
        editor.clear_up_to(1, 0).expect("reset chapter");
    }

    assert_eq!(store.clear_counts(1).unwrap(), vec![0; 51]);
    assert_eq!(store.progress(1).unwrap(), 0);
}

#[test]
fn clear_up_to_clamps_out_of_domain_progress() {
    let mut store = ProgressStore::with_default_layout();
    let mut editor = ChapterEditor::new(&mut store);
    editor.clear_up_to(0, 120).expect("clamped high");
    editor.clear_up_to(1, -7).expect("clamped low");

    assert_eq!(store.progress(0).unwrap(), MAX_CHAPTER_PROGRESS);
    assert_eq!(store.progress(1).unwrap(), 0);
    assert_eq!(store.clear_counts(0).unwrap()[47], 1);
}

#[test]
fn explicit_counts_only_touch_concrete_positions() {
    let mut store = ProgressStore::with_default_layout();
    let mut editor = ChapterEditor::new(&mut store);
    editor.clear_up_to(2, 5).expect("seed five cleared stages");

    let progress = editor
        .apply_explicit_counts(2, &sentinel_counts(&[-1, 3, -1, 0, 2]))
        .expect("explicit counts");

    assert_eq!(progress, 5);
    let counts = store.clear_counts(2).unwrap();
    assert_eq!(&counts[..6], &[1, 3, 1, 0, 2, 0]);
    assert_eq!(store.progress(2).unwrap(), 5);
}

#[test]
fn explicit_counts_longer_than_chapter_are_dropped() {
    let mut store = store_with_stage_counts(&[4]);
    let progress = ChapterEditor::new(&mut store)
        .apply_explicit_counts(0, &vec![Some(2); 20])
        .expect("long input must not fail");

    assert_eq!(progress, 4);
    assert_eq!(store.clear_counts(0).unwrap(), vec![2; 7]);
}

#[test]
fn explicit_counts_on_missing_chapter_is_index_out_of_range() {
    let mut store = store_with_stage_counts(&[4]);
    let err = ChapterEditor::new(&mut store)
        .apply_explicit_counts(1, &[Some(1)])
        .expect_err("chapter 1 does not exist");
    assert_eq!(err.code, CoreErrorCode::IndexOutOfRange);
}

#[test]
fn bulk_set_resets_treasures_when_asked() {
    let store = ProgressStore::with_default_layout();
    let mut chapter = store.chapter(4).unwrap().clone();
    chapter.treasures = vec![3; 49];
    let mut chapters = store.chapters().to_vec();
    chapters[4] = chapter;
    let mut store = ProgressStore::new(chapters);

    let report =
        ChapterEditor::new(&mut store).bulk_set_chapters(&[4], 1, 5, TreasureBehavior::Reset);

    assert!(report.is_complete());
    assert_eq!(store.progress(4).unwrap(), 5);
    let counts = store.clear_counts(4).unwrap();
    assert!(counts[..5].iter().all(|&c| c == 1));
    assert!(counts[5..].iter().all(|&c| c == 0));
    assert_eq!(store.treasures(4).unwrap(), &[0; 49][..]);
}

#[test]
fn bulk_set_preserve_leaves_treasures_alone() {
    let mut chapter = StoryChapter::empty(48);
    chapter.treasures = vec![2; 49];
    let mut store = ProgressStore::new(vec![chapter]);

    ChapterEditor::new(&mut store).bulk_set_chapters(&[0], 1, 48, TreasureBehavior::Preserve);

    assert_eq!(store.treasures(0).unwrap(), &[2; 49][..]);
    assert_eq!(store.progress(0).unwrap(), 48);
}

#[test]
fn bulk_set_sizes_each_chapter_by_its_own_stage_count() {
    let mut store = store_with_stage_counts(&[48, 10]);
    let report =
        ChapterEditor::new(&mut store).bulk_set_chapters(&[0, 1], 3, 12, TreasureBehavior::Reset);

    assert_eq!(report.applied, vec![0, 1]);
    assert_eq!(store.clear_counts(0).unwrap().len(), 51);
    assert_eq!(store.clear_counts(1).unwrap(), {
        let mut expected = vec![3; 12];
        expected.push(0);
        expected
    });
    assert_eq!(store.treasures(1).unwrap().len(), 11);
}

#[test]
fn bulk_reset_zero_fills_treasures_at_their_stored_length() {
    let mut chapter = StoryChapter::empty(48);
    chapter.treasures = vec![5; 50];
    let mut store = ProgressStore::new(vec![chapter]);

    ChapterEditor::new(&mut store).bulk_set_chapters(&[0], 0, 0, TreasureBehavior::Reset);

    assert_eq!(store.treasures(0).unwrap(), &[0; 50][..]);
}

#[test]
fn bulk_set_clamps_progress_above_cap() {
    let mut store = store_with_stage_counts(&[60]);
    let report =
        ChapterEditor::new(&mut store).bulk_set_chapters(&[0], 1, 200, TreasureBehavior::Preserve);

    assert!(report.is_complete());
    assert_eq!(store.progress(0).unwrap(), MAX_CHAPTER_PROGRESS);
    let counts = store.clear_counts(0).unwrap();
    assert_eq!(counts.len(), 63);
    assert!(counts[..48].iter().all(|&c| c == 1));
    assert!(counts[48..].iter().all(|&c| c == 0));
}

#[test]
fn bulk_set_skips_missing_chapters_and_continues() {
    let mut store = store_with_stage_counts(&[48, 48]);
    let report =
        ChapterEditor::new(&mut store).bulk_set_chapters(&[0, 7, 1], 1, 48, TreasureBehavior::Preserve);

    assert_eq!(report.applied, vec![0, 1]);
    assert_eq!(report.skipped, vec![7]);
    assert_eq!(store.progress(1).unwrap(), 48);
}

proptest! {
    #[test]
    fn prop_sentinel_only_edit_is_a_no_op(
        seed in prop::collection::vec(0u32..5, 0..51),
        sentinels in 0usize..80,
    ) {
        let mut store = ProgressStore::with_default_layout();
        let mut editor = ChapterEditor::new(&mut store);
        let seed: Vec<StageEdit> = seed.into_iter().map(Some).collect();
        editor.apply_explicit_counts(5, &seed).unwrap();
        let before = store.clone();

        ChapterEditor::new(&mut store)
            .apply_explicit_counts(5, &vec![None; sentinels])
            .unwrap();
        prop_assert_eq!(store, before);
    }

    #[test]
    fn prop_explicit_counts_are_idempotent(
        edits in prop::collection::vec(prop::option::of(0u32..4), 0..60),
    ) {
        let mut once = ProgressStore::with_default_layout();
        ChapterEditor::new(&mut once).apply_explicit_counts(0, &edits).unwrap();
        let mut twice = once.clone();
        ChapterEditor::new(&mut twice).apply_explicit_counts(0, &edits).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_clear_up_to_splits_cleared_and_zeroed(
        stage_count in 0usize..60,
        progress in -10i64..70,
    ) {
        let mut store = store_with_stage_counts(&[stage_count]);
        ChapterEditor::new(&mut store).clear_up_to(0, progress).unwrap();

        let expected = progress.clamp(0, 48) as u32;
        prop_assert_eq!(store.progress(0).unwrap(), expected);
        let counts = store.clear_counts(0).unwrap();
        prop_assert_eq!(counts.len(), stage_count + 3);
        for (slot, &count) in counts.iter().enumerate() {
            prop_assert_eq!(count, u32::from(slot < expected as usize));
        }
    }

    #[test]
    fn prop_storage_index_round_trips(logical in 0usize..512) {
        let storage = chapter::to_storage_index(logical);
        prop_assert_ne!(storage, GAP_STORAGE_INDEX);
        prop_assert_eq!(chapter::to_logical_index(storage), Some(logical));
    }
}

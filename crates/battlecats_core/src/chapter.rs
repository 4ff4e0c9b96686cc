//! Translation between the chapter ordinals a user sees and the chapter
//! slots inside the persisted story record.
//!
//! The story record keeps one unrelated chapter in storage slot 3, right
//! after the third Empire of Cats chapter. Every read and write path must
//! shift logical ordinals past that slot exactly once.

/// Highest logical ordinal that maps to the same storage slot.
const LAST_UNSHIFTED_LOGICAL: usize = 2;

/// Storage slot occupied by the chapter that is not part of the main story.
pub const GAP_STORAGE_INDEX: usize = LAST_UNSHIFTED_LOGICAL + 1;

pub const CHAPTER_NAMES: [&str; 9] = [
    "Empire of Cats 1",
    "Empire of Cats 2",
    "Empire of Cats 3",
    "Into the Future 1",
    "Into the Future 2",
    "Into the Future 3",
    "Cats of the Cosmos 1",
    "Cats of the Cosmos 2",
    "Cats of the Cosmos 3",
];

pub const LOGICAL_CHAPTER_COUNT: usize = CHAPTER_NAMES.len();

/// Chapter slots in a stock save: every logical chapter plus the gap slot.
pub const STORAGE_CHAPTER_COUNT: usize = LOGICAL_CHAPTER_COUNT + 1;

pub fn to_storage_index(logical_index: usize) -> usize {
    if logical_index > LAST_UNSHIFTED_LOGICAL {
        logical_index + 1
    } else {
        logical_index
    }
}

pub fn to_storage_indices(logical_indices: &[usize]) -> Vec<usize> {
    logical_indices
        .iter()
        .map(|&index| to_storage_index(index))
        .collect()
}

/// Inverse of [`to_storage_index`]. The gap slot has no logical ordinal.
pub fn to_logical_index(storage_index: usize) -> Option<usize> {
    match storage_index {
        GAP_STORAGE_INDEX => None,
        index if index > GAP_STORAGE_INDEX => Some(index - 1),
        index => Some(index),
    }
}

pub fn chapter_name(logical_index: usize) -> Option<&'static str> {
    CHAPTER_NAMES.get(logical_index).copied()
}

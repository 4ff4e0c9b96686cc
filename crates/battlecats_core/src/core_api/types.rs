use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryCode {
    #[default]
    En,
    Jp,
    Kr,
    Tw,
}

impl CountryCode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "jp" | "ja" => Some(Self::Jp),
            "kr" | "ko" => Some(Self::Kr),
            "tw" => Some(Self::Tw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::En => "en",
            Self::Jp => "jp",
            Self::Kr => "kr",
            Self::Tw => "tw",
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the story progress overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryChapterEntry {
    pub logical_index: usize,
    pub storage_index: usize,
    pub name: Option<String>,
    pub progress: u32,
    pub total_stages: usize,
    /// Real stages with a positive clear count.
    pub stages_cleared: usize,
    /// One past the last real stage with a positive clear count.
    pub highest_cleared_stage: usize,
    pub cleared: bool,
}

/// A single non-interactive edit, as sent by a web or scripted caller.
/// Chapter ordinals are logical and 0-based; `-1` in `counts` means
/// "leave this stage alone".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoryEditRequest {
    SetClearCounts { chapters: Vec<usize>, counts: Vec<i64> },
    ClearUpTo { chapters: Vec<usize>, progress: i64 },
    ClearChapters { chapters: Vec<usize> },
    ResetChapters { chapters: Vec<usize> },
}

impl StoryEditRequest {
    pub fn chapters(&self) -> &[usize] {
        match self {
            Self::SetClearCounts { chapters, .. }
            | Self::ClearUpTo { chapters, .. }
            | Self::ClearChapters { chapters }
            | Self::ResetChapters { chapters } => chapters,
        }
    }
}

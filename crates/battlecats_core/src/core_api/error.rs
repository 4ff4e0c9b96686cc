use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    /// A storage chapter index with no backing entry in the story record.
    IndexOutOfRange,
    /// The save payload or an edited transport tree could not be decoded.
    DecodeFailure,
    Io,
    InvalidRequest,
}

impl CoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::IndexOutOfRange => "index_out_of_range",
            Self::DecodeFailure => "decode_failure",
            Self::Io => "io",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn chapter_out_of_range(storage_index: usize, chapter_count: usize) -> Self {
        Self::new(
            CoreErrorCode::IndexOutOfRange,
            format!("no story chapter at storage index {storage_index} (record has {chapter_count})"),
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::DecodeFailure, message)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}

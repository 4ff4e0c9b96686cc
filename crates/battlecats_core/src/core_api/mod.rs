mod bridge;
mod engine;
mod error;
mod host;
mod types;

pub use bridge::Bridge;
pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use host::{Host, SilentHost};
pub use types::{CountryCode, StoryChapterEntry, StoryEditRequest};

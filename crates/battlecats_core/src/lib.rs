pub mod chapter;
pub mod codec;
pub mod core_api;
pub mod editor;
pub mod progress;
mod reader;

//! Non-interactive access to a whole save for callers that cannot drive a
//! terminal session, such as a browser front end.
//!
//! The record is exposed as a JSON tree. Byte payloads inside it are base64
//! text, so a tree handed back unchanged re-encodes to the same bytes.

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::codec::SaveRecord;
use crate::editor::BulkReport;

use super::engine::Engine;
use super::error::CoreError;
use super::types::{CountryCode, StoryEditRequest};

#[derive(Debug, Clone, Default)]
pub struct Bridge {
    engine: Engine,
}

impl Bridge {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn parse_save_tree(
        &self,
        save_bytes: &[u8],
        country: Option<CountryCode>,
    ) -> Result<JsonValue, CoreError> {
        let session = self.engine.open_bytes(save_bytes, country)?;
        serde_json::to_value(session.record())
            .map_err(|e| CoreError::decode(format!("failed to build save tree: {e}")))
    }

    pub fn parse_save_json(
        &self,
        save_bytes: &[u8],
        country: Option<CountryCode>,
    ) -> Result<String, CoreError> {
        let tree = self.parse_save_tree(save_bytes, country)?;
        serde_json::to_string_pretty(&tree)
            .map_err(|e| CoreError::decode(format!("failed to render save tree: {e}")))
    }

    /// Re-encodes an edited tree. The tree is checked in full before any
    /// bytes are produced.
    pub fn serialise_save_json(&self, save_json: &str) -> Result<Vec<u8>, CoreError> {
        let record: SaveRecord = serde_json::from_str(save_json)
            .map_err(|e| CoreError::decode(format!("invalid save tree: {e}")))?;
        record.story.validate()?;
        self.engine.open_record(record).to_bytes()
    }

    pub fn apply_edit(
        &self,
        save_bytes: &[u8],
        country: Option<CountryCode>,
        request: &StoryEditRequest,
    ) -> Result<(Vec<u8>, BulkReport), CoreError> {
        let mut session = self.engine.open_bytes(save_bytes, country)?;
        let report = session.apply_request(request)?;
        debug!(
            chapters = request.chapters().len(),
            skipped = report.skipped.len(),
            "applied bridge edit request"
        );
        Ok((session.to_bytes()?, report))
    }
}

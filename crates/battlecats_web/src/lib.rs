use battlecats_core::core_api::{Bridge, CoreError, CoreErrorCode, CountryCode, StoryEditRequest};
use battlecats_render::{
    JsonStyle, TextRenderOptions, render_json_full_with_options, render_story_table_with_options,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebOptions {
    pub country: Option<String>,
    pub json_output: bool,
    pub verbose: bool,
}

/// Edited save plus the logical chapters the edit applied to or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryEditResult {
    pub save_bytes: Vec<u8>,
    pub applied: Vec<usize>,
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone)]
struct WebError {
    code: &'static str,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct WebErrorPayload {
    code: String,
    message: String,
}

impl WebError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_js_value(&self) -> JsValue {
        let payload = WebErrorPayload {
            code: self.code.to_string(),
            message: self.message.clone(),
        };
        serde_wasm_bindgen::to_value(&payload).unwrap_or_else(|_| {
            JsValue::from_str(&format!("{}: {}", payload.code, payload.message))
        })
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        let code = match err.code {
            CoreErrorCode::DecodeFailure => "parse_failed",
            CoreErrorCode::IndexOutOfRange => "chapter_out_of_range",
            CoreErrorCode::InvalidRequest => "invalid_request",
            CoreErrorCode::Io => "encode_failed",
        };
        Self::new(code, err.message)
    }
}

/// Renders the story progress overview as text, or as JSON with
/// `json_output`.
#[wasm_bindgen]
pub fn render_save_text(save_bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    render_save_text_impl(save_bytes, &parsed_options).map_err(|err| err.to_js_value())
}

/// Decodes a save into the editable JSON tree.
#[wasm_bindgen]
pub fn parse_save_data(save_bytes: &[u8], options: JsValue) -> Result<String, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    parse_save_data_impl(save_bytes, &parsed_options).map_err(|err| err.to_js_value())
}

/// Re-encodes a JSON tree produced by `parse_save_data`.
#[wasm_bindgen]
pub fn serialise_save_data(save_json: &str) -> Result<Vec<u8>, JsValue> {
    serialise_save_data_impl(save_json).map_err(|err| err.to_js_value())
}

/// Applies one edit request. Chapters missing from the save are listed in
/// `skipped` rather than failing the edit.
#[wasm_bindgen]
pub fn apply_story_edit(
    save_bytes: &[u8],
    request: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let parsed_options = parse_options(options).map_err(|err| err.to_js_value())?;
    let request: StoryEditRequest = serde_wasm_bindgen::from_value(request).map_err(|err| {
        WebError::new(
            "invalid_request",
            format!("Failed to parse story edit request: {err}"),
        )
        .to_js_value()
    })?;
    let result = apply_story_edit_impl(save_bytes, &request, &parsed_options)
        .map_err(|err| err.to_js_value())?;
    serde_wasm_bindgen::to_value(&result).map_err(|err| {
        WebError::new(
            "render_failed",
            format!("failed to convert edit result: {err}"),
        )
        .to_js_value()
    })
}

fn render_save_text_impl(save_bytes: &[u8], options: &WebOptions) -> Result<String, WebError> {
    ensure_not_empty(save_bytes)?;
    let country = parse_country(options.country.as_deref())?;

    let session = Bridge::default()
        .engine()
        .open_bytes(save_bytes, country)?;
    let render_options = TextRenderOptions {
        verbose: options.verbose,
    };

    if options.json_output {
        let value = render_json_full_with_options(&session, JsonStyle::CanonicalV1, render_options);
        return serde_json::to_string_pretty(&value).map_err(|err| {
            WebError::new(
                "render_failed",
                format!("failed to serialize rendered JSON output: {err}"),
            )
        });
    }

    Ok(render_story_table_with_options(&session, render_options))
}

fn parse_save_data_impl(save_bytes: &[u8], options: &WebOptions) -> Result<String, WebError> {
    ensure_not_empty(save_bytes)?;
    let country = parse_country(options.country.as_deref())?;
    Ok(Bridge::default().parse_save_json(save_bytes, country)?)
}

fn serialise_save_data_impl(save_json: &str) -> Result<Vec<u8>, WebError> {
    Ok(Bridge::default().serialise_save_json(save_json)?)
}

fn apply_story_edit_impl(
    save_bytes: &[u8],
    request: &StoryEditRequest,
    options: &WebOptions,
) -> Result<StoryEditResult, WebError> {
    ensure_not_empty(save_bytes)?;
    let country = parse_country(options.country.as_deref())?;
    let (save_bytes, report) = Bridge::default().apply_edit(save_bytes, country, request)?;
    Ok(StoryEditResult {
        save_bytes,
        applied: report.applied,
        skipped: report.skipped,
    })
}

fn ensure_not_empty(save_bytes: &[u8]) -> Result<(), WebError> {
    if save_bytes.is_empty() {
        return Err(WebError::new(
            "unsupported_file",
            "The uploaded file is empty. Please provide a Battle Cats save file.",
        ));
    }
    Ok(())
}

fn parse_options(options: JsValue) -> Result<WebOptions, WebError> {
    if options.is_null() || options.is_undefined() {
        return Ok(WebOptions::default());
    }

    serde_wasm_bindgen::from_value(options).map_err(|err| {
        WebError::new(
            "invalid_options",
            format!("Failed to parse web options: {err}"),
        )
    })
}

fn parse_country(raw: Option<&str>) -> Result<Option<CountryCode>, WebError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    CountryCode::parse(raw).map(Some).ok_or_else(|| {
        WebError::new(
            "invalid_options",
            format!("Invalid country '{raw}'. Expected one of: en, jp, kr, tw"),
        )
    })
}

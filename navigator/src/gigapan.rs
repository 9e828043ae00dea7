//! Gigapan image metadata scraped from the public viewer page.
//!
//! The emulated viewer needs the image dimensions and pyramid depth to
//! request tiles. Gigapan does not publish these through an API, but the
//! page's inline JavaScript carries them as `"width":N`, `"height":N` and
//! `"levels":N`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GigapanError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    /// Page did not contain the expected `"name":<digits>` entry
    #[error("Missing field in page: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Dimensions of a Gigapan image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GigapanMetadata {
    /// Image identifier, the last path segment of the page URL
    pub id: String,
    pub width: u64,
    pub height: u64,
    pub levels: u32,
}

/// Image identifier from a Gigapan URL (`.../gigapans/117375` gives `117375`)
pub fn image_id(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Extract metadata from the HTML of a Gigapan page
pub fn parse_metadata(id: &str, html: &str) -> Result<GigapanMetadata, GigapanError> {
    let width = find_number(html, &WIDTH, "width")?;
    let height = find_number(html, &HEIGHT, "height")?;
    let levels = find_number(html, &LEVELS, "levels")?;

    Ok(GigapanMetadata {
        id: id.to_string(),
        width,
        height,
        levels: u32::try_from(levels).map_err(|_| GigapanError::InvalidField {
            field: "levels",
            value: levels.to_string(),
        })?,
    })
}

/// Fetch the Gigapan page at `url` and extract its metadata
pub fn fetch_metadata(url: &str) -> Result<GigapanMetadata, GigapanError> {
    debug!("Fetching Gigapan page {url}");
    let mut response = ureq::get(url).call()?;
    let html = response.body_mut().read_to_string()?;

    let metadata = parse_metadata(image_id(url), &html)?;
    debug!("Gigapan metadata: {metadata:?}");
    Ok(metadata)
}

static WIDTH: Lazy<Regex> = Lazy::new(|| field_pattern("width"));
static HEIGHT: Lazy<Regex> = Lazy::new(|| field_pattern("height"));
static LEVELS: Lazy<Regex> = Lazy::new(|| field_pattern("levels"));

fn field_pattern(field: &str) -> Regex {
    Regex::new(&format!(r#""{field}":(\d+)"#)).expect("field pattern is a valid regex")
}

/// First `"field":<digits>` occurrence in `text`
fn find_number(
    text: &str,
    pattern: &Regex,
    field: &'static str,
) -> Result<u64, GigapanError> {
    let digits = pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(GigapanError::MissingField(field))?
        .as_str();

    digits.parse().map_err(|_| GigapanError::InvalidField {
        field,
        value: digits.to_string(),
    })
}

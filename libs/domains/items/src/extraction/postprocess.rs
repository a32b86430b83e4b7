use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use super::{ExtractedProduct, ExtractionError};

static HEX_COLOUR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());
static EMBEDDED_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Model output before clean-up. Scalars stay loosely typed because models
/// occasionally quote numbers or return numbers for text fields.
#[derive(Debug, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub vendor: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub colour_hex: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub material: Option<Value>,
    #[serde(default)]
    pub dimensions: Option<Value>,
    #[serde(default)]
    pub features: Option<Vec<Value>>,
}

/// Parse the model's reply: strips markdown fences, then falls back to the
/// outermost `{...}` block.
pub fn parse_model_output(reply: &str) -> Result<RawProduct, ExtractionError> {
    let mut cleaned = reply.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    let cleaned = cleaned.trim();

    match serde_json::from_str::<RawProduct>(cleaned) {
        Ok(raw) => Ok(raw),
        Err(first) => {
            let block = EMBEDDED_OBJECT
                .find(cleaned)
                .ok_or_else(|| ExtractionError::Parse("No valid JSON found in AI response".into()))?;
            serde_json::from_str(block.as_str()).map_err(|_| ExtractionError::Parse(first.to_string()))
        }
    }
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}

fn truncate(s: String, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].trim_end().to_string(),
        None => s,
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

fn price(value: Option<Value>) -> Option<f64> {
    let amount = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    }?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// `#RRGGBB` kept, `#RGB` expanded, bare `RRGGBB` prefixed, anything else dropped.
pub fn normalize_colour(raw: &str) -> Option<String> {
    let colour = raw.trim();
    if HEX_COLOUR.is_match(colour) {
        return Some(colour.to_string());
    }
    let is_hex = |s: &str| s.chars().all(|c| c.is_ascii_hexdigit());
    if let Some(short) = colour.strip_prefix('#')
        && short.len() == 3
        && is_hex(short)
    {
        let expanded: String = short.chars().flat_map(|c| [c, c]).collect();
        return Some(format!("#{expanded}"));
    }
    if colour.len() == 6 && is_hex(colour) {
        return Some(format!("#{colour}"));
    }
    None
}

/// Clean model output into the response shape.
pub fn normalize(raw: RawProduct) -> ExtractedProduct {
    let title = text(raw.title)
        .map(|t| truncate(t, 200))
        .unwrap_or_else(|| "Product".to_string());

    ExtractedProduct {
        title,
        vendor: text(raw.vendor).map(|v| truncate(v, 100)),
        price: price(raw.price),
        currency: text(raw.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| "USD".to_string()),
        description: text(raw.description).map(|d| truncate(d, 500)),
        colour_hex: text(raw.colour_hex).and_then(|c| normalize_colour(&c)),
        category: text(raw.category).map(|c| truncate(title_case(&c), 50)),
        material: text(raw.material).map(|m| truncate(title_case(&m), 50)),
        dimensions: text(raw.dimensions),
        features: raw
            .features
            .unwrap_or_default()
            .into_iter()
            .filter_map(|f| text(Some(f)))
            .collect(),
    }
}

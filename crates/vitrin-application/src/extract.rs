//! Deterministic field extraction from free text.
//!
//! Used by the gathering scenario so routine "name + price" messages never
//! cost an intent-resolver call. A price is the first number in the text
//! (thousands separators tolerated, two-decimal fractions understood);
//! whatever meaningful text remains becomes the product name when the
//! draft does not have one yet.

use once_cell::sync::Lazy;
use regex::Regex;
use vitrin_core::draft::{DetailPatch, ProductDraft};

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d(?:[\d \u{202f},.'']*\d)?)\s*(?:so'?m|sum|uzs|usd|eur|\$)?").unwrap()
});

static MATERIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)material\s*[:\-]?\s*([\p{L}][\p{L} ]*)").unwrap());

/// Builds a patch from whatever the text deterministically contains.
/// Returns an empty patch when nothing was recognized.
pub fn extract_detail_patch(text: &str, draft: &ProductDraft) -> DetailPatch {
    let mut patch = DetailPatch::default();
    let mut remainder = text.to_string();

    if draft.price_minor.is_none() {
        if let Some(captures) = PRICE_RE.captures(text) {
            let raw = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            if let Some(minor) = parse_price_text(raw) {
                patch.price_minor = Some(minor);
                remainder = remainder.replacen(captures.get(0).unwrap().as_str(), " ", 1);
            }
        }
    }

    if let Some(captures) = MATERIAL_RE.captures(&remainder) {
        let material = captures[1].trim().to_string();
        if !material.is_empty() {
            patch.material = Some(material);
            remainder = remainder.replacen(captures.get(0).unwrap().as_str(), " ", 1);
        }
    }

    if draft.raw_name.is_none() {
        let name = remainder
            .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .trim()
            .to_string();
        if name.chars().filter(|c| c.is_alphabetic()).count() >= 2 {
            patch.raw_name = Some(name);
        }
    }

    patch
}

/// Parses a human-typed price into minor units: `"4 200"` and `"4,200"`
/// are the major amount, `"4200.50"` carries cents. Amounts below 1 are
/// rejected; nobody prices a product at zero.
fn parse_price_text(raw: &str) -> Option<i64> {
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if compact.is_empty() {
        return None;
    }
    let value: f64 = compact.parse().ok()?;
    if value < 1.0 {
        return None;
    }
    Some((value * 100.0).round() as i64)
}

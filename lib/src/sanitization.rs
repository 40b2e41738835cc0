// lib/src/sanitization.rs

//! Normalization of free-form request input.
//!
//! Every string that reaches the store passes through [`sanitize`]: convert to
//! text, trim, optionally drop characters outside an allow-set, cap the length,
//! escape the five HTML-sensitive characters and attach a reversible
//! `\uXXXX` encoding of the result. The email, phone and SSN helpers layer a
//! format check on top.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub use rx_models::is_ssn_format;
use rx_models::Scalar;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Character classes kept when filtering is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowSet {
    /// ASCII digits.
    pub numeric: bool,
    /// ASCII letters.
    pub alphabetic: bool,
    /// Any Unicode whitespace.
    pub whitespace: bool,
}

impl AllowSet {
    /// Digits and whitespace.
    pub const fn numeric() -> Self {
        AllowSet {
            numeric: true,
            alphabetic: false,
            whitespace: true,
        }
    }

    /// Letters and whitespace.
    pub const fn alphabetic() -> Self {
        AllowSet {
            numeric: false,
            alphabetic: true,
            whitespace: true,
        }
    }

    pub const fn alphanumeric() -> Self {
        AllowSet {
            numeric: true,
            alphabetic: true,
            whitespace: true,
        }
    }

    pub fn allows(&self, c: char) -> bool {
        (self.numeric && c.is_ascii_digit())
            || (self.alphabetic && c.is_ascii_alphabetic())
            || (self.whitespace && c.is_whitespace())
    }
}

impl Default for AllowSet {
    fn default() -> Self {
        AllowSet::alphabetic()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub trim: bool,
    pub filter: Option<AllowSet>,
    pub max_length: Option<usize>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions {
            trim: true,
            filter: None,
            max_length: None,
        }
    }
}

impl SanitizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn filter(mut self, allow: AllowSet) -> Self {
        self.filter = Some(allow);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sanitized {
    /// The input as received, `None` when nothing was sent.
    pub original: Option<String>,
    pub sanitized: String,
    pub hex_encoded: String,
}

impl Sanitized {
    fn replace_sanitized(mut self, sanitized: String) -> Self {
        self.hex_encoded = encode_hex(&sanitized);
        self.sanitized = sanitized;
        self
    }
}

/// A sanitized value plus the outcome of a format check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validated {
    #[serde(flatten)]
    pub result: Sanitized,
    pub is_valid: bool,
}

impl Validated {
    pub fn sanitized(&self) -> &str {
        &self.result.sanitized
    }
}

pub fn sanitize(input: Option<&str>, options: &SanitizeOptions) -> Sanitized {
    let Some(raw) = input else {
        return Sanitized::default();
    };

    let mut processed = if options.trim { raw.trim() } else { raw }.to_string();

    if let Some(allow) = options.filter {
        processed.retain(|c| allow.allows(c));
    }

    if let Some(max) = options.max_length {
        if let Some((cut, _)) = processed.char_indices().nth(max) {
            processed.truncate(cut);
        }
    }

    let sanitized = escape_html(&processed);
    let hex_encoded = encode_hex(&sanitized);

    Sanitized {
        original: Some(raw.to_string()),
        sanitized,
        hex_encoded,
    }
}

/// [`sanitize`] for a JSON scalar; numbers and booleans are read as text.
pub fn sanitize_scalar(input: Option<&Scalar>, options: &SanitizeOptions) -> Sanitized {
    match input {
        Some(value) => sanitize(Some(&value.as_text()), options),
        None => sanitize(None, options),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Encodes every UTF-16 code unit as `\u` plus four lowercase hex digits.
pub fn encode_hex(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len() * 6);
    for unit in input.encode_utf16() {
        let _ = write!(encoded, "\\u{:04x}", unit);
    }
    encoded
}

/// Inverse of [`encode_hex`]. Text that is not a `\uXXXX` escape is copied
/// through untouched; unpaired surrogates decode to U+FFFD.
pub fn decode_hex(input: &str) -> String {
    let mut decoded = String::with_capacity(input.len() / 6 + 1);
    let mut units: Vec<u16> = Vec::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if let Some(unit) = leading_escape(rest) {
            units.push(unit);
            rest = &rest[6..];
            continue;
        }
        flush_units(&mut units, &mut decoded);
        decoded.push(c);
        rest = &rest[c.len_utf8()..];
    }
    flush_units(&mut units, &mut decoded);
    decoded
}

fn leading_escape(text: &str) -> Option<u16> {
    let digits = text.strip_prefix("\\u")?.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

pub fn sanitize_email(email: Option<&str>) -> Validated {
    let result = sanitize(email, &SanitizeOptions::new().max_length(100));
    let is_valid = EMAIL_PATTERN.is_match(&result.sanitized);
    Validated { result, is_valid }
}

/// Keeps digits only; valid for 10 to 15 digits.
pub fn sanitize_phone(phone: Option<&str>) -> Validated {
    let result = sanitize(phone, &SanitizeOptions::new().filter(AllowSet::numeric()));
    let digits: String = result.sanitized.chars().filter(|c| c.is_ascii_digit()).collect();
    let is_valid = (10..=15).contains(&digits.len());
    Validated {
        result: result.replace_sanitized(digits),
        is_valid,
    }
}

/// Runs the numeric filter and re-inserts the dashes after the third and
/// fifth character. On failure the sanitized value is empty.
pub fn sanitize_ssn(ssn: Option<&str>) -> Validated {
    let result = sanitize(ssn, &SanitizeOptions::new().filter(AllowSet::numeric()));
    let reshaped = reshape_ssn(&result.sanitized);
    let is_valid = is_ssn_format(&reshaped);
    let sanitized = if is_valid { reshaped } else { String::new() };
    Validated {
        result: result.replace_sanitized(sanitized),
        is_valid,
    }
}

fn reshape_ssn(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let part = |from: usize, to: usize| -> String {
        chars[from.min(chars.len())..to.min(chars.len())].iter().collect()
    };
    format!("{}-{}-{}", part(0, 3), part(3, 5), part(5, chars.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(input: &str) -> Sanitized {
        sanitize(Some(input), &SanitizeOptions::default())
    }

    #[test]
    fn missing_input_short_circuits() {
        let result = sanitize(None, &SanitizeOptions::new().max_length(3));
        assert_eq!(result, Sanitized::default());
        assert!(result.original.is_none());
        assert!(result.hex_encoded.is_empty());
    }

    #[test]
    fn trims_by_default() {
        assert_eq!(plain("  Amoxicillin \t").sanitized, "Amoxicillin");
        let untrimmed = sanitize(Some(" a "), &SanitizeOptions::new().trim(false));
        assert_eq!(untrimmed.sanitized, " a ");
    }

    #[test]
    fn escapes_html_sensitive_characters() {
        let result = plain(r#"<script>alert("x" & 'y')</script>"#);
        assert_eq!(
            result.sanitized,
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#039;y&#039;)&lt;/script&gt;"
        );
        for raw in ['<', '>', '"', '\''] {
            assert!(!result.sanitized.contains(raw));
        }
        assert_eq!(result.original.as_deref(), Some(r#"<script>alert("x" & 'y')</script>"#));
    }

    #[test]
    fn numeric_filter_keeps_digits_and_whitespace_only() {
        let options = SanitizeOptions::new().filter(AllowSet::numeric());
        let result = sanitize(Some("Call 555-123 4567 <now>!"), &options);
        assert_eq!(result.sanitized, " 555123 4567 ");
        assert!(result
            .sanitized
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace()));
    }

    #[test]
    fn default_filter_keeps_letters_and_spaces() {
        let options = SanitizeOptions::new().filter(AllowSet::default());
        assert_eq!(sanitize(Some("Dr. O'Neil 3rd"), &options).sanitized, "Dr ONeil rd");
    }

    #[test]
    fn truncates_before_escaping() {
        let options = SanitizeOptions::new().max_length(4);
        assert_eq!(sanitize(Some("a&bcdef"), &options).sanitized, "a&amp;bc");
        assert_eq!(sanitize(Some("héllo"), &options).sanitized, "héll");
        assert_eq!(sanitize(Some("abc"), &options).sanitized, "abc");
    }

    #[test]
    fn hex_encoding_pads_to_four_digits() {
        assert_eq!(encode_hex("A&"), "\\u0041\\u0026");
        assert_eq!(plain("é").hex_encoded, "\\u00e9");
    }

    #[test]
    fn hex_round_trips_sanitized_output() {
        let samples = [
            "",
            "plain text",
            "<b>bold</b> & 'quoted'",
            "naïve café",
            "emoji 💊 pills",
            "tab\tand\nnewline",
            "\\u0041 literal escape",
        ];
        for sample in samples {
            let result = plain(sample);
            assert_eq!(decode_hex(&result.hex_encoded), result.sanitized, "sample {:?}", sample);
        }
    }

    #[test]
    fn decode_passes_through_non_escapes() {
        assert_eq!(decode_hex("x\\u0041y\\uzzzz"), "xAy\\uzzzz");
        assert_eq!(decode_hex("\\ud83d"), "\u{fffd}");
    }

    #[test]
    fn email_validation() {
        assert!(sanitize_email(Some("  house@ppth.org ")).is_valid);
        assert!(!sanitize_email(Some("house@ppth")).is_valid);
        assert!(!sanitize_email(Some("house wilson@ppth.org")).is_valid);
        assert!(!sanitize_email(None).is_valid);
        let long = format!("{}@example.com", "a".repeat(120));
        assert_eq!(sanitize_email(Some(&long)).sanitized().chars().count(), 100);
    }

    #[test]
    fn phone_validation_counts_digits() {
        let phone = sanitize_phone(Some("(555) 123-4567"));
        assert!(phone.is_valid);
        assert_eq!(phone.sanitized(), "5551234567");
        assert_eq!(decode_hex(&phone.result.hex_encoded), "5551234567");
        assert!(!sanitize_phone(Some("123-4567")).is_valid);
        assert!(!sanitize_phone(Some("1234567890123456")).is_valid);
    }

    #[test]
    fn ssn_is_reshaped_from_digits() {
        let ssn = sanitize_ssn(Some(" 123 45 6789 "));
        assert!(!ssn.is_valid);
        assert_eq!(ssn.sanitized(), "");

        let ssn = sanitize_ssn(Some("123-45-6789"));
        assert!(ssn.is_valid);
        assert_eq!(ssn.sanitized(), "123-45-6789");

        let ssn = sanitize_ssn(Some("123456789"));
        assert!(ssn.is_valid);
        assert_eq!(ssn.sanitized(), "123-45-6789");

        let ssn = sanitize_ssn(Some("12345"));
        assert!(!ssn.is_valid);
        assert_eq!(ssn.sanitized(), "");
        assert!(ssn.result.hex_encoded.is_empty());
    }

    #[test]
    fn fixed_ssn_format() {
        assert!(is_ssn_format("123-45-6789"));
        assert!(!is_ssn_format("123456789"));
        assert!(!is_ssn_format("12-345-6789"));
    }

    #[test]
    fn scalar_numbers_are_read_as_text() {
        let amount = Scalar::from(12.5);
        let result = sanitize_scalar(Some(&amount), &SanitizeOptions::default());
        assert_eq!(result.sanitized, "12.5");
    }

    #[test]
    fn validated_serializes_flat() {
        let json = serde_json::to_value(sanitize_phone(Some("5551234567"))).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["sanitized"], "5551234567");
        assert!(json.get("hexEncoded").is_some());
    }
}

//! Log sanitization for survey answers.
//!
//! Formatted log lines pass through `SanitizingMakeWriter`, which redacts
//! values that could identify a respondent or reveal their answers:
//! - Blood pressure readings ("135/85")
//! - Labelled body measures ("weight=70", "BMI: 22.9")
//! - Emails, phone numbers and UUIDs
//!
//! Callsites should still avoid logging raw answers; this is a backstop.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum bytes of a single line that are scanned; the rest is dropped.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 8 * 1024;

const RULES: [(&str, &str); 5] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (
        r"(?i)\b[a-z0-9._%+-]{1,64}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?\d{1,3}[-.\s])?\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b",
        "[REDACTED-PHONE]",
    ),
    (r"\b\d{2,3}\s*/\s*\d{2,3}\b", "[REDACTED-BP]"),
    (
        r"(?i)\b(?:height|weight|bmi|cholesterol|chol|age)(?:_[a-z]+)?\s*[:=]\s*-?\d+(?:\.\d+)?",
        "[REDACTED-MEASURE]",
    ),
];

struct Patterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        set: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        rules: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
            .collect(),
    })
}

fn max_sanitize_bytes() -> usize {
    std::env::var("GLYCOSCOPE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace sensitive patterns in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).iter() {
        let (regex, replacement) = &patterns.rules[idx];
        result = regex.replace_all(&result, *replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains anything `sanitize` would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer that sanitizes each formatted line
/// before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let (body, newline) = match bytes.strip_suffix(b"\n") {
            Some(body) => (body, true),
            None => (bytes, false),
        };
        let text = String::from_utf8_lossy(body);
        self.inner
            .write_all(sanitize_with_limit(&text, self.max_bytes).as_bytes())?;
        if newline {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight is written out truncated.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
            max_bytes: max_sanitize_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_blood_pressure() {
        let sanitized = sanitize("reading 135/85 submitted");
        assert_eq!(sanitized, "reading [REDACTED-BP] submitted");
    }

    #[test]
    fn test_sanitize_measures() {
        let sanitized = sanitize("height_cm=175 weight: 70.5 BMI=22.9");
        assert!(!sanitized.contains("175"));
        assert!(!sanitized.contains("70.5"));
        assert!(!sanitized.contains("22.9"));
        assert_eq!(sanitized.matches("[REDACTED-MEASURE]").count(), 3);
    }

    #[test]
    fn test_sanitize_contact_details() {
        let sanitized = sanitize("contact jane.doe@example.org or 555-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_sanitize_uuid() {
        let sanitized = sanitize("request 550e8400-e29b-41d4-a716-446655440000 done");
        assert!(sanitized.contains("[REDACTED-UUID]"));
    }

    #[test]
    fn test_plain_log_lines_pass_through() {
        let line = "Loaded pipeline (schema=clinical, n_features=10, n_expanded=14)";
        assert!(!contains_sensitive(line));
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let sanitized = sanitize_with_limit("ééééé", 3);
        assert_eq!(sanitized, "é [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_each_line() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut out,
                buffer: Vec::new(),
                max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
            };
            writer.write_all(b"bp 150/95\nsecond ").expect("write");
            writer.write_all(b"line\n").expect("write");
            writer.flush().expect("flush");
        }
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "bp [REDACTED-BP]\nsecond line\n"
        );
    }

    #[test]
    fn test_writer_caps_line_without_newline() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut out,
                buffer: Vec::new(),
                max_bytes: 8,
            };
            writer.write_all(b"abcdefghij").expect("write");
            writer.write_all(b"klmnopqrst").expect("write");
            assert!(writer.buffer.is_empty());
            writer.write_all(b"tail\n").expect("write");
            writer.flush().expect("flush");
        }
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "abcdefgh [TRUNCATED]\ntail\n"
        );
    }
}

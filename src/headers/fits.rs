//! FITS primary header parsing.
//!
//! A FITS header is a sequence of 2880-byte blocks, each holding 36 cards of 80 ASCII characters.
//! Value cards look like `KEYWORD = value / comment`; the header ends with an `END` card.

use super::structs::{HeaderFields, HeaderOutcome, HeaderReader};
use serde_json::{Number, Value};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

pub const BLOCK_LEN: usize = 2880;
pub const CARD_LEN: usize = 80;

/// Reads FITS headers, giving up after `max_blocks` blocks.
#[derive(Debug, Clone)]
pub struct FitsReader {
    max_blocks: usize,
}

impl FitsReader {
    pub fn new(max_blocks: usize) -> Self {
        Self {
            max_blocks: max_blocks.max(1),
        }
    }
}

impl HeaderReader for FitsReader {
    fn read(&mut self, path: &Path) -> io::Result<HeaderOutcome> {
        let limit = self.max_blocks.saturating_mul(BLOCK_LEN);
        let file = File::open(path)?;
        let mut bytes = Vec::with_capacity(BLOCK_LEN);
        if let Err(e) = file.take(limit as u64).read_to_end(&mut bytes) {
            debug!(path = %path.display(), error = %e, "FITS header read failed");
            return Ok(HeaderOutcome::Unreadable(format!("read failed: {e}")));
        }
        Ok(match parse_header(&bytes) {
            HeaderOutcome::Partial { fields, .. } if bytes.len() >= limit => HeaderOutcome::Partial {
                fields,
                reason: format!("no END card within {} blocks", self.max_blocks),
            },
            outcome => outcome,
        })
    }
}

/// Parses header cards from the start of a FITS file.
pub fn parse_header(bytes: &[u8]) -> HeaderOutcome {
    let mut fields = HeaderFields::new();

    for (index, card) in bytes.chunks(CARD_LEN).enumerate() {
        if card.len() < CARD_LEN {
            break;
        }
        if !card.is_ascii() {
            return HeaderOutcome::degraded(fields, format!("non-ASCII header card {index}"));
        }
        let Ok(card) = std::str::from_utf8(card) else {
            return HeaderOutcome::degraded(fields, format!("non-ASCII header card {index}"));
        };

        let keyword = card[..8].trim_end();
        if index == 0 && keyword != "SIMPLE" {
            return HeaderOutcome::Unreadable("not a FITS file: first card is not SIMPLE".into());
        }
        if keyword == "END" {
            return HeaderOutcome::Found(fields);
        }
        // COMMENT, HISTORY and blank cards carry no value indicator.
        if keyword.is_empty() || &card[8..10] != "= " {
            continue;
        }
        if let Some(value) = parse_value(&card[10..]) {
            fields.insert(keyword.to_string(), value);
        }
    }

    HeaderOutcome::degraded(fields, "truncated header: no END card")
}

/// Parses the value part of a card.
///
/// Strings are single-quoted with `''` as an escaped quote and trailing blanks removed. `T`/`F`
/// are logicals. Floats may use a `D` exponent. Anything else is kept as text.
pub fn parse_value(raw: &str) -> Option<Value> {
    let raw = raw.trim_start();

    if let Some(rest) = raw.strip_prefix('\'') {
        let mut text = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\'' {
                text.push(c);
            } else if chars.peek() == Some(&'\'') {
                text.push('\'');
                chars.next();
            } else {
                return Some(Value::String(text.trim_end().to_string()));
            }
        }
        return None;
    }

    let value = raw.split_once('/').map_or(raw, |(value, _)| value).trim();
    match value {
        "" => None,
        "T" => Some(Value::Bool(true)),
        "F" => Some(Value::Bool(false)),
        _ => {
            if let Ok(int) = value.parse::<i64>() {
                return Some(Value::from(int));
            }
            let float = value
                .replace(['D', 'd'], "E")
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64);
            Some(float.map_or_else(|| Value::String(value.to_string()), Value::Number))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn card(text: &str) -> String {
        format!("{text:<80}")
    }

    /// A minimal FITS header with the given value cards, padded to a whole block.
    pub(crate) fn fits_header(cards: &[(&str, &str)]) -> Vec<u8> {
        let mut header = card("SIMPLE  =                    T / conforms to FITS standard");
        header.push_str(&card("BITPIX  =                   16"));
        header.push_str(&card("NAXIS   =                    0"));
        for (key, value) in cards {
            header.push_str(&card(&format!("{key:<8}= {value}")));
        }
        header.push_str(&card("END"));
        let padded = header.len().div_ceil(BLOCK_LEN) * BLOCK_LEN;
        let mut bytes = header.into_bytes();
        bytes.resize(padded, b' ');
        bytes
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("                 180 / [s]"), Some(json!(180)));
        assert_eq!(parse_value("               -10.5"), Some(json!(-10.5)));
        assert_eq!(parse_value("             1.5D+02"), Some(json!(150.0)));
        assert_eq!(parse_value("                   T"), Some(json!(true)));
        assert_eq!(parse_value("'Ha      '           / filter"), Some(json!("Ha")));
        assert_eq!(parse_value("'O''Neil '"), Some(json!("O'Neil")));
        assert_eq!(parse_value("'unterminated"), None);
        assert_eq!(parse_value("                     / only a comment"), None);
    }

    #[test]
    fn test_parse_complete_header() {
        let bytes = fits_header(&[
            ("EXPOSURE", "180.0"),
            ("GAIN", "100"),
            ("SET-TEMP", "-10.0"),
            ("OBJECT", "'M 31    '"),
        ]);
        let HeaderOutcome::Found(fields) = parse_header(&bytes) else {
            panic!("expected a complete header");
        };
        assert_eq!(fields.get("EXPOSURE"), Some(&json!(180.0)));
        assert_eq!(fields.get("GAIN"), Some(&json!(100)));
        assert_eq!(fields.get("SET-TEMP"), Some(&json!(-10.0)));
        assert_eq!(fields.get("OBJECT"), Some(&json!("M 31")));
        assert!(fields.get("FILTER").is_none(), "absent keys are never defaulted");
    }

    #[test]
    fn test_comment_cards_are_skipped() {
        let mut bytes = card("SIMPLE  =                    T").into_bytes();
        bytes.extend(card("COMMENT   = not a value card").bytes());
        bytes.extend(card("HISTORY taken with ASIAIR").bytes());
        bytes.extend(card("GAIN    =                  120").bytes());
        bytes.extend(card("END").bytes());

        let fields = parse_header(&bytes).into_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("GAIN"), Some(&json!(120)));
    }

    #[test]
    fn test_truncated_header_is_partial() {
        let bytes = fits_header(&[("EXPTIME", "60"), ("GAIN", "100")]);
        let truncated = &bytes[..CARD_LEN * 4 + 17];

        let outcome = parse_header(truncated);
        assert!(matches!(outcome, HeaderOutcome::Partial { .. }));
        let fields = outcome.into_fields();
        assert_eq!(fields.get("EXPTIME"), Some(&json!(60)));
        assert!(fields.get("GAIN").is_none());
    }

    #[test]
    fn test_garbage_is_unreadable() {
        assert!(matches!(parse_header(b""), HeaderOutcome::Unreadable(_)));
        assert!(matches!(
            parse_header(&[0xFF; BLOCK_LEN]),
            HeaderOutcome::Unreadable(_)
        ));
        let not_fits = card("HELLO   = 'world'").repeat(36);
        assert!(matches!(
            parse_header(not_fits.as_bytes()),
            HeaderOutcome::Unreadable(_)
        ));
    }

    #[test]
    fn test_reader_respects_block_limit() {
        let mut cards = vec![card("SIMPLE  =                    T")];
        cards.extend((0..80).map(|i| card(&format!("COMMENT filler {i}"))));
        cards.push(card("GAIN    =                  100"));
        cards.push(card("END"));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(cards.concat().as_bytes()).unwrap();

        let limited = FitsReader::new(1).read(file.path()).unwrap();
        assert!(
            matches!(&limited, HeaderOutcome::Partial { reason, .. } if reason.contains("1 blocks"))
        );

        let unlimited = FitsReader::new(4).read(file.path()).unwrap();
        let HeaderOutcome::Found(fields) = unlimited else {
            panic!("expected a complete header");
        };
        assert_eq!(fields.get("GAIN"), Some(&json!(100)));

        let huge = FitsReader::new(usize::MAX).read(file.path()).unwrap();
        assert!(matches!(huge, HeaderOutcome::Found(_)));
    }

    #[test]
    fn test_missing_file_is_an_access_error() {
        let result = FitsReader::new(1).read(Path::new("/definitely/not/here.fits"));
        assert!(result.is_err());
    }
}

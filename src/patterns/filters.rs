use crate::config::ConfigError;
use crate::structs::FilterName;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One row of the filter keyword table: a keyword as it appears in names, and its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilterKeyword {
    pub keyword: String,
    pub canonical: String,
}

#[derive(Debug, Clone)]
struct FilterEntry {
    keyword: String,
    canonical: String,
    /// Keyword on word boundaries, for free text such as session folder names.
    word: Regex,
    /// Keyword between `_`/`-` delimiters, for file names.
    delimited: Regex,
}

/// Ordered, case-insensitive keyword to canonical filter name mapping.
///
/// Order matters: the first entry that matches wins, so longer keywords (`l-extreme`) must come
/// before their prefixes (`l`).
#[derive(Debug, Clone)]
pub struct FilterTable {
    entries: Vec<FilterEntry>,
}

impl FilterTable {
    pub fn new(keywords: &[FilterKeyword]) -> Result<Self, ConfigError> {
        let entries = keywords
            .iter()
            .map(|entry| {
                let keyword = entry.keyword.trim().to_lowercase();
                let canonical = entry.canonical.trim().to_string();
                if keyword.is_empty() || canonical.is_empty() {
                    return Err(ConfigError::EmptyValue("filter_keywords"));
                }
                let escaped = regex::escape(&keyword);
                let word = compile(&format!(r"(?i)\b{escaped}\b"))?;
                let delimited = compile(&format!(r"(?i)[_\-]{escaped}(?:[_\-.]|$)"))?;
                Ok(FilterEntry {
                    keyword,
                    canonical,
                    word,
                    delimited,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Exact lookup of a keyword or canonical name, ignoring case.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.entries
            .iter()
            .find(|e| e.keyword.eq_ignore_ascii_case(text) || e.canonical.eq_ignore_ascii_case(text))
            .map(|e| e.canonical.as_str())
    }

    /// Normalizes captured filter text. Unknown text is kept as is, marked low confidence.
    pub fn normalize(&self, raw: &str) -> Option<FilterName> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(canonical) = self.lookup(raw) {
            return Some(FilterName::mapped(canonical));
        }
        if let Some((filter, _)) = self.find_word(raw) {
            return Some(filter);
        }
        Some(FilterName::unmapped(raw))
    }

    /// Finds the first keyword standing as a word in `text`, with the byte range it occupies.
    pub fn find_word(&self, text: &str) -> Option<(FilterName, Range<usize>)> {
        self.entries.iter().find_map(|e| {
            e.word
                .find(text)
                .map(|m| (FilterName::mapped(e.canonical.as_str()), m.range()))
        })
    }

    /// Finds the first keyword delimited by underscores or dashes, as in `_L-Extreme_`.
    pub fn find_delimited(&self, file_name: &str) -> Option<FilterName> {
        self.entries
            .iter()
            .find(|e| e.delimited.is_match(file_name))
            .map(|e| FilterName::mapped(e.canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::default_filter_keywords;
    use crate::structs::Confidence;

    fn table() -> FilterTable {
        FilterTable::new(&default_filter_keywords()).unwrap()
    }

    #[test]
    fn test_normalize_is_case_insensitive() {
        let table = table();
        assert_eq!(table.normalize("HA"), Some(FilterName::mapped("Ha")));
        assert_eq!(table.normalize("l-Extreme"), Some(FilterName::mapped("L-eXtreme")));
        assert_eq!(table.normalize("oiii"), Some(FilterName::mapped("OIII")));
    }

    #[test]
    fn test_canonical_names_map_to_themselves() {
        let table = table();
        assert_eq!(table.normalize("Red"), Some(FilterName::mapped("Red")));
        assert_eq!(table.normalize("UV/IR Cut"), Some(FilterName::mapped("UV/IR Cut")));
    }

    #[test]
    fn test_unmapped_filter_is_kept_with_low_confidence() {
        let filter = table().normalize("Dual Band").unwrap();
        assert_eq!(filter.name, "Dual Band");
        assert_eq!(filter.confidence, Confidence::Low);
        assert!(table().normalize("   ").is_none());
    }

    #[test]
    fn test_normalize_finds_keyword_inside_header_text() {
        let filter = table().normalize("Baader Ha 7nm").unwrap();
        assert_eq!(filter, FilterName::mapped("Ha"));
    }

    #[test]
    fn test_longer_keywords_win_over_prefixes() {
        let table = table();
        let found = table.find_delimited("Light_M42_L-Extreme_gain120.fit");
        assert_eq!(found, Some(FilterName::mapped("L-eXtreme")));
    }

    #[test]
    fn test_find_word_reports_range() {
        let text = "HomeOSC Ha";
        let (filter, range) = table().find_word(text).unwrap();
        assert_eq!(filter.name, "Ha");
        assert_eq!(&text[range], "Ha");
        assert!(table().find_word("Backyard").is_none());
    }

    #[test]
    fn test_empty_keyword_is_rejected() {
        let result = FilterTable::new(&[FilterKeyword {
            keyword: " ".to_string(),
            canonical: "Ha".to_string(),
        }]);
        assert!(matches!(result, Err(ConfigError::EmptyValue(_))));
    }
}

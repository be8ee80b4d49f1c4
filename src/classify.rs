//! Guessing what kind of payload a scanned code carries.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

// `\w` and `\s` are ASCII-only here. The regex crate's shorthand classes are
// Unicode-aware, so they are spelled out.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_!#$%&'*+/=?^`{|}~-]+(?:\.[A-Za-z0-9_!#$%&'*+/=?^`{|}~-]+)*@(?:[A-Za-z0-9_](?:[A-Za-z0-9_-]*[A-Za-z0-9_])?\.)+[A-Za-z0-9_](?:[A-Za-z0-9_-]*[A-Za-z0-9_])?$",
    )
    .expect("email pattern is valid")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]+://[^ \t\n\x0B\x0C\r]*$").expect("url pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*$").expect("number pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeType {
    Email,
    Url,
    Number,
    Text,
}

impl DecodeType {
    pub fn name(self) -> &'static str {
        match self {
            DecodeType::Email => "EMAIL",
            DecodeType::Url => "URL",
            DecodeType::Number => "NUMBER",
            DecodeType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DecodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies the whole of `text`, trying email, then URL, then digits.
/// The empty string counts as a number; anything else is plain text.
pub fn classify(text: &str) -> DecodeType {
    if EMAIL.is_match(text) {
        DecodeType::Email
    } else if URL.is_match(text) {
        DecodeType::Url
    } else if NUMBER.is_match(text) {
        DecodeType::Number
    } else {
        DecodeType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a@b.co", DecodeType::Email; "short email")]
    #[test_case("first.last+tag@mail.example.org", DecodeType::Email; "dotted email")]
    #[test_case("http://example.com", DecodeType::Url; "http url")]
    #[test_case("https://example.com/path?q=1#frag", DecodeType::Url; "https url with query")]
    #[test_case("ftp://files.example.com", DecodeType::Url; "other scheme")]
    #[test_case("12345", DecodeType::Number; "digits")]
    #[test_case("0", DecodeType::Number; "single digit")]
    #[test_case("hello world", DecodeType::Text; "free text")]
    #[test_case("", DecodeType::Number; "empty")]
    #[test_case("12 345", DecodeType::Text; "digits with space")]
    #[test_case("-42", DecodeType::Text; "signed number")]
    #[test_case("a@b", DecodeType::Text; "email without domain dot")]
    #[test_case("see http://example.com", DecodeType::Text; "url inside text")]
    #[test_case("http://example.com later", DecodeType::Text; "url followed by text")]
    #[test_case("١٢٣", DecodeType::Text; "non ascii digits")]
    #[test_case("http://a\u{3000}b", DecodeType::Url; "ideographic space in url")]
    #[test_case("http://a\u{a0}b", DecodeType::Url; "no break space in url")]
    #[test_case("http://a\tb", DecodeType::Text; "tab in url")]
    #[test_case("http://a\u{0B}b", DecodeType::Text; "vertical tab in url")]
    #[test_case("über@example.com", DecodeType::Text; "non ascii local part")]
    fn classifies_whole_string(text: &str, expected: DecodeType) {
        assert_eq!(classify(text), expected);
    }

    #[test]
    fn numeric_local_part_is_still_email() {
        assert_eq!(classify("12345@example.com"), DecodeType::Email);
    }

    #[test]
    fn trailing_newline_is_not_ignored() {
        assert_eq!(classify("12345\n"), DecodeType::Text);
    }
}

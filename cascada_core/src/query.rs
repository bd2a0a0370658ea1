// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page query parameters.
//!
//! Two parameters matter: `id` (channel key) and `s` (initial server). `s` is
//! 1-based when positive and 0-based otherwise, and is parsed with the same
//! prefix rules as JavaScript's `parseInt(s, 10)` so existing links keep
//! working (`?s=2abc` selects the second server).

use url::form_urlencoded;

/// The parameters read from the page URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Requested channel key (`id`).
    pub channel: Option<String>,
    /// Raw server selector (`s`).
    pub server: Option<String>,
}

impl PageQuery {
    /// Parses a query string, with or without the leading `?`.
    ///
    /// When a parameter repeats, the first occurrence wins.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut out = Self::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "id" if out.channel.is_none() => out.channel = Some(value.into_owned()),
                "s" if out.server.is_none() => out.server = Some(value.into_owned()),
                _ => {}
            }
        }
        out
    }

    /// Parses the query part of a full URL. Unparseable URLs yield an empty
    /// query.
    #[must_use]
    pub fn from_href(href: &str) -> Self {
        match url::Url::parse(href) {
            Ok(url) => Self::parse(url.query().unwrap_or_default()),
            Err(err) => {
                tracing::debug!(%err, "page URL did not parse; ignoring query");
                Self::default()
            }
        }
    }

    /// Requested channel key, treating an empty `id` as absent.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|id| !id.is_empty())
    }

    /// Initial server index for a list of `len` servers.
    #[must_use]
    pub fn server_index(&self, len: usize) -> usize {
        initial_server_index(self.server.as_deref(), len)
    }
}

/// Integer prefix parse with `parseInt(text, 10)` rules.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. Returns `None` when no digit was read.
#[must_use]
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }
    seen.then_some(if negative { -value } else { value })
}

/// Maps the raw `s` parameter to an index in `[0, len - 1]`.
///
/// Missing or non-numeric selectors select the first server; positive values
/// are 1-based; zero and negative values are 0-based and clamp to 0.
#[must_use]
pub fn initial_server_index(raw: Option<&str>, len: usize) -> usize {
    let requested = raw.and_then(parse_int_prefix).unwrap_or(0);
    let zero_based = if requested > 0 { requested - 1 } else { requested };
    clamp_index(zero_based, len)
}

/// Clamps a signed index into `[0, len - 1]`; `0` for an empty list.
#[must_use]
pub fn clamp_index(index: i64, len: usize) -> usize {
    if len == 0 || index <= 0 {
        return 0;
    }
    usize::try_from(index).map_or(len - 1, |index| index.min(len - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_and_s() {
        let query = PageQuery::parse("?id=news&s=2");
        assert_eq!(query.channel(), Some("news"));
        assert_eq!(query.server.as_deref(), Some("2"));
    }

    #[test]
    fn first_occurrence_wins_and_values_are_decoded() {
        let query = PageQuery::parse("id=a%20b&id=other&s=3&s=1");
        assert_eq!(query.channel(), Some("a b"));
        assert_eq!(query.server.as_deref(), Some("3"));
    }

    #[test]
    fn empty_id_is_absent() {
        assert_eq!(PageQuery::parse("id=").channel(), None);
    }

    #[test]
    fn from_href_reads_the_query_part() {
        let query = PageQuery::from_href("https://tv.example/player.html?id=news&s=1#x");
        assert_eq!(query.channel(), Some("news"));
        assert_eq!(PageQuery::from_href("not a url"), PageQuery::default());
    }

    #[test]
    fn int_prefix_follows_parse_int() {
        assert_eq!(parse_int_prefix("2"), Some(2));
        assert_eq!(parse_int_prefix("  3"), Some(3));
        assert_eq!(parse_int_prefix("2abc"), Some(2));
        assert_eq!(parse_int_prefix("-1"), Some(-1));
        assert_eq!(parse_int_prefix("+4"), Some(4));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }

    #[test]
    fn positive_selector_is_one_based() {
        assert_eq!(initial_server_index(Some("1"), 3), 0);
        assert_eq!(initial_server_index(Some("2"), 3), 1);
        assert_eq!(initial_server_index(Some("3"), 3), 2);
    }

    #[test]
    fn out_of_range_selector_clamps() {
        assert_eq!(initial_server_index(Some("9"), 3), 2);
        assert_eq!(initial_server_index(Some("99999999999999999999"), 3), 2);
    }

    #[test]
    fn zero_negative_and_garbage_select_first() {
        assert_eq!(initial_server_index(Some("0"), 3), 0);
        assert_eq!(initial_server_index(Some("-2"), 3), 0);
        assert_eq!(initial_server_index(Some("x"), 3), 0);
        assert_eq!(initial_server_index(None, 3), 0);
        assert_eq!(initial_server_index(Some("2"), 0), 0);
    }
}

//! Request parameter marshaling.
//!
//! # Design
//! The service reads ordinary parameters percent-encoded, but identifier and
//! query lists travel as a bracketed literal (`[1,2,3]`) whose brackets and
//! commas must reach the server verbatim. `Params` keeps pairs already
//! encoded: `literal` values skip escaping, `text` values go through
//! `urlencoding`, and `list` encodes each element but not the brackets. The
//! same rendering serves both the URL query string and the form body.

use std::fmt::Display;

use crate::error::UsageError;

/// Ordered, pre-encoded `name=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(&'static str, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a percent-encoded value.
    pub fn text(mut self, name: &'static str, value: impl Display) -> Self {
        let value = value.to_string();
        self.pairs.push((name, urlencoding::encode(&value).into_owned()));
        self
    }

    /// Add a value only when present.
    pub fn opt<T: Display>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    /// Add `name=1` when `flag` is set.
    pub fn flag(self, name: &'static str, flag: bool) -> Self {
        if flag {
            self.text(name, 1)
        } else {
            self
        }
    }

    /// Add a value without escaping it.
    pub fn literal(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((name, value.into()));
        self
    }

    /// Add `[a,b,c]` with each element percent-encoded. The brackets and
    /// separators stay literal.
    pub fn list<I, T>(mut self, name: &'static str, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let encoded = items
            .into_iter()
            .map(|item| urlencoding::encode(&item.to_string()).into_owned());
        self.pairs.push((name, bracket_literal(encoded)));
        self
    }

    /// Add the session token when there is one.
    pub fn token(self, token: Option<&str>) -> Self {
        self.opt("token", token)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Render `items` as `[a,b,c]`. Elements are written as-is; nothing is quoted.
pub fn bracket_literal<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let joined = items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

/// A normalized sequence of item identifiers.
///
/// Built from a single id or any sequence of ids, so `42` and `vec![42]`
/// produce the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(Vec<u64>);

impl IdList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bracketed literal, or a usage error when the list is empty.
    pub(crate) fn render(&self, field: &'static str) -> Result<String, UsageError> {
        if self.0.is_empty() {
            return Err(UsageError::MissingField(field));
        }
        Ok(bracket_literal(&self.0))
    }
}

impl From<u64> for IdList {
    fn from(id: u64) -> Self {
        IdList(vec![id])
    }
}

impl From<Vec<u64>> for IdList {
    fn from(ids: Vec<u64>) -> Self {
        IdList(ids)
    }
}

impl From<&[u64]> for IdList {
    fn from(ids: &[u64]) -> Self {
        IdList(ids.to_vec())
    }
}

impl From<&Vec<u64>> for IdList {
    fn from(ids: &Vec<u64>) -> Self {
        IdList(ids.clone())
    }
}

impl<const N: usize> From<[u64; N]> for IdList {
    fn from(ids: [u64; N]) -> Self {
        IdList(ids.to_vec())
    }
}

impl FromIterator<u64> for IdList {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        IdList(iter.into_iter().collect())
    }
}

/// Reject `None` and empty strings for a required text field.
pub(crate) fn required<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, UsageError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(UsageError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_values_are_percent_encoded() {
        let params = Params::new()
            .text("email", "a b@example.com")
            .text("password", "p&ss");
        assert_eq!(params.encode(), "email=a%20b%40example.com&password=p%26ss");
    }

    #[test]
    fn literal_values_are_left_alone() {
        let params = Params::new().literal("ids", bracket_literal([1, 2, 3]));
        assert_eq!(params.encode(), "ids=[1,2,3]");
    }

    #[test]
    fn absent_options_and_unset_flags_are_omitted() {
        let params = Params::new()
            .opt::<i64>("priority", None)
            .flag("js_date", false);
        assert!(params.is_empty());
    }

    #[test]
    fn present_zero_is_sent() {
        let params = Params::new().opt("indent", Some(0)).flag("js_date", true);
        assert_eq!(params.encode(), "indent=0&js_date=1");
    }

    #[test]
    fn token_is_skipped_when_absent() {
        assert!(Params::new().token(None).is_empty());
        assert_eq!(Params::new().token(Some("abc")).encode(), "token=abc");
    }

    #[test]
    fn list_elements_are_encoded_inside_literal_brackets() {
        let params = Params::new().list("queries", ["today & p1", "C++", "overdue"]);
        assert_eq!(params.encode(), "queries=[today%20%26%20p1,C%2B%2B,overdue]");
    }

    #[test]
    fn bracket_literal_does_not_quote_strings() {
        assert_eq!(bracket_literal(["overdue", "today"]), "[overdue,today]");
        assert_eq!(bracket_literal(Vec::<u64>::new()), "[]");
    }

    #[test]
    fn scalar_and_sequence_ids_normalize_equally() {
        assert_eq!(IdList::from(42u64), IdList::from(vec![42u64]));
        assert_eq!(IdList::from([42u64]), IdList::from(&[42u64][..]));
    }

    #[test]
    fn empty_id_list_is_a_usage_error() {
        let err = IdList::default().render("ids").unwrap_err();
        assert_eq!(err, UsageError::MissingField("ids"));
    }

    #[test]
    fn required_rejects_empty_strings() {
        assert_eq!(required("name", Some("Inbox")), Ok("Inbox"));
        assert_eq!(
            required("name", Some("")),
            Err(UsageError::MissingField("name"))
        );
        assert_eq!(required("name", None), Err(UsageError::MissingField("name")));
    }
}

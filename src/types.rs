use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A loosely typed scalar as submitted by form or JSON clients.
///
/// The browser front end submits everything as strings (multipart or
/// urlencoded), while API clients send JSON numbers for the same fields. Both
/// arrive here as an optional string; helpers implement the presence and
/// positive-number guards used by the commission rules: "present" means
/// non-empty after trimming, and a value only counts as a positive number when
/// it parses and is strictly greater than zero (so `"0"`, `""` and garbage all
/// fail the guard).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormField(Option<String>);

impl FormField {
    pub fn new(value: impl Into<String>) -> Self {
        FormField(Some(value.into()))
    }

    pub fn empty() -> Self {
        FormField(None)
    }

    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => FormField(None),
            Some(Value::String(s)) => FormField(Some(s)),
            Some(Value::Number(n)) => FormField(Some(n.to_string())),
            Some(Value::Bool(b)) => FormField(Some(b.to_string())),
            // Arrays keep their first element, mirroring how repeated form
            // fields collapse to the first submitted value.
            Some(Value::Array(items)) => FormField::from_value(items.into_iter().next()),
            Some(other) => FormField(Some(other.to_string())),
        }
    }

    /// Raw submitted value, untrimmed.
    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_raw(self) -> Option<String> {
        self.0
    }

    /// Non-empty trimmed text, or None when the field is absent or blank.
    pub fn text(&self) -> Option<&str> {
        match self.0.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(s) => Some(s),
        }
    }

    pub fn is_present(&self) -> bool {
        self.text().is_some()
    }

    pub fn number(&self) -> Option<f64> {
        self.text()?.parse::<f64>().ok()
    }

    /// Strictly positive numeric parse; zero, negatives, blanks and
    /// unparsable input all yield None.
    pub fn positive(&self) -> Option<f64> {
        self.number().filter(|n| *n > 0.0)
    }

    pub fn integer(&self) -> Option<i64> {
        self.text()?.parse::<i64>().ok()
    }

    /// Owned trimmed text for storage.
    pub fn to_text(&self) -> Option<String> {
        self.text().map(str::to_string)
    }
}

impl<'de> Deserialize<'de> for FormField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(FormField::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_are_absent() {
        assert!(!FormField::new("").is_present());
        assert!(!FormField::new("   ").is_present());
        assert!(FormField::empty().text().is_none());
        assert_eq!(FormField::new(" B1 ").text(), Some("B1"));
    }

    #[test]
    fn positive_guard_excludes_zero_and_garbage() {
        assert_eq!(FormField::new("200").positive(), Some(200.0));
        assert_eq!(FormField::new("0").positive(), None);
        assert_eq!(FormField::new("-5").positive(), None);
        assert_eq!(FormField::new("abc").positive(), None);
        assert_eq!(FormField::empty().positive(), None);
    }

    #[test]
    fn json_numbers_and_strings_both_parse() {
        let from_number = FormField::from_value(Some(serde_json::json!(5000)));
        let from_string = FormField::from_value(Some(serde_json::json!("5000")));
        assert_eq!(from_number.number(), Some(5000.0));
        assert_eq!(from_string.number(), Some(5000.0));
    }
}

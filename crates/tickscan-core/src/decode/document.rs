use serde_json::{Map, Value};

use crate::ProviderError;

/// Fully parsed, loosely typed provider payload.
///
/// Providers such as Alpha Vantage answer with objects whose keys depend on
/// the request (`"Time Series (1min)"`) and whose numbers are serialized as
/// strings. Every access through [`Node`] is checked and reports a typed
/// error instead of falling back to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn parse(body: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(body)
            .map(Self::from_value)
            .map_err(|error| ProviderError::decode(format!("malformed JSON payload: {error}")))
    }

    /// Wraps an already decoded value.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            path: String::from("$"),
            value: &self.root,
        }
    }
}

/// Borrowed view of one value inside a [`Document`], tagged with its path
/// for error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    path: String,
    value: &'a Value,
}

impl<'a> Node<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Name of the JSON type held by this node.
    pub fn kind(&self) -> &'static str {
        match self.value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Result<&'a Map<String, Value>, ProviderError> {
        self.value.as_object().ok_or_else(|| {
            ProviderError::schema(format!(
                "expected object at {}, found {}",
                self.path,
                self.kind()
            ))
        })
    }

    pub fn as_str(&self) -> Result<&'a str, ProviderError> {
        self.value.as_str().ok_or_else(|| {
            ProviderError::schema(format!(
                "expected string at {}, found {}",
                self.path,
                self.kind()
            ))
        })
    }

    /// Child node under `key`, or `None` when the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<Node<'a>>, ProviderError> {
        let object = self.as_object()?;
        Ok(object.get(key).map(|value| Node {
            path: format!("{}[{key:?}]", self.path),
            value,
        }))
    }

    /// Child node under `key`; absence is a schema error.
    pub fn require(&self, key: &str) -> Result<Node<'a>, ProviderError> {
        self.get(key)?.ok_or_else(|| {
            ProviderError::schema(format!("missing key {key:?} at {}", self.path))
        })
    }

    /// Child object under `key`; absence or a non-object value is a schema error.
    pub fn object(&self, key: &str) -> Result<Node<'a>, ProviderError> {
        let child = self.require(key)?;
        child.as_object()?;
        Ok(child)
    }

    pub fn keys(&self) -> Result<Vec<&'a str>, ProviderError> {
        Ok(self.as_object()?.keys().map(String::as_str).collect())
    }

    /// Reads a string field and parses it as a finite number.
    ///
    /// Absent keys and placeholders such as `"None"` are parse errors.
    pub fn number_field(&self, key: &str) -> Result<f64, ProviderError> {
        let Some(child) = self.get(key)? else {
            return Err(ProviderError::parse(format!(
                "field {key:?} is absent at {}",
                self.path
            )));
        };
        parse_number(key, child.as_str()?)
    }
}

/// Parses a provider number serialized as a string.
pub fn parse_number(field: &str, raw: &str) -> Result<f64, ProviderError> {
    let value = raw.trim().parse::<f64>().map_err(|_| {
        ProviderError::parse(format!("field {field:?} is not a number: {raw:?}"))
    })?;

    if !value.is_finite() {
        return Err(ProviderError::parse(format!(
            "field {field:?} is not finite: {raw:?}"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    fn overview() -> Document {
        Document::parse(
            r#"{"Symbol":"IBM","PERatio":"22.4","EPS":"None","Beta":1.2,
                "Nested":{"Inner":"1"}}"#,
        )
        .expect("valid document")
    }

    #[test]
    fn number_field_parses_numeric_strings() {
        let document = overview();
        assert_eq!(document.root().number_field("PERatio"), Ok(22.4));
    }

    #[test]
    fn none_placeholder_and_absence_are_parse_errors() {
        let document = overview();

        let none = document.root().number_field("EPS").expect_err("None is not a number");
        assert_eq!(none.kind(), ProviderErrorKind::Parse);

        let absent = document
            .root()
            .number_field("AnalystTargetPrice")
            .expect_err("absent field");
        assert_eq!(absent.kind(), ProviderErrorKind::Parse);
    }

    #[test]
    fn non_string_number_is_a_schema_error() {
        let error = overview().root().number_field("Beta").expect_err("number, not string");
        assert_eq!(error.kind(), ProviderErrorKind::Schema);
        assert!(error.message().contains("$[\"Beta\"]"));
    }

    #[test]
    fn object_accessor_checks_presence_and_type() {
        let document = overview();
        let root = document.root();

        let nested = root.object("Nested").expect("nested object");
        assert_eq!(nested.keys().expect("object keys"), vec!["Inner"]);

        let missing = root.object("Time Series (1min)").expect_err("absent");
        assert_eq!(missing.kind(), ProviderErrorKind::Schema);

        let wrong = root.object("Symbol").expect_err("string, not object");
        assert!(wrong.message().contains("found string"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let error = Document::parse("{\"PERatio\":").expect_err("truncated");
        assert_eq!(error.kind(), ProviderErrorKind::Decode);
    }

    #[test]
    fn infinite_values_are_rejected() {
        let error = parse_number("PERatio", "inf").expect_err("not finite");
        assert_eq!(error.kind(), ProviderErrorKind::Parse);
        assert_eq!(parse_number("PERatio", " 12.5 "), Ok(12.5));
    }
}

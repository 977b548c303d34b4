use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier of a JSON-RPC request.
///
/// The wire value may be an integer, a float, a string or `null`. Any other
/// JSON kind is kept as [`RequestId::Unparseable`] so that validation can
/// reject the request instead of failing the decode.
///
/// A request without an `id` member carries no `RequestId` at all; that is a
/// notification, which is distinct from `RequestId::Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestId {
    Null,
    Number(i64),
    Float(f64),
    String(String),
    Unparseable(Value),
}

/// Errors returned by the [`RequestId`] accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestIdError {
    #[error("request id is {found}, not {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown value for RequestID")]
    Unparseable,
}

impl RequestId {
    /// Parse an id from its JSON text.
    ///
    /// Only malformed JSON is an error. A well-formed value of an unsupported
    /// kind (`true`, `[]`, `{}`) yields [`RequestId::Unparseable`].
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    /// Interpret a JSON value, trying integer, then float, then string.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => RequestId::Null,
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RequestId::Number(i)
                } else if let Some(f) = n.as_f64() {
                    RequestId::Float(f)
                } else {
                    RequestId::Unparseable(Value::Number(n))
                }
            }
            Value::String(s) => RequestId::String(s),
            other => RequestId::Unparseable(other),
        }
    }

    /// Encode the id back to JSON text.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn as_i64(&self) -> Result<i64, RequestIdError> {
        match self {
            RequestId::Number(n) => Ok(*n),
            other => Err(other.mismatch("integer")),
        }
    }

    /// Integer ids always widen to a float.
    pub fn as_f64(&self) -> Result<f64, RequestIdError> {
        match self {
            RequestId::Number(n) => Ok(*n as f64),
            RequestId::Float(f) => Ok(*f),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_str(&self) -> Result<&str, RequestIdError> {
        match self {
            RequestId::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    /// Fails only when the wire value could not be read as any id kind.
    pub fn check(&self) -> Result<(), RequestIdError> {
        match self {
            RequestId::Unparseable(_) => Err(RequestIdError::Unparseable),
            _ => Ok(()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RequestId::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            RequestId::Null => "null",
            RequestId::Number(_) => "integer",
            RequestId::Float(_) => "float",
            RequestId::String(_) => "string",
            RequestId::Unparseable(_) => "unparseable",
        }
    }

    fn mismatch(&self, expected: &'static str) -> RequestIdError {
        match self {
            RequestId::Unparseable(_) => RequestIdError::Unparseable,
            other => RequestIdError::TypeMismatch {
                expected,
                found: other.kind(),
            },
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Null => write!(f, "null"),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Float(x) => write!(f, "{}", x),
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Unparseable(v) => write!(f, "<unparseable {}>", v),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            RequestId::Number(n) => serializer.serialize_i64(*n),
            RequestId::Float(f) => serializer.serialize_f64(*f),
            RequestId::String(s) => serializer.serialize_str(s),
            // An id that never parsed is echoed as null
            RequestId::Null | RequestId::Unparseable(_) => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(RequestId::from_value)
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_id_round_trip() {
        for literal in ["0", "1", "12345", "-7", "9007199254740993"] {
            let id = RequestId::parse(literal.as_bytes()).unwrap();
            assert!(id.as_i64().is_ok(), "{} should read as integer", literal);
            assert!(id.as_str().is_err());
            assert_eq!(String::from_utf8(id.encode().unwrap()).unwrap(), literal);
        }
    }

    #[test]
    fn test_integer_widens_to_float() {
        let id = RequestId::parse(b"12345").unwrap();
        assert_eq!(id.as_i64().unwrap(), 12345);
        assert_eq!(id.as_f64().unwrap(), 12345.0);
        assert_eq!(
            id.as_f64().unwrap().to_bits(),
            (id.as_i64().unwrap() as f64).to_bits()
        );
    }

    #[test]
    fn test_float_id() {
        let id = RequestId::parse(b"123.456").unwrap();
        assert_eq!(id, RequestId::Float(123.456));
        assert!(id.as_i64().is_err());
        assert!(id.as_str().is_err());
        assert_eq!(id.encode().unwrap(), b"123.456");
    }

    #[test]
    fn test_string_id() {
        for literal in [r#""foobar""#, r#""""#, r#""12""#] {
            let id = RequestId::parse(literal.as_bytes()).unwrap();
            assert!(id.as_str().is_ok());
            assert!(id.as_i64().is_err());
            assert!(id.as_f64().is_err());
            assert_eq!(String::from_utf8(id.encode().unwrap()).unwrap(), literal);
        }

        let id = RequestId::parse(br#""stringaling""#).unwrap();
        assert_eq!(id.as_str().unwrap(), "stringaling");
        assert_eq!(
            id.as_i64(),
            Err(RequestIdError::TypeMismatch {
                expected: "integer",
                found: "string"
            })
        );
    }

    #[test]
    fn test_null_id() {
        let id = RequestId::parse(b"null").unwrap();
        assert!(id.is_null());
        assert!(id.check().is_ok());
        assert!(id.as_i64().is_err());
        assert_eq!(id.encode().unwrap(), b"null");
    }

    #[test]
    fn test_unparseable_id() {
        for literal in ["true", "[]", "{}", r#"{"a":1}"#] {
            let id = RequestId::parse(literal.as_bytes()).unwrap();
            assert!(matches!(id, RequestId::Unparseable(_)));
            assert_eq!(id.check(), Err(RequestIdError::Unparseable));
            assert_eq!(id.as_i64(), Err(RequestIdError::Unparseable));
            assert_eq!(id.as_f64(), Err(RequestIdError::Unparseable));
            assert_eq!(id.as_str(), Err(RequestIdError::Unparseable));
            assert_eq!(id.encode().unwrap(), b"null");
        }
    }

    #[test]
    fn test_malformed_id() {
        assert!(RequestId::parse(b"{nope").is_err());
    }

    #[test]
    fn test_json_rpc_version() {
        let version = JsonRpcVersion::V2_0;
        assert_eq!(version.as_str(), "2.0");
        assert_eq!(serde_json::to_string(&version).unwrap(), r#""2.0""#);
    }
}

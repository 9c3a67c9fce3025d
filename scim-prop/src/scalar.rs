//! Scalar values held by leaf properties.

use crate::hash::StructuralHasher;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use scim_schema::AttributeType;
use serde_json::{Number, Value};

/// A parsed leaf value.
///
/// Decimals keep the JSON number they were read from so `raw()` returns it
/// as written; they compare and hash by their `f64` value.
#[derive(Debug, Clone)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Decimal(Number),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Reference(String),
    Binary(Vec<u8>),
}

impl Scalar {
    /// Reads `value` as a scalar of `kind`, or `None` if it does not fit.
    ///
    /// Binaries are standard base64 strings. Decimals accept any JSON
    /// number. Integers accept integral numbers in `i64` range, including
    /// float spellings such as `42.0` or `1e2`.
    ///
    /// Date-times are RFC 3339 strings, or `xsd:dateTime` strings without an
    /// offset, which are read as UTC. Either way the instant is stored in
    /// UTC and rendered back with a `Z` suffix.
    #[must_use]
    pub fn parse(kind: AttributeType, value: &Value) -> Option<Self> {
        match (kind, value) {
            (AttributeType::String, Value::String(s)) => Some(Self::String(s.clone())),
            (AttributeType::Reference, Value::String(s)) => Some(Self::Reference(s.clone())),
            (AttributeType::Integer, Value::Number(n)) => parse_integer(n).map(Self::Integer),
            (AttributeType::Decimal, Value::Number(n)) => {
                n.as_f64().is_some().then(|| Self::Decimal(n.clone()))
            }
            (AttributeType::Boolean, Value::Bool(b)) => Some(Self::Boolean(*b)),
            (AttributeType::DateTime, Value::String(s)) => parse_date_time(s).map(Self::DateTime),
            (AttributeType::Binary, Value::String(s)) => STANDARD.decode(s).ok().map(Self::Binary),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Integer(_) => AttributeType::Integer,
            Self::Decimal(_) => AttributeType::Decimal,
            Self::Boolean(_) => AttributeType::Boolean,
            Self::DateTime(_) => AttributeType::DateTime,
            Self::Reference(_) => AttributeType::Reference,
            Self::Binary(_) => AttributeType::Binary,
        }
    }

    /// The JSON representation: integers stay integral, decimals are the
    /// number as given, date-times are RFC 3339 in UTC, binaries are
    /// standard base64.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) | Self::Reference(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Decimal(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::DateTime(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
        }
    }

    /// Digest of the kind tag and the canonical value. Strings are
    /// lowercased first unless `case_exact`.
    #[must_use]
    pub fn digest(&self, case_exact: bool) -> u64 {
        let mut hasher = StructuralHasher::new();
        hasher.write_name(self.kind().as_str());
        match self {
            Self::String(s) if !case_exact => hasher.write_name(&s.to_lowercase()),
            Self::String(s) | Self::Reference(s) => hasher.write_name(s),
            Self::Integer(i) => hasher.write_bytes(&i.to_le_bytes()),
            Self::Decimal(n) => {
                // -0.0 and 0.0 compare equal, so they must hash equal
                let f = n.as_f64().unwrap_or_default();
                let f = if f == 0.0 { 0.0 } else { f };
                hasher.write_bytes(&f.to_bits().to_le_bytes());
            }
            Self::Boolean(b) => hasher.write_bytes(&[u8::from(*b)]),
            Self::DateTime(t) => {
                hasher.write_bytes(&t.timestamp().to_le_bytes());
                hasher.write_bytes(&t.timestamp_subsec_nanos().to_le_bytes());
            }
            Self::Binary(bytes) => hasher.write_bytes(bytes),
        }
        hasher.finish()
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) | (Self::Reference(a), Self::Reference(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a.as_f64() == b.as_f64(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            _ => false,
        }
    }
}

fn parse_integer(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    // i64::MAX is not representable; the nearest f64 above it is 2^63
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then(|| f as i64)
}

fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

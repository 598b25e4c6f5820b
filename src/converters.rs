//! Synchronous type-converter registry consulted by the resolver when
//! binding a typed parameter. Built-ins cover every type named in the
//! pattern grammar's type list; a host can register additional converters
//! (including enum-like ones the completion engine can enumerate) under
//! any identifier before it registers routes.

use std::collections::HashMap;
use std::net::IpAddr as StdIpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use crate::error::ConversionError;
use crate::value::Value;

pub trait TypeConverter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError>;

    /// Enum-like converters (e.g. a `LogLevel` converter) return their
    /// closed set of values so the completion engine can enumerate them;
    /// open-ended converters (int, string, ...) return `None`.
    fn enum_values(&self) -> Option<Vec<String>> {
        None
    }
}

pub struct ConverterRegistry {
    converters: HashMap<String, Box<dyn TypeConverter>>,
}

impl ConverterRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            converters: HashMap::new(),
        };
        registry.register("string", StringConverter);
        registry.register("int", IntConverter);
        registry.register("long", LongConverter);
        registry.register("double", DoubleConverter);
        registry.register("decimal", DecimalConverter);
        registry.register("bool", BoolConverter);
        registry.register("datetime", DateTimeConverter);
        registry.register("guid", GuidConverter);
        registry.register("timespan", TimeSpanConverter);
        registry.register("fileinfo", PathConverter);
        registry.register("directoryinfo", PathConverter);
        registry.register("uri", UriConverter);
        registry.register("ipaddress", IpAddrConverter);
        registry.register("dateonly", DateOnlyConverter);
        registry.register("timeonly", TimeOnlyConverter);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, converter: impl TypeConverter + 'static) {
        self.converters.insert(name.into(), Box::new(converter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn TypeConverter> {
        self.converters.get(name).map(|c| c.as_ref())
    }

    pub fn convert(&self, type_name: &str, raw: &str) -> Result<Value, ConversionError> {
        match self.get(type_name) {
            Some(converter) => converter.convert(raw),
            None => Err(ConversionError::UnknownType(type_name.to_string())),
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn invalid(value: &str, type_name: &str) -> ConversionError {
    ConversionError::InvalidFormat {
        value: value.to_string(),
        type_name: type_name.to_string(),
    }
}

struct StringConverter;
impl TypeConverter for StringConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::Str(raw.to_string()))
    }
}

struct IntConverter;
impl TypeConverter for IntConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.parse::<i32>().map(Value::Int).map_err(|_| invalid(raw, "int"))
    }
}

struct LongConverter;
impl TypeConverter for LongConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.parse::<i64>().map(Value::Long).map_err(|_| invalid(raw, "long"))
    }
}

struct DoubleConverter;
impl TypeConverter for DoubleConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.parse::<f64>()
            .map(Value::Double)
            .map_err(|_| invalid(raw, "double"))
    }
}

struct DecimalConverter;
impl TypeConverter for DecimalConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-') {
            return Err(invalid(raw, "decimal"));
        }
        if raw.parse::<f64>().is_err() {
            return Err(invalid(raw, "decimal"));
        }
        Ok(Value::Decimal(raw.to_string()))
    }
}

struct BoolConverter;
impl TypeConverter for BoolConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(invalid(raw, "bool")),
        }
    }

    fn enum_values(&self) -> Option<Vec<String>> {
        Some(vec!["true".into(), "false".into()])
    }
}

struct DateTimeConverter;
impl TypeConverter for DateTimeConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| Value::DateTime(dt.with_timezone(&chrono::Utc)))
            .map_err(|_| invalid(raw, "datetime"))
    }
}

struct GuidConverter;
impl TypeConverter for GuidConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if is_well_formed_guid(raw) {
            Ok(Value::Guid(raw.to_ascii_lowercase()))
        } else {
            Err(invalid(raw, "guid"))
        }
    }
}

fn is_well_formed_guid(raw: &str) -> bool {
    let groups: Vec<&str> = raw.split('-').collect();
    let expected_lengths = [8, 4, 4, 4, 12];
    groups.len() == 5
        && groups
            .iter()
            .zip(expected_lengths)
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

struct TimeSpanConverter;
impl TypeConverter for TimeSpanConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        parse_timespan(raw)
            .map(Value::TimeSpan)
            .ok_or_else(|| invalid(raw, "timespan"))
    }
}

/// Accepts `HH:MM:SS` or a bare integer number of seconds.
fn parse_timespan(raw: &str) -> Option<Duration> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: u64 = parts[2].parse().ok()?;
    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

struct PathConverter;
impl TypeConverter for PathConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if raw.is_empty() {
            return Err(invalid(raw, "path"));
        }
        Ok(Value::Path(PathBuf::from(raw)))
    }
}

struct UriConverter;
impl TypeConverter for UriConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        if is_well_formed_uri(raw) {
            Ok(Value::Uri(raw.to_string()))
        } else {
            Err(invalid(raw, "uri"))
        }
    }
}

fn is_well_formed_uri(raw: &str) -> bool {
    match raw.find(':') {
        Some(colon) if colon > 0 => {
            let scheme = &raw[..colon];
            let mut chars = scheme.chars();
            chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

struct IpAddrConverter;
impl TypeConverter for IpAddrConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        StdIpAddr::from_str(raw)
            .map(Value::IpAddr)
            .map_err(|_| invalid(raw, "ipaddress"))
    }
}

struct DateOnlyConverter;
impl TypeConverter for DateOnlyConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Value::DateOnly)
            .map_err(|_| invalid(raw, "dateonly"))
    }
}

struct TimeOnlyConverter;
impl TypeConverter for TimeOnlyConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map(Value::TimeOnly)
            .map_err(|_| invalid(raw, "timeonly"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_converter_rejects_non_numeric() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry.convert("int", "3").is_ok());
        assert!(registry.convert("int", "abc").is_err());
    }

    #[test]
    fn bool_converter_accepts_common_spellings() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(registry.convert("bool", "true").unwrap(), Value::Bool(true));
        assert_eq!(registry.convert("bool", "0").unwrap(), Value::Bool(false));
    }

    #[test]
    fn unknown_type_name_is_unknown_type_error() {
        let registry = ConverterRegistry::with_builtins();
        let err = registry.convert("widget", "x").unwrap_err();
        assert!(matches!(err, ConversionError::UnknownType(_)));
    }

    #[test]
    fn guid_validates_group_lengths() {
        let registry = ConverterRegistry::with_builtins();
        assert!(registry
            .convert("guid", "123e4567-e89b-12d3-a456-426614174000")
            .is_ok());
        assert!(registry.convert("guid", "not-a-guid").is_err());
    }

    #[test]
    fn timespan_accepts_seconds_or_hms() {
        let registry = ConverterRegistry::with_builtins();
        assert_eq!(
            registry.convert("timespan", "90").unwrap(),
            Value::TimeSpan(Duration::from_secs(90))
        );
        assert_eq!(
            registry.convert("timespan", "00:01:30").unwrap(),
            Value::TimeSpan(Duration::from_secs(90))
        );
    }

    #[test]
    fn custom_converter_can_be_registered_and_enumerated() {
        struct LogLevelConverter;
        impl TypeConverter for LogLevelConverter {
            fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
                match raw {
                    "debug" | "info" | "warn" | "error" => Ok(Value::Custom(raw.to_string())),
                    _ => Err(ConversionError::InvalidFormat {
                        value: raw.to_string(),
                        type_name: "loglevel".to_string(),
                    }),
                }
            }

            fn enum_values(&self) -> Option<Vec<String>> {
                Some(vec!["debug", "info", "warn", "error"].into_iter().map(String::from).collect())
            }
        }

        let mut registry = ConverterRegistry::with_builtins();
        registry.register("loglevel", LogLevelConverter);
        assert!(registry.convert("loglevel", "info").is_ok());
        assert_eq!(
            registry.get("loglevel").unwrap().enum_values().unwrap().len(),
            4
        );
    }
}

//! The bound-parameter value type the resolver and converter registry
//! exchange. One sum type covers every built-in constraint named in the
//! type list plus an escape hatch for custom converters.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i32),
    Long(i64),
    Double(f64),
    /// Stored as its canonical string form; no external decimal dependency
    /// is pulled in solely to represent this.
    Decimal(String),
    Bool(bool),
    DateTime(chrono::DateTime<chrono::Utc>),
    Guid(String),
    TimeSpan(Duration),
    Path(PathBuf),
    Uri(String),
    IpAddr(IpAddr),
    DateOnly(NaiveDate),
    TimeOnly(NaiveTime),
    List(Vec<Value>),
    /// A value produced by a converter the registry could not resolve to
    /// one of the built-in variants; carried as its raw string form.
    Custom(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Uri(s) | Value::Guid(s) | Value::Decimal(s) | Value::Custom(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Guid(_) => "guid",
            Value::TimeSpan(_) => "timespan",
            Value::Path(_) => "path",
            Value::Uri(_) => "uri",
            Value::IpAddr(_) => "ipaddress",
            Value::DateOnly(_) => "dateonly",
            Value::TimeOnly(_) => "timeonly",
            Value::List(_) => "list",
            Value::Custom(_) => "custom",
        }
    }
}

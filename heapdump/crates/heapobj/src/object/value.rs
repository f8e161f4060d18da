//! Value snapshots carried by dumped objects.

use serde::Serialize;
use std::fmt;

/// Scalar or short-string snapshot of a dumped object's value
///
/// Dumpers record small integers verbatim and truncate long strings, so the
/// text held here may be a prefix of the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ObjValue {
    Int(i64),
    Str(Box<str>),
}

impl ObjValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ObjValue::Int(v) => Some(*v),
            ObjValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ObjValue::Int(_) => None,
            ObjValue::Str(s) => Some(s),
        }
    }
}

impl From<i64> for ObjValue {
    fn from(value: i64) -> Self {
        ObjValue::Int(value)
    }
}

impl From<&str> for ObjValue {
    fn from(value: &str) -> Self {
        ObjValue::Str(value.into())
    }
}

impl From<String> for ObjValue {
    fn from(value: String) -> Self {
        ObjValue::Str(value.into_boxed_str())
    }
}

impl fmt::Display for ObjValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjValue::Int(v) => write!(f, "{}", v),
            ObjValue::Str(s) => write!(f, "{:?}", s),
        }
    }
}

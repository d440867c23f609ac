//! Typed values exchanged between device snapshots and items.

use serde::{Deserialize, Serialize};

/// A single typed item value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ItemValue {
    /// Interpret the value as a switch state.
    ///
    /// Numbers follow the usual truthiness rules (non-zero is on); text is
    /// only accepted when it is unambiguously `"true"`/`"false"` or
    /// `"on"`/`"off"`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Text(s) => match s.as_str() {
                "true" | "on" => Some(true),
                "false" | "off" => Some(false),
                _ => None,
            },
        }
    }

    /// Interpret the value as a floating-point number (e.g. a setpoint).
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl From<bool> for ItemValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ItemValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ItemValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ItemValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

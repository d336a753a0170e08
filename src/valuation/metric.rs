//! Tagged numeric result for values that can be mathematically undefined
//!
//! Margins and growth rates divide by user-supplied prices and horizons.
//! Instead of letting NaN/Infinity leak into reports, every such value is
//! either a finite number or an explicit `Undefined` marker with a reason.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a derived figure could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Current price is zero or negative
    NonPositivePrice,
    /// Growth rate requested over a zero-year horizon
    ZeroYears,
    /// Future/current price ratio is negative (no real root)
    NegativePriceRatio,
    /// Arithmetic overflowed or produced NaN
    NonFinite,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UndefinedReason::NonPositivePrice => "current price is zero or negative",
            UndefinedReason::ZeroYears => "projection horizon is zero years",
            UndefinedReason::NegativePriceRatio => "future and current prices have opposite signs",
            UndefinedReason::NonFinite => "result is not a finite number",
        };
        f.write_str(text)
    }
}

/// A finite value or an explicitly undefined one
///
/// Serialized tagged. Deserialization also accepts a bare number, and `null`
/// (how non-finite numbers end up in JSON documents) as `NonFinite`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case", from = "MetricRepr")]
pub enum Metric {
    /// Always finite
    Value(f64),
    Undefined(UndefinedReason),
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum TaggedMetric {
    Value(f64),
    Undefined(UndefinedReason),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricRepr {
    Tagged(TaggedMetric),
    Plain(Option<f64>),
}

impl From<MetricRepr> for Metric {
    fn from(repr: MetricRepr) -> Self {
        match repr {
            MetricRepr::Tagged(TaggedMetric::Value(v)) | MetricRepr::Plain(Some(v)) => Metric::from_f64(v),
            MetricRepr::Tagged(TaggedMetric::Undefined(reason)) => Metric::Undefined(reason),
            MetricRepr::Plain(None) => Metric::Undefined(UndefinedReason::NonFinite),
        }
    }
}

impl Metric {
    /// Wrap a raw float, flagging NaN/Infinity as `NonFinite`
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Undefined(UndefinedReason::NonFinite)
        }
    }

    pub fn undefined(reason: UndefinedReason) -> Self {
        Metric::Undefined(reason)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn reason(&self) -> Option<UndefinedReason> {
        match self {
            Metric::Value(_) => None,
            Metric::Undefined(reason) => Some(*reason),
        }
    }

    /// Apply `f` to a defined value; the result is re-checked for finiteness
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Metric::Value(v) => Metric::from_f64(f(v)),
            undefined => undefined,
        }
    }

    /// Chain a computation that may itself be undefined
    pub fn and_then(self, f: impl FnOnce(f64) -> Metric) -> Self {
        match self {
            Metric::Value(v) => f(v),
            undefined => undefined,
        }
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Metric::from_f64(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Metric::Undefined(_) => f.write_str("—"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_is_flagged() {
        assert_eq!(Metric::from_f64(f64::INFINITY), Metric::Undefined(UndefinedReason::NonFinite));
        assert_eq!(Metric::from_f64(f64::NAN), Metric::Undefined(UndefinedReason::NonFinite));
        assert_eq!(Metric::from_f64(1.5).value(), Some(1.5));
    }

    #[test]
    fn test_map_keeps_undefined_reason() {
        let m = Metric::undefined(UndefinedReason::ZeroYears).map(|v| v * 2.0);
        assert_eq!(m.reason(), Some(UndefinedReason::ZeroYears));

        let overflow = Metric::Value(f64::MAX).map(|v| v * 10.0);
        assert_eq!(overflow.reason(), Some(UndefinedReason::NonFinite));
    }

    #[test]
    fn test_display_dash_for_undefined() {
        assert_eq!(format!("{:.2}", Metric::Value(14.129)), "14.13");
        assert_eq!(format!("{:.2}", Metric::undefined(UndefinedReason::NonPositivePrice)), "—");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Metric::Value(2.5)).unwrap();
        assert_eq!(json, r#"{"kind":"value","value":2.5}"#);

        let undefined: Metric =
            serde_json::from_str(r#"{"kind":"undefined","value":"zero_years"}"#).unwrap();
        assert_eq!(undefined, Metric::Undefined(UndefinedReason::ZeroYears));

        let plain: Vec<Metric> = serde_json::from_str("[14.5, null]").unwrap();
        assert_eq!(plain, vec![Metric::Value(14.5), Metric::Undefined(UndefinedReason::NonFinite)]);
    }
}

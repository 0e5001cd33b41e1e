// src/config/params.rs

//! Typed `key=value` coin parameters.
//!
//! A parameter string is a comma-separated list of `key=value` pairs. A value
//! is a number or a bracketed, semicolon-separated list of numbers
//! (`theta=[0.1;pi/4]`). Numbers may be written with `pi`: `pi`, `-pi`,
//! `3*pi`, `pi/4`, `3*pi/4`.

use crate::core::{PI, Result, WalkError};
use crate::operators::Angles;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    List(Vec<f64>),
}

impl ParamValue {
    /// The value as a scalar; lists are rejected.
    pub fn as_scalar(&self, key: &str) -> Result<f64> {
        match self {
            ParamValue::Scalar(v) => Ok(*v),
            ParamValue::List(_) => Err(WalkError::config(format!("parameter '{}' must be a single number", key))),
        }
    }

    pub fn to_angles(&self) -> Angles {
        match self {
            ParamValue::Scalar(v) => Angles::Uniform(*v),
            ParamValue::List(list) => Angles::PerQubit(list.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => write!(f, "{}", v),
            ParamValue::List(list) => {
                let items: Vec<String> = list.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(";"))
            }
        }
    }
}

fn parse_factor(token: &str, source: &str) -> Result<f64> {
    let token = token.trim();
    let (sign, body) = match token.strip_prefix('-') {
        Some(rest) => (-1.0, rest.trim()),
        None => (1.0, token),
    };
    if body.eq_ignore_ascii_case("pi") {
        return Ok(sign * PI);
    }
    body.parse::<f64>()
        .map(|v| sign * v)
        .map_err(|_| WalkError::config(format!("'{}' in '{}' is not a number", token, source)))
}

/// Parses `[k*]pi[/d]` expressions and plain floats.
pub fn parse_number(text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WalkError::config("empty numeric value"));
    }
    let (numerator, denominator) = match text.split_once('/') {
        Some((n, d)) => (n, Some(d)),
        None => (text, None),
    };
    let mut value = 1.0;
    for factor in numerator.split('*') {
        value *= parse_factor(factor, text)?;
    }
    if let Some(d) = denominator {
        let d = parse_factor(d, text)?;
        if d == 0.0 {
            return Err(WalkError::config(format!("division by zero in '{}'", text)));
        }
        value /= d;
    }
    Ok(value)
}

fn parse_value(text: &str) -> Result<ParamValue> {
    let text = text.trim();
    match text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) if inner.trim().is_empty() => Ok(ParamValue::List(Vec::new())),
        Some(inner) => inner.split(';').map(parse_number).collect::<Result<Vec<_>>>().map(ParamValue::List),
        None => parse_number(text).map(ParamValue::Scalar),
    }
}

/// Keyword parameters for a parametric coin family.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinParams {
    values: BTreeMap<String, ParamValue>,
}

impl CoinParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: ParamValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A required parameter.
    pub fn require(&self, key: &str, family: &str) -> Result<&ParamValue> {
        self.get(key)
            .ok_or_else(|| WalkError::config(format!("{} requires parameter '{}'", family, key)))
    }

    /// Rejects any key outside `schema`.
    pub fn check_keys(&self, schema: &[&str], family: &str) -> Result<()> {
        match self.keys().find(|k| !schema.contains(k)) {
            Some(unknown) => Err(WalkError::config(format!(
                "{} does not take parameter '{}' (expected one of {:?})",
                family, unknown, schema
            ))),
            None => Ok(()),
        }
    }
}

impl FromStr for CoinParams {
    type Err = WalkError;

    fn from_str(s: &str) -> Result<Self> {
        let mut params = CoinParams::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| WalkError::config(format!("coin parameter '{}' is not of the form key=value", pair)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(WalkError::config(format!("coin parameter '{}' has an empty key", pair)));
            }
            if params.values.contains_key(key) {
                return Err(WalkError::config(format!("coin parameter '{}' given twice", key)));
            }
            params.values.insert(key.to_string(), parse_value(value)?);
        }
        Ok(params)
    }
}

//! Operation parameters
//!
//! A small typed key/value bag. Operations read the keys they understand and
//! fall back to their own defaults for missing ones.

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// Floating point scalar
    Float(f32),
    /// Integer scalar
    Int(i64),
    /// Flag
    Bool(bool),
    /// Vector
    Vec3(Vec3),
    /// Free text
    Text(String),
}

impl ParamValue {
    /// Get as float; integers are widened
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as vector; a scalar becomes a uniform vector
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            Self::Float(_) | Self::Int(_) => self.as_f32().map(|s| Vec3::new(s, s, s)),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value as f32)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec3> for ParamValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Named parameters for an edit operation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewParams {
    values: BTreeMap<String, ParamValue>,
}

impl PreviewParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add or replace `key`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Add or replace `key`, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove `key`
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }

    /// Raw value of `key`
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// `key` as float
    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(ParamValue::as_f32)
    }

    /// `key` as float, or `default` when missing or mistyped
    pub fn float_or(&self, key: &str, default: f32) -> f32 {
        self.get_float(key).unwrap_or(default)
    }

    /// `key` as integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_i64)
    }

    /// `key` as integer, or `default`
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// `key` as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ParamValue::as_bool)
    }

    /// `key` as vector
    pub fn get_vec3(&self, key: &str) -> Option<Vec3> {
        self.get(key).and_then(ParamValue::as_vec3)
    }

    /// `key` as text
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let params = PreviewParams::new()
            .with("factor", 2.0)
            .with("iterations", 3)
            .with("keep_uv", true)
            .with("axis", Vec3::new(0.0, 1.0, 0.0))
            .with("kernel", "catmull-clark");

        assert_eq!(params.get_float("factor"), Some(2.0));
        assert_eq!(params.get_float("iterations"), Some(3.0));
        assert_eq!(params.get_int("iterations"), Some(3));
        assert_eq!(params.get_int("factor"), None);
        assert_eq!(params.get_bool("keep_uv"), Some(true));
        assert_eq!(params.get_vec3("axis"), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(params.get_vec3("factor"), Some(Vec3::new(2.0, 2.0, 2.0)));
        assert_eq!(params.get_text("kernel"), Some("catmull-clark"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_defaults_for_missing() {
        let params = PreviewParams::new().with("factor", "big");
        assert_eq!(params.float_or("factor", 1.0), 1.0);
        assert_eq!(params.int_or("iterations", 2), 2);
    }

    #[test]
    fn test_set_replaces() {
        let mut params = PreviewParams::new().with("factor", 2.0);
        assert_eq!(params.set("factor", 3.0), Some(ParamValue::Float(2.0)));
        assert_eq!(params.get_float("factor"), Some(3.0));
        assert!(params.remove("factor").is_some());
        assert!(params.is_empty());
    }

    #[test]
    fn test_ron_roundtrip() {
        let params = PreviewParams::new().with("factor", 1.5).with("axis", Vec3::new(1.0, 0.0, 0.0));
        let text = ron::to_string(&params).unwrap();
        let back: PreviewParams = ron::from_str(&text).unwrap();
        assert_eq!(back, params);
    }
}

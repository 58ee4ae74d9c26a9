//! Conversion strategies between raw values and display strings.
//!
//! A [`ValueConverter`] turns a dynamically typed [`Value`] into another
//! [`ValueKind`] and back. Converters are stateless and shared; every
//! validation failure is reported as [`Error::UnsupportedOperation`] (the
//! converter was used outside its contract) or [`Error::InvalidArgument`]
//! (the input could not be coerced).
//!
//! # Example
//!
//! ```
//! use hello_core::convert::{ModelToStringConverter, Value, ValueConverter, ValueKind};
//! use hello_core::{Culture, DisplayModel};
//!
//! let converter = ModelToStringConverter;
//! let culture = Culture::invariant();
//! let shown = converter
//!     .convert(&Value::Model(DisplayModel::new("Hello, World!")), ValueKind::Text, None, &culture)
//!     .unwrap();
//! assert_eq!(shown, Value::Text("Hello, World!".into()));
//! ```

use std::fmt;

use crate::culture::Culture;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::model::{DisplayModel, HasDisplayName};

/// A dynamically typed value flowing through a converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
    /// A display model.
    Model(DisplayModel),
}

/// The kind a converter is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Integer`].
    Integer,
    /// [`Value::Float`].
    Float,
    /// [`Value::Text`].
    Text,
    /// Anything with a read-only display name ([`Value::Model`]).
    DisplayName,
    /// No constraint: every value is already of this kind.
    Any,
}

impl ValueKind {
    /// Whether a string can be handed out as this kind.
    pub fn accepts_text(self) -> bool {
        matches!(self, Self::Text | Self::Any)
    }

    /// Whether a display-name holder can be handed out as this kind.
    pub fn accepts_display_name(self) -> bool {
        matches!(self, Self::DisplayName | Self::Any)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "Bool",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Text => "Text",
            Self::DisplayName => "DisplayName",
            Self::Any => "Any",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The kind of this value, or `None` for [`Value::Null`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Integer(_) => Some(ValueKind::Integer),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Text(_) => Some(ValueKind::Text),
            Self::Model(_) => Some(ValueKind::DisplayName),
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The display-name capability, if this value has it.
    pub fn as_display_name(&self) -> Option<&dyn HasDisplayName> {
        match self {
            Self::Model(model) => Some(model as &dyn HasDisplayName),
            _ => None,
        }
    }

    /// The string form of a string-convertible value.
    ///
    /// Scalars and text are string-convertible; null and models are not.
    /// Numbers are rendered culture-invariantly.
    pub fn to_text(&self, _culture: &Culture) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Null | Self::Model(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Model(model) => write!(f, "{model}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DisplayModel> for Value {
    fn from(value: DisplayModel) -> Self {
        Self::Model(value)
    }
}

/// A stateless, validated, bidirectional conversion strategy.
pub trait ValueConverter: Send + Sync + fmt::Debug {
    /// A short name for logging.
    fn name(&self) -> &'static str;

    /// Convert `value` into `target`.
    ///
    /// `parameter` is an optional converter argument; `culture` governs
    /// culture-sensitive steps.
    fn convert(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        culture: &Culture,
    ) -> Result<Value>;

    /// Convert a previously converted value back into `target`.
    fn convert_back(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        culture: &Culture,
    ) -> Result<Value>;
}

fn reject_parameter(parameter: Option<&Value>) -> Result<()> {
    match parameter {
        Some(_) => Err(Error::unsupported("This converter does not accept parameters")),
        None => Ok(()),
    }
}

fn cannot_convert(value: &Value, target: ValueKind) -> Error {
    Error::invalid_argument(format!("Cannot convert {value} to {target}"))
}

/// Coerce `value` into `target`.
///
/// Null stays null for every target. Text is parsed for scalar targets;
/// parsing ignores surrounding whitespace and booleans are
/// case-insensitive. Floats convert to integers by rounding half to even.
pub fn change_kind(value: &Value, target: ValueKind, culture: &Culture) -> Result<Value> {
    if value.is_null() || target == ValueKind::Any || value.kind() == Some(target) {
        return Ok(value.clone());
    }

    let converted = match (value, target) {
        (Value::Model(_), _) | (_, ValueKind::DisplayName) => None,
        (_, ValueKind::Text) => value.to_text(culture).map(Value::Text),
        (Value::Bool(v), ValueKind::Integer) => Some(Value::Integer(i64::from(*v))),
        (Value::Bool(v), ValueKind::Float) => Some(Value::Float(if *v { 1.0 } else { 0.0 })),
        (Value::Integer(v), ValueKind::Bool) => Some(Value::Bool(*v != 0)),
        (Value::Integer(v), ValueKind::Float) => Some(Value::Float(*v as f64)),
        (Value::Float(v), ValueKind::Bool) => Some(Value::Bool(*v != 0.0)),
        (Value::Float(v), ValueKind::Integer) => float_to_integer(*v).map(Value::Integer),
        (Value::Text(s), ValueKind::Bool) => parse_bool(s.trim()).map(Value::Bool),
        (Value::Text(s), ValueKind::Integer) => s.trim().parse().ok().map(Value::Integer),
        (Value::Text(s), ValueKind::Float) => s.trim().parse().ok().map(Value::Float),
        _ => None,
    };

    converted.ok_or_else(|| cannot_convert(value, target))
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn float_to_integer(value: f64) -> Option<i64> {
    let rounded = value.round_ties_even();
    // i64::MAX is not exactly representable; the bound below is 2^63.
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Direct coercion between scalar kinds. Symmetric.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToStringConverter;

impl ValueConverter for StringToStringConverter {
    fn name(&self) -> &'static str {
        "string-to-string"
    }

    fn convert(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        culture: &Culture,
    ) -> Result<Value> {
        reject_parameter(parameter)?;
        let result = change_kind(value, target, culture)?;
        if result.is_null() && !value.is_null() {
            return Err(cannot_convert(value, target));
        }
        tracing::trace!(
            target: targets::CONVERT,
            converter = self.name(),
            kind = %target,
            "converted"
        );
        Ok(result)
    }

    fn convert_back(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        culture: &Culture,
    ) -> Result<Value> {
        self.convert(value, target, parameter, culture)
    }
}

/// Renders a display-name holder as text, and wraps text in a new model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelToStringConverter;

impl ValueConverter for ModelToStringConverter {
    fn name(&self) -> &'static str {
        "model-to-string"
    }

    fn convert(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        _culture: &Culture,
    ) -> Result<Value> {
        let Some(holder) = value.as_display_name() else {
            return Err(Error::unsupported("Only HasDisplayName is supported"));
        };
        reject_parameter(parameter)?;
        if !target.accepts_text() {
            return Err(Error::unsupported("Can only convert HasDisplayName to Text"));
        }
        tracing::trace!(target: targets::CONVERT, converter = self.name(), "rendered display name");
        Ok(Value::Text(holder.display_name()))
    }

    fn convert_back(
        &self,
        value: &Value,
        target: ValueKind,
        parameter: Option<&Value>,
        culture: &Culture,
    ) -> Result<Value> {
        let Some(text) = value.to_text(culture) else {
            return Err(Error::unsupported("Only string-convertible values are supported"));
        };
        reject_parameter(parameter)?;
        if !target.accepts_display_name() {
            return Err(Error::unsupported(
                "Can only convert string-convertible values to HasDisplayName",
            ));
        }
        Ok(Value::Model(DisplayModel::new(text)))
    }
}

static_assertions::assert_impl_all!(Value: Send, Sync);

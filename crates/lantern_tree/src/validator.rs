//! Post-parse validation.
//!
//! A [`ParameterValidator`] inspects a value after its [`ParameterType`]
//! has produced it. The pipeline wraps a parameter's type in [`Validated`]
//! when the parameter declares a length or size bound, or when the host has
//! registered validators of its own.

use std::sync::Arc;

use lantern_foundation::{CommandError, Result, Value};
use lantern_stream::StringStream;

use crate::context::ExecutionContext;
use crate::parameter::ParameterDescriptor;
use crate::types::{ParameterType, ParsePriority};

/// Checks a parsed value.
pub trait ParameterValidator: Send + Sync {
    /// Validates `value` for `parameter`.
    ///
    /// # Errors
    ///
    /// Returns the error that rejects the value.
    fn validate(
        &self,
        value: &Value,
        parameter: &ParameterDescriptor,
        context: &ExecutionContext<'_>,
    ) -> Result<()>;
}

impl<F> ParameterValidator for F
where
    F: Fn(&Value, &ParameterDescriptor, &ExecutionContext<'_>) -> Result<()> + Send + Sync,
{
    fn validate(
        &self,
        value: &Value,
        parameter: &ParameterDescriptor,
        context: &ExecutionContext<'_>,
    ) -> Result<()> {
        self(value, parameter, context)
    }
}

/// Enforces [`ParameterDescriptor::length`] on string values.
#[derive(Clone, Copy, Debug, Default)]
pub struct LengthValidator;

impl ParameterValidator for LengthValidator {
    fn validate(
        &self,
        value: &Value,
        parameter: &ParameterDescriptor,
        _context: &ExecutionContext<'_>,
    ) -> Result<()> {
        let (Some((min, max)), Some(text)) = (parameter.length(), value.as_str()) else {
            return Ok(());
        };
        let length = text.chars().count();
        if length < min || length > max {
            return Err(CommandError::parameter_parse(
                text,
                format!("length must be between {min} and {max}, got {length}"),
            ));
        }
        Ok(())
    }
}

/// Enforces [`ParameterDescriptor::size`] on list values.
#[derive(Clone, Copy, Debug, Default)]
pub struct SizeValidator;

impl ParameterValidator for SizeValidator {
    fn validate(
        &self,
        value: &Value,
        parameter: &ParameterDescriptor,
        _context: &ExecutionContext<'_>,
    ) -> Result<()> {
        let (Some((min, max)), Some(items)) = (parameter.size(), value.as_list()) else {
            return Ok(());
        };
        if items.len() < min || items.len() > max {
            return Err(CommandError::parameter_parse(
                value.to_string(),
                format!("expected between {min} and {max} entries, got {}", items.len()),
            ));
        }
        Ok(())
    }
}

/// Runs validators over the output of another parameter type.
#[derive(Clone)]
pub struct Validated {
    inner: Arc<dyn ParameterType>,
    parameter: ParameterDescriptor,
    validators: Arc<[Arc<dyn ParameterValidator>]>,
}

impl Validated {
    /// Wraps `inner` so every parsed value passes through `validators`.
    #[must_use]
    pub fn new(
        inner: Arc<dyn ParameterType>,
        parameter: ParameterDescriptor,
        validators: impl Into<Arc<[Arc<dyn ParameterValidator>]>>,
    ) -> Self {
        Self {
            inner,
            parameter,
            validators: validators.into(),
        }
    }
}

impl ParameterType for Validated {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn parse(&self, input: &mut StringStream, context: &ExecutionContext<'_>) -> Result<Value> {
        let value = self.inner.parse(input, context)?;
        for validator in self.validators.iter() {
            validator.validate(&value, &self.parameter, context)?;
        }
        Ok(value)
    }

    fn default_suggestions(&self) -> Vec<String> {
        self.inner.default_suggestions()
    }

    fn is_greedy(&self) -> bool {
        self.inner.is_greedy()
    }

    fn greedy_variant(&self) -> Option<Arc<dyn ParameterType>> {
        let greedy = self.inner.greedy_variant()?;
        Some(Arc::new(Self {
            inner: greedy,
            parameter: self.parameter.clone(),
            validators: Arc::clone(&self.validators),
        }))
    }

    fn parse_priority(&self) -> ParsePriority {
        self.inner.parse_priority()
    }
}

//! The resolver pipeline.
//!
//! Each parameter is matched to a [`Resolver`] by walking an ordered list
//! of [`ResolverFactory`]s; the first factory that returns `Some` wins. A
//! factory can delegate to the factories after it through
//! [`NextResolver`], which is how the validation and range-check wrappers
//! layer on top of the value types.
//!
//! The list is assembled once by [`PipelineBuilder`] and is immutable
//! afterwards:
//!
//! 1. validation wrapper (length, size, registered validators)
//! 2. range-check wrapper
//! 3. user factories, in insertion order
//! 4. built-in value types (int, float, bool, char, string, list)
//! 5. built-in context types (`actor`, `input`, `command`)
//! 6. registered dependencies
//! 7. factories added with [`PipelineBuilder::add_factory_last`]
//! 8. enum fallback

use std::fmt;
use std::sync::Arc;

use lantern_foundation::{ConfigError, Opaque, Result, Value};

use crate::context::ExecutionContext;
use crate::parameter::{ParameterDescriptor, TypeRef};
use crate::types::{
    BoolType, CharType, EnumType, FloatType, IntType, ListType, ParameterType, RangeChecked,
    StringType,
};
use crate::validator::{LengthValidator, ParameterValidator, SizeValidator, Validated};

/// Derives a value from ambient state without consuming input.
pub trait ContextParameter: Send + Sync {
    /// Produces the value for `parameter`.
    ///
    /// # Errors
    ///
    /// Returns a [`lantern_foundation::CommandError`] if the value is unavailable.
    fn resolve(
        &self,
        parameter: &ParameterDescriptor,
        context: &ExecutionContext<'_>,
    ) -> Result<Value>;
}

impl<F> ContextParameter for F
where
    F: Fn(&ParameterDescriptor, &ExecutionContext<'_>) -> Result<Value> + Send + Sync,
{
    fn resolve(
        &self,
        parameter: &ParameterDescriptor,
        context: &ExecutionContext<'_>,
    ) -> Result<Value> {
        self(parameter, context)
    }
}

/// How a parameter obtains its value.
#[derive(Clone)]
pub enum Resolver {
    /// Consumes input through a parameter type.
    Value(Arc<dyn ParameterType>),
    /// Derives a value from context.
    Context(Arc<dyn ContextParameter>),
}

impl Resolver {
    /// Returns true for value resolvers.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(ty) => write!(f, "Value({})", ty.name()),
            Self::Context(_) => write!(f, "Context"),
        }
    }
}

/// Produces a resolver for parameters it recognises.
pub trait ResolverFactory: Send + Sync {
    /// Returns a resolver for `parameter`, or `None` to defer to the next
    /// factory.
    fn create(&self, parameter: &ParameterDescriptor, next: &NextResolver<'_>) -> Option<Resolver>;
}

/// A view of the pipeline after a given factory.
pub struct NextResolver<'a> {
    pipeline: &'a ResolverPipeline,
    after: usize,
}

impl NextResolver<'_> {
    /// Resolves `parameter` using only the factories after the current one.
    #[must_use]
    pub fn resolve(&self, parameter: &ParameterDescriptor) -> Option<Resolver> {
        self.pipeline.find_from(self.after, parameter)
    }

    /// Resolves `parameter` from the start of the pipeline.
    #[must_use]
    pub fn resolve_from_start(&self, parameter: &ParameterDescriptor) -> Option<Resolver> {
        self.pipeline.find_from(0, parameter)
    }
}

/// An immutable, ordered list of resolver factories.
#[derive(Clone)]
pub struct ResolverPipeline {
    factories: Vec<Arc<dyn ResolverFactory>>,
}

impl ResolverPipeline {
    /// Starts a new pipeline configuration.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Resolves `parameter`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvableType`] if no factory accepts it.
    pub fn resolve(&self, parameter: &ParameterDescriptor) -> std::result::Result<Resolver, ConfigError> {
        self.find_from(0, parameter)
            .ok_or_else(|| ConfigError::UnresolvableType {
                name: parameter.name().to_string(),
                ty: parameter.type_ref().to_string(),
            })
    }

    /// Resolves `parameter` using the factories strictly after `index`.
    #[must_use]
    pub fn find_next(&self, index: usize, parameter: &ParameterDescriptor) -> Option<Resolver> {
        self.find_from(index + 1, parameter)
    }

    /// Number of factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if there are no factories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn find_from(&self, start: usize, parameter: &ParameterDescriptor) -> Option<Resolver> {
        self.factories
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, factory)| {
                let next = NextResolver {
                    pipeline: self,
                    after: index + 1,
                };
                factory.create(parameter, &next)
            })
    }
}

impl Default for ResolverPipeline {
    fn default() -> Self {
        PipelineBuilder::new().build()
    }
}

impl fmt::Debug for ResolverPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverPipeline")
            .field("factories", &self.factories.len())
            .finish()
    }
}

/// Configures a [`ResolverPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    user: Vec<Arc<dyn ResolverFactory>>,
    last: Vec<Arc<dyn ResolverFactory>>,
    dependencies: Vec<(Arc<str>, Opaque)>,
    validators: Vec<Arc<dyn ParameterValidator>>,
    case_sensitive_enums: bool,
}

impl PipelineBuilder {
    /// Creates a builder with only the built-in factories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a factory to the user section, after previously added ones.
    #[must_use]
    pub fn add_factory(mut self, factory: impl ResolverFactory + 'static) -> Self {
        self.user.push(Arc::new(factory));
        self
    }

    /// Inserts a factory at `index` within the user section. Index 0 gives
    /// it precedence over every other user factory.
    #[must_use]
    pub fn insert_factory(mut self, index: usize, factory: impl ResolverFactory + 'static) -> Self {
        let index = index.min(self.user.len());
        self.user.insert(index, Arc::new(factory));
        self
    }

    /// Appends a factory after all built-ins, just before the enum fallback.
    #[must_use]
    pub fn add_factory_last(mut self, factory: impl ResolverFactory + 'static) -> Self {
        self.last.push(Arc::new(factory));
        self
    }

    /// Registers a parameter type for [`TypeRef::Named`] parameters called `name`.
    #[must_use]
    pub fn add_parameter_type(
        self,
        name: impl AsRef<str>,
        ty: impl ParameterType + 'static,
    ) -> Self {
        self.add_factory(NamedFactory {
            name: Arc::from(name.as_ref()),
            resolver: Resolver::Value(Arc::new(ty)),
        })
    }

    /// Registers a context resolver for [`TypeRef::Named`] parameters called `name`.
    #[must_use]
    pub fn add_context_parameter<F>(self, name: impl AsRef<str>, resolve: F) -> Self
    where
        F: Fn(&ParameterDescriptor, &ExecutionContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.add_factory(NamedFactory {
            name: Arc::from(name.as_ref()),
            resolver: Resolver::Context(Arc::new(resolve)),
        })
    }

    /// Registers a dependency injected into parameters of type `name`.
    #[must_use]
    pub fn dependency(mut self, name: impl AsRef<str>, value: Opaque) -> Self {
        self.dependencies.push((Arc::from(name.as_ref()), value));
        self
    }

    /// Registers a validator run on every value parameter after parsing.
    ///
    /// Validators see the parameter descriptor and skip values they do not
    /// care about.
    #[must_use]
    pub fn add_validator(mut self, validator: impl ParameterValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Makes the enum fallback match variant names case-sensitively.
    #[must_use]
    pub const fn case_sensitive_enums(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_enums = case_sensitive;
        self
    }

    /// Freezes the configuration.
    #[must_use]
    pub fn build(self) -> ResolverPipeline {
        let mut factories: Vec<Arc<dyn ResolverFactory>> = Vec::new();
        factories.push(Arc::new(ValidatorFactory {
            validators: self.validators,
        }));
        factories.push(Arc::new(RangeFactory));
        factories.extend(self.user);
        factories.push(Arc::new(BuiltinFactory));
        factories.push(Arc::new(ListFactory));
        factories.push(Arc::new(AmbientFactory));
        for (name, value) in self.dependencies {
            let resolve = move |_: &ParameterDescriptor, _: &ExecutionContext<'_>| -> Result<Value> {
                Ok(Value::Opaque(value.clone()))
            };
            factories.push(Arc::new(NamedFactory {
                name,
                resolver: Resolver::Context(Arc::new(resolve)),
            }));
        }
        factories.extend(self.last);
        factories.push(Arc::new(EnumFallback {
            case_sensitive: self.case_sensitive_enums,
        }));
        ResolverPipeline { factories }
    }
}

/// Wraps value types in [`Validated`] when any validator applies.
struct ValidatorFactory {
    validators: Vec<Arc<dyn ParameterValidator>>,
}

impl ResolverFactory for ValidatorFactory {
    fn create(&self, parameter: &ParameterDescriptor, next: &NextResolver<'_>) -> Option<Resolver> {
        let mut active: Vec<Arc<dyn ParameterValidator>> = Vec::new();
        if parameter.length().is_some() {
            active.push(Arc::new(LengthValidator));
        }
        if parameter.size().is_some() {
            active.push(Arc::new(SizeValidator));
        }
        active.extend(self.validators.iter().cloned());
        if active.is_empty() {
            return None;
        }
        match next.resolve(parameter)? {
            Resolver::Value(ty) => Some(Resolver::Value(Arc::new(Validated::new(
                ty,
                parameter.clone(),
                active,
            )))),
            context @ Resolver::Context(_) => Some(context),
        }
    }
}

/// Wraps numeric types in [`RangeChecked`] when the parameter has a range.
struct RangeFactory;

impl ResolverFactory for RangeFactory {
    fn create(&self, parameter: &ParameterDescriptor, next: &NextResolver<'_>) -> Option<Resolver> {
        let (min, max) = parameter.range()?;
        match next.resolve(parameter)? {
            Resolver::Value(ty) => Some(Resolver::Value(Arc::new(RangeChecked::new(ty, min, max)))),
            context @ Resolver::Context(_) => Some(context),
        }
    }
}

struct BuiltinFactory;

impl ResolverFactory for BuiltinFactory {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        let ty: Arc<dyn ParameterType> = match parameter.type_ref() {
            TypeRef::Int => Arc::new(IntType),
            TypeRef::Float => Arc::new(FloatType),
            TypeRef::Bool => Arc::new(BoolType),
            TypeRef::Char => Arc::new(CharType),
            TypeRef::String => Arc::new(StringType::single()),
            _ => return None,
        };
        Some(Resolver::Value(ty))
    }
}

struct ListFactory;

impl ResolverFactory for ListFactory {
    fn create(&self, parameter: &ParameterDescriptor, next: &NextResolver<'_>) -> Option<Resolver> {
        let TypeRef::List(inner) = parameter.type_ref() else {
            return None;
        };
        match next.resolve_from_start(&parameter.with_type((**inner).clone()))? {
            Resolver::Value(ty) => Some(Resolver::Value(Arc::new(ListType::new(ty)))),
            Resolver::Context(_) => None,
        }
    }
}

/// The `actor`, `input`, and `command` context types.
struct AmbientFactory;

impl ResolverFactory for AmbientFactory {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        let TypeRef::Named(name) = parameter.type_ref() else {
            return None;
        };
        let resolve: Arc<dyn ContextParameter> = match name.as_ref() {
            "actor" => Arc::new(
                |_: &ParameterDescriptor, ctx: &ExecutionContext<'_>| -> Result<Value> {
                    Ok(Value::Actor(ctx.actor().id()))
                },
            ),
            "input" => Arc::new(
                |_: &ParameterDescriptor, ctx: &ExecutionContext<'_>| -> Result<Value> {
                    Ok(Value::string(ctx.input()))
                },
            ),
            "command" => Arc::new(
                |_: &ParameterDescriptor, ctx: &ExecutionContext<'_>| -> Result<Value> {
                    Ok(Value::string(ctx.execution().path()))
                },
            ),
            _ => return None,
        };
        Some(Resolver::Context(resolve))
    }
}

struct NamedFactory {
    name: Arc<str>,
    resolver: Resolver,
}

impl ResolverFactory for NamedFactory {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        match parameter.type_ref() {
            TypeRef::Named(name) if *name == self.name => Some(self.resolver.clone()),
            _ => None,
        }
    }
}

struct EnumFallback {
    case_sensitive: bool,
}

impl ResolverFactory for EnumFallback {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        match parameter.type_ref() {
            TypeRef::Enum(spec) => Some(Resolver::Value(Arc::new(EnumType::new(
                spec.clone(),
                self.case_sensitive,
            )))),
            _ => None,
        }
    }
}

//! Tests for the resolver pipeline as seen through compiled executions.

use std::sync::Arc;

use lantern_foundation::{CommandError, ConfigError, ErrorKind, Opaque, Result, Value};
use lantern_stream::StringStream;
use lantern_tree::{
    CommandFunction, EnumSpec, ExecutionContext, NextResolver, ParameterDescriptor, ParameterType,
    Resolver, ResolverFactory, ResolverPipeline, TreeBuilder, TypeRef,
};

use crate::Player;

// =============================================================================
// Helper Types
// =============================================================================

/// Parses a `x,y,z` triple into a list of floats.
struct Vec3Type;

impl ParameterType for Vec3Type {
    fn name(&self) -> &str {
        "vec3"
    }

    fn parse(
        &self,
        input: &mut StringStream,
        _context: &ExecutionContext<'_>,
    ) -> Result<Value> {
        let word = input.read_unquoted();
        let parts: Vec<f64> = word.split(',').filter_map(|p| p.parse().ok()).collect();
        if parts.len() == 3 {
            Ok(Value::List(parts.into_iter().map(Value::Float).collect()))
        } else {
            Err(CommandError::parameter_parse(word, "expected x,y,z"))
        }
    }
}

/// Resolves every int parameter as a word.
struct IntAsWord;

impl ResolverFactory for IntAsWord {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        (*parameter.type_ref() == TypeRef::Int).then(|| Resolver::Value(Arc::new(WordType("word"))))
    }
}

/// Resolves every int parameter as a word, under a different name.
struct IntAsToken;

impl ResolverFactory for IntAsToken {
    fn create(&self, parameter: &ParameterDescriptor, _next: &NextResolver<'_>) -> Option<Resolver> {
        (*parameter.type_ref() == TypeRef::Int).then(|| Resolver::Value(Arc::new(WordType("token"))))
    }
}

struct WordType(&'static str);

impl ParameterType for WordType {
    fn name(&self) -> &str {
        self.0
    }

    fn parse(
        &self,
        input: &mut StringStream,
        _context: &ExecutionContext<'_>,
    ) -> Result<Value> {
        Ok(Value::from(input.read_unquoted()))
    }
}

fn type_name(pipeline: &ResolverPipeline, parameter: &ParameterDescriptor) -> String {
    match pipeline.resolve(parameter) {
        Ok(Resolver::Value(ty)) => ty.name().to_string(),
        Ok(Resolver::Context(_)) => "<context>".to_string(),
        Err(err) => format!("error: {err}"),
    }
}

fn parse_first(pipeline: &ResolverPipeline, function: &CommandFunction, name: &str, text: &str) -> Result<Value> {
    let execution = TreeBuilder::new(pipeline).build_all(function).unwrap().remove(0);
    let actor = Player(1);
    let context = ExecutionContext::new(&actor, &execution, text);
    execution
        .parameter(name)
        .unwrap()
        .parse(&mut StringStream::new(text), &context)
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn named_parameter_type_is_used() {
    let pipeline = ResolverPipeline::builder().add_parameter_type("vec3", Vec3Type).build();
    let function = CommandFunction::new("tp <to>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("to", TypeRef::named("vec3")));

    let value = parse_first(&pipeline, &function, "to", "1,2.5,-3").unwrap();
    assert_eq!(
        value,
        Value::List([Value::Float(1.0), Value::Float(2.5), Value::Float(-3.0)].into_iter().collect())
    );
    assert!(parse_first(&pipeline, &function, "to", "1,2").is_err());
}

#[test]
fn unregistered_named_type_fails_compilation() {
    let pipeline = ResolverPipeline::default();
    let function = CommandFunction::new("tp <to>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("to", TypeRef::named("vec3")));
    let err = TreeBuilder::new(&pipeline).build_all(&function).unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvableType { .. }));
}

#[test]
fn inserted_factory_takes_precedence() {
    let p = ParameterDescriptor::new("n", TypeRef::Int);

    let appended = ResolverPipeline::builder()
        .add_factory(IntAsWord)
        .add_factory(IntAsToken)
        .build();
    assert_eq!(type_name(&appended, &p), "word");

    let inserted = ResolverPipeline::builder()
        .add_factory(IntAsWord)
        .insert_factory(0, IntAsToken)
        .build();
    assert_eq!(type_name(&inserted, &p), "token");
}

#[test]
fn late_factory_only_sees_leftovers() {
    let pipeline = ResolverPipeline::builder().add_factory_last(IntAsWord).build();
    assert_eq!(type_name(&pipeline, &ParameterDescriptor::new("n", TypeRef::Int)), "int");
}

// =============================================================================
// Context Parameters
// =============================================================================

#[test]
fn context_parameters_resolve_at_invocation() {
    let pipeline = ResolverPipeline::builder()
        .add_context_parameter("greeting", |_p: &ParameterDescriptor, ctx: &ExecutionContext<'_>| {
            Ok(Value::string(format!("hello {}", ctx.actor().name())))
        })
        .build();
    let function = CommandFunction::new("hi", |ctx| Ok(ctx.get("greeting").cloned().unwrap_or(Value::Nil)))
        .with_parameter(ParameterDescriptor::new("greeting", TypeRef::named("greeting")));
    let execution = TreeBuilder::new(&pipeline).build_all(&function).unwrap().remove(0);
    assert_eq!(execution.len(), 1);

    let actor = Player(1);
    let mut context = ExecutionContext::new(&actor, &execution, "hi");
    let response = execution.action().unwrap().invoke(&mut context).unwrap();
    assert_eq!(response, Value::string("hello player"));
}

#[test]
fn ambient_types_are_context_parameters() {
    let pipeline = ResolverPipeline::default();
    for name in ["actor", "input", "command"] {
        let p = ParameterDescriptor::new("x", TypeRef::named(name));
        assert_eq!(type_name(&pipeline, &p), "<context>", "{name}");
    }
}

#[test]
fn dependencies_are_injected_as_opaque_values() {
    #[derive(Debug, PartialEq)]
    struct Config {
        motd: &'static str,
    }

    let pipeline = ResolverPipeline::builder()
        .dependency("config", Opaque::new("config", Config { motd: "welcome" }))
        .build();
    let function = CommandFunction::new("motd", |ctx| {
        let motd = ctx
            .get("config")
            .and_then(Value::as_opaque)
            .and_then(|o| o.downcast_ref::<Config>())
            .map(|c| c.motd);
        Ok(motd.map_or(Value::Nil, Value::string))
    })
    .with_parameter(ParameterDescriptor::new("config", TypeRef::named("config")));
    let execution = TreeBuilder::new(&pipeline).build_all(&function).unwrap().remove(0);

    let actor = Player(1);
    let mut context = ExecutionContext::new(&actor, &execution, "motd");
    let response = execution.action().unwrap().invoke(&mut context).unwrap();
    assert_eq!(response, Value::string("welcome"));
}

// =============================================================================
// Wrappers and Fallbacks
// =============================================================================

#[test]
fn range_wraps_numeric_types() {
    let pipeline = ResolverPipeline::default();
    let function = CommandFunction::new("speed <n>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("n", TypeRef::Float).with_range(Some(0.0), Some(10.0)));

    assert_eq!(parse_first(&pipeline, &function, "n", "2.5").unwrap(), Value::Float(2.5));
    assert!(parse_first(&pipeline, &function, "n", "10.5").is_err());
    assert!(parse_first(&pipeline, &function, "n", "-1").is_err());
}

#[test]
fn list_resolves_inner_type_through_pipeline() {
    let pipeline = ResolverPipeline::builder().add_parameter_type("vec3", Vec3Type).build();
    let p = ParameterDescriptor::new("points", TypeRef::list(TypeRef::named("vec3")));
    assert_eq!(type_name(&pipeline, &p), "list<vec3>");

    let p = ParameterDescriptor::new("who", TypeRef::list(TypeRef::named("actor")));
    assert!(type_name(&pipeline, &p).starts_with("error"));
}

#[test]
fn enum_case_sensitivity_is_configurable() {
    let mode = EnumSpec::new("GameMode", ["SURVIVAL", "CREATIVE"]);
    let function = CommandFunction::new("gm <mode>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("mode", TypeRef::Enum(mode)));

    let relaxed = ResolverPipeline::default();
    assert_eq!(
        parse_first(&relaxed, &function, "mode", "creative").unwrap(),
        Value::variant("CREATIVE")
    );

    let strict = ResolverPipeline::builder().case_sensitive_enums(true).build();
    assert!(parse_first(&strict, &function, "mode", "creative").is_err());
    assert_eq!(
        parse_first(&strict, &function, "mode", "CREATIVE").unwrap(),
        Value::variant("CREATIVE")
    );
}

// =============================================================================
// Validators
// =============================================================================

#[test]
fn length_bounds_survive_greedy_promotion() {
    let pipeline = ResolverPipeline::default();
    let function = CommandFunction::new("nick <name>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("name", TypeRef::String).with_length(3, 8));

    assert_eq!(parse_first(&pipeline, &function, "name", "Steve Jr").unwrap(), Value::string("Steve Jr"));
    let err = parse_first(&pipeline, &function, "name", "Jo").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParameterParse { ref input, .. } if input == "Jo"));
    assert!(parse_first(&pipeline, &function, "name", "a rather long name").is_err());
}

#[test]
fn size_bounds_count_list_entries() {
    let pipeline = ResolverPipeline::default();
    let function = CommandFunction::new("pardon <ids>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("ids", TypeRef::list(TypeRef::Int)).with_size(1, 3));

    let value = parse_first(&pipeline, &function, "ids", "4 5 6").unwrap();
    assert_eq!(value.as_list().map(|items| items.len()), Some(3));
    let err = parse_first(&pipeline, &function, "ids", "4 5 6 7").unwrap_err();
    assert!(err.to_string().contains("between 1 and 3 entries, got 4"));
}

#[test]
fn registered_validators_see_the_actor() {
    let pipeline = ResolverPipeline::builder()
        .add_validator(|value: &Value, parameter: &ParameterDescriptor, ctx: &ExecutionContext<'_>| -> Result<()> {
            let limit = i64::try_from(ctx.actor().id().raw() * 10).unwrap_or(i64::MAX);
            match value.as_int() {
                Some(n) if parameter.name() == "amount" && n > limit => Err(CommandError::parameter_parse(
                    n.to_string(),
                    format!("at most {limit} allowed"),
                )),
                _ => Ok(()),
            }
        })
        .build();
    let function = CommandFunction::new("give <amount> <count>", |_ctx| Ok(Value::Nil))
        .with_parameter(ParameterDescriptor::new("amount", TypeRef::Int))
        .with_parameter(ParameterDescriptor::new("count", TypeRef::Int));

    assert_eq!(parse_first(&pipeline, &function, "amount", "10").unwrap(), Value::Int(10));
    let err = parse_first(&pipeline, &function, "amount", "11").unwrap_err();
    assert!(err.to_string().contains("at most 10 allowed"));
    assert_eq!(parse_first(&pipeline, &function, "count", "99").unwrap(), Value::Int(99));
}

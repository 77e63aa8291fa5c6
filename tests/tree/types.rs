//! Tests for parameter types and parameter nodes inside compiled executions.

use lantern_foundation::{Actor, ErrorKind, InputFormatCause, Result, Value};
use lantern_stream::StringStream;
use lantern_tree::{
    CommandFunction, EnumSpec, Execution, ExecutionContext, ParameterDescriptor, ParsePriority,
    ResolverPipeline, TreeBuilder, TypeRef,
};

use crate::Player;

// =============================================================================
// Helper Functions
// =============================================================================

fn compile(function: &CommandFunction) -> Execution {
    TreeBuilder::new(&ResolverPipeline::default())
        .build_all(function)
        .unwrap()
        .remove(0)
}

/// Parses `text` with the named parameter of `execution`, returning the
/// value and whatever input is left.
fn parse_as(execution: &Execution, actor: &Player, name: &str, text: &str) -> Result<(Value, String)> {
    let context = ExecutionContext::new(actor, execution, text);
    let mut stream = StringStream::new(text);
    let value = execution.parameter(name).unwrap().parse(&mut stream, &context)?;
    Ok((value, stream.peek_remaining().to_string()))
}

fn one(ty: TypeRef) -> Execution {
    compile(
        &CommandFunction::new("run <x> <rest>", |_ctx| Ok(Value::Nil))
            .with_parameter(ParameterDescriptor::new("x", ty))
            .with_parameter(ParameterDescriptor::new("rest", TypeRef::String)),
    )
}

// =============================================================================
// Scalar Types
// =============================================================================

#[test]
fn numbers_consume_one_word() {
    let actor = Player(1);
    let ints = one(TypeRef::Int);
    assert_eq!(parse_as(&ints, &actor, "x", "-42 tail").unwrap(), (Value::Int(-42), " tail".to_string()));
    assert!(parse_as(&ints, &actor, "x", "4.2").is_err());
    assert!(parse_as(&ints, &actor, "x", "99999999999999999999").is_err());

    let floats = one(TypeRef::Float);
    assert_eq!(parse_as(&floats, &actor, "x", "0.5").unwrap().0, Value::Float(0.5));
    assert!(parse_as(&floats, &actor, "x", "NaN").is_err());
    assert!(parse_as(&floats, &actor, "x", "inf").is_err());
}

#[test]
fn booleans_accept_common_spellings() {
    let actor = Player(1);
    let bools = one(TypeRef::Bool);
    for (text, expected) in [("yes", true), ("TRUE", true), ("no", false), ("nope", false)] {
        assert_eq!(parse_as(&bools, &actor, "x", text).unwrap().0, Value::Bool(expected), "{text}");
    }
    let err = parse_as(&bools, &actor, "x", "maybe").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParameterParse { .. }));
}

#[test]
fn chars_are_single_characters() {
    let actor = Player(1);
    let chars = one(TypeRef::Char);
    assert_eq!(parse_as(&chars, &actor, "x", "é").unwrap().0, Value::Char('é'));
    assert!(parse_as(&chars, &actor, "x", "ab").is_err());
}

#[test]
fn enums_yield_canonical_variant() {
    let actor = Player(1);
    let spec = EnumSpec::new("Difficulty", ["PEACEFUL", "EASY", "HARD"]);
    let execution = one(TypeRef::Enum(spec));
    assert_eq!(parse_as(&execution, &actor, "x", "Hard").unwrap().0, Value::variant("HARD"));

    let err = parse_as(&execution, &actor, "x", "normal").unwrap_err();
    assert!(err.to_string().contains("PEACEFUL, EASY, HARD"));
}

// =============================================================================
// Strings and Greediness
// =============================================================================

#[test]
fn trailing_string_is_greedy() {
    let actor = Player(1);
    let execution = one(TypeRef::Int);
    let rest = execution.parameter("rest").unwrap();
    assert!(rest.is_greedy());
    assert_eq!(rest.parse_priority(), ParsePriority::Lowest);
    assert_eq!(
        parse_as(&execution, &actor, "rest", "hello there world").unwrap().0,
        Value::from("hello there world")
    );
}

#[test]
fn single_string_stays_one_word() {
    let actor = Player(1);
    let execution = compile(
        &CommandFunction::new("kick <who>", |_ctx| Ok(Value::Nil))
            .with_parameter(ParameterDescriptor::new("who", TypeRef::String).single()),
    );
    assert!(!execution.parameter("who").unwrap().is_greedy());
    assert_eq!(
        parse_as(&execution, &actor, "who", "\"big bob\" now").unwrap(),
        (Value::from("big bob"), " now".to_string())
    );

    let err = parse_as(&execution, &actor, "who", "\"big bob").unwrap_err();
    assert_eq!(err.kind, ErrorKind::InputFormat(InputFormatCause::UnclosedQuote));
}

#[test]
fn lists_collect_until_end() {
    let actor = Player(1);
    let execution = compile(
        &CommandFunction::new("sum <xs>", |_ctx| Ok(Value::Nil))
            .with_parameter(ParameterDescriptor::new("xs", TypeRef::list(TypeRef::Int))),
    );
    let (value, rest) = parse_as(&execution, &actor, "xs", "1 2 3").unwrap();
    assert_eq!(value.as_list().map(|items| items.len()), Some(3));
    assert!(rest.is_empty());
    assert!(parse_as(&execution, &actor, "xs", "1 x 3").is_err());
}

// =============================================================================
// Absent Values and Permissions
// =============================================================================

#[test]
fn optional_parameters_use_defaults() {
    let actor = Player(1);
    let execution = compile(
        &CommandFunction::new("give <item> [count] [note]", |_ctx| Ok(Value::Nil))
            .with_parameter(ParameterDescriptor::new("item", TypeRef::String).single())
            .with_parameter(ParameterDescriptor::new("count", TypeRef::Int).with_default("1"))
            .with_parameter(ParameterDescriptor::new("note", TypeRef::String)),
    );
    assert_eq!(parse_as(&execution, &actor, "count", "").unwrap().0, Value::Int(1));
    assert_eq!(parse_as(&execution, &actor, "note", "").unwrap().0, Value::Nil);

    let err = parse_as(&execution, &actor, "item", "").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingArgument { ref parameter } if parameter == "item"));
}

#[test]
fn parameter_permission_is_checked_before_parsing() {
    let execution = compile(
        &CommandFunction::new("fly <speed>", |_ctx| Ok(Value::Nil)).with_parameter(
            ParameterDescriptor::new("speed", TypeRef::Int)
                .with_permission(|actor: &dyn Actor| actor.id().raw() >= 5),
        ),
    );
    assert!(parse_as(&execution, &Player(9), "speed", "3").is_ok());

    let err = parse_as(&execution, &Player(1), "speed", "3").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoPermission { ref target } if target == "speed"));
}

#[test]
fn absent_flags_resolve_without_input() {
    let actor = Player(1);
    let execution = compile(
        &CommandFunction::new("save", |_ctx| Ok(Value::Nil))
            .with_parameter(ParameterDescriptor::new("force", TypeRef::Bool).switch())
            .with_parameter(ParameterDescriptor::new("slot", TypeRef::Int).with_default("0").flag())
            .with_parameter(ParameterDescriptor::new("name", TypeRef::String).flag()),
    );
    let context = ExecutionContext::new(&actor, &execution, "save");
    let absent = |name: &str| execution.parameter(name).unwrap().resolve_absent(&context);

    assert_eq!(absent("force").unwrap(), Value::Bool(false));
    assert_eq!(absent("slot").unwrap(), Value::Int(0));
    assert!(matches!(absent("name").unwrap_err().kind, ErrorKind::MissingArgument { .. }));
}

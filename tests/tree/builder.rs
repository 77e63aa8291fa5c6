//! Integration tests for the grammar tree builder

use lantern_foundation::{ConfigError, Value};
use lantern_tree::{
    CommandFunction, CommandNode, Execution, ParameterDescriptor, ResolverPipeline, TreeBuilder,
    TypeRef,
};
use proptest::prelude::*;

fn noop(path: &str) -> CommandFunction {
    CommandFunction::new(path, |_ctx| Ok(Value::Nil))
}

fn build(function: &CommandFunction) -> Result<Vec<Execution>, ConfigError> {
    TreeBuilder::new(&ResolverPipeline::default()).build_all(function)
}

// =============================================================================
// Node Chains
// =============================================================================

#[test]
fn placeholders_and_trailing_parameters() {
    let function = noop("foo <a> [b]")
        .with_parameter(ParameterDescriptor::new("a", TypeRef::Int))
        .with_parameter(ParameterDescriptor::new("b", TypeRef::String).with_default("x"))
        .with_parameter(ParameterDescriptor::new("c", TypeRef::Int).optional());
    let execution = build(&function).unwrap().remove(0);

    let names: Vec<&str> = execution.nodes().iter().map(CommandNode::name).collect();
    assert_eq!(names, vec!["foo", "a", "b", "c"]);
    assert_eq!(execution.optional_count(), 2);
    assert_eq!(execution.required_count(), 2);
    assert_eq!(execution.path(), "foo <a> [b] [c]");
}

#[test]
fn every_optional_node_carries_the_action() {
    let function = noop("foo <a> [b]")
        .with_parameter(ParameterDescriptor::new("a", TypeRef::Int))
        .with_parameter(ParameterDescriptor::new("b", TypeRef::Int).optional());
    let execution = build(&function).unwrap().remove(0);
    let nodes = execution.nodes();

    assert!(nodes[0].action().is_none());
    assert!(nodes[1].action().is_none());
    assert!(nodes[2].action().is_some());
    assert!(nodes[2].is_last());
    assert!(execution.action().is_some());
}

#[test]
fn trailing_string_is_promoted_to_greedy() {
    let function = noop("msg <target> <message>")
        .with_parameter(ParameterDescriptor::new("target", TypeRef::String))
        .with_parameter(ParameterDescriptor::new("message", TypeRef::String));
    let execution = build(&function).unwrap().remove(0);

    let target = execution.parameter("target").unwrap();
    let message = execution.parameter("message").unwrap();
    assert!(!target.is_greedy());
    assert!(message.is_greedy());
}

#[test]
fn single_opts_out_of_promotion() {
    let function = noop("nick <name>")
        .with_parameter(ParameterDescriptor::new("name", TypeRef::String).single());
    let execution = build(&function).unwrap().remove(0);
    assert!(!execution.parameter("name").unwrap().is_greedy());
}

#[test]
fn flags_follow_positional_nodes() {
    let function = noop("ban <target>")
        .with_parameter(ParameterDescriptor::new("silent", TypeRef::Bool).switch())
        .with_parameter(ParameterDescriptor::new("target", TypeRef::String));
    let execution = build(&function).unwrap().remove(0);

    assert!(execution.contains_flags());
    assert_eq!(execution.flags().count(), 1);
    assert_eq!(execution.positional().count(), 2);
    assert_eq!(execution.path(), "ban <target> [--silent]");
}

#[test]
fn context_parameters_are_deferred() {
    let function = noop("whoami")
        .with_parameter(ParameterDescriptor::new("sender", TypeRef::named("actor")));
    let execution = build(&function).unwrap().remove(0);

    assert_eq!(execution.len(), 1);
    let action = execution.action().unwrap();
    let deferred: Vec<&str> = action.context_parameters().map(ParameterDescriptor::name).collect();
    assert_eq!(deferred, vec!["sender"]);
}

#[test]
fn aliases_compile_separately() {
    let function = noop("gamemode <mode>")
        .with_path("gm <mode>")
        .with_parameter(ParameterDescriptor::new("mode", TypeRef::Int));
    let executions = build(&function).unwrap();

    assert_eq!(executions.len(), 2);
    assert_eq!(executions[1].name(), "gm");
    assert_ne!(executions[0].id(), executions[1].id());
}

#[test]
fn metadata_is_copied() {
    let function = noop("heal")
        .with_description("Restores health")
        .with_usage("heal [player]")
        .with_priority(3)
        .secret();
    let execution = build(&function).unwrap().remove(0);

    assert_eq!(execution.description(), Some("Restores health"));
    assert_eq!(execution.usage(), "heal [player]");
    assert_eq!(execution.priority(), Some(3));
    assert!(execution.is_secret());
}

// =============================================================================
// Invariant Violations
// =============================================================================

fn assert_rejected(function: &CommandFunction, expected: impl Fn(&ConfigError) -> bool) {
    let err = build(function).unwrap_err();
    assert!(expected(&err), "{:?} produced {err:?}", function.paths());
}

#[test]
fn rejects_leading_parameter() {
    assert_rejected(
        &noop("<a>").with_parameter(ParameterDescriptor::new("a", TypeRef::Int)),
        |e| matches!(e, ConfigError::LeadingParameter { .. }),
    );
}

#[test]
fn rejects_placeholder_errors() {
    assert_rejected(&noop("foo <missing>"), |e| {
        matches!(e, ConfigError::UnknownPlaceholder { .. })
    });
    assert_rejected(
        &noop("foo <a> <a>").with_parameter(ParameterDescriptor::new("a", TypeRef::Int)),
        |e| matches!(e, ConfigError::DuplicatePlaceholder { .. }),
    );
    assert_rejected(
        &noop("foo <who>").with_parameter(ParameterDescriptor::new("who", TypeRef::named("actor"))),
        |e| matches!(e, ConfigError::ContextPlaceholder { .. }),
    );
}

#[test]
fn rejects_ordering_errors() {
    assert_rejected(
        &noop("foo [a] bar").with_parameter(ParameterDescriptor::new("a", TypeRef::Int)),
        |e| matches!(e, ConfigError::LiteralAfterOptional { .. }),
    );
    assert_rejected(
        &noop("foo [a] <b>")
            .with_parameter(ParameterDescriptor::new("a", TypeRef::Int))
            .with_parameter(ParameterDescriptor::new("b", TypeRef::Int)),
        |e| matches!(e, ConfigError::RequiredAfterOptional { .. }),
    );
    assert_rejected(
        &noop("foo <a> <b>")
            .with_parameter(ParameterDescriptor::new("a", TypeRef::list(TypeRef::Int)))
            .with_parameter(ParameterDescriptor::new("b", TypeRef::Int)),
        |e| matches!(e, ConfigError::GreedyNotLast { .. }),
    );
}

#[test]
fn rejects_flag_and_metadata_errors() {
    assert_rejected(
        &noop("foo")
            .with_parameter(ParameterDescriptor::new("x", TypeRef::Bool).switch())
            .with_parameter(ParameterDescriptor::new("xray", TypeRef::Bool).switch()),
        |e| matches!(e, ConfigError::DuplicateShorthand('x')),
    );
    assert_rejected(&noop("foo").with_priority(1).low_priority(), |e| {
        matches!(e, ConfigError::ConflictingPriority { .. })
    });
    assert_rejected(
        &noop("foo <p>").with_parameter(ParameterDescriptor::new("p", TypeRef::named("vector"))),
        |e| matches!(e, ConfigError::UnresolvableType { .. }),
    );
}

#[test]
fn one_bad_alias_fails_the_function() {
    let function = noop("good").with_path("also <nope>");
    assert!(build(&function).is_err());
}

// =============================================================================
// Properties
// =============================================================================

fn grammar() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
    (prop::collection::vec("[a-z]{2,6}", 1..4), 0usize..4, 0usize..3)
}

proptest! {
    #[test]
    fn node_count_is_literals_plus_parameters((literals, required, optional) in grammar()) {
        let mut path = literals.join(" ");
        let mut function_parameters = Vec::new();
        for i in 0..required {
            path.push_str(&format!(" <r{i}>"));
            function_parameters.push(ParameterDescriptor::new(format!("r{i}"), TypeRef::Int));
        }
        for i in 0..optional {
            path.push_str(&format!(" [o{i}]"));
            function_parameters.push(ParameterDescriptor::new(format!("o{i}"), TypeRef::Int));
        }
        let mut function = noop(&path);
        for parameter in function_parameters {
            function = function.with_parameter(parameter);
        }

        let execution = build(&function).unwrap().remove(0);
        prop_assert_eq!(execution.len(), literals.len() + required + optional);
        prop_assert_eq!(execution.optional_count(), optional);
        prop_assert!(execution.nodes()[0].is_literal());
        prop_assert!(execution.nodes().last().unwrap().is_last());
    }
}

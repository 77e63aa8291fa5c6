//! Tests for registration, queries, hooks, and handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lantern_dispatch::{CommandHooks, DispatchError, Dispatcher};
use lantern_foundation::{ActionError, Value};
use lantern_tree::{CommandFunction, Execution, ExecutionContext, ParameterDescriptor, TypeRef};
use parking_lot::Mutex;

use crate::{Player, run, tagged};

// =============================================================================
// Registration and Queries
// =============================================================================

#[test]
fn aliases_register_separately() {
    let dispatcher = Dispatcher::new();
    let registered = dispatcher
        .register_function(&tagged("gamemode", "gm").with_path("gm"))
        .unwrap();
    assert_eq!(registered.len(), 2);
    assert_eq!(run(&dispatcher, "GM").unwrap(), Value::string("gm"));
    assert_eq!(run(&dispatcher, "gamemode").unwrap(), Value::string("gm"));
}

#[test]
fn invalid_alias_registers_nothing() {
    let dispatcher = Dispatcher::new();
    let result = dispatcher.register_function(&tagged("ok", "x").with_path("<bad>"));
    assert!(result.is_err());
    assert!(dispatcher.commands().is_empty());
}

#[test]
fn unregister_by_id_and_predicate() {
    let dispatcher = Dispatcher::new();
    let ping = dispatcher.register_function(&tagged("ping", "pong")).unwrap().remove(0);
    dispatcher.register_function(&tagged("team join", "join")).unwrap();
    dispatcher.register_function(&tagged("team leave", "leave")).unwrap();

    assert!(dispatcher.get(ping.id()).is_some());
    assert_eq!(dispatcher.unregister(ping.id()).map(|e| e.id()), Some(ping.id()));
    assert!(dispatcher.unregister(ping.id()).is_none());
    assert!(matches!(run(&dispatcher, "ping"), Err(DispatchError::UnknownCommand(_))));

    let removed = dispatcher.unregister_if(|e| e.path().starts_with("team"));
    assert_eq!(removed.len(), 2);
    assert!(!dispatcher.any(|_| true));
}

#[test]
fn structural_queries() {
    let dispatcher = Dispatcher::new();
    let team = dispatcher.register_function(&tagged("team", "team")).unwrap().remove(0);
    let join = dispatcher.register_function(&tagged("team join", "join")).unwrap().remove(0);
    dispatcher.register_function(&tagged("team leave", "leave")).unwrap();
    dispatcher.register_function(&tagged("teams", "teams")).unwrap();

    let mut children: Vec<String> = dispatcher
        .children(&team)
        .iter()
        .map(|e| e.path().to_string())
        .collect();
    children.sort();
    assert_eq!(children, vec!["team join", "team leave"]);

    let siblings: Vec<String> = dispatcher
        .siblings(&join)
        .iter()
        .map(|e| e.path().to_string())
        .collect();
    assert_eq!(siblings, vec!["team leave"]);

    assert_eq!(dispatcher.candidates("TEAM x").len(), 3);
    assert_eq!(dispatcher.filter(|e| e.len() == 1).len(), 2);
}

#[test]
fn actions_may_register_commands() {
    let dispatcher = Arc::new(Dispatcher::new());
    let inner = Arc::clone(&dispatcher);
    dispatcher
        .register_function(&CommandFunction::new("spawn", move |_ctx| {
            inner
                .register_function(&tagged("spawned", "hello"))
                .map_err(|err| ActionError::message(err.to_string()))?;
            Ok(Value::Nil)
        }))
        .unwrap();

    run(&dispatcher, "spawn").unwrap();
    assert_eq!(run(&dispatcher, "spawned").unwrap(), Value::string("hello"));
    dispatcher.unregister_if(|_| true);
}

// =============================================================================
// Hooks
// =============================================================================

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    veto: bool,
}

impl CommandHooks for Recorder {
    fn on_registered(&self, execution: &Execution) -> bool {
        self.events.lock().push(format!("+{}", execution.path()));
        !(self.veto && execution.path() == "forbidden")
    }

    fn on_unregistered(&self, execution: &Execution) {
        self.events.lock().push(format!("-{}", execution.path()));
    }

    fn on_executed(&self, context: &ExecutionContext<'_>) -> bool {
        self.events.lock().push(format!("!{}", context.execution().path()));
        !(self.veto && context.input() == "ping now")
    }
}

struct Shared(Arc<Recorder>);

impl CommandHooks for Shared {
    fn on_registered(&self, execution: &Execution) -> bool {
        self.0.on_registered(execution)
    }

    fn on_unregistered(&self, execution: &Execution) {
        self.0.on_unregistered(execution);
    }

    fn on_executed(&self, context: &ExecutionContext<'_>) -> bool {
        self.0.on_executed(context)
    }
}

#[test]
fn hooks_observe_lifecycle() {
    let recorder = Arc::new(Recorder::default());
    let dispatcher = Dispatcher::builder().with_hooks(Shared(Arc::clone(&recorder))).build();
    let ping = dispatcher.register_function(&tagged("ping", "pong")).unwrap().remove(0);
    run(&dispatcher, "ping").unwrap();
    dispatcher.unregister(ping.id());

    assert_eq!(*recorder.events.lock(), vec!["+ping", "!ping", "-ping"]);
}

#[test]
fn any_hook_can_veto_and_all_are_notified() {
    let observer = Arc::new(Recorder::default());
    let vetoer = Arc::new(Recorder { veto: true, ..Recorder::default() });
    let dispatcher = Dispatcher::builder()
        .with_hooks(Shared(Arc::clone(&vetoer)))
        .with_hooks(Shared(Arc::clone(&observer)))
        .build();

    assert!(dispatcher.register_function(&tagged("forbidden", "x")).unwrap().is_empty());
    assert!(dispatcher.commands().is_empty());

    let ran = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ran);
    dispatcher
        .register_function(
            &CommandFunction::new("ping <text>", move |_ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Nil)
            })
            .with_parameter(ParameterDescriptor::new("text", TypeRef::String)),
        )
        .unwrap();

    let err = run(&dispatcher, "ping now").unwrap_err();
    assert!(matches!(err, DispatchError::Vetoed { ref path } if path == "ping <text>"));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert!(observer.events.lock().contains(&"!ping <text>".to_string()));

    run(&dispatcher, "ping later").unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Handlers
// =============================================================================

#[test]
fn responses_reach_the_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let dispatcher = Dispatcher::builder()
        .with_response_handler(move |ctx: &ExecutionContext<'_>, response: &Value| {
            sink.lock().push(format!("{} -> {response}", ctx.execution().path()));
        })
        .build();
    dispatcher.register_function(&tagged("ping", "pong")).unwrap();
    dispatcher
        .register_function(&CommandFunction::new("quiet", |_ctx| Ok(Value::Nil)))
        .unwrap();

    run(&dispatcher, "ping").unwrap();
    run(&dispatcher, "quiet").unwrap();
    assert_eq!(*seen.lock(), vec!["ping -> pong"]);
}

#[test]
fn action_errors_reach_the_exception_handler() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let dispatcher = Dispatcher::builder()
        .with_exception_handler(move |_ctx: &ExecutionContext<'_>, _error: &ActionError| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    dispatcher
        .register_function(&CommandFunction::new("explode", |_ctx| {
            Err(ActionError::message("boom"))
        }))
        .unwrap();

    let err = dispatcher.dispatch(&Player(1), "explode").unwrap_err();
    assert!(matches!(err, DispatchError::Action { ref path, .. } if path == "explode"));
    assert!(err.to_string().contains("boom"));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn dispatch_sees_whole_snapshots_while_registry_changes() {
    let dispatcher = Dispatcher::new();
    dispatcher.register_function(&tagged("ping", "pong")).unwrap();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..3 {
            scope.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    assert_eq!(run(&dispatcher, "ping").unwrap(), Value::string("pong"));
                    match run(&dispatcher, "flip") {
                        Ok(value) => assert_eq!(value, Value::string("flipped")),
                        Err(DispatchError::UnknownCommand(_)) => {}
                        Err(other) => panic!("inconsistent registry state: {other}"),
                    }
                    let commands = dispatcher.commands();
                    assert!(commands.iter().any(|e| e.path() == "ping"));
                    assert!(commands.len() <= 2, "saw {} commands", commands.len());
                }
            });
        }

        scope.spawn(|| {
            for _ in 0..200 {
                dispatcher.register_function(&tagged("flip", "flipped")).unwrap();
                std::thread::yield_now();
                assert_eq!(dispatcher.unregister_if(|e| e.path() == "flip").len(), 1);
            }
            dispatcher.register_function(&tagged("flip", "flipped")).unwrap();
            done.store(true, Ordering::SeqCst);
        });
    });

    assert_eq!(run(&dispatcher, "flip").unwrap(), Value::string("flipped"));
    assert_eq!(dispatcher.commands().len(), 2);
}

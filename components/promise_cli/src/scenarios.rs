//! Named promise scenarios.
//!
//! Each scenario builds a promise on a fresh event loop; slow inputs are
//! settled by virtual timers so runs are deterministic.

use async_runtime::{EventLoop, Promise, Realm, Task};
use core_types::{Function, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A named, self-contained promise program.
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line summary shown by `--list`
    pub description: &'static str,
    /// Builds the promise whose outcome is reported
    pub build: fn(&mut EventLoop) -> Promise,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

/// Every scenario known to the CLI, in listing order.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "numeric-chain",
        description: "resolve(11).then(r => r - 1).then(r => r - 1)",
        build: numeric_chain,
    },
    Scenario {
        name: "all",
        description: "all([p50 -> 1, null, p100 -> 2, resolve(3)])",
        build: all,
    },
    Scenario {
        name: "race",
        description: "race([p50 -> 1, true, p100 -> 2, resolve(3)])",
        build: race,
    },
    Scenario {
        name: "all-settled",
        description: "allSettled([resolve(1), reject(2), p50 -> 3])",
        build: all_settled,
    },
    Scenario {
        name: "thenable",
        description: "resolve with a foreign thenable calling res(111)",
        build: thenable,
    },
    Scenario {
        name: "double-call",
        description: "foreign thenable calling res(v), res(v2), rej(r)",
        build: double_call,
    },
    Scenario {
        name: "cycle",
        description: "a handler returning its own child promise",
        build: cycle,
    },
    Scenario {
        name: "finally",
        description: "reject(boom).finally(cleanup)",
        build: finally,
    },
];

/// Looks up a scenario by name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name == name)
}

/// A promise settled by a timer after `delay_ms` of virtual time.
fn after(event_loop: &mut EventLoop, delay_ms: u64, value: Value) -> Promise {
    let deferred = event_loop.realm().deferred();
    let promise = deferred.promise().clone();
    event_loop.set_timeout(
        delay_ms,
        Task::new(move || {
            deferred.resolve(value);
            Ok(Value::Undefined)
        }),
    );
    promise
}

fn minus_one() -> Function {
    Function::unary(|value| match value {
        Value::Smi(n) => Ok(n
            .checked_sub(1)
            .map(Value::Smi)
            .unwrap_or_else(|| Value::Double(f64::from(n) - 1.0))),
        Value::Double(n) => Ok(Value::Double(n - 1.0)),
        other => Err(other),
    })
}

fn thenable_from(then: Function) -> Value {
    Value::object([("then", Value::Function(then))])
}

/// Calls the `index`-th callback argument of a thenable's `then`.
fn call_arg(args: &[Value], index: usize, value: Value) -> Result<Value, Value> {
    match args.get(index).and_then(Value::as_function) {
        Some(callback) => callback.call(vec![value]),
        None => Ok(Value::Undefined),
    }
}

fn numeric_chain(event_loop: &mut EventLoop) -> Promise {
    event_loop
        .realm()
        .resolve(Value::Smi(11))
        .then(Some(minus_one()), None)
        .then(Some(minus_one()), None)
}

fn inputs(event_loop: &mut EventLoop, realm: &Realm, plain: Value) -> Value {
    let p50 = after(event_loop, 50, Value::Smi(1));
    let p100 = after(event_loop, 100, Value::Smi(2));
    Value::Array(vec![
        p50.into(),
        plain,
        p100.into(),
        realm.resolve(Value::Smi(3)).into(),
    ])
}

fn all(event_loop: &mut EventLoop) -> Promise {
    let realm = event_loop.realm();
    let items = inputs(event_loop, &realm, Value::Null);
    realm.all(items)
}

fn race(event_loop: &mut EventLoop) -> Promise {
    let realm = event_loop.realm();
    let items = inputs(event_loop, &realm, Value::Boolean(true));
    realm.race(items)
}

fn all_settled(event_loop: &mut EventLoop) -> Promise {
    let realm = event_loop.realm();
    let p50 = after(event_loop, 50, Value::Smi(3));
    realm.all_settled(Value::Array(vec![
        realm.resolve(Value::Smi(1)).into(),
        realm.reject(Value::Smi(2)).into(),
        p50.into(),
    ]))
}

fn thenable(event_loop: &mut EventLoop) -> Promise {
    let then = Function::new(|args| call_arg(&args, 0, Value::Smi(111)));
    event_loop.realm().resolve(thenable_from(then))
}

fn double_call(event_loop: &mut EventLoop) -> Promise {
    let then = Function::new(|args| {
        call_arg(&args, 0, Value::from("v"))?;
        call_arg(&args, 0, Value::from("v2"))?;
        call_arg(&args, 1, Value::from("r"))
    });
    event_loop.realm().resolve(thenable_from(then))
}

fn cycle(event_loop: &mut EventLoop) -> Promise {
    let slot: Rc<RefCell<Option<Promise>>> = Rc::default();
    let handler_slot = slot.clone();
    let child = event_loop.realm().resolve(Value::Smi(1)).then(
        Some(Function::unary(move |_| {
            let child = handler_slot.borrow_mut().take();
            Ok(child.map(Value::from).unwrap_or(Value::Undefined))
        })),
        None,
    );
    *slot.borrow_mut() = Some(child.clone());
    child
}

fn finally(event_loop: &mut EventLoop) -> Promise {
    event_loop
        .realm()
        .reject(Value::from("boom"))
        .finally(Some(Function::new(|_| Ok(Value::from("cleanup result")))))
}

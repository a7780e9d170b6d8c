//! Chains mixing `then`, `catch` and `finally`, including handlers that
//! register further chains on an already settled promise.

use core_types::{Function, Value};
use integration_tests::harness::{Harness, returning};

fn minus_one() -> Function {
    Function::unary(|value| match value {
        Value::Smi(n) => Ok(Value::Smi(n - 1)),
        other => Err(other),
    })
}

/// A handler returning `realm.reject(reason)`.
fn rejecting(h: &Harness, reason: i32) -> Function {
    let realm = h.realm.clone();
    Function::unary(move |_| Ok(realm.reject(Value::Smi(reason)).into()))
}

/// Logs its argument under `label`, then returns `next`.
fn logging_then(h: &Harness, label: &str, next: Function) -> Function {
    let log = h.fake(label);
    Function::unary(move |value| {
        log.call(vec![value.clone()])?;
        next.call(vec![value])
    })
}

#[test]
fn test_resolve_numeric_chain() {
    let mut h = Harness::new();
    let result = h
        .realm
        .resolve(Value::Smi(11))
        .then(Some(logging_then(&h, "a", minus_one())), None)
        .then(Some(logging_then(&h, "b", minus_one())), None);
    h.run();
    assert_eq!(h.log(), vec!["a:11", "b:10"]);
    assert_eq!(result.value(), Some(Value::Smi(9)));
}

#[test]
fn test_reject_recovers_into_chain() {
    let mut h = Harness::new();
    let result = h
        .realm
        .reject(Value::Smi(11))
        .then(None, Some(minus_one()))
        .then(Some(minus_one()), None);
    h.run();
    assert_eq!(result.value(), Some(Value::Smi(9)));
}

#[test]
fn test_catch_skips_fulfillment_handlers() {
    let mut h = Harness::new();
    let realm = h.realm.clone();
    let promise = h.realm.reject(Value::Smi(1));

    promise
        .catch(Some(logging_then(&h, "cb", rejecting(&h, 2))))
        .then(None, Some(logging_then(&h, "cb2", returning(realm.resolve(Value::Smi(3)).into()))))
        .then(Some(rejecting(&h, 4)), None)
        .then(Some(logging_then(&h, "cb3", returning(Value::Smi(5)))), None)
        .catch(Some(h.fake("cb4")))
        .then(Some(h.fake("cb5")), None);
    h.run();

    assert!(h.called_with("cb", "1"));
    assert!(h.called_with("cb2", "2"));
    assert!(!h.called("cb3"));
    assert!(h.called_with("cb4", "4"));
    assert!(h.called("cb5"));
}

#[test]
fn test_nested_catch_on_settled_promise() {
    let mut h = Harness::new();
    let promise = h.realm.reject(Value::Smi(1));

    let nested = {
        let promise = promise.clone();
        let cb2 = h.fake("cb2");
        let cb3 = h.fake("cb3");
        let reject4 = rejecting(&h, 4);
        let cb4 = h.fake("cb4");
        let cb5 = h.fake("cb5");
        let cb6 = h.fake("cb6");
        Function::unary(move |_| {
            promise
                .then(None, Some(cb2.clone()))
                .then(Some(cb3.clone()), None)
                .then(Some(reject4.clone()), None)
                .then(Some(cb4.clone()), None)
                .catch(Some(cb5.clone()))
                .then(Some(cb6.clone()), None);
            Ok(Value::Undefined)
        })
    };
    promise.catch(Some(logging_then(&h, "cb", nested)));
    h.run();

    assert!(h.called_with("cb", "1"));
    assert!(h.called_with("cb2", "1"));
    assert!(h.called("cb3"));
    assert!(!h.called("cb4"));
    assert!(h.called_with("cb5", "4"));
    assert!(h.called("cb6"));
}

#[test]
fn test_doubly_nested_catch() {
    let mut h = Harness::new();
    let promise = h.realm.reject(Value::Smi(1));

    let innermost = {
        let promise = promise.clone();
        let cb9 = h.fake("cb9");
        let cb10 = h.fake("cb10");
        let reject4 = rejecting(&h, 4);
        let cb11 = h.fake("cb11");
        let cb12 = h.fake("cb12");
        let cb13 = h.fake("cb13");
        Function::unary(move |_| {
            promise
                .then(None, Some(cb9.clone()))
                .then(Some(cb10.clone()), None)
                .then(Some(reject4.clone()), None)
                .then(Some(cb11.clone()), Some(cb12.clone()))
                .catch(Some(cb13.clone()));
            Ok(Value::Undefined)
        })
    };
    let nested = {
        let promise = promise.clone();
        let cb2 = h.fake("cb2");
        let cb3 = h.fake("cb3");
        let reject4 = rejecting(&h, 4);
        let cb41 = h.fake("cb41");
        let cb4 = h.fake("cb4");
        let cb5 = h.fake("cb5");
        let cb6 = h.fake("cb6");
        let reject8 = rejecting(&h, 8);
        let cb7 = h.fake("cb7");
        let cb8 = h.fake("cb8");
        Function::unary(move |_| {
            promise
                .then(None, Some(cb2.clone()))
                .then(Some(cb3.clone()), None)
                .then(Some(reject4.clone()), None)
                .then(Some(cb41.clone()), Some(cb4.clone()))
                .catch(Some(cb5.clone()))
                .then(Some(cb6.clone()), None)
                .then(Some(reject8.clone()), None)
                .then(Some(cb7.clone()), Some(cb8.clone()))
                .then(Some(innermost.clone()), None);
            Ok(Value::Undefined)
        })
    };
    promise.catch(Some(logging_then(&h, "cb", nested)));
    h.run();

    assert!(h.called_with("cb", "1"));
    assert!(h.called_with("cb2", "1"));
    assert!(h.called("cb3"));
    assert!(h.called_with("cb4", "4"));
    assert!(!h.called("cb41"));
    assert!(!h.called("cb5"));
    assert!(h.called("cb6"));
    assert!(!h.called("cb7"));
    assert!(h.called_with("cb8", "8"));
    assert!(h.called_with("cb9", "1"));
    assert!(h.called("cb10"));
    assert!(!h.called("cb11"));
    assert!(h.called("cb12"));
    assert!(!h.called("cb13"));
}

#[test]
fn test_finally_runs_on_both_outcomes() {
    let mut h = Harness::new();
    let fulfilled = h.realm.resolve(Value::Smi(1)).finally(Some(h.fake("f1")));
    let rejected = h.realm.reject(Value::Smi(2)).finally(Some(h.fake("f2")));
    h.run();

    assert!(h.called("f1"));
    assert!(h.called("f2"));
    assert_eq!(fulfilled.value(), Some(Value::Smi(1)));
    assert_eq!(rejected.reason(), Some(Value::Smi(2)));
}

#[test]
fn test_finally_rejection_replaces_outcome() {
    let mut h = Harness::new();
    let result = h
        .realm
        .resolve(Value::Smi(1))
        .finally(Some(rejecting(&h, 9)));
    h.run();
    assert_eq!(result.reason(), Some(Value::Smi(9)));
}

//! Promises/A+ conformance: states (2.1) and the `then` method (2.2).

use async_runtime::{Promise, PromiseState};
use core_types::{ErrorKind, Function, Value};
use integration_tests::harness::{returning, throwing, Harness};
use std::cell::RefCell;
use std::rc::Rc;

fn assert_type_error(promise: &Promise) {
    match promise.reason() {
        Some(Value::Error(err)) => assert_eq!(err.kind, ErrorKind::TypeError),
        other => panic!("expected TypeError, got {:?}", other),
    }
}

#[test]
fn test_construct_requires_function() {
    let h = Harness::new();
    assert!(h.realm.construct(Value::from("not a function")).is_err());
    assert!(h.realm.construct(Value::Undefined).is_err());
    assert!(h
        .realm
        .construct(Value::Function(Function::new(|_| Ok(Value::Undefined))))
        .is_ok());
}

#[test]
fn test_2_1_2_fulfilled_is_final() {
    let mut h = Harness::new();
    let promise = h.realm.promise(|functions| {
        functions.resolve(Value::from("hi"));
        functions.reject(Value::from("no"));
        functions.resolve(Value::from("again"));
        Ok(())
    });
    h.run();
    assert_eq!(promise.state(), PromiseState::Fulfilled);
    assert_eq!(promise.value(), Some(Value::from("hi")));
}

#[test]
fn test_2_1_3_rejected_is_final() {
    let mut h = Harness::new();
    let promise = h.realm.promise(|functions| {
        functions.reject(Value::from("no"));
        functions.resolve(Value::from("hi"));
        Ok(())
    });
    h.run();
    assert_eq!(promise.state(), PromiseState::Rejected);
    assert_eq!(promise.reason(), Some(Value::from("no")));
}

#[test]
fn test_2_2_1_non_function_handlers_are_ignored() {
    let mut h = Harness::new();
    let fulfilled = h
        .realm
        .resolve(Value::from("hi"))
        .then_values(Value::Boolean(false), Value::Null)
        .then(Some(h.fake("value")), None);
    let rejected = h
        .realm
        .reject(Value::from("no"))
        .then_values(Value::Null, Value::Smi(1))
        .then(None, Some(h.fake("reason")));
    h.run();

    assert!(h.called_with("value", "hi"));
    assert!(h.called_with("reason", "no"));
    assert_eq!(fulfilled.state(), PromiseState::Fulfilled);
    assert_eq!(rejected.state(), PromiseState::Fulfilled);
}

#[test]
fn test_2_2_2_on_fulfilled_called_once_after_fulfillment() {
    let mut h = Harness::new();
    let deferred = h.realm.deferred();
    deferred.promise().then(Some(h.fake("fulfilled")), None);

    h.run();
    assert!(!h.called("fulfilled"));

    deferred.resolve(Value::from("hi"));
    deferred.resolve(Value::from("again"));
    h.run();
    assert_eq!(h.log(), vec!["fulfilled:hi"]);
}

#[test]
fn test_2_2_3_on_rejected_called_once_after_rejection() {
    let mut h = Harness::new();
    let deferred = h.realm.deferred();
    deferred.promise().then(None, Some(h.fake("rejected")));

    deferred.reject(Value::from("no"));
    deferred.reject(Value::from("again"));
    h.run();
    assert_eq!(h.log(), vec!["rejected:no"]);
}

#[test]
fn test_2_2_4_handlers_run_after_current_code() {
    let mut h = Harness::new();
    h.realm.resolve(Value::Smi(1)).then(Some(h.fake("handler")), None);
    h.note("sync");
    h.run();
    assert_eq!(h.log(), vec!["sync", "handler:1"]);
}

#[test]
fn test_2_2_4_1_nested_then_runs_after_outer_handlers() {
    let mut h = Harness::new();
    let promise = h.realm.resolve(Value::Smi(1));

    let log = h.log_handle();
    let inner = h.fake("c");
    let nested_promise = promise.clone();
    promise.then(
        Some(Function::unary(move |_| {
            log.borrow_mut().push("a".to_string());
            nested_promise.then(Some(inner.clone()), None);
            Ok(Value::Undefined)
        })),
        None,
    );
    promise.then(Some(h.fake("b")), None);

    h.run();
    assert_eq!(h.log(), vec!["a", "b:1", "c:1"]);
}

#[test]
fn test_2_2_4_2_nested_then_on_rejection() {
    let mut h = Harness::new();
    let promise = h.realm.reject(Value::Smi(1));

    let log = h.log_handle();
    let inner = h.fake("c");
    let nested_promise = promise.clone();
    promise.then(
        None,
        Some(Function::unary(move |_| {
            log.borrow_mut().push("a".to_string());
            nested_promise.then(None, Some(inner.clone()));
            Ok(Value::Undefined)
        })),
    );
    promise.then(None, Some(h.fake("b")));

    h.run();
    assert_eq!(h.log(), vec!["a", "b:1", "c:1"]);
}

#[test]
fn test_2_2_6_fulfillment_handlers_in_registration_order() {
    let mut h = Harness::new();
    let deferred = h.realm.deferred();
    for label in ["r1", "r2", "r3"] {
        deferred.promise().then(Some(h.fake(label)), Some(h.fake("never")));
    }
    deferred.resolve(Value::from("hi"));
    h.run();
    assert_eq!(h.log(), vec!["r1:hi", "r2:hi", "r3:hi"]);
}

#[test]
fn test_2_2_6_rejection_handlers_in_registration_order() {
    let mut h = Harness::new();
    let deferred = h.realm.deferred();
    for label in ["r1", "r2", "r3"] {
        deferred.promise().then(Some(h.fake("never")), Some(h.fake(label)));
    }
    deferred.reject(Value::from("no"));
    h.run();
    assert_eq!(h.log(), vec!["r1:no", "r2:no", "r3:no"]);
}

#[test]
fn test_2_2_7_then_returns_new_promise() {
    let h = Harness::new();
    let promise = h.realm.resolve(Value::Undefined);
    let promise2 = promise.then(None, None);
    assert!(!promise2.ptr_eq(&promise));
    assert!(promise2.is_pending());
}

#[test]
fn test_2_2_7_1_handler_values_fulfill_promise2() {
    let mut h = Harness::new();
    let from_success = h
        .realm
        .resolve(Value::Undefined)
        .then(Some(returning(Value::from("success"))), None);
    let from_fail = h
        .realm
        .reject(Value::Undefined)
        .then(None, Some(returning(Value::from("fail"))));
    h.run();
    assert_eq!(from_success.value(), Some(Value::from("success")));
    assert_eq!(from_fail.value(), Some(Value::from("fail")));
}

#[test]
fn test_2_2_7_1_2_handler_promises_are_adopted() {
    let mut h = Harness::new();
    let ok = h.realm.resolve(Value::from("ok"));
    let bad = h.realm.reject(Value::from("bad"));

    let success_ok = h.realm.resolve(Value::Undefined).then(Some(returning(ok.clone().into())), None);
    let success_bad = h.realm.resolve(Value::Undefined).then(Some(returning(bad.clone().into())), None);
    let fail_ok = h.realm.reject(Value::Undefined).then(None, Some(returning(ok.into())));
    let fail_bad = h.realm.reject(Value::Undefined).then(None, Some(returning(bad.into())));
    h.run();

    assert_eq!(success_ok.value(), Some(Value::from("ok")));
    assert_eq!(success_bad.reason(), Some(Value::from("bad")));
    assert_eq!(fail_ok.value(), Some(Value::from("ok")));
    assert_eq!(fail_bad.reason(), Some(Value::from("bad")));
}

#[test]
fn test_2_2_7_2_thrown_errors_reject_promise2() {
    let mut h = Harness::new();
    let from_success = h
        .realm
        .resolve(Value::Undefined)
        .then(Some(throwing(Value::from("e1"))), None);
    let from_fail = h
        .realm
        .reject(Value::Undefined)
        .then(None, Some(throwing(Value::from("e2"))));
    h.run();
    assert_eq!(from_success.reason(), Some(Value::from("e1")));
    assert_eq!(from_fail.reason(), Some(Value::from("e2")));
}

#[test]
fn test_2_2_7_3_missing_handler_passes_value() {
    let mut h = Harness::new();
    let promise2 = h.realm.resolve(Value::from("hi")).then(None, None);
    promise2.then(Some(h.fake("res")), None);
    h.run();
    assert!(h.called_with("res", "hi"));
}

fn self_returning(fulfill: bool) -> Promise {
    let mut h = Harness::new();
    let slot: Rc<RefCell<Option<Promise>>> = Rc::default();
    let handler_slot = slot.clone();
    let handler = Function::unary(move |_| {
        let own = handler_slot.borrow_mut().take();
        Ok(own.map(Value::from).unwrap_or(Value::Undefined))
    });
    let p = if fulfill {
        h.realm.resolve(Value::Undefined).then(Some(handler), None)
    } else {
        h.realm.reject(Value::Undefined).then(None, Some(handler))
    };
    *slot.borrow_mut() = Some(p.clone());
    h.run();
    p
}

#[test]
fn test_2_3_1_returning_own_promise_from_on_fulfilled() {
    assert_type_error(&self_returning(true));
}

#[test]
fn test_2_3_1_returning_own_promise_from_on_rejected() {
    assert_type_error(&self_returning(false));
}

#[test]
fn test_executor_error_rejects() {
    let mut h = Harness::new();
    let promise = h.realm.promise(|_| Err(Value::from("executor failed")));
    promise.then(None, Some(h.fake("caught")));
    h.run();
    assert!(h.called_with("caught", "executor failed"));
}

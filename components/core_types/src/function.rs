//! Callable values.

use crate::Value;
use std::fmt;
use std::rc::Rc;

type Callback = dyn Fn(Vec<Value>) -> Result<Value, Value>;

/// A function that can be called with arguments and returns a Result.
///
/// `Ok` carries the return value, `Err` carries a thrown value. Functions are
/// cheap to clone: clones share the same underlying closure, and identity is
/// preserved (see [`Function::ptr_eq`]).
///
/// # Examples
///
/// ```
/// use core_types::{Function, Value};
///
/// let add_one = Function::unary(|v| match v {
///     Value::Smi(n) => Ok(Value::Smi(n + 1)),
///     other => Err(other),
/// });
///
/// assert_eq!(add_one.call(vec![Value::Smi(1)]), Ok(Value::Smi(2)));
/// assert_eq!(add_one.call(vec![Value::Null]), Err(Value::Null));
/// ```
#[derive(Clone)]
pub struct Function {
    name: Option<Rc<str>>,
    callback: Rc<Callback>,
}

impl Function {
    /// Creates a new Function from a closure receiving all arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Value> + 'static,
    {
        Self {
            name: None,
            callback: Rc::new(f),
        }
    }

    /// Creates a Function that only looks at its first argument.
    ///
    /// A missing argument is passed as `Value::Undefined`.
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, Value> + 'static,
    {
        Self::new(move |args| f(args.into_iter().next().unwrap_or(Value::Undefined)))
    }

    /// Attaches a name, used for debugging output.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(Rc::from(name));
        self
    }

    /// Returns the function name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Calls the function with the given arguments.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, Value> {
        (self.callback)(args)
    }

    /// Returns true if both handles refer to the same closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Function {{ {} }}", name),
            None => write!(f, "Function {{ ... }}"),
        }
    }
}

//! Host objects.
//!
//! Values that live outside the plain data model (promises from the runtime,
//! foreign thenables supplied by embedders) are stored as trait objects. The
//! only capability the promise machinery asks of them is `then`.

use crate::{Function, Value};
use std::any::Any;

/// An object provided by the host.
///
/// # Examples
///
/// ```
/// use core_types::{Function, HostObject, Value};
/// use std::any::Any;
/// use std::rc::Rc;
///
/// struct Eventually(i32);
///
/// impl HostObject for Eventually {
///     fn class_name(&self) -> &str {
///         "Eventually"
///     }
///
///     fn then_capability(&self) -> Result<Option<Function>, Value> {
///         let value = self.0;
///         Ok(Some(Function::new(move |args| {
///             if let Some(Value::Function(resolve)) = args.first() {
///                 resolve.call(vec![Value::Smi(value)])?;
///             }
///             Ok(Value::Undefined)
///         })))
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let value = Value::Host(Rc::new(Eventually(111)));
/// assert!(value.then_capability().unwrap().is_some());
/// ```
pub trait HostObject {
    /// Name used in debug and display output (`[object Name]`).
    fn class_name(&self) -> &str;

    /// Looks up a callable `then` member.
    ///
    /// `Ok(None)` means the object is not thenable. `Err` carries the value
    /// thrown while reading the member.
    fn then_capability(&self) -> Result<Option<Function>, Value> {
        Ok(None)
    }

    /// Allows the runtime to recognise its own object types.
    fn as_any(&self) -> &dyn Any;
}

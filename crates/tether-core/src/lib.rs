//! tether core crate.
//!
//! The contracts the binding engine consumes, plus small reference
//! implementations of each:
//!
//! - [`Value`]: the dynamic value that crosses every member boundary.
//! - [`Object`]: named-member access with an optional change signal
//!   ([`Record`] is the map-backed implementation).
//! - [`Command`]: an invocable action with enablement ([`ActionCommand`]).
//! - [`ObservableList`]: a model collection reporting structural edits.
//! - [`Signal`]: the notification primitive all of the above use.
//!
//! Everything is single-threaded (`Rc`/`RefCell`). Notifications are
//! synchronous.

pub mod command;
pub mod list;
pub mod logging;
pub mod object;
pub mod signal;
pub mod value;

pub use command::{ActionCommand, Command, CommandRef};
pub use list::{ListChange, ListRef, ObservableList, OutOfBounds};
pub use logging::{init_logging, LoggingConfig};
pub use object::{AccessError, Object, ObjectRef, Record};
pub use signal::{Signal, Subscription};
pub use value::{same_rc, Value, ValueKind};

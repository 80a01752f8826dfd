//! Named-member access on models, views and list items.
//!
//! [`Object`] is the property-accessor contract the binding engine consumes.
//! It never looks members up any other way. Hosts implement it however they
//! like (hand-written match, generated code, a registry); [`Record`] is the
//! map-backed implementation shipped here.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::signal::Signal;
use crate::value::{Value, ValueKind};

// ── AccessError ───────────────────────────────────────────────────────────

/// Failure reading or writing a member.
///
/// A missing member and an incompatible value are distinct variants so the
/// engine can report configuration mistakes separately from runtime ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("`{type_name}` has no member `{member}`")]
    NoSuchMember { type_name: String, member: String },

    #[error("member `{member}` of `{type_name}` expects {expected}, got {found}")]
    TypeMismatch {
        type_name: String,
        member: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("member `{member}` of `{type_name}` is read-only")]
    ReadOnly { type_name: String, member: String },
}

impl AccessError {
    pub fn no_such_member(type_name: &str, member: &str) -> Self {
        AccessError::NoSuchMember { type_name: type_name.to_string(), member: member.to_string() }
    }

    pub fn read_only(type_name: &str, member: &str) -> Self {
        AccessError::ReadOnly { type_name: type_name.to_string(), member: member.to_string() }
    }
}

// ── Object ────────────────────────────────────────────────────────────────

/// Something with named, dynamically typed members.
///
/// Mutation goes through `&self`: objects are shared behind `Rc` and use
/// interior mutability, matching the single-threaded binding model.
pub trait Object {
    /// Type name used in error messages and default-member lookup.
    fn type_name(&self) -> &str;

    fn get(&self, member: &str) -> Result<Value, AccessError>;

    fn set(&self, member: &str, value: Value) -> Result<(), AccessError>;

    fn has_member(&self, member: &str) -> bool {
        self.get(member).is_ok()
    }

    /// `true` when `member` currently holds a list.
    fn is_list_typed(&self, member: &str) -> bool {
        matches!(self.get(member), Ok(Value::List(_)))
    }

    /// Fires with a member name after that member's value changes.
    ///
    /// Objects that never change (or never report it) return `None`.
    fn changed(&self) -> Option<&Signal<String>> {
        None
    }
}

pub type ObjectRef = Rc<dyn Object>;

// ── Record ────────────────────────────────────────────────────────────────

/// A map-backed [`Object`] with change notification.
///
/// Members are declared up front (builder [`Record::with`] or
/// [`Record::define`]); `set` on an undeclared member fails with
/// [`AccessError::NoSuchMember`]. A member's kind is fixed by its first
/// non-null value, except that ints are accepted into float members.
///
/// ```rust
/// use tether_core::{Object, Record, Value};
///
/// let model = Record::new("Lot").with("Title", "Clock").with("Bid", 10);
/// model.set("Bid", Value::Int(12)).unwrap();
/// assert_eq!(model.get("Bid").unwrap(), Value::Int(12));
/// assert!(model.set("Bid", Value::from("twelve")).is_err());
/// ```
pub struct Record {
    type_name: String,
    members: RefCell<BTreeMap<String, Value>>,
    changed: Signal<String>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: RefCell::new(BTreeMap::new()),
            changed: Signal::new(),
        }
    }

    /// Builder form of [`define`](Self::define).
    pub fn with(self, member: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.borrow_mut().insert(member.into(), value.into());
        self
    }

    /// Declare (or redeclare) a member without type checks or notification.
    pub fn define(&self, member: impl Into<String>, value: impl Into<Value>) {
        self.members.borrow_mut().insert(member.into(), value.into());
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.borrow().keys().cloned().collect()
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(self)
    }

    fn coerce(&self, member: &str, current: &Value, value: Value) -> Result<Value, AccessError> {
        match (current, value) {
            (Value::Null, v) | (_, v @ Value::Null) => Ok(v),
            (Value::Float(_), Value::Int(i)) => Ok(Value::Float(i as f64)),
            (cur, v) if cur.kind() == v.kind() => Ok(v),
            (cur, v) => Err(AccessError::TypeMismatch {
                type_name: self.type_name.clone(),
                member: member.to_string(),
                expected: cur.kind(),
                found: v.kind(),
            }),
        }
    }
}

impl Object for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, member: &str) -> Result<Value, AccessError> {
        self.members
            .borrow()
            .get(member)
            .cloned()
            .ok_or_else(|| AccessError::no_such_member(&self.type_name, member))
    }

    fn set(&self, member: &str, value: Value) -> Result<(), AccessError> {
        {
            let mut members = self.members.borrow_mut();
            let Some(slot) = members.get_mut(member) else {
                return Err(AccessError::no_such_member(&self.type_name, member));
            };
            let value = self.coerce(member, slot, value)?;
            if *slot == value {
                return Ok(());
            }
            *slot = value;
        }
        self.changed.emit(&member.to_string());
        Ok(())
    }

    fn has_member(&self, member: &str) -> bool {
        self.members.borrow().contains_key(member)
    }

    fn changed(&self) -> Option<&Signal<String>> {
        Some(&self.changed)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type_name", &self.type_name)
            .field("members", &self.members.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn missing_member_is_distinct_from_mismatch() {
        let r = Record::new("Lot").with("Bid", 1);
        assert!(matches!(r.get("Ask"), Err(AccessError::NoSuchMember { .. })));
        assert!(matches!(r.set("Ask", Value::Int(1)), Err(AccessError::NoSuchMember { .. })));
        assert!(matches!(
            r.set("Bid", Value::from("x")),
            Err(AccessError::TypeMismatch { expected: ValueKind::Int, found: ValueKind::Str, .. })
        ));
    }

    #[test]
    fn set_notifies_only_on_change() {
        let r = Record::new("Lot").with("Bid", 1);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = r.changed().unwrap().subscribe(move |m| {
            assert_eq!(m, "Bid");
            h.set(h.get() + 1);
        });
        r.set("Bid", Value::Int(1)).unwrap();
        r.set("Bid", Value::Int(2)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn null_members_accept_any_kind() {
        let r = Record::new("Lot").with("Winner", Value::Null);
        r.set("Winner", Value::from("ada")).unwrap();
        r.set("Winner", Value::Null).unwrap();
        assert!(r.get("Winner").unwrap().is_null());
    }

    #[test]
    fn int_into_float_member() {
        let r = Record::new("Lot").with("Price", 1.5);
        r.set("Price", Value::Int(2)).unwrap();
        assert_eq!(r.get("Price").unwrap(), Value::Float(2.0));
    }

    #[test]
    fn list_typed_members() {
        let r = Record::new("Auction")
            .with("Lots", crate::list::ObservableList::new_ref())
            .with("Title", "x");
        assert!(r.is_list_typed("Lots"));
        assert!(!r.is_list_typed("Title"));
        assert!(!r.is_list_typed("Missing"));
    }
}

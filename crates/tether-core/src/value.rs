use std::fmt;
use std::rc::Rc;

use crate::command::CommandRef;
use crate::list::ListRef;
use crate::object::ObjectRef;

// ── ValueKind ─────────────────────────────────────────────────────────────

/// The variant of a [`Value`], without its payload. Used in type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Command,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null    => "null",
            ValueKind::Bool    => "bool",
            ValueKind::Int     => "int",
            ValueKind::Float   => "float",
            ValueKind::Str     => "string",
            ValueKind::List    => "list",
            ValueKind::Command => "command",
            ValueKind::Object  => "object",
        })
    }
}

// ── Value ─────────────────────────────────────────────────────────────────

/// A dynamically typed member value.
///
/// Scalars compare by value; lists, commands and objects compare by
/// identity (same allocation).
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListRef),
    Command(CommandRef),
    Object(ObjectRef),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null       => ValueKind::Null,
            Value::Bool(_)    => ValueKind::Bool,
            Value::Int(_)     => ValueKind::Int,
            Value::Float(_)   => ValueKind::Float,
            Value::Str(_)     => ValueKind::Str,
            Value::List(_)    => ValueKind::List,
            Value::Command(_) => ValueKind::Command,
            Value::Object(_)  => ValueKind::Object,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Ints widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandRef> {
        match self {
            Value::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// Compare two `Rc`s by allocation, ignoring trait-object metadata.
#[inline]
pub fn same_rc<T: ?Sized>(a: &Rc<T>, b: &Rc<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null)             => true,
            (Value::Bool(a), Value::Bool(b))       => a == b,
            (Value::Int(a), Value::Int(b))         => a == b,
            (Value::Float(a), Value::Float(b))     => a == b,
            (Value::Str(a), Value::Str(b))         => a == b,
            (Value::List(a), Value::List(b))       => same_rc(a, b),
            (Value::Command(a), Value::Command(b)) => same_rc(a, b),
            (Value::Object(a), Value::Object(b))   => same_rc(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null       => f.write_str("Null"),
            Value::Bool(b)    => write!(f, "Bool({b})"),
            Value::Int(i)     => write!(f, "Int({i})"),
            Value::Float(x)   => write!(f, "Float({x})"),
            Value::Str(s)     => write!(f, "Str({s:?})"),
            Value::List(l)    => write!(f, "List(len={})", l.len()),
            Value::Command(c) => write!(f, "Command(enabled={})", c.is_enabled()),
            Value::Object(o)  => write!(f, "Object({})", o.type_name()),
        }
    }
}

/// Display text as a view would show it: `Null` is empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null       => Ok(()),
            Value::Bool(b)    => write!(f, "{b}"),
            Value::Int(i)     => write!(f, "{i}"),
            Value::Float(x)   => write!(f, "{x}"),
            Value::Str(s)     => f.write_str(s),
            Value::List(l)    => write!(f, "[{} items]", l.len()),
            Value::Command(_) => f.write_str("<command>"),
            Value::Object(o)  => write!(f, "<{}>", o.type_name()),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self { Value::Bool(v) }
}
impl From<i64> for Value {
    fn from(v: i64) -> Self { Value::Int(v) }
}
impl From<i32> for Value {
    fn from(v: i32) -> Self { Value::Int(v.into()) }
}
/// Saturates at `i64::MAX`.
impl From<usize> for Value {
    fn from(v: usize) -> Self { Value::Int(i64::try_from(v).unwrap_or(i64::MAX)) }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float(v) }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self { Value::Str(v.to_string()) }
}
impl From<String> for Value {
    fn from(v: String) -> Self { Value::Str(v) }
}
impl From<ListRef> for Value {
    fn from(v: ListRef) -> Self { Value::List(v) }
}
impl From<CommandRef> for Value {
    fn from(v: CommandRef) -> Self { Value::Command(v) }
}
impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self { Value::Object(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ObservableList;

    #[test]
    fn usize_saturates_into_int() {
        assert_eq!(Value::from(7usize), Value::Int(7));
        assert_eq!(Value::from(usize::MAX), Value::Int(i64::MAX));
    }

    #[test]
    fn scalars_compare_by_value() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_ne!(Value::Int(3), Value::Float(3.0));
        assert_eq!(Value::from("a"), Value::Str("a".into()));
    }

    #[test]
    fn lists_compare_by_identity() {
        let a = ObservableList::new_ref();
        let b = ObservableList::new_ref();
        assert_eq!(Value::List(Rc::clone(&a)), Value::List(Rc::clone(&a)));
        assert_ne!(Value::List(a), Value::List(b));
    }

    #[test]
    fn display_matches_view_text() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn int_widens_to_float() {
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
        assert_eq!(Value::Str("2".into()).as_float(), None);
    }
}

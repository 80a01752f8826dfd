//! The view side of a binding.
//!
//! A view node is an [`Object`] (its members are what bindings write to)
//! that also knows its place in a tree and, optionally, how to render a
//! list. The engine never touches a native toolkit; the host implements
//! these traits over whatever it renders with.

use std::rc::Rc;

use tether_core::{ListChange, Object, Signal, Value};

use crate::list::ListAdapter;

pub type ViewRef = Rc<dyn View>;

/// A node in the host's view tree.
///
/// The [`Object::changed`] signal doubles as the user-edit notification for
/// TwoWay bindings: it must fire with the member name when the user changes
/// a member.
pub trait View: Object {
    fn parent(&self) -> Option<ViewRef>;

    fn children(&self) -> Vec<ViewRef>;

    /// `Some` for nodes that render a list of rows.
    fn list_surface(&self) -> Option<&dyn ListSurface> {
        None
    }

    /// Toggle interactivity. Called when a bound command's enablement changes.
    fn set_enabled(&self, _enabled: bool) {}

    /// Fires with a command parameter when the user activates the view.
    fn activated(&self) -> Option<&Signal<Value>> {
        None
    }
}

/// One rendered row: the item and the template chosen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub template: String,
    pub item: Value,
}

/// The list-rendering half of a view node.
pub trait ListSurface {
    /// Re-render every row.
    fn reload(&self, rows: Vec<Row>);

    /// Incremental update. `rows` is the full row set after `change`.
    fn apply_change(&self, _change: &ListChange, rows: Vec<Row>) {
        self.reload(rows);
    }

    /// The adapter already driving this surface, if any.
    fn adapter(&self) -> Option<ListAdapter>;

    fn attach_adapter(&self, adapter: ListAdapter);

    /// Fires with a row index when the user selects a row.
    fn selected(&self) -> Option<&Signal<usize>> {
        None
    }
}

//! Headless reference views.
//!
//! [`ViewNode`] is a minimal in-memory view tree node: members in a map, a
//! parent/children tree, optional list rows. Hosts with a real toolkit
//! implement [`View`] themselves; `ViewNode` exists for tests, demos and
//! headless use (driving a screen's bindings without rendering it).

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{AccessError, ListChange, Object, Signal, Value};

use crate::list::ListAdapter;
use crate::view::{ListSurface, Row, View, ViewRef};

/// A headless view node.
///
/// Members hold any [`Value`]; a view displays whatever it is given, so
/// there is no kind checking. `set` fails only for undeclared members.
pub struct ViewNode {
    type_name: String,
    members: RefCell<BTreeMap<String, Value>>,
    changed: Signal<String>,
    parent: RefCell<Option<Weak<dyn View>>>,
    children: RefCell<Vec<ViewRef>>,
    enabled: Cell<bool>,
    activated: Signal<Value>,

    is_list: bool,
    rows: RefCell<Vec<Row>>,
    list_changes: RefCell<Vec<ListChange>>,
    reloads: Cell<usize>,
    adapter: RefCell<Option<ListAdapter>>,
    selected: Signal<usize>,
}

impl ViewNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: RefCell::new(BTreeMap::new()),
            changed: Signal::new(),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            enabled: Cell::new(true),
            activated: Signal::new(),
            is_list: false,
            rows: RefCell::new(Vec::new()),
            list_changes: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
            adapter: RefCell::new(None),
            selected: Signal::new(),
        }
    }

    pub fn with(self, member: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.borrow_mut().insert(member.into(), value.into());
        self
    }

    pub fn into_ref(self) -> Rc<ViewNode> {
        Rc::new(self)
    }

    // ── Stock nodes ───────────────────────────────────────────────────────

    pub fn container() -> Self {
        Self::new("Container")
    }

    pub fn label() -> Self {
        Self::new("Label").with("Text", "")
    }

    pub fn text_box() -> Self {
        Self::new("TextBox").with("Text", "")
    }

    pub fn button(title: &str) -> Self {
        Self::new("Button").with("Title", title)
    }

    pub fn toggle() -> Self {
        Self::new("Toggle").with("IsOn", false)
    }

    pub fn slider() -> Self {
        Self::new("Slider").with("Value", 0.0)
    }

    pub fn progress_bar() -> Self {
        Self::new("ProgressBar").with("Progress", 0.0)
    }

    /// A list surface with a `SelectedItem` member.
    pub fn list() -> Self {
        Self { is_list: true, ..Self::new("List").with("SelectedItem", Value::Null) }
    }

    // ── Tree ──────────────────────────────────────────────────────────────

    /// Append `child` under `parent` and return the child.
    pub fn attach(parent: &Rc<ViewNode>, child: Rc<ViewNode>) -> Rc<ViewNode> {
        let weak: Weak<dyn View> = Rc::downgrade(parent) as Weak<ViewNode>;
        *child.parent.borrow_mut() = Some(weak);
        parent.children.borrow_mut().push(Rc::clone(&child) as ViewRef);
        child
    }

    // ── User interaction ──────────────────────────────────────────────────

    /// Simulate the user editing a member.
    pub fn user_input(&self, member: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        self.set(member, value.into())
    }

    /// Simulate the user activating the view (a tap or click).
    ///
    /// Disabled views ignore activation.
    pub fn tap(&self, parameter: Value) {
        if self.enabled.get() {
            self.activated.emit(&parameter);
        }
    }

    /// Simulate the user selecting list row `row`.
    pub fn select_row(&self, row: usize) {
        if self.is_list && row < self.rows.borrow().len() {
            self.selected.emit(&row);
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// Current value of `member`, `Null` when undeclared.
    pub fn value(&self, member: &str) -> Value {
        self.members.borrow().get(member).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.borrow().clone()
    }

    /// Incremental changes applied since creation.
    pub fn list_changes(&self) -> Vec<ListChange> {
        self.list_changes.borrow().clone()
    }

    /// Number of full reloads.
    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }
}

impl Object for ViewNode {
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

impl View for ViewNode {
    fn parent(&self) -> Option<ViewRef> {
        self.parent.borrow().as_ref()?.upgrade()
    }

    fn children(&self) -> Vec<ViewRef> {
        self.children.borrow().clone()
    }

    fn list_surface(&self) -> Option<&dyn ListSurface> {
        if self.is_list { Some(self) } else { None }
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn activated(&self) -> Option<&Signal<Value>> {
        Some(&self.activated)
    }
}

impl ListSurface for ViewNode {
    fn reload(&self, rows: Vec<Row>) {
        *self.rows.borrow_mut() = rows;
        self.reloads.set(self.reloads.get() + 1);
    }

    fn apply_change(&self, change: &ListChange, rows: Vec<Row>) {
        *self.rows.borrow_mut() = rows;
        self.list_changes.borrow_mut().push(*change);
    }

    fn adapter(&self) -> Option<ListAdapter> {
        self.adapter.borrow().clone()
    }

    fn attach_adapter(&self, adapter: ListAdapter) {
        *self.adapter.borrow_mut() = Some(adapter);
    }

    fn selected(&self) -> Option<&Signal<usize>> {
        Some(&self.selected)
    }
}

impl fmt::Debug for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNode")
            .field("type_name", &self.type_name)
            .field("members", &self.members.borrow())
            .field("children", &self.children.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_accept_any_kind() {
        let label = ViewNode::label();
        label.set("Text", Value::Int(42)).unwrap();
        label.set("Text", Value::from("forty-two")).unwrap();
        assert_eq!(label.value("Text"), Value::from("forty-two"));
        assert!(label.set("Colour", Value::Null).is_err());
    }

    #[test]
    fn attach_links_parent_and_child() {
        let root = ViewNode::container().into_ref();
        let child = ViewNode::attach(&root, ViewNode::label().into_ref());
        let parent = child.parent().unwrap();
        assert_eq!(parent.type_name(), "Container");
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn disabled_views_ignore_taps() {
        let button = ViewNode::button("Bid");
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = button.activated.subscribe(move |_| h.set(h.get() + 1));
        button.tap(Value::Null);
        button.set_enabled(false);
        button.tap(Value::Null);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn only_lists_are_surfaces() {
        assert!(ViewNode::list().list_surface().is_some());
        assert!(ViewNode::label().list_surface().is_none());
    }
}

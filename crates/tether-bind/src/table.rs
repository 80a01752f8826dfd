use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tether_core::{same_rc, Object, Subscription};
use tether_markup::{BindingMode, BindingSpec};

use crate::list::ListAdapter;
use crate::view::ViewRef;

// ── Binding ───────────────────────────────────────────────────────────────

/// Where a binding's scalar value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarSource {
    /// A named model member.
    Member(String),
    /// The model object itself (`.`).
    WholeModel,
    /// No scalar value: the binding only drives a list, or names nothing.
    Absent,
}

/// Per-mode handler state. Each variant carries only what its mode needs.
#[derive(Default)]
pub(crate) enum ModeState {
    #[default]
    OneWay,
    TwoWay { view_changed: Option<Subscription> },
    Command {
        enabled_changed: Option<Subscription>,
        activated: Option<Subscription>,
    },
}

impl ModeState {
    pub(crate) fn for_mode(mode: BindingMode) -> Self {
        match mode {
            BindingMode::OneWay => ModeState::OneWay,
            BindingMode::TwoWay => ModeState::TwoWay { view_changed: None },
            BindingMode::Command => ModeState::Command { enabled_changed: None, activated: None },
        }
    }

    /// Drop every subscription this mode holds.
    pub(crate) fn detach(&mut self) {
        match self {
            ModeState::OneWay => {}
            ModeState::TwoWay { view_changed } => *view_changed = None,
            ModeState::Command { enabled_changed, activated } => {
                *enabled_changed = None;
                *activated = None;
            }
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        match self {
            ModeState::OneWay => false,
            ModeState::TwoWay { view_changed } => view_changed.is_some(),
            ModeState::Command { enabled_changed, activated } => {
                enabled_changed.is_some() || activated.is_some()
            }
        }
    }
}

/// One live binding, owned by a [`BindingTable`].
pub(crate) struct Binding {
    pub(crate) id: String,
    pub(crate) spec: BindingSpec,
    pub(crate) view: ViewRef,
    pub(crate) view_member: Option<String>,
    pub(crate) source: ScalarSource,
    pub(crate) list_property: Option<String>,
    pub(crate) adapter: Option<ListAdapter>,
    pub(crate) handlers: RefCell<ModeState>,
    /// Set while the engine itself writes to the view, so the view's change
    /// notification is not written back to the model.
    pub(crate) syncing: Rc<Cell<bool>>,
}

impl Binding {
    pub(crate) fn mode(&self) -> BindingMode {
        self.spec.mode
    }

    pub(crate) fn info(&self) -> BindingInfo {
        BindingInfo {
            id: self.id.clone(),
            mode: self.spec.mode,
            view: Rc::clone(&self.view),
            view_member: self.view_member.clone(),
            source: self.source.clone(),
            list_property: self.list_property.clone(),
            has_list_adapter: self.adapter.is_some(),
            spec: self.spec.clone(),
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        if let Some(adapter) = &self.adapter {
            adapter.remove_handlers();
        }
    }
}

/// Read-only snapshot of a registered binding.
#[derive(Clone)]
pub struct BindingInfo {
    pub id: String,
    pub mode: BindingMode,
    pub view: ViewRef,
    pub view_member: Option<String>,
    pub source: ScalarSource,
    pub list_property: Option<String>,
    pub has_list_adapter: bool,
    /// The parsed binding string.
    pub spec: BindingSpec,
}

impl fmt::Debug for BindingInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingInfo")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("view", &self.view.type_name())
            .field("view_member", &self.view_member)
            .field("source", &self.source)
            .field("list_property", &self.list_property)
            .field("has_list_adapter", &self.has_list_adapter)
            .finish()
    }
}

// ── BindingTable ──────────────────────────────────────────────────────────

/// Id-name → binding, for one engine.
///
/// No two bindings share an id-name or a view node. Both rules are checked
/// by the engine before insertion.
#[derive(Default)]
pub(crate) struct BindingTable {
    bindings: BTreeMap<String, Binding>,
}

impl BindingTable {
    pub(crate) fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.id.clone(), binding);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Binding> {
        self.bindings.remove(id)
    }

    pub(crate) fn take_all(&mut self) -> Vec<Binding> {
        std::mem::take(&mut self.bindings).into_values().collect()
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Binding> {
        self.bindings.get(id)
    }

    pub(crate) fn contains_id(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    pub(crate) fn find_by_view(&self, view: &ViewRef) -> Option<&Binding> {
        self.bindings.values().find(|b| same_rc(&b.view, view))
    }

    pub(crate) fn find_by_list_property(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .values()
            .find(|b| b.list_property.as_deref() == Some(name))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}

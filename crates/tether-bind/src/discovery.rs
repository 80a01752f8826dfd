//! Finding binding strings in a view tree.
//!
//! The host decides where a view's binding string lives (an attribute, a
//! tag, a side table). It exposes that through [`Discovery`]; [`discover`]
//! walks a tree with it, and [`RootIndex`] groups what was found by the
//! topmost ancestor so one engine can own every binding under a root.

use std::fmt;
use std::rc::Rc;

use tether_core::{same_rc, Object};

use crate::view::ViewRef;

/// A view node paired with its raw binding string.
#[derive(Clone)]
pub struct BoundView {
    pub view: ViewRef,
    pub binding: String,
}

impl BoundView {
    pub fn new(view: ViewRef, binding: impl Into<String>) -> Self {
        Self { view, binding: binding.into() }
    }
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("view", &self.view.type_name())
            .field("binding", &self.binding)
            .finish()
    }
}

/// Host-provided lookup of a view's binding string.
pub trait Discovery {
    fn binding_string(&self, view: &ViewRef) -> Option<String>;
}

impl<F> Discovery for F
where
    F: Fn(&ViewRef) -> Option<String>,
{
    fn binding_string(&self, view: &ViewRef) -> Option<String> {
        self(view)
    }
}

/// Reads the binding string from a string member of the view itself.
///
/// `MemberDiscovery::default()` uses the member `Bind`.
#[derive(Debug, Clone)]
pub struct MemberDiscovery {
    key: String,
}

impl MemberDiscovery {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for MemberDiscovery {
    fn default() -> Self {
        Self::new("Bind")
    }
}

impl Discovery for MemberDiscovery {
    fn binding_string(&self, view: &ViewRef) -> Option<String> {
        let value = view.get(&self.key).ok()?;
        value.as_str().filter(|s| !s.trim().is_empty()).map(str::to_string)
    }
}

/// Collect every bound view under `root` (inclusive), in pre-order.
pub fn discover(root: &ViewRef, discovery: &dyn Discovery) -> Vec<BoundView> {
    let mut found = Vec::new();
    let mut stack = vec![Rc::clone(root)];
    while let Some(view) = stack.pop() {
        if let Some(binding) = discovery.binding_string(&view) {
            log::trace!("discovered `{binding}` on {}", view.type_name());
            found.push(BoundView::new(Rc::clone(&view), binding));
        }
        stack.extend(view.children().into_iter().rev());
    }
    found
}

/// Walk parents up to the topmost ancestor.
pub fn root_of(view: &ViewRef) -> ViewRef {
    let mut root = Rc::clone(view);
    while let Some(parent) = root.parent() {
        if same_rc(&parent, &root) {
            break;
        }
        root = parent;
    }
    root
}

// ── RootIndex ─────────────────────────────────────────────────────────────

/// Bound views grouped by root ancestor.
#[derive(Default)]
pub struct RootIndex {
    groups: Vec<(ViewRef, Vec<BoundView>)>,
}

impl RootIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `bound` under its view's root.
    pub fn add(&mut self, bound: BoundView) {
        let root = root_of(&bound.view);
        match self.groups.iter_mut().find(|(r, _)| same_rc(r, &root)) {
            Some((_, views)) => views.push(bound),
            None => self.groups.push((root, vec![bound])),
        }
    }

    pub fn extend(&mut self, bound: impl IntoIterator<Item = BoundView>) {
        for b in bound {
            self.add(b);
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &ViewRef> {
        self.groups.iter().map(|(r, _)| r)
    }

    pub fn bindings_for(&self, root: &ViewRef) -> &[BoundView] {
        self.groups
            .iter()
            .find(|(r, _)| same_rc(r, root))
            .map_or(&[], |(_, v)| v.as_slice())
    }

    /// Remove and return the group for `root`, ready for `add_bindings`.
    pub fn take(&mut self, root: &ViewRef) -> Vec<BoundView> {
        match self.groups.iter().position(|(r, _)| same_rc(r, root)) {
            Some(i) => self.groups.remove(i).1,
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Debug for RootIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.groups.iter().map(|(r, v)| (r.type_name().to_string(), v.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ViewNode;

    fn tree() -> (Rc<ViewNode>, Rc<ViewNode>, Rc<ViewNode>) {
        let root = ViewNode::container().into_ref();
        let panel = ViewNode::attach(&root, ViewNode::container().into_ref());
        let title = ViewNode::attach(&panel, ViewNode::label().with("Bind", "{Binding Title}").into_ref());
        let bid = ViewNode::attach(&root, ViewNode::label().with("Bind", "Bid").into_ref());
        (root, title, bid)
    }

    #[test]
    fn discover_walks_in_pre_order() {
        let (root, _, _) = tree();
        let root: ViewRef = root;
        let found = discover(&root, &MemberDiscovery::default());
        let strings: Vec<_> = found.iter().map(|b| b.binding.as_str()).collect();
        assert_eq!(strings, ["{Binding Title}", "Bid"]);
    }

    #[test]
    fn closures_are_discoveries() {
        let (root, _, _) = tree();
        let root: ViewRef = root;
        let only_labels = |v: &ViewRef| (v.type_name() == "Label").then(|| "X".to_string());
        assert_eq!(discover(&root, &only_labels).len(), 2);
    }

    #[test]
    fn index_groups_by_root() {
        let (root, title, bid) = tree();
        let other = ViewNode::label().into_ref();

        let mut index = RootIndex::new();
        index.add(BoundView::new(title, "Title"));
        index.add(BoundView::new(other.clone(), "Other"));
        index.add(BoundView::new(bid, "Bid"));

        assert_eq!(index.len(), 2);
        let root: ViewRef = root;
        assert_eq!(index.bindings_for(&root).len(), 2);
        let other: ViewRef = other;
        assert_eq!(index.take(&other).len(), 1);
        assert_eq!(index.len(), 1);
    }
}

//! tether binding engine.
//!
//! Connects view nodes to a view model through binding strings:
//!
//! ```text
//! {Binding .Text=DisplayCount}
//! {Binding Name, Mode=TwoWay}
//! {Binding PlaceBid, Mode=Command} {CommandParameter 10}
//! {Binding Lots} {List AddCommand=AddLot, RemoveCommand=RemoveLot, CanEdit=true}
//! ```
//!
//! The host finds the strings on its views ([`Discovery`]), groups them by
//! root ([`RootIndex`]) and hands each group to a [`BindingEngine`], which
//! owns the resulting bindings and keeps both sides in sync.
//!
//! # Quick start
//!
//! ```rust
//! use tether_bind::prelude::*;
//!
//! let model = Record::new("Profile").with("Name", "ada").into_ref();
//! let root = ViewNode::container().into_ref();
//! let name = ViewNode::attach(
//!     &root,
//!     ViewNode::text_box().with("Bind", "{Binding Name, Mode=TwoWay}").into_ref(),
//! );
//!
//! let root: ViewRef = root;
//! let engine = BindingEngine::new(model.clone(), "profile.");
//! engine.add_bindings(discover(&root, &MemberDiscovery::default())).unwrap();
//! engine.update_view().unwrap();
//! assert_eq!(name.value("Text"), Value::from("ada"));
//!
//! name.user_input("Text", "grace").unwrap();
//! assert_eq!(model.get("Name").unwrap(), Value::from("grace"));
//! ```

pub mod defaults;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod list;
pub mod table;
pub mod view;
pub mod views;

pub use defaults::DefaultMembers;
pub use discovery::{discover, root_of, BoundView, Discovery, MemberDiscovery, RootIndex};
pub use engine::BindingEngine;
pub use error::{BindError, ConfigIssue};
pub use hooks::ViewHooks;
pub use list::{ListAdapter, ListConfig, ListEdit, Selection};
pub use table::{BindingInfo, ScalarSource};
pub use view::{ListSurface, Row, View, ViewRef};
pub use views::ViewNode;

/// Everything a host needs to wire a screen.
pub mod prelude {
    pub use crate::{
        discover, BindError, BindingEngine, BoundView, DefaultMembers, Discovery, ListAdapter,
        ListEdit, ListSurface, MemberDiscovery, RootIndex, Row, View, ViewHooks, ViewNode, ViewRef,
    };
    pub use tether_core::{
        ActionCommand, Command, ListChange, Object, ObjectRef, ObservableList, Record, Value,
    };
    pub use tether_markup::BindingMode;
}

//! The synchronization engine.
//!
//! A [`BindingEngine`] owns the binding table for one view model. It turns
//! discovered binding strings into live bindings, pushes model values into
//! views, writes TwoWay edits back, runs commands, and drives list adapters.
//!
//! # Borrowing
//!
//! Engine state lives in one `RefCell`. Refreshes and handler wiring take a
//! shared borrow, so a refresh that triggers another refresh (a TwoWay write
//! that notifies the model, which refreshes the binding again) is fine.
//! Registration, removal and model swaps need an exclusive borrow and fail
//! with [`BindError::Busy`] when called from inside a refresh. Callbacks
//! hold only a `Weak` to the state, so dropping the engine tears everything
//! down.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tether_core::{same_rc, AccessError, Object, ObjectRef, Subscription, Value, ValueKind};
use tether_markup::{parse_str, BindingMode, BindingSpec};

use crate::defaults::DefaultMembers;
use crate::discovery::BoundView;
use crate::error::{BindError, ConfigIssue};
use crate::hooks::{invoke_command, HooksRef, ViewHooks};
use crate::list::{ListAdapter, ListConfig, Selection};
use crate::table::{Binding, BindingInfo, BindingTable, ModeState, ScalarSource};
use crate::view::ViewRef;


type Shared = Rc<RefCell<EngineState>>;

struct EngineState {
    model: ObjectRef,
    prefix: String,
    defaults: DefaultMembers,
    hooks: Option<HooksRef>,
    table: BindingTable,
    attached: Cell<bool>,
    model_sub: RefCell<Option<Subscription>>,
}

/// A binding resolved against the model but not yet live.
struct Plan {
    id: String,
    spec: BindingSpec,
    view: ViewRef,
    view_member: Option<String>,
    source: ScalarSource,
    list: Option<ListPlan>,
}

struct ListPlan {
    list_property: Option<String>,
    config: ListConfig,
}

// ── BindingEngine ─────────────────────────────────────────────────────────

/// Keeps a set of views in sync with one view model.
///
/// ```rust
/// use tether_bind::{BindingEngine, BoundView, ViewNode};
/// use tether_core::{Object, Record, Value};
///
/// let model = Record::new("Lot").with("Bid", 42).into_ref();
/// let label = ViewNode::label().into_ref();
///
/// let engine = BindingEngine::new(model.clone(), "lot.");
/// engine.add_bindings([BoundView::new(label.clone(), "{Binding Bid}")]).unwrap();
/// engine.update_view().unwrap();
/// assert_eq!(label.value("Text"), Value::Int(42));
///
/// model.set("Bid", Value::Int(43)).unwrap();
/// assert_eq!(label.value("Text"), Value::Int(43));
/// ```
pub struct BindingEngine {
    inner: Shared,
}

impl BindingEngine {
    /// A live engine for `model`. Binding ids are `prefix + model_property`.
    ///
    /// The engine starts with handlers attached: model changes refresh
    /// bindings as soon as they are registered.
    pub fn new(model: ObjectRef, prefix: impl Into<String>) -> Self {
        let inner = Rc::new(RefCell::new(EngineState {
            model,
            prefix: prefix.into(),
            defaults: DefaultMembers::standard(),
            hooks: None,
            table: BindingTable::default(),
            attached: Cell::new(true),
            model_sub: RefCell::new(None),
        }));
        {
            let st = inner.borrow();
            *st.model_sub.borrow_mut() = model_subscription(Rc::downgrade(&inner), &st.model);
        }
        Self { inner }
    }

    /// Replace the per-view-type default members. Defaults to
    /// [`DefaultMembers::standard`].
    pub fn with_defaults(self, defaults: DefaultMembers) -> Self {
        self.inner.borrow_mut().defaults = defaults;
        self
    }

    /// Install host hooks. They apply to bindings registered afterwards.
    pub fn with_hooks(self, hooks: impl ViewHooks + 'static) -> Self {
        self.inner.borrow_mut().hooks = Some(Rc::new(hooks));
        self
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn view_model(&self) -> ObjectRef {
        Rc::clone(&self.inner.borrow().model)
    }

    pub fn prefix(&self) -> String {
        self.inner.borrow().prefix.clone()
    }

    /// The id a binding to model member `property` gets.
    pub fn id_name(&self, property: &str) -> String {
        format!("{}{property}", self.inner.borrow().prefix)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<String> {
        self.inner.borrow().table.ids()
    }

    pub fn binding(&self, id: &str) -> Option<BindingInfo> {
        self.inner.borrow().table.get(id).map(Binding::info)
    }

    pub fn binding_for_view(&self, view: &ViewRef) -> Option<BindingInfo> {
        self.inner.borrow().table.find_by_view(view).map(Binding::info)
    }

    pub fn list_adapter(&self, id: &str) -> Option<ListAdapter> {
        self.inner.borrow().table.get(id)?.adapter.clone()
    }

    pub fn handlers_attached(&self) -> bool {
        self.inner.borrow().attached.get()
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Parse, validate and register a batch of bound views.
    ///
    /// All or nothing: every binding string is parsed and resolved before
    /// any binding becomes live, and the first failure leaves the table as
    /// it was. Handlers are wired before a binding is visible. Views are not
    /// refreshed; call [`update_view`](Self::update_view) afterwards.
    pub fn add_bindings(&self, views: impl IntoIterator<Item = BoundView>) -> Result<(), BindError> {
        drop(self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?);

        let plans = {
            let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
            let mut plans: Vec<Plan> = Vec::new();
            for bound in views {
                let spec = parse_str(&bound.binding).map_err(|source| BindError::Parse {
                    raw: bound.binding.clone(),
                    source,
                })?;
                if st.table.find_by_view(&bound.view).is_some()
                    || plans.iter().any(|p| same_rc(&p.view, &bound.view))
                {
                    return Err(BindError::config(&spec, ConfigIssue::DuplicateView));
                }
                let id = format!("{}{}", st.prefix, spec.model_property.as_deref().unwrap_or(""));
                if st.table.contains_id(&id) || plans.iter().any(|p| p.id == id) {
                    return Err(BindError::config(&spec, ConfigIssue::DuplicateId(id)));
                }
                plans.push(st.resolve(id, bound.view, spec)?);
            }
            plans
        };

        let (model, hooks, attached) = {
            let st = self.inner.borrow();
            (Rc::clone(&st.model), st.hooks.clone(), st.attached.get())
        };
        let weak = Rc::downgrade(&self.inner);
        let bindings: Vec<Binding> = plans
            .into_iter()
            .map(|plan| {
                let binding = build(plan, &model, hooks.clone());
                if attached {
                    attach(&weak, &binding, &model);
                }
                binding
            })
            .collect();

        let mut st = self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?;
        for binding in bindings {
            log::debug!(
                "bound `{}` ({}) to {}.{}",
                binding.id,
                binding.mode(),
                binding.view.type_name(),
                binding.view_member.as_deref().unwrap_or("-"),
            );
            st.table.insert(binding);
        }
        Ok(())
    }

    /// Remove one binding and detach its handlers. Returns `false` for an
    /// unknown id.
    pub fn remove_binding(&self, id: &str) -> Result<bool, BindError> {
        let removed = self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?.table.remove(id);
        let Some(binding) = removed else { return Ok(false) };
        binding.handlers.borrow_mut().detach();
        log::debug!("removed binding `{id}`");
        Ok(true)
    }

    /// Remove every binding.
    pub fn clear(&self) -> Result<(), BindError> {
        let removed = self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?.table.take_all();
        log::debug!("cleared {} bindings", removed.len());
        for binding in removed {
            binding.handlers.borrow_mut().detach();
        }
        Ok(())
    }

    // ── Handlers ──────────────────────────────────────────────────────────

    /// Subscribe to the model, the views and the lists. Idempotent.
    pub fn add_handlers(&self) -> Result<(), BindError> {
        let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
        st.attached.set(true);
        if st.model_sub.borrow().is_none() {
            *st.model_sub.borrow_mut() = model_subscription(Rc::downgrade(&self.inner), &st.model);
        }
        let weak = Rc::downgrade(&self.inner);
        for binding in st.table.iter() {
            attach(&weak, binding, &st.model);
        }
        Ok(())
    }

    /// Drop every subscription. Idempotent.
    pub fn remove_handlers(&self) -> Result<(), BindError> {
        let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
        st.attached.set(false);
        let model_sub = st.model_sub.borrow_mut().take();
        drop(model_sub);
        for binding in st.table.iter() {
            if let Some(adapter) = &binding.adapter {
                adapter.remove_handlers();
            }
            binding.handlers.borrow_mut().detach();
        }
        Ok(())
    }

    /// Point every binding at a new view model.
    ///
    /// A pointer-equal model is a no-op. Otherwise handlers come off the old
    /// model before the swap and go onto the new one after it, then every
    /// view is refreshed once.
    pub fn set_view_model(&self, model: ObjectRef) -> Result<(), BindError> {
        if same_rc(&self.inner.try_borrow().map_err(|_| BindError::Busy)?.model, &model) {
            return Ok(());
        }
        drop(self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?);

        self.remove_handlers()?;
        let old = {
            let mut st = self.inner.try_borrow_mut().map_err(|_| BindError::Busy)?;
            for adapter in st.table.iter().filter_map(|b| b.adapter.as_ref()) {
                adapter.set_model(Rc::clone(&model));
            }
            log::debug!("view model {} -> {}", st.model.type_name(), model.type_name());
            std::mem::replace(&mut st.model, model)
        };
        drop(old);
        self.add_handlers()?;
        self.update_view()
    }

    // ── Refresh ───────────────────────────────────────────────────────────

    /// Refresh every binding: its list, then its scalar value.
    ///
    /// A failing binding does not stop the others; the first error is
    /// returned once all have been tried.
    pub fn update_view(&self) -> Result<(), BindError> {
        let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
        let mut first = None;
        for binding in st.table.iter() {
            let result = st.refresh_list(binding).and_then(|()| st.refresh_scalar(binding));
            if let Err(e) = result {
                log::debug!("refresh of `{}` failed: {e}", binding.id);
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Refresh what depends on model member `name`.
    ///
    /// The binding with id `prefix + name` gets its list and scalar value
    /// refreshed. Failing that, a binding whose list comes from `name` gets
    /// its list refreshed. Otherwise nothing happens.
    pub fn update_view_for(&self, name: &str) -> Result<(), BindError> {
        let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
        let id = format!("{}{name}", st.prefix);
        if let Some(binding) = st.table.get(&id) {
            st.refresh_list(binding)?;
            return st.refresh_scalar(binding);
        }
        if let Some(binding) = st.table.find_by_list_property(name) {
            return st.refresh_list(binding);
        }
        log::trace!("no binding for `{name}`");
        Ok(())
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Execute the command behind Command binding `id`.
    ///
    /// A `Null` parameter is replaced by the binding's `{CommandParameter}`
    /// literal, then the hooks may transform it. Unknown ids and bindings
    /// that are not Command bindings are ignored.
    pub fn execute_command(&self, id: &str, parameter: Value) -> Result<(), BindError> {
        let (model, hooks, command, fallback) = {
            let st = self.inner.try_borrow().map_err(|_| BindError::Busy)?;
            let Some(binding) = st.table.get(id) else { return Ok(()) };
            let ScalarSource::Member(command) = &binding.source else { return Ok(()) };
            if binding.mode() != BindingMode::Command {
                return Ok(());
            }
            (
                Rc::clone(&st.model),
                st.hooks.clone(),
                command.clone(),
                binding.spec.command_parameter.clone(),
            )
        };
        let parameter = match (parameter, fallback) {
            (Value::Null, Some(literal)) => Value::from(literal),
            (p, _) => p,
        };
        invoke_command(&*model, hooks.as_deref(), &command, parameter)?;
        Ok(())
    }
}

impl std::fmt::Debug for BindingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("BindingEngine")
            .field("model", &st.model.type_name())
            .field("prefix", &st.prefix)
            .field("bindings", &st.table.ids())
            .finish()
    }
}

// ── Resolution ────────────────────────────────────────────────────────────

impl EngineState {
    fn missing(&self, spec: &BindingSpec, member: &str) -> BindError {
        BindError::Resolution {
            binding: spec.to_string(),
            model_type: self.model.type_name().to_string(),
            member: member.to_string(),
        }
    }

    fn resolve(&self, id: String, view: ViewRef, spec: BindingSpec) -> Result<Plan, BindError> {
        if !spec.has_source() {
            return Err(BindError::config(&spec, ConfigIssue::NoSource));
        }

        let view_member = match &spec.view_member {
            Some(member) => Some(member.clone()),
            None if spec.mode.pushes_values() => {
                let Some(member) = self.defaults.get(view.type_name()) else {
                    let issue = ConfigIssue::NoDefaultMember(view.type_name().to_string());
                    return Err(BindError::config(&spec, issue));
                };
                Some(member.to_string())
            }
            None => None,
        };

        let mut source = match spec.model_property() {
            None => ScalarSource::Absent,
            Some(".") => ScalarSource::WholeModel,
            Some(name) if self.model.has_member(name) => ScalarSource::Member(name.to_string()),
            Some(name) => return Err(self.missing(&spec, name)),
        };

        let list = match view.list_surface() {
            Some(_) => Some(self.resolve_list(&spec, &mut source)?),
            None => None,
        };

        if spec.mode == BindingMode::Command {
            match &source {
                ScalarSource::Member(name) if !matches!(self.model.get(name), Ok(Value::Command(_))) => {
                    return Err(BindError::config(&spec, ConfigIssue::NotACommand(name.clone())));
                }
                ScalarSource::WholeModel => {
                    return Err(BindError::config(&spec, ConfigIssue::NotACommand(".".to_string())));
                }
                _ => {}
            }
        }

        Ok(Plan { id, spec, view, view_member, source, list })
    }

    /// Pick the list source for a list surface.
    ///
    /// `ItemsSource` wins; without it `<property>List` is tried, and failing
    /// that a list-typed scalar member is taken over as the list (the scalar
    /// source is then cleared).
    fn resolve_list(&self, spec: &BindingSpec, source: &mut ScalarSource) -> Result<ListPlan, BindError> {
        let explicit = spec.list_property();
        let candidate = match explicit {
            Some(name) => name.to_string(),
            None => format!("{}List", spec.model_property().unwrap_or("")),
        };

        let list_property = if self.model.has_member(&candidate) {
            Some(candidate.clone())
        } else if explicit.is_some() {
            return Err(self.missing(spec, &candidate));
        } else {
            match &*source {
                ScalarSource::Member(name) if self.model.is_list_typed(name) => {
                    let name = name.clone();
                    *source = ScalarSource::Absent;
                    Some(name)
                }
                _ => None,
            }
        };

        let item_template = spec
            .item_template
            .clone()
            .unwrap_or_else(|| format!("{}Item", list_property.as_deref().unwrap_or(&candidate)));

        let selection = match (spec.mode, &*source) {
            (BindingMode::TwoWay, ScalarSource::Member(name)) => Some(Selection::Property(name.clone())),
            (BindingMode::Command, ScalarSource::Member(name)) => Some(Selection::Command(name.clone())),
            _ => None,
        };

        Ok(ListPlan {
            list_property,
            config: ListConfig {
                item_template,
                add_command: spec.add_command.clone(),
                remove_command: spec.remove_command.clone(),
                can_edit: spec.can_edit.clone(),
                can_move: spec.can_move.clone(),
                selection,
            },
        })
    }

    // ── Refresh ───────────────────────────────────────────────────────────

    fn refresh_list(&self, binding: &Binding) -> Result<(), BindError> {
        let (Some(property), Some(adapter)) = (&binding.list_property, &binding.adapter) else {
            return Ok(());
        };
        let value = self.model.get(property)?;
        let list = match value {
            Value::List(list) => Some(list),
            Value::Null => None,
            other => {
                return Err(BindError::Access(AccessError::TypeMismatch {
                    type_name: self.model.type_name().to_string(),
                    member: property.clone(),
                    expected: ValueKind::List,
                    found: other.kind(),
                }));
            }
        };
        log::trace!("refresh list `{}` from {property}", binding.id);
        adapter.set_list(list);
        Ok(())
    }

    fn refresh_scalar(&self, binding: &Binding) -> Result<(), BindError> {
        if !binding.mode().pushes_values() {
            return Ok(());
        }
        let Some(member) = &binding.view_member else { return Ok(()) };
        let value = match &binding.source {
            ScalarSource::Member(name) => self.model.get(name)?,
            ScalarSource::WholeModel => Value::Object(Rc::clone(&self.model)),
            ScalarSource::Absent => return Ok(()),
        };
        log::trace!("refresh `{}`: {}.{member} = {value:?}", binding.id, binding.view.type_name());

        let was_syncing = binding.syncing.replace(true);
        let result = match &self.hooks {
            Some(hooks) => hooks.apply(&binding.view, member, value),
            None => binding.view.set(member, value),
        };
        binding.syncing.set(was_syncing);
        result.map_err(BindError::from)
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────

fn build(plan: Plan, model: &ObjectRef, hooks: Option<HooksRef>) -> Binding {
    let Plan { id, spec, view, view_member, source, list } = plan;

    let (list_property, adapter) = match list {
        Some(ListPlan { list_property, config }) => {
            let existing = view.list_surface().and_then(|s| s.adapter());
            let adapter = match existing {
                Some(adapter) => {
                    log::debug!("reusing list adapter for `{id}`");
                    adapter.retarget(Rc::clone(model), config, hooks);
                    adapter
                }
                None => {
                    let adapter = ListAdapter::new(&view, Rc::clone(model), config, hooks);
                    if let Some(surface) = view.list_surface() {
                        surface.attach_adapter(adapter.clone());
                    }
                    adapter
                }
            };
            (list_property, Some(adapter))
        }
        None => (None, None),
    };

    Binding {
        handlers: RefCell::new(ModeState::for_mode(spec.mode)),
        syncing: Rc::new(Cell::new(false)),
        id,
        spec,
        view,
        view_member,
        source,
        list_property,
        adapter,
    }
}

fn model_subscription(weak: Weak<RefCell<EngineState>>, model: &ObjectRef) -> Option<Subscription> {
    let signal = model.changed()?;
    Some(signal.subscribe(move |name: &String| {
        let Some(inner) = weak.upgrade() else { return };
        if let Err(e) = (BindingEngine { inner }).update_view_for(name) {
            log::warn!("refresh after `{name}` changed failed: {e}");
        }
    }))
}

/// Attach a binding's list and mode handlers. Already attached handlers are
/// left alone.
fn attach(weak: &Weak<RefCell<EngineState>>, binding: &Binding, model: &ObjectRef) {
    if let Some(adapter) = &binding.adapter {
        adapter.add_handlers();
    }
    let mut handlers = binding.handlers.borrow_mut();
    if handlers.is_attached() {
        return;
    }
    match &mut *handlers {
        ModeState::OneWay => {}
        ModeState::TwoWay { view_changed } => {
            *view_changed = two_way_handler(weak, binding);
        }
        ModeState::Command { enabled_changed, activated } => {
            *enabled_changed = enablement_handler(binding, model);
            *activated = activation_handler(weak, binding);
        }
    }
}

/// View edits → model, unless the engine itself caused the edit.
fn two_way_handler(weak: &Weak<RefCell<EngineState>>, binding: &Binding) -> Option<Subscription> {
    let member = binding.view_member.clone()?;
    let ScalarSource::Member(property) = binding.source.clone() else { return None };
    let syncing = Rc::clone(&binding.syncing);
    let view = Rc::downgrade(&binding.view);
    let weak = weak.clone();

    let signal = binding.view.changed()?;
    Some(signal.subscribe(move |changed: &String| {
        if *changed != member || syncing.get() {
            return;
        }
        let (Some(inner), Some(view)) = (weak.upgrade(), view.upgrade()) else { return };
        let model = match inner.try_borrow() {
            Ok(st) => Rc::clone(&st.model),
            Err(_) => {
                log::warn!("dropped edit of `{member}`: engine is busy");
                return;
            }
        };
        let result = view.get(&member).and_then(|value| model.set(&property, value));
        if let Err(e) = result {
            log::warn!("writing `{member}` back to `{property}` failed: {e}");
        }
    }))
}

/// Mirror the command's enablement onto the view, starting now.
fn enablement_handler(binding: &Binding, model: &ObjectRef) -> Option<Subscription> {
    let ScalarSource::Member(name) = &binding.source else { return None };
    let value = model.get(name).ok()?;
    let command = value.as_command()?;
    binding.view.set_enabled(command.is_enabled());

    let view = Rc::downgrade(&binding.view);
    Some(command.enabled_changed()?.subscribe(move |enabled| {
        if let Some(view) = view.upgrade() {
            view.set_enabled(*enabled);
        }
    }))
}

fn activation_handler(weak: &Weak<RefCell<EngineState>>, binding: &Binding) -> Option<Subscription> {
    let id = binding.id.clone();
    let weak = weak.clone();
    Some(binding.view.activated()?.subscribe(move |parameter: &Value| {
        let Some(inner) = weak.upgrade() else { return };
        if let Err(e) = (BindingEngine { inner }).execute_command(&id, parameter.clone()) {
            log::warn!("command for `{id}` failed: {e}");
        }
    }))
}

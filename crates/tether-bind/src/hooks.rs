use std::rc::Rc;

use tether_core::{AccessError, ListChange, Object, Value, ValueKind};

use crate::view::ViewRef;

/// Optional host customization points.
///
/// Every method has a default, so a host overrides only what it needs.
pub trait ViewHooks {
    /// Push a model value into a view member.
    fn apply(&self, view: &ViewRef, member: &str, value: Value) -> Result<(), AccessError> {
        view.set(member, value)
    }

    /// Transform or supply the parameter for a command invocation.
    fn command_parameter(&self, _command: &str, parameter: Value) -> Value {
        parameter
    }

    /// Pick a template for a list row. `None` keeps `template`.
    fn item_template(&self, _template: &str, _item: &Value) -> Option<String> {
        None
    }

    /// Observe an incremental change to a bound list.
    fn list_changed(&self, _view: &ViewRef, _change: &ListChange) {}
}

pub(crate) type HooksRef = Rc<dyn ViewHooks>;

/// Resolve `command` on `model` and execute it.
pub(crate) fn invoke_command(
    model: &dyn Object,
    hooks: Option<&dyn ViewHooks>,
    command: &str,
    parameter: Value,
) -> Result<(), AccessError> {
    let value = model.get(command)?;
    let Some(cmd) = value.as_command() else {
        return Err(AccessError::TypeMismatch {
            type_name: model.type_name().to_string(),
            member: command.to_string(),
            expected: ValueKind::Command,
            found: value.kind(),
        });
    };
    let parameter = match hooks {
        Some(h) => h.command_parameter(command, parameter),
        None => parameter,
    };
    log::trace!("executing `{command}` with {parameter:?}");
    cmd.execute(parameter);
    Ok(())
}

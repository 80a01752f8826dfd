use thiserror::Error;

use tether_core::AccessError;
use tether_markup::ParseError;

/// What made a binding unusable at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("the view already has a binding")]
    DuplicateView,

    #[error("a binding with id `{0}` already exists")]
    DuplicateId(String),

    #[error("no default member is registered for view type `{0}`; name one with `.Member`")]
    NoDefaultMember(String),

    #[error("at least one of a model property or an ItemsSource must be given")]
    NoSource,

    #[error("model member `{0}` does not hold a command")]
    NotACommand(String),
}

/// Errors raised by the binding engine.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid binding string `{raw}`: {source}")]
    Parse {
        raw: String,
        #[source]
        source: ParseError,
    },

    #[error("binding `{binding}`: {issue}")]
    Configuration { binding: String, issue: ConfigIssue },

    #[error("binding `{binding}`: model `{model_type}` has no member `{member}`")]
    Resolution {
        binding: String,
        model_type: String,
        member: String,
    },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("bindings cannot be registered or removed while a refresh is running")]
    Busy,
}

impl BindError {
    pub(crate) fn config(binding: impl ToString, issue: ConfigIssue) -> Self {
        BindError::Configuration { binding: binding.to_string(), issue }
    }

    /// The configuration issue, if this is a configuration error.
    pub fn issue(&self) -> Option<&ConfigIssue> {
        match self {
            BindError::Configuration { issue, .. } => Some(issue),
            _ => None,
        }
    }
}

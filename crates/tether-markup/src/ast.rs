// ── ClauseKind ────────────────────────────────────────────────────────────

/// The three bracketed clauses a binding string may contain.
///
/// The declaration order is also the order clauses must appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    Binding,
    List,
    CommandParameter,
}

impl ClauseKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "Binding"          => Some(Self::Binding),
            "List"             => Some(Self::List),
            "CommandParameter" => Some(Self::CommandParameter),
            _                  => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Binding          => "Binding",
            Self::List             => "List",
            Self::CommandParameter => "CommandParameter",
        }
    }
}

// ── Target ────────────────────────────────────────────────────────────────

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// No `=`: the whole assignment is a value (`Title`).
    Bare,
    /// `Name=value`, e.g. `Mode=TwoWay`.
    Named(String),
    /// `.Member` or `.Member=value`: names a member on the view.
    ViewMember(String),
}

// ── Assignment ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: Target,
    /// `None` for `.Member` without `=` and for `Name=` with nothing after it.
    pub value: Option<String>,
    /// 1-based column of the first token.
    pub col: usize,
}

// ── Clause ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    /// `true` when the assignments appeared without a `{Binding ...}` wrapper.
    pub implicit: bool,
    pub assignments: Vec<Assignment>,
    pub col: usize,
}

// ── BindingDocument ───────────────────────────────────────────────────────

/// Syntax tree for one binding string, before names are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDocument {
    pub clauses: Vec<Clause>,
}

impl BindingDocument {
    pub fn clause(&self, kind: ClauseKind) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.kind == kind)
    }

    /// Every assignment in clause order, paired with its clause kind.
    pub fn assignments(&self) -> impl Iterator<Item = (ClauseKind, &Assignment)> {
        self.clauses
            .iter()
            .flat_map(|c| c.assignments.iter().map(move |a| (c.kind, a)))
    }
}

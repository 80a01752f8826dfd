use std::fmt;
use std::str::FromStr;

use crate::ast::{BindingDocument, ClauseKind, Target};
use crate::error::ParseError;

// ── BindingMode ───────────────────────────────────────────────────────────

/// How values flow between a view member and a model member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingMode {
    /// Model → view only.
    #[default]
    OneWay,
    /// Model → view, and view edits are written back to the model.
    TwoWay,
    /// The view triggers a command held by the model.
    Command,
}

impl BindingMode {
    pub const ALL: [BindingMode; 3] = [Self::OneWay, Self::TwoWay, Self::Command];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWay  => "OneWay",
            Self::TwoWay  => "TwoWay",
            Self::Command => "Command",
        }
    }

    /// `true` for the modes that push model values into a view member.
    pub fn pushes_values(self) -> bool {
        matches!(self, Self::OneWay | Self::TwoWay)
    }
}

impl FromStr for BindingMode {
    type Err = ();

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── BindingSpec ───────────────────────────────────────────────────────────

/// The interpreted form of one binding string.
///
/// Every field is optional at this level. The rule that at least one of
/// `model_property` / `list_property` must be present is checked when the
/// binding is registered, so `{Binding Mode=TwoWay}` parses fine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingSpec {
    /// Model member to bind. `"."` means the whole model.
    pub model_property: Option<String>,
    pub mode: BindingMode,
    /// View member to bind; falls back to a per-view-type default.
    pub view_member: Option<String>,
    /// `ItemsSource`: model member holding the list.
    pub list_property: Option<String>,
    /// `ItemTemplate`: template used to render each list item.
    pub item_template: Option<String>,
    /// `AddCommand`: model command invoked to insert an item.
    pub add_command: Option<String>,
    /// `RemoveCommand`: model command invoked to remove an item.
    pub remove_command: Option<String>,
    /// `CanEdit`: `true`, `false`, or a member evaluated per item.
    pub can_edit: Option<String>,
    /// `CanMove`: `true`, `false`, or a member evaluated per item.
    pub can_move: Option<String>,
    /// Literal from the `{CommandParameter ...}` clause.
    pub command_parameter: Option<String>,
}

impl BindingSpec {
    /// Fold the assignments of a parsed document into a spec.
    ///
    /// Later assignments overwrite earlier ones field by field. Unknown
    /// names are rejected with the offending token.
    pub fn from_document(doc: &BindingDocument) -> Result<Self, ParseError> {
        let mut spec = BindingSpec::default();

        for (kind, a) in doc.assignments() {
            match &a.target {
                Target::Bare => {
                    let value = a.value.clone();
                    if kind == ClauseKind::CommandParameter {
                        spec.command_parameter = value;
                    } else {
                        spec.model_property = value;
                    }
                }
                Target::ViewMember(member) => {
                    spec.view_member = Some(member.clone());
                    if let Some(v) = &a.value {
                        spec.model_property = Some(v.clone());
                    }
                }
                Target::Named(name) => {
                    // An empty value reads as absent: Mode falls back to OneWay,
                    // the other names are cleared.
                    let value = a.value.clone();
                    match name.as_str() {
                        // An unrecognized mode falls back to OneWay rather than failing.
                        "Mode" => {
                            spec.mode = value
                                .and_then(|v| v.parse::<BindingMode>().ok())
                                .unwrap_or_default();
                        }
                        "ItemsSource"   => spec.list_property = value,
                        "ItemTemplate"  => spec.item_template = value,
                        "AddCommand"    => spec.add_command = value,
                        "RemoveCommand" => spec.remove_command = value,
                        "CanEdit"       => spec.can_edit = value,
                        "CanMove"       => spec.can_move = value,
                        other => {
                            return Err(ParseError::new(
                                format!("unknown binding parameter `{other}`"),
                                a.col,
                            )
                            .with_token(other));
                        }
                    }
                }
            }
        }

        Ok(spec)
    }

    /// Model member name, treating an empty string as absent.
    pub fn model_property(&self) -> Option<&str> {
        self.model_property.as_deref().filter(|s| !s.is_empty())
    }

    /// List member name, treating an empty string as absent.
    pub fn list_property(&self) -> Option<&str> {
        self.list_property.as_deref().filter(|s| !s.is_empty())
    }

    /// `true` when a model member or a list member is named.
    pub fn has_source(&self) -> bool {
        self.model_property().is_some() || self.list_property().is_some()
    }

    fn has_list_clause(&self) -> bool {
        self.list_property.is_some()
            || self.item_template.is_some()
            || self.add_command.is_some()
            || self.remove_command.is_some()
            || self.can_edit.is_some()
            || self.can_move.is_some()
    }
}

/// Canonical binding string. Parsing the output yields an equal spec.
impl fmt::Display for BindingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut binding: Vec<String> = Vec::new();
        match (&self.view_member, &self.model_property) {
            (Some(member), Some(prop)) => binding.push(format!(".{member}={prop}")),
            (Some(member), None) => binding.push(format!(".{member}")),
            (None, Some(prop)) => binding.push(prop.clone()),
            (None, None) => {}
        }
        if self.mode != BindingMode::OneWay {
            binding.push(format!("Mode={}", self.mode));
        }

        let list: Vec<String> = [
            ("ItemsSource", &self.list_property),
            ("ItemTemplate", &self.item_template),
            ("AddCommand", &self.add_command),
            ("RemoveCommand", &self.remove_command),
            ("CanEdit", &self.can_edit),
            ("CanMove", &self.can_move),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_ref().map(|v| format!("{name}={v}")))
        .collect();

        let mut clauses: Vec<String> = Vec::new();
        if !binding.is_empty() {
            clauses.push(format!("{{Binding {}}}", binding.join(", ")));
        }
        if self.has_list_clause() {
            clauses.push(format!("{{List {}}}", list.join(", ")));
        }
        if let Some(p) = &self.command_parameter {
            clauses.push(format!("{{CommandParameter {p}}}"));
        }
        f.write_str(&clauses.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_str;

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!("twoway".parse::<BindingMode>(), Ok(BindingMode::TwoWay));
        assert_eq!("COMMAND".parse::<BindingMode>(), Ok(BindingMode::Command));
        assert!("Sideways".parse::<BindingMode>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for src in [
            "{Binding Title}",
            "{Binding .Text=DisplayCount, Mode=TwoWay}",
            "{Binding Items, Mode=Command} {List ItemTemplate=Row, AddCommand=Add, CanEdit=true}",
            "{List ItemsSource=Bids} {CommandParameter latest}",
        ] {
            let spec = parse_str(src).unwrap();
            let again = parse_str(&spec.to_string()).unwrap();
            assert_eq!(spec, again, "round trip of {src}");
        }
    }

    #[test]
    fn display_is_canonical() {
        let spec = parse_str("Mode=twoway, .Text, Name").unwrap();
        assert_eq!(spec.to_string(), "{Binding .Text=Name, Mode=TwoWay}");
    }

    #[test]
    fn has_source_ignores_empty_names() {
        let spec = BindingSpec { model_property: Some(String::new()), ..Default::default() };
        assert!(!spec.has_source());
        let spec = BindingSpec { list_property: Some("Items".into()), ..Default::default() };
        assert!(spec.has_source());
    }
}

//! Lexer, parser, and spec model for **tether binding strings**.
//!
//! A binding string is the small mini-language attached to a view node to
//! describe what it binds to:
//!
//! ```text
//! {Binding .Text=DisplayCount, Mode=TwoWay}
//! {Binding Lots} {List ItemTemplate=LotRow, AddCommand=AddLot, CanEdit=true}
//! ```
//!
//! This crate is intentionally dependency-free so hosts and build tooling
//! can validate binding strings without pulling in the engine.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `BindingDocument`, `Clause`, `Assignment`, `Target` |
//! | [`binding`] | `BindingSpec`, `BindingMode` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`parser`] | `parse_str` / `parse_document` entry points |
//!
//! # Quick start
//!
//! ```rust
//! use tether_markup::{parse_str, BindingMode};
//!
//! let spec = parse_str("{Binding Score, Mode=TwoWay}").unwrap();
//! assert_eq!(spec.model_property.as_deref(), Some("Score"));
//! assert_eq!(spec.mode, BindingMode::TwoWay);
//! ```

pub mod ast;
pub mod binding;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::BindingDocument;
pub use binding::{BindingMode, BindingSpec};
pub use error::ParseError;
pub use parser::{parse_document, parse_str};

#[cfg(test)]
mod parse_tests {
    use super::*;

    fn ok(src: &str) -> BindingSpec { parse_str(src).unwrap() }
    fn err(src: &str) -> ParseError { parse_str(src).unwrap_err() }

    #[test] fn bare_property() {
        let s = ok("{Binding Title}");
        assert_eq!(s.model_property.as_deref(), Some("Title"));
        assert_eq!(s.mode, BindingMode::OneWay);
        assert_eq!(s.list_property, None);
        assert_eq!(s.item_template, None);
        assert_eq!(s.add_command, None);
        assert_eq!(s.remove_command, None);
        assert_eq!(s.can_edit, None);
        assert_eq!(s.can_move, None);
    }
    #[test] fn without_binding_wrapper() {
        assert_eq!(ok("Title, Mode=TwoWay"), ok("{Binding Title, Mode=TwoWay}"));
    }
    #[test] fn assignment_order_is_irrelevant() {
        assert_eq!(ok("{Binding Mode=TwoWay,Score}"), ok("{Binding Score,Mode=TwoWay}"));
        assert_eq!(
            ok("{List ItemsSource=Lots, CanMove=false}"),
            ok("{List CanMove=false, ItemsSource=Lots}"),
        );
    }
    #[test] fn whitespace_separates_assignments() {
        assert_eq!(ok("{Binding Score Mode=TwoWay}"), ok("{Binding Score, Mode=TwoWay}"));
    }
    #[test] fn last_write_wins() {
        assert_eq!(ok("{Binding A, B}").model_property.as_deref(), Some("B"));
        assert_eq!(ok("{Binding Mode=TwoWay, Mode=Command}").mode, BindingMode::Command);
    }
    #[test] fn view_member_with_property() {
        let s = ok("{Binding .Text=DisplayCount}");
        assert_eq!(s.view_member.as_deref(), Some("Text"));
        assert_eq!(s.model_property.as_deref(), Some("DisplayCount"));
    }
    #[test] fn view_member_alone() {
        let s = ok("{Binding Count, .Text}");
        assert_eq!(s.view_member.as_deref(), Some("Text"));
        assert_eq!(s.model_property.as_deref(), Some("Count"));
    }
    #[test] fn view_member_with_empty_value_keeps_property() {
        let s = ok("{Binding Count, .Text=}");
        assert_eq!(s.view_member.as_deref(), Some("Text"));
        assert_eq!(s.model_property.as_deref(), Some("Count"));
    }
    #[test] fn whole_model_sentinel() {
        assert_eq!(ok("{Binding .}").model_property.as_deref(), Some("."));
        assert_eq!(ok("{Binding .Summary=.}").model_property.as_deref(), Some("."));
    }
    #[test] fn mode_is_case_insensitive() {
        assert_eq!(ok("{Binding X, Mode=twoway}").mode, BindingMode::TwoWay);
    }
    #[test] fn unknown_mode_falls_back_to_one_way() {
        assert_eq!(ok("{Binding X, Mode=TwoWay, Mode=Sideways}").mode, BindingMode::OneWay);
    }
    #[test] fn empty_mode_is_one_way() {
        let s = ok("{Binding Title, Mode=}");
        assert_eq!(s.mode, BindingMode::OneWay);
        assert_eq!(s.model_property.as_deref(), Some("Title"));
        assert_eq!(ok("{Binding Title, Mode=TwoWay, Mode=}").mode, BindingMode::OneWay);
    }
    #[test] fn empty_list_names_are_absent() {
        let s = ok("{Binding Title} {List ItemsSource=}");
        assert_eq!(s.list_property, None);
        assert_eq!(s.list_property(), None);
        assert_eq!(ok("{List ItemsSource=Lots, ItemsSource=, CanEdit=}").list_property, None);
    }
    #[test] fn unknown_name_beside_view_member() {
        // Unknown names fail even next to a valid `.Member=value`.
        let e = err("{Binding Count=1 .Text=DisplayCount}");
        assert_eq!(e.token.as_deref(), Some("Count"));
        assert_eq!(e.col, 10);
        let s = ok("{Binding Count .Text=DisplayCount}");
        assert_eq!(s.view_member.as_deref(), Some("Text"));
        assert_eq!(s.model_property.as_deref(), Some("DisplayCount"));
    }
    #[test] fn mode_without_property_parses() {
        let s = ok("{Binding Mode=TwoWay}");
        assert_eq!(s.model_property, None);
        assert!(!s.has_source());
    }
    #[test] fn all_list_parameters() {
        let s = ok("{Binding Lots, Mode=Command} {List ItemsSource=LotList, ItemTemplate=LotRow, \
                    AddCommand=AddLot, RemoveCommand=RemoveLot, CanEdit=true, CanMove=IsMovable}");
        assert_eq!(s.list_property.as_deref(), Some("LotList"));
        assert_eq!(s.item_template.as_deref(), Some("LotRow"));
        assert_eq!(s.add_command.as_deref(), Some("AddLot"));
        assert_eq!(s.remove_command.as_deref(), Some("RemoveLot"));
        assert_eq!(s.can_edit.as_deref(), Some("true"));
        assert_eq!(s.can_move.as_deref(), Some("IsMovable"));
    }
    #[test] fn list_clause_alone() {
        let s = ok("{List ItemsSource=Bids}");
        assert_eq!(s.model_property, None);
        assert!(s.has_source());
    }
    #[test] fn bare_assignments_then_clause() {
        let s = ok("Lots {List ItemTemplate=LotRow}");
        assert_eq!(s.model_property.as_deref(), Some("Lots"));
        assert_eq!(s.item_template.as_deref(), Some("LotRow"));
    }
    #[test] fn command_parameter_clause() {
        let s = ok("{Binding PlaceBid, Mode=Command} {CommandParameter 10}");
        assert_eq!(s.model_property.as_deref(), Some("PlaceBid"));
        assert_eq!(s.command_parameter.as_deref(), Some("10"));
    }
    #[test] fn trailing_comma() { ok("{Binding Title,}"); }
    #[test] fn surrounding_whitespace() { ok("  {Binding Title}  {List ItemsSource=X}  "); }

    #[test] fn err_unknown_name_reports_token() {
        let e = err("{Binding Title, Colour=red}");
        assert_eq!(e.token.as_deref(), Some("Colour"));
        assert_eq!(e.col, 17);
        assert!(e.to_string().contains("Colour"));
    }
    #[test] fn err_empty() { err(""); err("   "); }
    #[test] fn err_unknown_clause() {
        assert_eq!(err("{Bind Title}").token.as_deref(), Some("Bind"));
    }
    #[test] fn err_empty_clause() { err("{Binding}"); err("{List }"); }
    #[test] fn err_unclosed_clause() { err("{Binding Title"); }
    #[test] fn err_unmatched_close() { err("Title}"); }
    #[test] fn err_clause_order() { err("{List ItemsSource=X} {Binding Title}"); }
    #[test] fn err_repeated_clause() { err("{Binding A} {Binding B}"); }
    #[test] fn err_double_comma() { err("{Binding A,,B}"); }
    #[test] fn err_missing_name() { err("{Binding =Title}"); }
    #[test] fn err_dot_without_member() { err("{Binding .=Title}"); }
    #[test] fn err_text_after_clauses() { err("{Binding A} B"); }
}

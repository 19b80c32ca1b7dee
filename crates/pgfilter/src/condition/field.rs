//! Typed column references.

use super::value::FieldKind;
use crate::error::TermError;
use std::fmt;

/// A column that predicates can filter on.
///
/// `table` is the alias the column is reachable through in the FROM clause
/// (`m` in `member m`); it may be empty for unqualified columns.
///
/// # Example
/// ```ignore
/// use pgfilter::{Field, FieldKind};
///
/// const NICKNAME: Field = Field::new("m", "nickname", FieldKind::Text);
/// assert_eq!(NICKNAME.qualified(), "m.nickname");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    table: &'static str,
    column: &'static str,
    kind: FieldKind,
}

impl Field {
    /// Declare a field. Identifiers are checked when a term is built from it.
    pub const fn new(table: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            table,
            column,
            kind,
        }
    }

    /// The same column reached through another alias (`m.age` as `ms.age`).
    pub const fn with_table(self, table: &'static str) -> Self {
        Self { table, ..self }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// `table.column`, or just `column` when unqualified.
    pub fn qualified(&self) -> String {
        if self.table.is_empty() {
            self.column.to_string()
        } else {
            format!("{}.{}", self.table, self.column)
        }
    }

    /// Check that both identifier parts are safe to splice into SQL.
    pub(crate) fn validate(&self) -> Result<(), TermError> {
        if !self.table.is_empty() && !is_plain_ident(self.table) {
            return Err(TermError::InvalidIdent(self.table.to_string()));
        }
        if !is_plain_ident(self.column) {
            return Err(TermError::InvalidIdent(self.qualified()));
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table.is_empty() {
            f.write_str(self.column)
        } else {
            write!(f, "{}.{}", self.table, self.column)
        }
    }
}

/// Unquoted PostgreSQL identifier: `[A-Za-z_][A-Za-z0-9_$]*`.
pub(crate) fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

//! SELECT synthesis for tablekit.
//!
//! The [`SelectBuilder`] turns a table descriptor plus a client request
//! into one SQL statement: projected columns, relation joins, identifier
//! and security criteria, and look-ahead pagination.

mod criteria;
mod select;

pub use criteria::{numeric_literal, qualified, quote_ident, Criteria, IdFilter, ALLOW_ALL, DENY_ALL};
pub use select::{enum_values_statement, Page, PropertySelection, SelectBuilder, SelectOptions};

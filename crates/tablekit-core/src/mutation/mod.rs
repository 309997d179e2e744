//! Update synthesis and field validation.

mod update;
pub mod validate;

pub use update::{UpdateBuilder, UpdatePlan, UpdateStatement};
pub use validate::validate_property;

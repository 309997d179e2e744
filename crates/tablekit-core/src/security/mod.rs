//! Access control and audit.
//!
//! Row visibility and edit rights are decided by each entity's hooks,
//! which receive an [`AccessContext`]. The engine records every
//! successful update through an [`AuditLogger`].

pub mod audit;
pub mod context;
pub mod permissions;

pub use audit::{
    AuditAction, AuditLogger, AuditRecord, GatewayAuditLogger, MemoryAuditLogger, NullAuditLogger,
};
pub use context::AccessContext;
pub use permissions::PermissionCache;

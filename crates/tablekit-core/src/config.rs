//! Engine configuration.

use std::time::Duration;

/// Default number of rows per page when a request gives no `max`.
pub const DEFAULT_PAGE_LENGTH: u32 = 5;

/// Default upper bound for a requested page length.
pub const DEFAULT_MAX_PAGE_LENGTH: u32 = 100;

/// Default audit table.
pub const DEFAULT_AUDIT_TABLE: &str = "audit_log";

/// Default per-user permission table.
pub const DEFAULT_PERMISSION_TABLE: &str = "contact_permissions";

/// How much error detail a caller wants to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Generic messages only.
    #[default]
    Terse,
    /// Include underlying registry/storage detail.
    Verbose,
}

impl Verbosity {
    /// Map a boolean "verbose errors" switch.
    pub fn from_flag(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Terse
        }
    }
}

/// Configuration for the data service.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Page length used when a request gives none.
    pub default_page_length: u32,

    /// Largest page length a request may ask for.
    pub max_page_length: u32,

    /// Table receiving audit records.
    pub audit_table: String,

    /// Table holding per-user permission rows.
    pub permission_table: String,

    /// Column of the permission table holding the user id.
    pub permission_user_column: String,

    /// How long cached permission rows stay valid. None keeps them until
    /// explicitly invalidated.
    pub permission_cache_ttl: Option<Duration>,

    /// Separator used when concatenating label columns of a related entity.
    pub label_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_length: DEFAULT_PAGE_LENGTH,
            max_page_length: DEFAULT_MAX_PAGE_LENGTH,
            audit_table: DEFAULT_AUDIT_TABLE.to_string(),
            permission_table: DEFAULT_PERMISSION_TABLE.to_string(),
            permission_user_column: "contact_id".to_string(),
            permission_cache_ttl: Some(Duration::from_secs(60)),
            label_separator: " ".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page length.
    pub fn with_default_page_length(mut self, length: u32) -> Self {
        self.default_page_length = length.max(1);
        self
    }

    /// Set the page length cap.
    pub fn with_max_page_length(mut self, length: u32) -> Self {
        self.max_page_length = length.max(1);
        self
    }

    /// Set the audit table.
    pub fn with_audit_table(mut self, table: impl Into<String>) -> Self {
        self.audit_table = table.into();
        self
    }

    /// Set the permission table and its user column.
    pub fn with_permission_table(
        mut self,
        table: impl Into<String>,
        user_column: impl Into<String>,
    ) -> Self {
        self.permission_table = table.into();
        self.permission_user_column = user_column.into();
        self
    }

    /// Set the permission cache TTL.
    pub fn with_permission_cache_ttl(mut self, ttl: Duration) -> Self {
        self.permission_cache_ttl = Some(ttl);
        self
    }

    /// Keep cached permissions until explicitly invalidated.
    pub fn without_permission_cache_ttl(mut self) -> Self {
        self.permission_cache_ttl = None;
        self
    }

    /// Set the label separator.
    pub fn with_label_separator(mut self, separator: impl Into<String>) -> Self {
        self.label_separator = separator.into();
        self
    }

    /// Resolve the effective page length for a request.
    pub fn page_length(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|&max| max > 0)
            .unwrap_or(self.default_page_length)
            .min(self.max_page_length)
    }
}

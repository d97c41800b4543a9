#[cfg(not(feature = "std"))]
use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An inclusive `[start, end]` wall-clock window, used to scope a query's
/// outermost `WHERE` to `timestamp BETWEEN start AND end`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeRange {
    /// RFC 3339 start timestamp.
    pub start: String,
    /// RFC 3339 end timestamp.
    pub end: String,
}

/// The per-query execution context the façade is handed alongside source
/// text. `organization_id` is the mandatory tenant scope: every generated
/// SQL statement binds it as its first parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExecutionContext {
    /// Mandatory tenant identifier, bound as SQL parameter `$1`.
    pub organization_id: String,
    /// Identifier of the user issuing the query, for audit/telemetry only.
    pub user_id: Option<String>,
    /// Optional wall-clock scoping window.
    pub time_range: Option<TimeRange>,
    /// Optional cap appended as `LIMIT $m`.
    pub max_rows: Option<u64>,
    /// Optional statement-level timeout, set on the backend session
    /// before issuing the query (consumed by the executor, not the core).
    pub timeout_ms: Option<u64>,
    /// Whether the executor may consult the result cache.
    pub cache: bool,
}

impl ExecutionContext {
    /// Creates a context scoped to the given tenant, with every optional
    /// field left unset and caching enabled.
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: None,
            time_range: None,
            max_rows: None,
            timeout_ms: None,
            cache: true,
        }
    }
}

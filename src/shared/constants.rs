/// Cap on the flat ticket list inside a report; longer ranges set the
/// `truncated` flag instead of growing the payload.
pub const REPORT_DETAILS_CAP: usize = 500;

/// Longest report range accepted, in days.
pub const REPORT_MAX_RANGE_DAYS: i64 = 366;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - manages the service/counter catalog
pub const ROLE_ADMIN: &str = "admin";

/// Staff role - operates a counter (call, serve, transfer)
#[allow(dead_code)]
pub const ROLE_STAFF: &str = "staff";

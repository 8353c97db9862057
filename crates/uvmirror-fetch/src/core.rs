//! Pure status-code classification.

/// Returns `true` for any 2xx status.
pub fn is_success(status: u16) -> bool { (200..300).contains(&status) }

/// Returns `true` if the status means the resource does not exist.
///
/// Only 404 qualifies: a 403 or 410 from a checksum sidecar is an upstream
/// problem worth reporting, not a missing file.
pub fn is_not_found(status: u16) -> bool { status == 404 }

//! Authorization checks over the [`User`] permission flags.
//!
//! Plain functions rather than behavior on the record itself — the
//! identity model stays a data carrier and callers compose checks.

use crate::models::user::User;

/// Whether the user may access administrative interfaces.
pub fn can_access_admin(user: &User) -> bool {
    user.is_active && user.is_staff
}

/// Whether the user holds unrestricted access to every resource.
pub fn has_full_access(user: &User) -> bool {
    user.is_active && user.is_superuser
}

//! Authentication: JWT bearer sessions, password hashing, role checks.

pub mod current_user;
pub mod password;
pub mod session;

use crate::{api::models::users::CurrentUser, errors::Error};

/// Gate an operation behind the admin role.
pub fn require_admin(user: &CurrentUser) -> Result<(), Error> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden {
            resource: "admin resource".to_string(),
        })
    }
}

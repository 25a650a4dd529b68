use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Identity attached to the request by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub tenant_id: String,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    pub fn require_supervisor(&self) -> actix_web::Result<()> {
        if self.role.is_supervisor() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                "Insufficient permissions for this action",
            ))
        }
    }

    /// Employee a request acts on: the caller's own record unless another
    /// one is named, which only supervisors may do.
    pub fn target_employee(&self, requested: Option<u64>) -> actix_web::Result<u64> {
        match (requested, self.employee_id) {
            (Some(id), Some(own)) if id == own => Ok(id),
            (Some(id), _) => {
                self.require_supervisor()?;
                Ok(id)
            }
            (None, Some(own)) => Ok(own),
            (None, None) => Err(actix_web::error::ErrorForbidden("No employee profile")),
        }
    }
}

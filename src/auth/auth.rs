use crate::{error::ApiError, model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Roles granted to backend user ids whose tokens carry no role claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGrants {
    pub admins: Vec<String>,
    pub hr: Vec<String>,
}

impl RoleGrants {
    /// Parse comma-separated id lists, ignoring blanks and case.
    pub fn from_lists(admins: &str, hr: &str) -> Self {
        fn ids(raw: &str) -> Vec<String> {
            raw.split(',')
                .map(|id| id.trim().to_lowercase())
                .filter(|id| !id.is_empty())
                .collect()
        }
        Self {
            admins: ids(admins),
            hr: ids(hr),
        }
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        let id = user_id.trim().to_lowercase();
        if self.admins.contains(&id) {
            Some(Role::Admin)
        } else if self.hr.contains(&id) {
            Some(Role::Hr)
        } else {
            None
        }
    }
}

/// Caller identity, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    /// A valid role claim wins, then the configured grants, then `Employee`.
    pub fn from_claims(claims: Claims, grants: &RoleGrants) -> Self {
        let role = claims
            .role
            .and_then(Role::from_id)
            .or_else(|| grants.role_of(&claims.sub))
            .unwrap_or(Role::Employee);
        AuthUser {
            user_id: claims.sub,
            role,
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), ApiError> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin only".into()))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::Unauthorized("Missing token".into())),
        )
    }
}

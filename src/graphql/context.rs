use async_graphql::{Context, ErrorExtensions};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use crate::users::model::Role;

/// Request-scoped identity extracted from a verified bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
    pub is_super_admin: bool,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles,
            is_super_admin: claims.is_super_admin,
        }
    }
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.is_super_admin || self.has_role(Role::Admin)
    }
}

/// Declarative authorization requirement evaluated before a resolver body
/// runs. Admins satisfy every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Authenticated,
    Admin,
    Role(Role),
    AdminOrSelf(Uuid),
}

/// Checks `policy` against the request context. A missing user is an
/// authentication failure; an authenticated user failing the predicate is an
/// authorization failure.
pub fn guard<'ctx>(
    ctx: &Context<'ctx>,
    policy: Policy,
) -> async_graphql::Result<&'ctx CurrentUser> {
    let user = ctx
        .data_opt::<CurrentUser>()
        .ok_or_else(|| AppError::authentication("Not authenticated").extend())?;

    if evaluate(user, policy) {
        Ok(user)
    } else {
        Err(AppError::authorization("Insufficient permissions").extend())
    }
}

fn evaluate(user: &CurrentUser, policy: Policy) -> bool {
    match policy {
        Policy::Authenticated => true,
        Policy::Admin => user.is_admin(),
        Policy::Role(role) => user.is_admin() || user.has_role(role),
        Policy::AdminOrSelf(id) => user.is_admin() || user.id == id,
    }
}

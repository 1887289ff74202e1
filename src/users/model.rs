use async_graphql::{ComplexObject, Context, Enum, ErrorExtensions, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::Database;
use crate::users::repository::UserRepository;

/// Dashboard a user may operate. Stored in Postgres as the `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    AirQuality,
    TreeManagement,
    GovernmentEmission,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_super_admin: bool,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl User {
    async fn roles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Role>> {
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .roles(self.id)
            .await
            .map_err(|e| e.extend())
    }

    async fn profile(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Profile>> {
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .profile(self.id)
            .await
            .map_err(|e| e.extend())
    }
}

/// Row used internally for credential checks; never crosses the wire.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub encrypted_password: String,
    pub is_super_admin: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    /// Must contain at least one role.
    pub roles: Vec<Role>,
    #[serde(default)]
    #[graphql(default)]
    pub is_super_admin: bool,
}

#[derive(Debug, Clone, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub job_title: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

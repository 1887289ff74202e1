use async_graphql::{Context, ErrorExtensions, Object};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::Database;
use crate::error::AppError;
use crate::graphql::context::{guard, Policy};
use crate::users::model::{AuthPayload, CreateUserInput, Profile, ProfileInput, Role, User};
use crate::users::repository::UserRepository;

#[derive(Default)]
pub struct UsersQuery;

#[Object]
impl UsersQuery {
    /// Currently authenticated user.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        let current = guard(ctx, Policy::Authenticated)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .find_by_id(current.id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("User not found").extend())
    }

    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<User>> {
        guard(ctx, Policy::Admin)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db).list().await.map_err(|e| e.extend())
    }

    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<User> {
        guard(ctx, Policy::AdminOrSelf(id))?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .find_by_id(id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::not_found("User not found").extend())
    }
}

#[derive(Default)]
pub struct UsersMutation;

#[Object]
impl UsersMutation {
    /// Verifies credentials and returns a signed token plus the user.
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let db = ctx.data::<Database>()?;
        let repo = UserRepository::new(db);

        let credentials = repo
            .find_credentials(&email)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::authentication("Invalid email or password").extend())?;

        let matches = auth::verify_password(&password, &credentials.encrypted_password)
            .map_err(|e| e.extend())?;
        if !matches {
            return Err(AppError::authentication("Invalid email or password").extend());
        }

        repo.update_last_sign_in(credentials.id)
            .await
            .map_err(|e| e.extend())?;

        let user = repo
            .find_by_id(credentials.id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| AppError::authentication("Invalid email or password").extend())?;
        let roles = repo.roles(credentials.id).await.map_err(|e| e.extend())?;

        let claims = Claims::new(
            credentials.id,
            credentials.email,
            roles,
            credentials.is_super_admin,
        );
        let token = auth::generate_jwt(&claims).map_err(|e| e.extend())?;

        Ok(AuthPayload { token, user })
    }

    async fn create_user(
        &self,
        ctx: &Context<'_>,
        input: CreateUserInput,
    ) -> async_graphql::Result<User> {
        guard(ctx, Policy::Admin)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .create(&input)
            .await
            .map_err(|e| e.extend())
    }

    /// Soft delete. Returns `false` for an unknown or already-deleted id.
    async fn delete_user(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        guard(ctx, Policy::Admin)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .soft_delete(id)
            .await
            .map_err(|e| e.extend())
    }

    async fn add_user_role(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        role: Role,
    ) -> async_graphql::Result<Vec<Role>> {
        guard(ctx, Policy::Admin)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .add_role(user_id, role)
            .await
            .map_err(|e| e.extend())
    }

    async fn remove_user_role(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        role: Role,
    ) -> async_graphql::Result<Vec<Role>> {
        guard(ctx, Policy::Admin)?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .remove_role(user_id, role)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        user_id: Uuid,
        input: ProfileInput,
    ) -> async_graphql::Result<Profile> {
        guard(ctx, Policy::AdminOrSelf(user_id))?;
        let db = ctx.data::<Database>()?;
        UserRepository::new(db)
            .update_profile(user_id, &input)
            .await
            .map_err(|e| e.extend())
    }
}

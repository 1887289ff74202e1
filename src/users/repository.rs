use uuid::Uuid;

use crate::auth;
use crate::database::Database;
use crate::error::AppError;
use crate::users::model::{CreateUserInput, Profile, ProfileInput, Role, User, UserCredentials};

const USER_COLUMNS: &str =
    "id, email, is_super_admin, last_sign_in_at, created_at, updated_at";

pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All users not marked deleted, newest first.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .fetch_all(self.db.pool())
        .await?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(user)
    }

    pub async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, encrypted_password, is_super_admin \
             FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(credentials)
    }

    /// Creates the user, its roles and an empty profile atomically.
    pub async fn create(&self, input: &CreateUserInput) -> Result<User, AppError> {
        if input.roles.is_empty() {
            return Err(AppError::input_validation("A user needs at least one role"));
        }

        let encrypted_password = auth::hash_password(&input.password)?;
        let email = input.email.clone();
        let roles = input.roles.clone();
        let is_super_admin = input.is_super_admin;

        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let user = sqlx::query_as::<_, User>(&format!(
                        "INSERT INTO users (email, encrypted_password, is_super_admin) \
                         VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
                    ))
                    .bind(&email)
                    .bind(&encrypted_password)
                    .bind(is_super_admin)
                    .fetch_one(&mut **tx)
                    .await?;

                    for role in &roles {
                        sqlx::query(
                            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
                             ON CONFLICT (user_id, role) DO NOTHING",
                        )
                        .bind(user.id)
                        .bind(role)
                        .execute(&mut **tx)
                        .await?;
                    }

                    sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
                        .bind(user.id)
                        .execute(&mut **tx)
                        .await?;

                    Ok(user)
                })
            })
            .await
    }

    pub async fn update_last_sign_in(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_sign_in_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Soft delete; the row stays but disappears from every read.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn roles(&self, user_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(roles)
    }

    /// Append-only: adding an already-held role is a no-op.
    pub async fn add_role(&self, user_id: Uuid, role: Role) -> Result<Vec<Role>, AppError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(user_id)
        .bind(role)
        .execute(self.db.pool())
        .await?;
        self.roles(user_id).await
    }

    /// Removal is rejected when it would leave the user with no role at all;
    /// the check and the delete run in one transaction.
    pub async fn remove_role(&self, user_id: Uuid, role: Role) -> Result<Vec<Role>, AppError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    let count: i64 =
                        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = $1")
                            .bind(user_id)
                            .fetch_one(&mut **tx)
                            .await?;

                    if count <= 1 {
                        return Err(AppError::input_validation(
                            "Cannot remove the last role from a user",
                        ));
                    }

                    sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
                        .bind(user_id)
                        .bind(role)
                        .execute(&mut **tx)
                        .await?;

                    Ok(())
                })
            })
            .await?;

        self.roles(user_id).await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, first_name, last_name, job_title, phone_number, \
                    created_at, updated_at \
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: &ProfileInput,
    ) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, first_name, last_name, job_title, phone_number) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                job_title = EXCLUDED.job_title, \
                phone_number = EXCLUDED.phone_number, \
                updated_at = NOW() \
             RETURNING user_id, first_name, last_name, job_title, phone_number, \
                       created_at, updated_at",
        )
        .bind(user_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.job_title)
        .bind(&input.phone_number)
        .fetch_one(self.db.pool())
        .await?;
        Ok(profile)
    }
}

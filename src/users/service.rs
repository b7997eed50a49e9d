//! User service layer
//!
//! Self-service profile updates plus the administrative management surface.
//! Role and flag changes are admin-only; an administrator may not strip
//! their own superuser flag, nor their own staff flag unless superuser.

use sqlx::PgPool;
use validator::Validate;

use super::model::{AdminUpdateUserRequest, UpdateProfileRequest, User};
use crate::authz::Actor;
use crate::error::{ApiError, ApiResult};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Self-demotion guard for administrative updates
fn check_self_demotion(
    actor: &Actor,
    target_id: i64,
    request: &AdminUpdateUserRequest,
) -> Result<(), ApiError> {
    if target_id != actor.id {
        return Ok(());
    }

    if actor.is_superuser && request.is_superuser == Some(false) {
        return Err(ApiError::Forbidden(
            "You cannot remove your own superuser flag".to_string(),
        ));
    }

    if !actor.is_superuser && request.is_staff == Some(false) {
        return Err(ApiError::Forbidden(
            "You cannot remove your own staff flag".to_string(),
        ));
    }

    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> ApiResult<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        Ok(user)
    }

    /// Self-service profile update; email, role, and flags are untouchable here
    pub async fn update_profile(
        &self,
        actor_id: i64,
        request: UpdateProfileRequest,
    ) -> ApiResult<User> {
        request.validate()?;

        let result = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                cin_number = COALESCE($5, cin_number)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(actor_id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.phone_number)
        .bind(request.cin_number)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
                "Phone or CIN number already in use".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Administrative listing, ordered by email
    pub async fn list(&self) -> ApiResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY email ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Administrative update of another user's role, flags, and profile
    pub async fn admin_update(
        &self,
        actor: &Actor,
        target_id: i64,
        request: AdminUpdateUserRequest,
    ) -> ApiResult<User> {
        request.validate()?;
        check_self_demotion(actor, target_id, &request)?;

        let result = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                role = COALESCE($2, role),
                is_active = COALESCE($3, is_active),
                is_staff = COALESCE($4, is_staff),
                is_superuser = COALESCE($5, is_superuser),
                is_verified = COALESCE($6, is_verified),
                first_name = COALESCE($7, first_name),
                last_name = COALESCE($8, last_name),
                phone_number = COALESCE($9, phone_number),
                cin_number = COALESCE($10, cin_number)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(target_id)
        .bind(request.role)
        .bind(request.is_active)
        .bind(request.is_staff)
        .bind(request.is_superuser)
        .bind(request.is_verified)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.phone_number)
        .bind(request.cin_number)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ApiError::NotFound("User not found".to_string())),
            Err(e) if is_unique_violation(&e) => Err(ApiError::Conflict(
                "Phone or CIN number already in use".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a user account
    pub async fn delete(&self, target_id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(target_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::UserRole;

    fn admin(id: i64, is_superuser: bool) -> Actor {
        Actor {
            id,
            email: "admin@example.gov".to_string(),
            role: UserRole::Administrateur,
            has_cin: true,
            is_active: true,
            is_staff: true,
            is_superuser,
            is_verified: true,
        }
    }

    fn request() -> AdminUpdateUserRequest {
        AdminUpdateUserRequest {
            role: None,
            is_active: None,
            is_staff: None,
            is_superuser: None,
            is_verified: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            cin_number: None,
        }
    }

    #[test]
    fn test_superuser_cannot_strip_own_superuser_flag() {
        let actor = admin(1, true);
        let mut req = request();
        req.is_superuser = Some(false);

        assert!(check_self_demotion(&actor, 1, &req).is_err());
        // Stripping someone else's flag is allowed
        assert!(check_self_demotion(&actor, 2, &req).is_ok());
    }

    #[test]
    fn test_non_superuser_cannot_strip_own_staff_flag() {
        let actor = admin(1, false);
        let mut req = request();
        req.is_staff = Some(false);

        assert!(check_self_demotion(&actor, 1, &req).is_err());
    }

    #[test]
    fn test_superuser_may_strip_own_staff_flag() {
        let actor = admin(1, true);
        let mut req = request();
        req.is_staff = Some(false);

        assert!(check_self_demotion(&actor, 1, &req).is_ok());
    }

    #[test]
    fn test_unrelated_self_update_passes() {
        let actor = admin(1, false);
        let mut req = request();
        req.first_name = Some("Amina".to_string());

        assert!(check_self_demotion(&actor, 1, &req).is_ok());
    }
}

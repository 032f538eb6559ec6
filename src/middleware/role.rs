//! Role-based authorization.
//!
//! Admins may access everything. Other roles must match exactly, except for
//! the staff gate, which lets admins and teachers through.
//!
//! `/api/admin` sits behind [`require_admin`] and the circulation desk behind
//! [`require_staff`]. Library routes that mix reads and writes take a
//! [`RequireStaff`] extractor on the writing handlers instead.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schoolhub_auth::UserRole;
use schoolhub_core::AppError;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const ADMIN_REQUIRED: &str = "Forbidden - admin access required";
pub const STAFF_REQUIRED: &str = "Forbidden - staff access required";

/// Passes when the caller's role is one of `allowed_roles`.
pub async fn require_roles(
    state: AppState,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
    denial: &str,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(denial.to_string()));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/", get(list_users))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(state, req, next, &[UserRole::Admin], ADMIN_REQUIRED).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Admin or teacher. Layered over the circulation desk routes.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        state,
        req,
        next,
        &[UserRole::Admin, UserRole::Teacher],
        STAFF_REQUIRED,
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Extractor form of [`require_admin`].
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_admin() {
            return Err(AppError::forbidden(ADMIN_REQUIRED.to_string()));
        }

        Ok(RequireAdmin(auth_user))
    }
}

/// Extractor form of [`require_staff`].
#[derive(Debug, Clone)]
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_staff() {
            return Err(AppError::forbidden(STAFF_REQUIRED.to_string()));
        }

        Ok(RequireStaff(auth_user))
    }
}

/// Admins access everything; any other role must equal `required`.
pub fn can_access(role: UserRole, required: UserRole) -> bool {
    role == UserRole::Admin || role == required
}

pub fn check_role(auth_user: &AuthUser, required_role: UserRole) -> Result<(), AppError> {
    if !can_access(auth_user.role(), required_role) {
        return Err(AppError::forbidden(format!(
            "Forbidden - {} access required",
            required_role
        )));
    }

    Ok(())
}

pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles
        .iter()
        .any(|required| can_access(auth_user.role(), *required))
    {
        let names: Vec<&str> = allowed_roles.iter().map(|r| r.as_str()).collect();
        return Err(AppError::forbidden(format!(
            "Forbidden - requires one of: {}",
            names.join(", ")
        )));
    }

    Ok(())
}

/// The caller is `owner_id`, or is staff.
pub fn check_self_or_staff(auth_user: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if auth_user.is_staff() || auth_user.user_id()? == owner_id {
        return Ok(());
    }

    Err(AppError::forbidden(
        "Forbidden - you can only access your own records".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhub_auth::Claims;

    fn user(role: UserRole) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@school.edu".to_string(),
            role,
            iss: "school-management-system".to_string(),
            exp: 9999999999,
            iat: 1234567890,
            nbf: 1234567890,
        })
    }

    #[test]
    fn test_admin_can_access_everything() {
        for role in UserRole::ALL {
            assert!(can_access(UserRole::Admin, role));
        }
    }

    #[test]
    fn test_check_role() {
        assert!(check_role(&user(UserRole::Teacher), UserRole::Teacher).is_ok());
        let err = check_role(&user(UserRole::Student), UserRole::Teacher).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.error.to_string(), "Forbidden - teacher access required");
    }

    #[test]
    fn test_check_any_role() {
        let allowed = [UserRole::Teacher, UserRole::Student];
        assert!(check_any_role(&user(UserRole::Student), &allowed).is_ok());
        assert!(check_any_role(&user(UserRole::Admin), &allowed).is_ok());
        let err = check_any_role(&user(UserRole::Parent), &allowed).unwrap_err();
        assert_eq!(
            err.error.to_string(),
            "Forbidden - requires one of: teacher, student"
        );
    }

    #[test]
    fn test_check_self_or_staff() {
        let student = user(UserRole::Student);
        let own_id = student.user_id().unwrap();
        assert!(check_self_or_staff(&student, own_id).is_ok());
        assert!(check_self_or_staff(&student, Uuid::new_v4()).is_err());
        assert!(check_self_or_staff(&user(UserRole::Teacher), own_id).is_ok());
    }
}

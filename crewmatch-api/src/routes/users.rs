/// User account endpoints
///
/// Account management for the authenticated caller, the invitation inbox, and
/// skill-based post recommendations. Every handler receives the principal as
/// an explicit `AuthContext` extension inserted by the JWT middleware.
///
/// # Endpoints
///
/// - `GET /v1/users` - Admin only: list all users
/// - `PUT /v1/users/:id` - Update own account
/// - `DELETE /v1/users/:id` - Delete own account
/// - `GET /v1/users/invitations` - List invitations addressed to the caller
/// - `POST /v1/users/invitations/:post_id/accept` - Accept an invitation
/// - `POST /v1/users/invitations/:post_id/reject` - Reject an invitation
/// - `GET /v1/users/joined` - Posts the caller was accepted into
/// - `GET /v1/users/recommended` - Posts matching the caller's skills

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewmatch_shared::{
    auth::{middleware::AuthContext, password},
    models::{
        invitation::{Invitation, InvitationStatus, InvitationSummary, StatusChange},
        post::Post,
        skill,
        user::{Role, UpdateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{MessageResponse, UserResponse};

/// Update user request
///
/// All fields optional; only present fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New profile text
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    pub bio: Option<String>,

    /// New role; only VOLUNTEER or ORGANIZER are accepted
    pub role: Option<Role>,

    /// Replacement skill set; ignored when empty
    pub skills: Option<Vec<String>>,

    /// New password (will be validated for strength and hashed)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// List invitations response
#[derive(Debug, Serialize)]
pub struct InvitationsResponse {
    /// Invitations addressed to the caller
    pub invitations: Vec<InvitationSummary>,
}

/// Fetches the caller's account row
///
/// A valid token for a deleted account is treated as unauthorized.
async fn current_user(state: &AppState, auth: &AuthContext) -> ApiResult<User> {
    User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))
}

/// List all users (admin only)
///
/// The caller's role is read from the store, not the token, so demotions take
/// effect immediately.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let caller = current_user(&state, &auth).await?;

    if caller.role != Role::Admin {
        return Err(ApiError::Forbidden("You are not authorized".to_string()));
    }

    let users = User::list(&state.db).await?;

    Ok(Json(users.into_iter().map(UserResponse::from_user).collect()))
}

/// Update own account
///
/// Accepts a partial field set. A username change is checked for collision
/// first; a role change is restricted to VOLUNTEER/ORGANIZER; a password is
/// strength-checked and hashed. Field writes and skill replacement commit in
/// one transaction.
///
/// # Errors
///
/// - `400 Bad Request`: Disallowed role value
/// - `403 Forbidden`: Path id is not the caller's id
/// - `404 Not Found`: No such user
/// - `409 Conflict`: Username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    if user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You are not authorized for this ID".to_string(),
        ));
    }

    req.validate().map_err(validation_errors)?;

    if let Some(role) = req.role {
        if !role.is_self_assignable() {
            return Err(ApiError::BadRequest(
                "Invalid role. Only volunteer or organizer roles are allowed.".to_string(),
            ));
        }
    }

    if let Some(ref username) = req.username {
        if User::username_taken(&state.db, username, auth.user_id).await? {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }
    }

    let password_hash = match req.password {
        Some(ref password) => {
            password::validate_password_strength(password).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(password)?)
        }
        None => None,
    };

    let update = UpdateUser {
        username: req.username,
        email: req.email,
        bio: req.bio,
        role: req.role,
        password_hash,
    };

    let skills = req.skills.as_deref().filter(|s| !s.is_empty());

    let user = User::update_with_skills(&state.db, auth.user_id, update, skills)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let skills = skill::list_for_user(&state.db, user.id).await?;

    Ok(Json(UserResponse::with_skills(user, skills)))
}

/// Delete own account
///
/// # Errors
///
/// - `403 Forbidden`: Path id is not the caller's id
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You are not authorized for this ID".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// List invitations addressed to the caller
///
/// # Errors
///
/// - `404 Not Found`: The caller has no invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<InvitationsResponse>> {
    let invitations = Invitation::list_for_user(&state.db, auth.user_id).await?;

    if invitations.is_empty() {
        return Err(ApiError::NotFound("No invitations found".to_string()));
    }

    Ok(Json(InvitationsResponse { invitations }))
}

/// Accept an invitation to a post
///
/// A single conditional write: accepting twice returns 400 without touching
/// the row again.
///
/// # Errors
///
/// - `400 Bad Request`: Already accepted for this post
/// - `404 Not Found`: No invitation for this post
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    match Invitation::set_status(&state.db, post_id, auth.user_id, InvitationStatus::Accepted)
        .await?
    {
        StatusChange::Updated => Ok(Json(MessageResponse::new("Post accepted successfully"))),
        StatusChange::AlreadySet => Err(ApiError::BadRequest(
            "User is already accepted for this post".to_string(),
        )),
        StatusChange::NotFound => Err(ApiError::NotFound(
            "Invitation not found or unauthorized".to_string(),
        )),
    }
}

/// Reject an invitation to a post
///
/// Rejecting an already-rejected invitation returns 400 without writing.
///
/// # Errors
///
/// - `400 Bad Request`: Invitation rejected already
/// - `404 Not Found`: Unknown post, or no invitation for (post, caller)
pub async fn reject_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if Post::find_by_id(&state.db, post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    match Invitation::set_status(&state.db, post_id, auth.user_id, InvitationStatus::Rejected)
        .await?
    {
        StatusChange::Updated => Ok(Json(MessageResponse::new("Post rejected successfully"))),
        StatusChange::AlreadySet => Err(ApiError::BadRequest(
            "Invitation rejected already".to_string(),
        )),
        StatusChange::NotFound => Err(ApiError::NotFound(
            "Invitation not found or unauthorized".to_string(),
        )),
    }
}

/// List posts the caller has been accepted into
///
/// An empty result is a 200 with an explanatory message, not a 404.
pub async fn joined_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<axum::response::Response> {
    use axum::response::IntoResponse;

    let posts = Post::joined_by_user(&state.db, auth.user_id).await?;

    if posts.is_empty() {
        return Ok(
            Json(MessageResponse::new("User was not accepted to a post yet")).into_response(),
        );
    }

    Ok(Json(posts).into_response())
}

/// List posts whose required skills intersect the caller's skills
///
/// # Errors
///
/// - `404 Not Found`: No posts match the caller's skills
pub async fn recommended_posts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Post>>> {
    let posts = Post::matching_user_skills(&state.db, auth.user_id).await?;

    if posts.is_empty() {
        return Err(ApiError::NotFound(
            "No posts available matching your skills".to_string(),
        ));
    }

    Ok(Json(posts))
}

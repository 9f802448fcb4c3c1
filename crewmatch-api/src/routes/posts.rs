/// Post endpoints
///
/// Post lifecycle, applications, organizer invitations, and the organizer's
/// decisions over applicants. Ownership checks compare the post's stored
/// owner against the authenticated principal; role checks read the caller's
/// row so a stale token cannot widen permissions.
///
/// # Endpoints
///
/// - `GET /v1/posts` - List all posts
/// - `POST /v1/posts` - Create a post (organizer or admin)
/// - `GET /v1/posts/:id` - Fetch one post
/// - `PUT /v1/posts/:id` - Update own post
/// - `DELETE /v1/posts/:id` - Delete own post
/// - `GET /v1/posts/:id/applicants` - Pending applicants
/// - `GET /v1/posts/:id/accepted` - Accepted users
/// - `GET /v1/posts/:id/recommended` - Users matching the post's skills
/// - `POST /v1/posts/:id/apply` - Apply to a post
/// - `POST /v1/posts/:id/invite/:username` - Invite a user by username
/// - `POST /v1/posts/:id/accept/:user_id` - Accept an applicant
/// - `POST /v1/posts/:id/reject/:user_id` - Reject an applicant

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewmatch_shared::{
    auth::middleware::AuthContext,
    models::{
        invitation::{Invitation, InvitationStatus, StatusChange},
        post::{CreatePost, Post, UpdatePost},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{MessageResponse, UserResponse};

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Post description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Required skill names
    pub skills: Option<Vec<String>>,
}

/// Update post request
///
/// All fields optional; only present fields are written.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// Replacement required-skill set; ignored when empty
    pub skills: Option<Vec<String>>,
}

/// Fetches a post or fails with 404
async fn find_post(state: &AppState, post_id: Uuid) -> ApiResult<Post> {
    Post::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// Fetches a post and verifies the caller owns it
async fn find_owned_post(state: &AppState, post_id: Uuid, auth: &AuthContext) -> ApiResult<Post> {
    let post = find_post(state, post_id).await?;

    if post.owner_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You are not the owner of this post".to_string(),
        ));
    }

    Ok(post)
}

/// List all posts, newest first
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    let posts = Post::list(&state.db).await?;
    Ok(Json(posts))
}

/// Create a post
///
/// The caller's role comes from the store; only organizers and admins may
/// create posts.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a volunteer
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<Json<Post>> {
    req.validate().map_err(validation_errors)?;

    let caller = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    if !caller.role.can_create_posts() {
        return Err(ApiError::Forbidden(
            "Only organizers can create posts".to_string(),
        ));
    }

    let post = Post::create(
        &state.db,
        CreatePost {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            skills: req.skills.unwrap_or_default(),
        },
    )
    .await?;

    Ok(Json(post))
}

/// Fetch one post
///
/// # Errors
///
/// - `404 Not Found`: Unknown post
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Post>> {
    let post = find_post(&state, post_id).await?;
    Ok(Json(post))
}

/// Update own post
///
/// Field writes and skill replacement commit in one transaction.
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<Json<Post>> {
    req.validate().map_err(validation_errors)?;

    find_owned_post(&state, post_id, &auth).await?;

    let update = UpdatePost {
        title: req.title,
        description: req.description,
    };

    let skills = req.skills.as_deref().filter(|s| !s.is_empty());

    let post = Post::update_with_skills(&state.db, post_id, update, skills)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Delete own post
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    find_owned_post(&state, post_id, &auth).await?;

    let deleted = Post::delete(&state.db, post_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// List pending applicants for own post
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post
pub async fn list_applicants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    find_owned_post(&state, post_id, &auth).await?;

    let users =
        Invitation::users_with_status(&state.db, post_id, InvitationStatus::Pending).await?;

    Ok(Json(users.into_iter().map(UserResponse::from_user).collect()))
}

/// List accepted users for own post
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post
pub async fn list_accepted(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    find_owned_post(&state, post_id, &auth).await?;

    let users =
        Invitation::users_with_status(&state.db, post_id, InvitationStatus::Accepted).await?;

    Ok(Json(users.into_iter().map(UserResponse::from_user).collect()))
}

/// List users whose skills match own post's required skills
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post, or no users match
pub async fn recommended_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    find_owned_post(&state, post_id, &auth).await?;

    let users = Post::recommended_users(&state.db, post_id).await?;

    if users.is_empty() {
        return Err(ApiError::NotFound(
            "No users available matching this post's skills".to_string(),
        ));
    }

    Ok(Json(users.into_iter().map(UserResponse::from_user).collect()))
}

/// Apply to a post
///
/// Creates a pending relation. Owners cannot apply to their own posts, and a
/// second application is rejected by the insert-if-absent write.
///
/// # Errors
///
/// - `400 Bad Request`: Caller owns the post
/// - `404 Not Found`: Unknown post
/// - `409 Conflict`: Already applied or invited
pub async fn apply_to_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let post = find_post(&state, post_id).await?;

    if post.owner_id == auth.user_id {
        return Err(ApiError::BadRequest(
            "You cannot apply to your own post".to_string(),
        ));
    }

    let created = Invitation::create(&state.db, post_id, auth.user_id).await?;
    if created.is_none() {
        return Err(ApiError::Conflict(
            "User has already applied or been invited to this post".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("Applied to post successfully")))
}

/// Invite a user to own post by username
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post or username
/// - `409 Conflict`: User already applied or invited
pub async fn invite_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((post_id, username)): Path<(Uuid, String)>,
) -> ApiResult<Json<MessageResponse>> {
    find_owned_post(&state, post_id, &auth).await?;

    let invitee = User::find_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let created = Invitation::create(&state.db, post_id, invitee.id).await?;
    if created.is_none() {
        return Err(ApiError::Conflict(
            "User has already applied or been invited to this post".to_string(),
        ));
    }

    Ok(Json(MessageResponse::new("User invited successfully")))
}

/// Accept an applicant on own post
///
/// A single conditional write; accepting twice returns 400 without touching
/// the row again.
///
/// # Errors
///
/// - `400 Bad Request`: Applicant already accepted
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post, or no application from this user
pub async fn accept_applicant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((post_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    find_owned_post(&state, post_id, &auth).await?;

    match Invitation::set_status(&state.db, post_id, user_id, InvitationStatus::Accepted).await? {
        StatusChange::Updated => Ok(Json(MessageResponse::new("Applicant accepted successfully"))),
        StatusChange::AlreadySet => Err(ApiError::BadRequest(
            "User is already accepted for this post".to_string(),
        )),
        StatusChange::NotFound => Err(ApiError::NotFound(
            "Application not found for this user".to_string(),
        )),
    }
}

/// Reject an applicant on own post
///
/// # Errors
///
/// - `400 Bad Request`: Applicant already rejected
/// - `403 Forbidden`: Caller does not own the post
/// - `404 Not Found`: Unknown post, or no application from this user
pub async fn reject_applicant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((post_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    find_owned_post(&state, post_id, &auth).await?;

    match Invitation::set_status(&state.db, post_id, user_id, InvitationStatus::Rejected).await? {
        StatusChange::Updated => Ok(Json(MessageResponse::new("Applicant rejected successfully"))),
        StatusChange::AlreadySet => Err(ApiError::BadRequest(
            "User is already rejected for this post".to_string(),
        )),
        StatusChange::NotFound => Err(ApiError::NotFound(
            "Application not found for this user".to_string(),
        )),
    }
}

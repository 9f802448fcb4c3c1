/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use crewmatch_shared::auth::middleware;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # API v1
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /users/                      # JWT required
///     │   ├── GET    /                 # Admin only: list all users
///     │   ├── PUT    /:id              # Update own account
///     │   ├── DELETE /:id              # Delete own account
///     │   ├── GET    /invitations
///     │   ├── POST   /invitations/:post_id/accept
///     │   ├── POST   /invitations/:post_id/reject
///     │   ├── GET    /joined
///     │   └── GET    /recommended
///     └── /posts/                      # JWT required
///         ├── GET    /
///         ├── POST   /
///         ├── GET    /:id
///         ├── PUT    /:id
///         ├── DELETE /:id
///         ├── GET    /:id/applicants
///         ├── GET    /:id/accepted
///         ├── GET    /:id/recommended
///         ├── POST   /:id/apply
///         ├── POST   /:id/invite/:username
///         ├── POST   /:id/accept/:user_id
///         └── POST   /:id/reject/:user_id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // User routes (require JWT authentication)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .route("/invitations", get(routes::users::list_invitations))
        .route(
            "/invitations/:post_id/accept",
            post(routes::users::accept_invitation),
        )
        .route(
            "/invitations/:post_id/reject",
            post(routes::users::reject_invitation),
        )
        .route("/joined", get(routes::users::joined_posts))
        .route("/recommended", get(routes::users::recommended_posts))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Post routes (require JWT authentication)
    let post_routes = Router::new()
        .route("/", get(routes::posts::list_posts))
        .route("/", post(routes::posts::create_post))
        .route("/:id", get(routes::posts::get_post))
        .route("/:id", put(routes::posts::update_post))
        .route("/:id", delete(routes::posts::delete_post))
        .route("/:id/applicants", get(routes::posts::list_applicants))
        .route("/:id/accepted", get(routes::posts::list_accepted))
        .route("/:id/recommended", get(routes::posts::recommended_users))
        .route("/:id/apply", post(routes::posts::apply_to_post))
        .route("/:id/invite/:username", post(routes::posts::invite_user))
        .route("/:id/accept/:user_id", post(routes::posts::accept_applicant))
        .route("/:id/reject/:user_id", post(routes::posts::reject_applicant))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/posts", post_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects an `AuthContext` into request
/// extensions, so handlers receive the principal as an explicit argument.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = middleware::authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

//! Account handlers: registration, login and profile.
//!
//! ```text
//! POST /auth/register {"username":"ada","email":"ada@example.com","password":"pw"}
//! POST /auth/login {"email":"ada@example.com","password":"pw"}
//! GET /auth/profile   (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AuthenticatedSession, Error, INVALID_CREDENTIALS_MESSAGE, LoginCredentials, RegistrationDetails,
    RegistrationValidationError, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorResponse;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account summary plus bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    /// HS256 JWT valid for 30 days.
    pub token: String,
}

impl From<AuthenticatedSession> for AuthResponse {
    fn from(session: AuthenticatedSession) -> Self {
        let AuthenticatedSession { user, token } = session;
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            is_admin: user.is_admin(),
            token: token.as_str().to_owned(),
        }
    }
}

/// Public profile of the authenticated user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub points: u32,
    #[schema(example = json!(["Recycling Enthusiast"]))]
    pub badges: Vec<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            is_admin: user.is_admin(),
            points: user.points(),
            badges: user.badges().iter().map(ToString::to_string).collect(),
        }
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let field = match &err {
        RegistrationValidationError::EmptyPassword => "password",
        RegistrationValidationError::User(
            UserValidationError::EmptyUsername | UserValidationError::UsernameTooLong { .. },
        ) => "username",
        RegistrationValidationError::User(_) => "email",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Create an account and return a bearer token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let details = RegistrationDetails::try_from_parts(&username, &email, &password)
        .map_err(map_registration_error)?;
    let session = state.registration.register(details).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    // Blank fields fail exactly like a wrong password.
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|_| Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))?;
    let session = state.login.login(&credentials).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// Profile of the caller.
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tags = ["auth"],
    operation_id = "getProfile",
    security(("bearerAuth" = []))
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = state.profile.fetch_profile(caller.id()).await?;
    Ok(web::Json(ProfileResponse::from(user)))
}

/// Register the account routes under `/auth`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(profile),
    );
}

use crate::{
    auth::{extractors::AuthenticatedUserId, hash_password, normalize_email, RegisterRequest},
    config::Config,
    error::AppError,
    store::UserStore,
};
use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns its public profile (the password
/// hash and reset fields are never serialized). Duplicate email or username
/// answers 409 via the store's unique constraints, so concurrent registrations
/// cannot race past an existence pre-check.
#[post("")]
pub async fn register(
    users: web::Data<UserStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let email = normalize_email(&register_data.email);
    let password_hash = hash_password(&register_data.password)?;

    let profile = users
        .insert(&register_data.username, &email, &password_hash)
        .await?;

    Ok(HttpResponse::Created().json(profile))
}

/// Current user's profile
///
/// Requires a bearer session token; answers the stripped profile of the
/// authenticated user.
#[get("/me")]
pub async fn me(
    users: web::Data<UserStore>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    match users.profile(user_id.0).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Gate for the administrative lock endpoints: the request must carry the
/// configured privileged key in `X-Admin-Key`.
fn require_admin_key(req: &HttpRequest, config: &Config) -> Result<(), AppError> {
    let presented = req
        .headers()
        .get("X-Admin-Key")
        .and_then(|value| value.to_str().ok());
    match presented {
        None => Err(AppError::Forbidden("Missing admin key".into())),
        Some(key) if key == config.admin_api_key => Ok(()),
        Some(_) => Err(AppError::Forbidden("Invalid admin key".into())),
    }
}

/// Lock an account
///
/// Privileged operation. While locked, the account cannot log in even with
/// valid credentials. The flip is a single conditional UPDATE.
#[put("/{id}/lock")]
pub async fn lock(
    users: web::Data<UserStore>,
    config: web::Data<Config>,
    user_id: web::Path<i32>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    require_admin_key(&req, &config)?;
    match users.set_locked(user_id.into_inner(), true).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

/// Unlock an account
///
/// Privileged operation; restores normal login for the account.
#[put("/{id}/unlock")]
pub async fn unlock(
    users: web::Data<UserStore>,
    config: web::Data<Config>,
    user_id: web::Path<i32>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    require_admin_key(&req, &config)?;
    match users.set_locked(user_id.into_inner(), false).await? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}

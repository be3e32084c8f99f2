use crate::{
    auth::{
        issue_token, normalize_email, verify_password, AuthResponse, ForgotPasswordRequest,
        LoginRequest, ResetPasswordRequest,
    },
    auth::{hash_password, token::RESET_TTL_HOURS, verify_token, TokenError, TokenPurpose},
    config::Config,
    email::{EmailMessage, Mailer},
    error::AppError,
    rate_limit::RateLimiter,
    store::UserStore,
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// The caller identity a rate-limit window is keyed on. Peer IP is enough for
/// this deployment shape; a reverse proxy would need the forwarded address.
fn caller_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Login user
///
/// Authenticates a user and returns a session token. The failed-attempt
/// limiter is consulted before the credential store is touched, and only
/// failed outcomes are recorded against the caller's window.
///
/// Unknown email and wrong password produce the same generic 401; a locked
/// account answers 423, and that check deliberately runs after credential
/// verification (observed behavior of the flow this replaces).
#[post("/login")]
pub async fn login(
    users: web::Data<UserStore>,
    limiter: web::Data<RateLimiter>,
    login_data: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let caller = caller_key(&req);
    if let Some(retry_after) = limiter.check(&caller).await {
        return Err(AppError::TooManyRequests { retry_after });
    }

    let email = normalize_email(&login_data.email);
    let user = match users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            limiter.record(&caller).await;
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        limiter.record(&caller).await;
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    // Lock check runs after the credential check.
    if user.locked {
        limiter.record(&caller).await;
        return Err(AppError::Locked("Account is locked".into()));
    }

    let token = issue_token(user.id, TokenPurpose::Session)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Request a password-reset link
///
/// Always answers the same generic acknowledgment, whether or not the email
/// is registered, so the endpoint cannot be used to enumerate accounts. When
/// the account exists, a one-hour reset token is issued, persisted on the row
/// (only the two reset columns are written), and mailed as a link. A mail
/// transport failure surfaces as a 500; the send is awaited, not
/// fire-and-forget.
#[post("/forgot-password")]
pub async fn forgot_password(
    users: web::Data<UserStore>,
    config: web::Data<Config>,
    mailer: web::Data<dyn Mailer>,
    request_data: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, AppError> {
    request_data.validate()?;

    let email = normalize_email(&request_data.email);
    if let Some(user) = users.find_by_email(&email).await? {
        let token = issue_token(user.id, TokenPurpose::Reset)?;
        let expires_at = chrono::Utc::now() + chrono::Duration::hours(RESET_TTL_HOURS);
        users.set_reset_token(user.id, &token, expires_at).await?;

        let link = config.reset_link(&token);
        mailer.send(&EmailMessage {
            to: user.email.clone(),
            subject: "Reset your password".to_string(),
            body: format!(
                "Hi {},\n\nFollow this link to choose a new password:\n{}\n\n\
                 The link is valid for one hour. If you did not request a reset, \
                 you can ignore this message.",
                user.username, link
            ),
        })?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "If that email is registered, a password reset link has been sent"
    })))
}

/// Complete a password reset
///
/// Checks, in order: confirmation match and strength policy (400), token
/// signature/expiry/purpose (400, generic message), and finally the stored
/// token. The last step is one conditional UPDATE that rehashes the password
/// and clears the token columns, so a token can be consumed exactly once and
/// a rotated or expired token matches zero rows.
#[post("/reset-password/{token}")]
pub async fn reset_password(
    users: web::Data<UserStore>,
    token: web::Path<String>,
    reset_data: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, AppError> {
    reset_data.validate()?;

    let token = token.into_inner();
    let claims = verify_token(&token, TokenPurpose::Reset).map_err(|e| match e {
        TokenError::Internal(msg) => AppError::Internal(msg),
        TokenError::Expired | TokenError::Invalid => {
            AppError::Validation("Invalid or expired reset token".into())
        }
    })?;

    let new_hash = hash_password(&reset_data.password)?;
    let consumed = users
        .consume_reset_token(claims.sub, &token, &new_hash)
        .await?;
    if !consumed {
        return Err(AppError::Validation("Invalid or expired reset token".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password updated"
    })))
}

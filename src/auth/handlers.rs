use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::{ApiError, is_duplicate_key},
    model::role::Role,
    models::{LoginReqDto, TokenType, UserReq, UserSql},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;

/// User registration handler
pub async fn register(
    user: web::Json<UserReq>,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let username = user.username.trim();

    if username.is_empty() || user.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "Username and password must not be empty".into(),
        ));
    }

    if Role::from_id(user.role_id).is_none() {
        return Err(ApiError::InvalidInput("Unknown role id".into()));
    }

    let hashed = hash_password(&user.password);

    sqlx::query(
        r#"INSERT INTO users (username, password, role_id, employee_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(username)
    .bind(&hashed)
    .bind(user.role_id)
    .bind(user.employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        if is_duplicate_key(&e) {
            ApiError::Conflict("Username already exists".into())
        } else {
            ApiError::from(e)
        }
    })?;

    info!(username, role_id = user.role_id, "User registered");

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Login handler: verifies credentials and issues access + refresh tokens.
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let user = sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, username, password, role_id, employee_id
        FROM users
        WHERE username = ? AND is_active = 1
        "#,
    )
    .bind(&payload.username)
    .fetch_optional(pool.get_ref())
    .await?;

    let Some(user) = user else {
        return Err(ApiError::Forbidden("Invalid username or password".into()));
    };

    if !verify_password(&payload.password, &user.password) {
        return Err(ApiError::Forbidden("Invalid username or password".into()));
    }

    let access_token = generate_access_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh_token = generate_refresh_token(
        user.id,
        user.username.clone(),
        user.role_id,
        user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    info!(username = %user.username, "Login succeeded");

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "Bearer",
        "expires_in": config.access_token_ttl,
    })))
}

#[derive(Deserialize)]
pub struct RefreshReq {
    pub refresh_token: String,
}

/// Exchanges a valid refresh token for a new access token.
pub async fn refresh_token(
    payload: web::Json<RefreshReq>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let claims = verify_token(&payload.refresh_token, &config.jwt_secret)
        .map_err(|_| ApiError::Forbidden("Invalid or expired refresh token".into()))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Forbidden("Not a refresh token".into()));
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub,
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": config.access_token_ttl,
    })))
}

//! Bearer-token auth gate. Requests carry `Authorization: Bearer <jwt>`;
//! the extractor resolves the token into an owner id before any handler
//! logic runs, so unauthenticated requests never reach the service layer.

use std::future::{ready, Ready};
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{post, web, FromRequest, HttpRequest, HttpResponse};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tasknest_shared::{CredentialsRequest, TokenResponse};

use crate::error::ApiError;
use crate::store::TaskStore;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: u64,
}

impl AuthKeys {
    pub fn new(secret: &str, token_ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    pub fn issue_token(&self, user_id: i64) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl_secs) as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    fn verify_token(&self, token: &str) -> Result<i64, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::Auth)?;
        data.claims.sub.parse().map_err(|_| ApiError::Auth)
    }
}

/// The resolved identity of the calling user.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub id: i64,
}

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve_identity(req))
    }
}

fn resolve_identity(req: &HttpRequest) -> Result<AuthedUser, ApiError> {
    let keys = req
        .app_data::<web::Data<AuthKeys>>()
        .ok_or(ApiError::Auth)?;
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Auth)?;
    let token = value.strip_prefix("Bearer ").ok_or(ApiError::Auth)?;
    keys.verify_token(token).map(|id| AuthedUser { id })
}

fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[post("/register")]
pub async fn register(
    store: web::Data<TaskStore>,
    keys: web::Data<AuthKeys>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password are required".to_string(),
        ));
    }
    let hash = hash_password(&body.password);
    let Some(user_id) = store.create_user(body.username.trim(), &hash)? else {
        return Err(ApiError::Conflict("username already taken".to_string()));
    };
    log::info!("registered user {}", body.username.trim());
    let access_token = keys.issue_token(user_id)?;
    Ok(HttpResponse::Created().json(TokenResponse { access_token }))
}

#[post("/login")]
pub async fn login(
    store: web::Data<TaskStore>,
    keys: web::Data<AuthKeys>,
    body: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = store
        .find_user_by_username(body.username.trim())?
        .ok_or(ApiError::Auth)?;
    if user.password_hash != hash_password(&body.password) {
        return Err(ApiError::Auth);
    }
    let access_token = keys.issue_token(user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse { access_token }))
}

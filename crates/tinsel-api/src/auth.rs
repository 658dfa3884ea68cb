use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;

use tinsel_db::Database;
use tinsel_types::api::{AuthRequest, AuthResponse, Claims, KidProfile, ParentProfile, UserProfile};
use tinsel_types::models::Role;

use crate::error::ApiError;
use crate::reply::ElfReplier;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub replier: ElfReplier,
}

const TOKEN_DAYS: i64 = 7;
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

pub async fn dispatch(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    match req {
        AuthRequest::ParentRegister {
            email,
            password,
            name,
        } => parent_register(&state, email, password, name),
        AuthRequest::ParentLogin { email, password } => parent_login(&state, email, password),
        AuthRequest::KidRegister {
            username,
            password,
            name,
            age,
            parent_code,
        } => kid_register(&state, username, password, name, age, parent_code),
        AuthRequest::KidLogin { username, password } => kid_login(&state, username, password),
    }
}

fn parent_register(
    state: &AppStateInner,
    email: String,
    password: String,
    name: String,
) -> Result<Json<AuthResponse>, ApiError> {
    if state.db.get_parent_by_email(&email)?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&password)?;
    let parent_code = generate_join_code();

    let id = state
        .db
        .create_parent(&email, &password_hash, &name, &parent_code)?;
    let token = create_token(&state.jwt_secret, id, Role::Parent)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::Parent(ParentProfile {
            id,
            email,
            name,
            parent_code,
            subscription_status: None,
            response_mode: None,
        }),
    }))
}

fn parent_login(
    state: &AppStateInner,
    email: String,
    password: String,
) -> Result<Json<AuthResponse>, ApiError> {
    // Same message whether the email is unknown or the password is wrong.
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());

    let parent = state.db.get_parent_by_email(&email)?.ok_or_else(invalid)?;
    verify_password(&password, &parent.password).map_err(|_| invalid())?;

    let token = create_token(&state.jwt_secret, parent.id, Role::Parent)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::Parent(ParentProfile {
            id: parent.id,
            email: parent.email,
            name: parent.name,
            parent_code: parent.parent_code,
            subscription_status: Some(parent.subscription_status),
            response_mode: Some(parent.response_mode),
        }),
    }))
}

fn kid_register(
    state: &AppStateInner,
    username: String,
    password: String,
    name: String,
    age: i64,
    parent_code: String,
) -> Result<Json<AuthResponse>, ApiError> {
    let parent_id = state
        .db
        .get_parent_id_by_code(&parent_code)?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid parent code. Ask your parent for the correct code!".into())
        })?;

    if state.db.get_kid_by_username(&username)?.is_some() {
        return Err(ApiError::BadRequest(
            "That username is taken. Try another one!".into(),
        ));
    }

    let password_hash = hash_password(&password)?;
    let id = state
        .db
        .create_kid(parent_id, &username, &password_hash, &name, age)?;
    let token = create_token(&state.jwt_secret, id, Role::Kid)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::Kid(KidProfile {
            id,
            username,
            name,
            age,
            elf_id: None,
        }),
    }))
}

fn kid_login(
    state: &AppStateInner,
    username: String,
    password: String,
) -> Result<Json<AuthResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Wrong username or password. Try again!".into());

    let kid = state.db.get_kid_by_username(&username)?.ok_or_else(invalid)?;
    verify_password(&password, &kid.password).map_err(|_| invalid())?;

    let token = create_token(&state.jwt_secret, kid.id, Role::Kid)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::Kid(KidProfile {
            id: kid.id,
            username: kid.username,
            name: kid.name,
            age: kid.age,
            elf_id: kid.elf_id,
        }),
    }))
}

pub fn create_token(secret: &str, id: i64, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        id,
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Hash a password with Argon2id.
pub(crate) fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<()> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("bad password hash: {}", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| anyhow!("password mismatch: {}", e))
}

/// Short code a parent shares with their kid to link accounts.
fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

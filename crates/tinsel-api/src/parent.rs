use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use tinsel_types::api::{
    Claims, CodeResponse, CreateKidRequest, CreateKidResponse, KidProfile, KidSummary,
    MessageResponse, RespondRequest, SettingsRequest,
};
use tinsel_types::models::ResponseMode;

use crate::auth::AppState;
use crate::error::ApiError;

/// Parent administration is dispatched by a query-string `action` plus the
/// HTTP method; a known action on the wrong method is 405, an unknown
/// action is 400.
#[derive(Debug, Deserialize)]
pub struct ParentQuery {
    #[serde(default)]
    pub action: String,
}

const ACTIONS_HINT: &str = "Invalid action. Use ?action=kids|create-kid|settings|respond|code";

pub async fn get_dispatch(
    State(state): State<AppState>,
    Query(query): Query<ParentQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Response, ApiError> {
    // The route middleware has already vouched for a parent token.
    let parent_id = claims.id;

    match query.action.as_str() {
        "kids" => {
            let kids: Vec<KidSummary> = state
                .db
                .kids_for_parent(parent_id)?
                .into_iter()
                .map(|k| KidSummary {
                    id: k.id,
                    username: k.username,
                    name: k.name,
                    age: k.age,
                    elf_id: k.elf_id,
                    created_at: k.created_at,
                })
                .collect();
            Ok(Json(kids).into_response())
        }
        "code" => {
            let parent = state
                .db
                .get_parent_by_id(parent_id)?
                .ok_or_else(|| anyhow::anyhow!("parent {} missing for valid token", parent_id))?;
            Ok(Json(CodeResponse {
                parent_code: parent.parent_code,
            })
            .into_response())
        }
        "create-kid" | "settings" | "respond" => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::BadRequest(ACTIONS_HINT.into())),
    }
}

pub async fn post_dispatch(
    State(state): State<AppState>,
    Query(query): Query<ParentQuery>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let parent_id = claims.id;

    match query.action.as_str() {
        "create-kid" => {
            let req: CreateKidRequest = parse_body(body)?;
            create_kid(&state, parent_id, req)
        }
        "respond" => {
            let req: RespondRequest = parse_body(body)?;
            respond(&state, parent_id, req)
        }
        "kids" | "settings" | "code" => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::BadRequest(ACTIONS_HINT.into())),
    }
}

pub async fn put_dispatch(
    State(state): State<AppState>,
    Query(query): Query<ParentQuery>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let parent_id = claims.id;

    match query.action.as_str() {
        "settings" => {
            let req: SettingsRequest = parse_body(body)?;
            state
                .db
                .set_response_mode(parent_id, req.response_mode.as_str())?;

            let label = match req.response_mode {
                ResponseMode::Ai => "AI (automatic)",
                ResponseMode::Parent => "Parent (manual)",
            };
            Ok(Json(MessageResponse {
                message: format!("Response mode set to {}", label),
            })
            .into_response())
        }
        "kids" | "create-kid" | "respond" | "code" => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::BadRequest(ACTIONS_HINT.into())),
    }
}

fn create_kid(
    state: &AppState,
    parent_id: i64,
    req: CreateKidRequest,
) -> Result<Response, ApiError> {
    if state.db.get_kid_by_username(&req.username)?.is_some() {
        return Err(ApiError::BadRequest("Username already taken".into()));
    }

    let password_hash = crate::auth::hash_password(&req.password)?;
    let id = state
        .db
        .create_kid(parent_id, &req.username, &password_hash, &req.name, req.age)?;

    Ok(Json(CreateKidResponse {
        message: format!("Account created for {}!", req.name),
        kid: KidProfile {
            id,
            username: req.username,
            name: req.name,
            age: req.age,
            elf_id: None,
        },
    })
    .into_response())
}

fn respond(state: &AppState, parent_id: i64, req: RespondRequest) -> Result<Response, ApiError> {
    // The letter must belong to one of the caller's kids.
    let owner = state.db.letter_owner(req.letter_id)?;
    match owner {
        Some(owner) if owner.parent_id == parent_id => {}
        _ => return Err(ApiError::Forbidden("Cannot access this letter".into())),
    }

    let response_at = chrono::Utc::now().to_rfc3339();
    state
        .db
        .set_letter_response(req.letter_id, &req.response, &response_at, "parent")?;

    Ok(Json(MessageResponse {
        message: "Response sent as elf! 🧝".into(),
    })
    .into_response())
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

use anyhow::anyhow;
use axum::{Json, extract::State, http::HeaderMap};

use tinsel_db::models::ElfRow;
use tinsel_types::api::{SelectElfRequest, SelectElfResponse};
use tinsel_types::models::{Elf, Role};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::verify_bearer;

/// The static catalog: all active elves, ordered by id. No token required.
pub async fn list_elves(State(state): State<AppState>) -> Result<Json<Vec<Elf>>, ApiError> {
    let elves = state
        .db
        .active_elves()?
        .into_iter()
        .map(elf_to_api)
        .collect();

    Ok(Json(elves))
}

/// Set the kid's elf friend. The update is fire-and-forget — the elf id is
/// not checked for existence up front, the schema's foreign key catches
/// garbage ids.
pub async fn select_elf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SelectElfRequest>,
) -> Result<Json<SelectElfResponse>, ApiError> {
    let claims = verify_bearer(&headers, &state.jwt_secret)
        .filter(|c| c.role == Role::Kid)
        .ok_or_else(|| ApiError::Unauthorized("Please log in first!".into()))?;

    state.db.set_kid_elf(claims.id, req.elf_id)?;

    let elf = state
        .db
        .get_elf(req.elf_id)?
        .ok_or_else(|| anyhow!("elf {} missing after selection", req.elf_id))?;

    Ok(Json(SelectElfResponse {
        message: format!("You're now friends with {}! 🧝", elf.name),
        elf: elf_to_api(elf),
    }))
}

pub(crate) fn elf_to_api(row: ElfRow) -> Elf {
    Elf {
        id: row.id,
        name: row.name,
        emoji: row.emoji,
        job: row.job,
        personality: row.personality,
        is_active: row.is_active,
    }
}

use axum::{Extension, Json, extract::State};

use tinsel_db::models::JoinedLetterRow;
use tinsel_types::api::{
    Claims, ElfBrief, KidBrief, LetterResponse, SendLetterRequest, SendLetterResponse,
};
use tinsel_types::models::{ResponseMode, Role};

use crate::auth::AppState;
use crate::error::ApiError;

/// Kid role: own letters, newest first. Parent role: letters of every owned
/// kid, or an empty list when there are none.
pub async fn get_letters(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<LetterResponse>>, ApiError> {
    let rows = match claims.role {
        Role::Kid => state.db.letters_for_kid(claims.id)?,
        Role::Parent => state.db.letters_for_parent(claims.id)?,
    };

    Ok(Json(rows.into_iter().map(joined_to_api).collect()))
}

pub async fn send_letter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendLetterRequest>,
) -> Result<Json<SendLetterResponse>, ApiError> {
    if claims.role != Role::Kid {
        return Err(ApiError::Forbidden("Only kids can send letters!".into()));
    }

    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest(
            "Please write something in your letter!".into(),
        ));
    }

    let no_elf = || ApiError::BadRequest("Please choose an elf friend first!".into());
    let kid = state.db.get_kid_by_id(claims.id)?.ok_or_else(no_elf)?;
    let elf_id = kid.elf_id.ok_or_else(no_elf)?;

    let elf = state
        .db
        .get_elf(elf_id)?
        .ok_or_else(|| anyhow::anyhow!("kid {} points at missing elf {}", kid.id, elf_id))?;

    // Parent's preference; missing or unknown values mean AI.
    let manual = state
        .db
        .get_parent_by_id(kid.parent_id)?
        .map(|p| p.response_mode == ResponseMode::Parent.as_str())
        .unwrap_or(false);

    let letter_id = state.db.insert_letter(claims.id, elf_id, content)?;
    let mut letter = state
        .db
        .get_letter(letter_id)?
        .ok_or_else(|| anyhow::anyhow!("letter {} missing after insert", letter_id))?;

    if !manual {
        // Reply immediately and patch the same row. Not a transaction: a
        // crash here leaves a pending letter, which the reader sees as
        // awaiting a reply.
        let response = state.replier.reply(&elf, &kid.name, content).await;
        let response_at = chrono::Utc::now().to_rfc3339();
        state
            .db
            .set_letter_response(letter_id, &response, &response_at, "ai")?;

        letter.response = Some(response);
        letter.response_at = Some(response_at);
        letter.responded_by = Some("ai".into());
    }

    let message = format!("Letter sent to {}! 📮✨", elf.name);
    let letter = LetterResponse {
        id: letter.id,
        kid_id: letter.kid_id,
        elf_id: letter.elf_id,
        content: letter.content,
        sent_at: letter.sent_at,
        response: letter.response,
        response_at: letter.response_at,
        responded_by: letter.responded_by,
        elves: Some(ElfBrief {
            name: elf.name,
            emoji: elf.emoji,
            job: Some(elf.job),
        }),
        kids: None,
    };

    Ok(Json(SendLetterResponse { message, letter }))
}

fn joined_to_api(row: JoinedLetterRow) -> LetterResponse {
    LetterResponse {
        id: row.letter.id,
        kid_id: row.letter.kid_id,
        elf_id: row.letter.elf_id,
        content: row.letter.content,
        sent_at: row.letter.sent_at,
        response: row.letter.response,
        response_at: row.letter.response_at,
        responded_by: row.letter.responded_by,
        elves: Some(ElfBrief {
            name: row.elf_name,
            emoji: row.elf_emoji,
            job: row.elf_job,
        }),
        kids: row.kid_name.map(|name| KidBrief { name }),
    }
}

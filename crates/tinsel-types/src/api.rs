use serde::{Deserialize, Serialize};

use crate::models::{Elf, ResponseMode, Role};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the auth handlers.
/// Canonical definition lives here in tinsel-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

/// Auth operations are dispatched by an `action` field in the request body.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum AuthRequest {
    ParentRegister {
        email: String,
        password: String,
        name: String,
    },
    ParentLogin {
        email: String,
        password: String,
    },
    #[serde(rename_all = "camelCase")]
    KidRegister {
        username: String,
        password: String,
        name: String,
        age: i64,
        parent_code: String,
    },
    KidLogin {
        username: String,
        password: String,
    },
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserProfile {
    Parent(ParentProfile),
    Kid(KidProfile),
}

#[derive(Debug, Serialize)]
pub struct ParentProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub parent_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KidProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub age: i64,
    pub elf_id: Option<i64>,
}

// -- Elves --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectElfRequest {
    pub elf_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SelectElfResponse {
    pub message: String,
    pub elf: Elf,
}

// -- Letters --

#[derive(Debug, Deserialize)]
pub struct SendLetterRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub id: i64,
    pub kid_id: i64,
    pub elf_id: i64,
    pub content: String,
    pub sent_at: String,
    pub response: Option<String>,
    pub response_at: Option<String>,
    pub responded_by: Option<String>,
    /// Display fields of the addressed elf, joined in for the reader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elves: Option<ElfBrief>,
    /// Sender display name, present only in the parent's letter view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kids: Option<KidBrief>,
}

#[derive(Debug, Serialize)]
pub struct ElfBrief {
    pub name: String,
    pub emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KidBrief {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SendLetterResponse {
    pub message: String,
    pub letter: LetterResponse,
}

// -- Parent administration --

#[derive(Debug, Serialize)]
pub struct KidSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub age: i64,
    pub elf_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateKidRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateKidResponse {
    pub message: String,
    pub kid: KidProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub response_mode: ResponseMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub letter_id: i64,
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub parent_code: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

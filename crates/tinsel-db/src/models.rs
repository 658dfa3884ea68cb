/// Database row types — these map directly to SQLite rows.
/// Distinct from the tinsel-types API models to keep the DB layer independent.

pub struct ParentRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub parent_code: String,
    pub response_mode: String,
    pub subscription_status: String,
    pub created_at: String,
}

pub struct KidRow {
    pub id: i64,
    pub parent_id: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    pub age: i64,
    pub elf_id: Option<i64>,
    pub created_at: String,
}

pub struct ElfRow {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub job: String,
    pub personality: String,
    pub is_active: bool,
}

pub struct LetterRow {
    pub id: i64,
    pub kid_id: i64,
    pub elf_id: i64,
    pub content: String,
    pub sent_at: String,
    pub response: Option<String>,
    pub response_at: Option<String>,
    pub responded_by: Option<String>,
}

/// Letter joined with display fields for the reader. The kid view carries
/// the elf's job, the parent view carries the sender's name instead.
pub struct JoinedLetterRow {
    pub letter: LetterRow,
    pub kid_name: Option<String>,
    pub elf_name: String,
    pub elf_emoji: String,
    pub elf_job: Option<String>,
}

/// Ownership chain of a letter, for the parent respond check.
pub struct LetterOwnerRow {
    pub kid_id: i64,
    pub parent_id: i64,
}

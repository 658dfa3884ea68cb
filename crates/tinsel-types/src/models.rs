use serde::{Deserialize, Serialize};

/// Account kind embedded in the identity token. Gates which operations
/// a caller may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Kid,
}

/// Parent-level setting: automatic AI replies or manual parent replies.
/// Unset or unknown values are treated as `Ai`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Ai,
    Parent,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Ai => "ai",
            ResponseMode::Parent => "parent",
        }
    }
}

/// Catalog entry for an elf a kid can befriend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elf {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub job: String,
    pub personality: String,
    pub is_active: bool,
}

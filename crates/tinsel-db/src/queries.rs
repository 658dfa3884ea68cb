use crate::Database;
use crate::models::{ElfRow, JoinedLetterRow, KidRow, LetterOwnerRow, LetterRow, ParentRow};
use anyhow::Result;
use rusqlite::Row;

impl Database {
    // -- Parents --

    pub fn create_parent(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        parent_code: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO parents (email, password, name, parent_code) VALUES (?1, ?2, ?3, ?4)",
                (email, password_hash, name, parent_code),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_parent_by_email(&self, email: &str) -> Result<Option<ParentRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{PARENT_SELECT} WHERE email = ?1"),
                [email],
                parent_from_row,
            )
            .optional()
        })
    }

    pub fn get_parent_by_id(&self, id: i64) -> Result<Option<ParentRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{PARENT_SELECT} WHERE id = ?1"), [id], parent_from_row)
                .optional()
        })
    }

    /// Resolve a join code to the owning parent's id.
    pub fn get_parent_id_by_code(&self, parent_code: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id FROM parents WHERE parent_code = ?1",
                [parent_code],
                |row| row.get(0),
            )
            .optional()
        })
    }

    pub fn set_response_mode(&self, parent_id: i64, mode: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE parents SET response_mode = ?1 WHERE id = ?2",
                (mode, parent_id),
            )?;
            Ok(())
        })
    }

    // -- Kids --

    pub fn create_kid(
        &self,
        parent_id: i64,
        username: &str,
        password_hash: &str,
        name: &str,
        age: i64,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kids (parent_id, username, password, name, age) VALUES (?1, ?2, ?3, ?4, ?5)",
                (parent_id, username, password_hash, name, age),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_kid_by_username(&self, username: &str) -> Result<Option<KidRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{KID_SELECT} WHERE username = ?1"),
                [username],
                kid_from_row,
            )
            .optional()
        })
    }

    pub fn get_kid_by_id(&self, id: i64) -> Result<Option<KidRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{KID_SELECT} WHERE id = ?1"), [id], kid_from_row)
                .optional()
        })
    }

    pub fn kids_for_parent(&self, parent_id: i64) -> Result<Vec<KidRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{KID_SELECT} WHERE parent_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([parent_id], kid_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_kid_elf(&self, kid_id: i64, elf_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE kids SET elf_id = ?1 WHERE id = ?2", (elf_id, kid_id))?;
            Ok(())
        })
    }

    // -- Elves --

    pub fn active_elves(&self) -> Result<Vec<ElfRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{ELF_SELECT} WHERE is_active = 1 ORDER BY id"))?;
            let rows = stmt
                .query_map([], elf_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_elf(&self, id: i64) -> Result<Option<ElfRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{ELF_SELECT} WHERE id = ?1"), [id], elf_from_row)
                .optional()
        })
    }

    // -- Letters --

    pub fn insert_letter(&self, kid_id: i64, elf_id: i64, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO letters (kid_id, elf_id, content) VALUES (?1, ?2, ?3)",
                (kid_id, elf_id, content),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_letter(&self, id: i64) -> Result<Option<LetterRow>> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{LETTER_SELECT} WHERE id = ?1"), [id], letter_from_row)
                .optional()
        })
    }

    /// A kid's own letters, newest first, joined with elf display fields.
    pub fn letters_for_kid(&self, kid_id: i64) -> Result<Vec<JoinedLetterRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.kid_id, l.elf_id, l.content, l.sent_at,
                        l.response, l.response_at, l.responded_by,
                        e.name, e.emoji, e.job
                 FROM letters l
                 JOIN elves e ON l.elf_id = e.id
                 WHERE l.kid_id = ?1
                 ORDER BY l.sent_at DESC, l.id DESC",
            )?;
            let rows = stmt
                .query_map([kid_id], |row| {
                    Ok(JoinedLetterRow {
                        letter: letter_from_row(row)?,
                        kid_name: None,
                        elf_name: row.get(8)?,
                        elf_emoji: row.get(9)?,
                        elf_job: Some(row.get(10)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Letters of every kid owned by a parent, newest first. Empty when the
    /// parent has no kids.
    pub fn letters_for_parent(&self, parent_id: i64) -> Result<Vec<JoinedLetterRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.kid_id, l.elf_id, l.content, l.sent_at,
                        l.response, l.response_at, l.responded_by,
                        k.name, e.name, e.emoji
                 FROM letters l
                 JOIN kids k ON l.kid_id = k.id
                 JOIN elves e ON l.elf_id = e.id
                 WHERE k.parent_id = ?1
                 ORDER BY l.sent_at DESC, l.id DESC",
            )?;
            let rows = stmt
                .query_map([parent_id], |row| {
                    Ok(JoinedLetterRow {
                        letter: letter_from_row(row)?,
                        kid_name: Some(row.get(8)?),
                        elf_name: row.get(9)?,
                        elf_emoji: row.get(10)?,
                        elf_job: None,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_letter_response(
        &self,
        letter_id: i64,
        response: &str,
        response_at: &str,
        responded_by: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE letters SET response = ?1, response_at = ?2, responded_by = ?3 WHERE id = ?4",
                (response, response_at, responded_by, letter_id),
            )?;
            Ok(())
        })
    }

    /// Who a letter belongs to: the sender kid and that kid's parent.
    pub fn letter_owner(&self, letter_id: i64) -> Result<Option<LetterOwnerRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT l.kid_id, k.parent_id
                 FROM letters l
                 JOIN kids k ON l.kid_id = k.id
                 WHERE l.id = ?1",
                [letter_id],
                |row| {
                    Ok(LetterOwnerRow {
                        kid_id: row.get(0)?,
                        parent_id: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }
}

const PARENT_SELECT: &str = "SELECT id, email, password, name, parent_code, response_mode, \
                             subscription_status, created_at FROM parents";
const KID_SELECT: &str =
    "SELECT id, parent_id, username, password, name, age, elf_id, created_at FROM kids";
const ELF_SELECT: &str = "SELECT id, name, emoji, job, personality, is_active FROM elves";
const LETTER_SELECT: &str = "SELECT id, kid_id, elf_id, content, sent_at, response, \
                             response_at, responded_by FROM letters";

fn parent_from_row(row: &Row<'_>) -> std::result::Result<ParentRow, rusqlite::Error> {
    Ok(ParentRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        parent_code: row.get(4)?,
        response_mode: row.get(5)?,
        subscription_status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn kid_from_row(row: &Row<'_>) -> std::result::Result<KidRow, rusqlite::Error> {
    Ok(KidRow {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        name: row.get(4)?,
        age: row.get(5)?,
        elf_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn elf_from_row(row: &Row<'_>) -> std::result::Result<ElfRow, rusqlite::Error> {
    Ok(ElfRow {
        id: row.get(0)?,
        name: row.get(1)?,
        emoji: row.get(2)?,
        job: row.get(3)?,
        personality: row.get(4)?,
        is_active: row.get(5)?,
    })
}

fn letter_from_row(row: &Row<'_>) -> std::result::Result<LetterRow, rusqlite::Error> {
    Ok(LetterRow {
        id: row.get(0)?,
        kid_id: row.get(1)?,
        elf_id: row.get(2)?,
        content: row.get(3)?,
        sent_at: row.get(4)?,
        response: row.get(5)?,
        response_at: row.get(6)?,
        responded_by: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn parent_email_is_unique() {
        let db = db();
        db.create_parent("mom@example.com", "hash", "Mom", "ABC123")
            .unwrap();
        let err = db.create_parent("mom@example.com", "hash2", "Mom Again", "XYZ789");
        assert!(err.is_err());
    }

    #[test]
    fn join_code_resolves_to_parent() {
        let db = db();
        let id = db
            .create_parent("dad@example.com", "hash", "Dad", "QQ77ZZ")
            .unwrap();
        assert_eq!(db.get_parent_id_by_code("QQ77ZZ").unwrap(), Some(id));
        assert_eq!(db.get_parent_id_by_code("NOPE00").unwrap(), None);
    }

    #[test]
    fn elf_catalog_is_seeded_and_active() {
        let db = db();
        let elves = db.active_elves().unwrap();
        assert!(!elves.is_empty());
        assert!(elves.iter().all(|e| e.is_active));
        // Ordered by id
        let ids: Vec<i64> = elves.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn kid_elf_selection_persists() {
        let db = db();
        let parent_id = db
            .create_parent("p@example.com", "hash", "P", "AAAAAA")
            .unwrap();
        let kid_id = db.create_kid(parent_id, "max", "hash", "Max", 8).unwrap();
        assert_eq!(db.get_kid_by_id(kid_id).unwrap().unwrap().elf_id, None);

        db.set_kid_elf(kid_id, 3).unwrap();
        assert_eq!(db.get_kid_by_id(kid_id).unwrap().unwrap().elf_id, Some(3));
    }

    #[test]
    fn letters_join_elf_fields_newest_first() {
        let db = db();
        let parent_id = db
            .create_parent("p@example.com", "hash", "P", "AAAAAA")
            .unwrap();
        let kid_id = db.create_kid(parent_id, "max", "hash", "Max", 8).unwrap();

        let first = db.insert_letter(kid_id, 1, "Dear elf, hi!").unwrap();
        let second = db.insert_letter(kid_id, 2, "Me again!").unwrap();

        let letters = db.letters_for_kid(kid_id).unwrap();
        assert_eq!(letters.len(), 2);
        assert_eq!(letters[0].letter.id, second);
        assert_eq!(letters[1].letter.id, first);
        assert_eq!(letters[1].elf_name, "Jingle");
        assert!(letters[1].elf_job.is_some());
        assert!(letters[0].kid_name.is_none());
    }

    #[test]
    fn parent_view_spans_all_kids() {
        let db = db();
        let parent_id = db
            .create_parent("p@example.com", "hash", "P", "AAAAAA")
            .unwrap();
        let other_parent = db
            .create_parent("q@example.com", "hash", "Q", "BBBBBB")
            .unwrap();
        let a = db.create_kid(parent_id, "ana", "hash", "Ana", 7).unwrap();
        let b = db.create_kid(parent_id, "ben", "hash", "Ben", 9).unwrap();
        let other_kid = db.create_kid(other_parent, "cat", "hash", "Cat", 6).unwrap();

        db.insert_letter(a, 1, "hello").unwrap();
        db.insert_letter(b, 2, "hi").unwrap();
        db.insert_letter(other_kid, 3, "not yours").unwrap();

        let letters = db.letters_for_parent(parent_id).unwrap();
        assert_eq!(letters.len(), 2);
        assert!(letters.iter().all(|l| l.kid_name.is_some()));

        assert!(db.letters_for_parent(999).unwrap().is_empty());
    }

    #[test]
    fn response_patch_fills_all_three_fields() {
        let db = db();
        let parent_id = db
            .create_parent("p@example.com", "hash", "P", "AAAAAA")
            .unwrap();
        let kid_id = db.create_kid(parent_id, "max", "hash", "Max", 8).unwrap();
        let letter_id = db.insert_letter(kid_id, 1, "hello").unwrap();

        let pending = db.get_letter(letter_id).unwrap().unwrap();
        assert!(pending.response.is_none());
        assert!(pending.responded_by.is_none());

        db.set_letter_response(letter_id, "Ho ho!", "2024-12-01T00:00:00Z", "ai")
            .unwrap();
        let answered = db.get_letter(letter_id).unwrap().unwrap();
        assert_eq!(answered.response.as_deref(), Some("Ho ho!"));
        assert_eq!(answered.responded_by.as_deref(), Some("ai"));
        assert!(answered.response_at.is_some());
    }

    #[test]
    fn letter_owner_walks_to_parent() {
        let db = db();
        let parent_id = db
            .create_parent("p@example.com", "hash", "P", "AAAAAA")
            .unwrap();
        let kid_id = db.create_kid(parent_id, "max", "hash", "Max", 8).unwrap();
        let letter_id = db.insert_letter(kid_id, 1, "hello").unwrap();

        let owner = db.letter_owner(letter_id).unwrap().unwrap();
        assert_eq!(owner.kid_id, kid_id);
        assert_eq!(owner.parent_id, parent_id);
        assert!(db.letter_owner(12345).unwrap().is_none());
    }
}

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS parents (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT NOT NULL,
            name                TEXT NOT NULL,
            parent_code         TEXT NOT NULL UNIQUE,
            response_mode       TEXT NOT NULL DEFAULT 'ai',
            subscription_status TEXT NOT NULL DEFAULT 'free',
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS elves (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            emoji       TEXT NOT NULL,
            job         TEXT NOT NULL,
            personality TEXT NOT NULL,
            is_active   INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS kids (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_id   INTEGER NOT NULL REFERENCES parents(id),
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            age         INTEGER NOT NULL,
            elf_id      INTEGER REFERENCES elves(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_kids_parent
            ON kids(parent_id);

        CREATE TABLE IF NOT EXISTS letters (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            kid_id       INTEGER NOT NULL REFERENCES kids(id),
            elf_id       INTEGER NOT NULL REFERENCES elves(id),
            content      TEXT NOT NULL,
            sent_at      TEXT NOT NULL DEFAULT (datetime('now')),
            response     TEXT,
            response_at  TEXT,
            responded_by TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_letters_kid
            ON letters(kid_id, sent_at);

        -- Seed the elf catalog
        INSERT OR IGNORE INTO elves (id, name, emoji, job, personality) VALUES
            (1, 'Jingle', '🔔', 'Toy Workshop Bell Ringer',
             'cheerful and loud, loves songs and surprises'),
            (2, 'Sparkle', '✨', 'Christmas Light Untangler',
             'patient and kind, always sees the bright side'),
            (3, 'Cocoa', '☕', 'Hot Chocolate Taste Tester',
             'warm and cozy, tells the best stories'),
            (4, 'Pepper', '🍬', 'Candy Cane Striper',
             'silly and full of jokes, giggles at everything'),
            (5, 'Frost', '❄️', 'Snowflake Designer',
             'quiet and artistic, notices every little detail'),
            (6, 'Holly', '🎄', 'Tree Decoration Inspector',
             'fancy and dramatic, loves all things glittery');
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

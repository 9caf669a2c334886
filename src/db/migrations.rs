use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Run all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    create_migration_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version < 1 {
        debug!("Running migration v1");
        run_migration_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if current_version < 2 {
        debug!("Running migration v2");
        run_migration_v2(pool).await?;
        set_schema_version(pool, 2).await?;
    }

    if current_version < 3 {
        debug!("Running migration v3");
        run_migration_v3(pool).await?;
        set_schema_version(pool, 3).await?;
    }

    Ok(())
}

async fn create_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schema version table")?;

    Ok(())
}

async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM _schema_version LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to get schema version")?;

    Ok(row.map_or(0, |(v,)| v))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("DELETE FROM _schema_version")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO _schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// v1: core forum schema.
async fn run_migration_v1(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            display_order INTEGER NOT NULL DEFAULT 0
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create categories table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS threads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            price REAL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create threads table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS replies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create replies table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create tags table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS thread_tags (
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (thread_id, tag_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create thread_tags table")?;

    // UNIQUE(thread_id, user_id) is what makes the like/bookmark toggles
    // safe: the insert/delete pair never needs a read-before-write.
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS likes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (thread_id, user_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create likes table")?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (thread_id, user_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create bookmarks table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_threads_category ON threads(category_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_replies_thread ON replies(thread_id, created_at)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token)")
        .execute(pool)
        .await?;

    Ok(())
}

/// v2: read-only aggregate views consumed by the pages.
async fn run_migration_v2(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE VIEW IF NOT EXISTS threads_with_details AS
        SELECT
            t.id,
            t.title,
            t.content,
            t.category_id,
            c.name AS category_name,
            t.user_id,
            u.username AS author_name,
            t.price,
            t.created_at,
            (SELECT COUNT(*) FROM likes l WHERE l.thread_id = t.id) AS like_count,
            (SELECT COUNT(*) FROM replies r WHERE r.thread_id = t.id) AS reply_count,
            (SELECT group_concat(tg.name)
               FROM thread_tags tt
               JOIN tags tg ON tg.id = tt.tag_id
              WHERE tt.thread_id = t.id) AS tags
        FROM threads t
        JOIN categories c ON c.id = t.category_id
        JOIN users u ON u.id = t.user_id
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create threads_with_details view")?;

    sqlx::query(
        r"
        CREATE VIEW IF NOT EXISTS replies_with_author AS
        SELECT
            r.id,
            r.thread_id,
            r.user_id,
            u.username AS author_name,
            r.content,
            r.created_at
        FROM replies r
        JOIN users u ON u.id = r.user_id
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create replies_with_author view")?;

    Ok(())
}

/// v3: seeded reference data. Categories are admin-managed and tags are
/// curated out of band; neither has a create path in the application.
async fn run_migration_v3(pool: &SqlitePool) -> Result<()> {
    let categories = [
        ("General Discussion", "Talk about anything retro gaming.", 1),
        ("Game Reviews", "Share your takes on the classics.", 2),
        ("Technical Help", "Mods, repairs, and CRT troubleshooting.", 3),
        ("Marketplace", "Buy, sell, and trade games and hardware.", 4),
    ];

    for (name, description, display_order) in categories {
        sqlx::query(
            "INSERT OR IGNORE INTO categories (name, description, display_order) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(display_order)
        .execute(pool)
        .await
        .context("Failed to seed categories")?;
    }

    // Tag names are stored lower-case; lookups fold case at the edges.
    let tags = [
        "zelda", "mario", "metroid", "n64", "snes", "nes", "ps1", "gamecube", "dreamcast",
        "gameboy", "console", "controller", "cartridge", "cib", "boxed", "repro", "crt",
    ];

    for name in tags {
        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await
            .context("Failed to seed tags")?;
    }

    Ok(())
}

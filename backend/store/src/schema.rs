pub(crate) const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
PRAGMA foreign_keys=ON;";

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    metadata      TEXT NOT NULL,
    created_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    account_id TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_account ON sessions(account_id);

CREATE TABLE IF NOT EXISTS profiles (
    user_id              TEXT PRIMARY KEY,
    full_name            TEXT,
    line_user_id         TEXT UNIQUE,
    line_display_name    TEXT,
    line_picture_url     TEXT,
    auth_provider        TEXT NOT NULL DEFAULT 'email',
    migrated_from_email  INTEGER NOT NULL DEFAULT 0,
    line_is_friend       INTEGER NOT NULL DEFAULT 0,
    line_friend_added_at INTEGER,
    updated_at           INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_profiles_auth_provider ON profiles(auth_provider);

CREATE TABLE IF NOT EXISTS orders (
    order_id    INTEGER PRIMARY KEY,
    user_id     TEXT NOT NULL,
    course_id   INTEGER NOT NULL,
    course_name TEXT NOT NULL,
    total       INTEGER NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
";

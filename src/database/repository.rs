/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::connection::DatabaseConnection;
use super::models::{
    decode_list, encode_list, AuthSessionRecord, ConversionSessionRecord, FileErrorRow,
    FileRecordRow, HistoryRecord, UserInsert, UserRecord,
};
use crate::conversion::FileStatus;

/// Everything stored for one finished conversion
#[derive(Debug, Clone)]
pub struct ConversionBundle {
    pub session: ConversionSessionRecord,
    pub files: Vec<FileRecordRow>,
    pub errors: Vec<FileErrorRow>,
    pub history: Vec<HistoryRecord>,
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a user unless the username or email is already registered
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<UserInsert> {
        let username = username.to_string();
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        let created_at = created_at.to_string();

        self.db
            .transaction_async(move |tx| {
                let username_taken: bool = tx.query_row(
                    "SELECT COUNT(*) FROM users WHERE username = ?1",
                    [&username],
                    |row| row.get(0),
                )?;
                if username_taken {
                    return Ok(UserInsert::UsernameTaken);
                }

                let email_taken: bool = tx.query_row(
                    "SELECT COUNT(*) FROM users WHERE email = ?1",
                    [&email],
                    |row| row.get(0),
                )?;
                if email_taken {
                    return Ok(UserInsert::EmailTaken);
                }

                tx.execute(
                    "INSERT INTO users (username, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![username, email, password_hash, created_at],
                )?;
                Ok(UserInsert::Created(tx.last_insert_rowid()))
            })
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let username = username.to_string();

        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?1",
                        [username],
                        Self::user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?1",
                        [user_id],
                        Self::user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
        Ok(UserRecord {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    // =========================================================================
    // Auth Session Operations
    // =========================================================================

    pub async fn insert_auth_session(&self, record: &AuthSessionRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO auth_sessions (token_hash, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                    params![record.token_hash, record.user_id, record.created_at, record.expires_at],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn get_auth_session(&self, token_hash: &str) -> Result<Option<AuthSessionRecord>> {
        let token_hash = token_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        "SELECT token_hash, user_id, created_at, expires_at FROM auth_sessions WHERE token_hash = ?1",
                        [token_hash],
                        |row| {
                            Ok(AuthSessionRecord {
                                token_hash: row.get(0)?,
                                user_id: row.get(1)?,
                                created_at: row.get(2)?,
                                expires_at: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    /// Delete one login
    ///
    /// # Returns
    /// * `Result<bool>` - Whether a row was removed
    pub async fn delete_auth_session(&self, token_hash: &str) -> Result<bool> {
        let token_hash = token_hash.to_string();

        self.db
            .execute_async(move |conn| {
                let removed = conn.execute("DELETE FROM auth_sessions WHERE token_hash = ?1", [token_hash])?;
                Ok(removed > 0)
            })
            .await
    }

    /// Delete logins that expired at or before `now`
    pub async fn delete_expired_auth_sessions(&self, now: &str) -> Result<usize> {
        let now = now.to_string();

        self.db
            .execute_async(move |conn| {
                let removed = conn.execute("DELETE FROM auth_sessions WHERE expires_at <= ?1", [now])?;
                Ok(removed)
            })
            .await
    }

    // =========================================================================
    // Conversion Operations
    // =========================================================================

    /// Store a finished conversion with its files, errors and history in one transaction
    pub async fn save_conversion(&self, bundle: ConversionBundle) -> Result<()> {
        self.db
            .transaction_async(move |tx| {
                let session = &bundle.session;
                tx.execute(
                    r#"
                    INSERT INTO conversion_sessions (
                        id, user_id, conversion_type, source_dir, target_dir, archive_path,
                        ai_used, warnings, manifests, next_steps, analysis, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                    params![
                        session.id,
                        session.user_id,
                        session.conversion_type,
                        session.source_dir,
                        session.target_dir,
                        session.archive_path,
                        session.ai_used,
                        encode_list(&session.warnings),
                        encode_list(&session.manifests),
                        session.next_steps,
                        session.analysis,
                        session.created_at,
                    ],
                )?;

                {
                    let mut stmt = tx.prepare(
                        r#"
                        INSERT INTO file_records (
                            session_id, seq_num, source_path, target_path, status, warnings, ai_used, model
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                        "#,
                    )?;
                    for file in &bundle.files {
                        stmt.execute(params![
                            file.session_id,
                            file.seq_num,
                            file.source_path,
                            file.target_path,
                            file.status.to_string(),
                            encode_list(&file.warnings),
                            file.ai_used,
                            file.model,
                        ])?;
                    }
                }

                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO file_errors (session_id, file, error) VALUES (?1, ?2, ?3)",
                    )?;
                    for error in &bundle.errors {
                        stmt.execute(params![error.session_id, error.file, error.error])?;
                    }
                }

                {
                    let mut stmt = tx.prepare(
                        r#"
                        INSERT INTO conversion_history (
                            user_id, session_id, source_path, target_path, source_code, target_code,
                            source_language, target_language, conversion_time_ms, output_non_empty,
                            delimiters_balanced, ai_used, model, created_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                        "#,
                    )?;
                    for entry in &bundle.history {
                        stmt.execute(params![
                            entry.user_id,
                            entry.session_id,
                            entry.source_path,
                            entry.target_path,
                            entry.source_code,
                            entry.target_code,
                            entry.source_language,
                            entry.target_language,
                            entry.conversion_time_ms,
                            entry.output_non_empty,
                            entry.delimiters_balanced,
                            entry.ai_used,
                            entry.model,
                            entry.created_at,
                        ])?;
                    }
                }

                debug!(
                    "Stored session {} with {} file(s), {} error(s), {} history entries",
                    session.id,
                    bundle.files.len(),
                    bundle.errors.len(),
                    bundle.history.len()
                );
                Ok(())
            })
            .await
    }

    /// Load a stored conversion
    pub async fn get_conversion(&self, session_id: &str) -> Result<Option<ConversionBundle>> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let Some(session) = Self::get_session_sync(conn, &session_id)? else {
                    return Ok(None);
                };

                let files = {
                    let mut stmt = conn.prepare(
                        r#"
                        SELECT session_id, seq_num, source_path, target_path, status, warnings, ai_used, model
                        FROM file_records WHERE session_id = ?1 ORDER BY seq_num
                        "#,
                    )?;
                    let rows = stmt.query_map([&session_id], |row| {
                        Ok(FileRecordRow {
                            session_id: row.get(0)?,
                            seq_num: row.get(1)?,
                            source_path: row.get(2)?,
                            target_path: row.get(3)?,
                            status: row
                                .get::<_, String>(4)?
                                .parse()
                                .unwrap_or(FileStatus::Error),
                            warnings: decode_list(&row.get::<_, String>(5)?),
                            ai_used: row.get(6)?,
                            model: row.get(7)?,
                        })
                    })?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                };

                let errors = {
                    let mut stmt = conn.prepare(
                        "SELECT session_id, file, error FROM file_errors WHERE session_id = ?1 ORDER BY id",
                    )?;
                    let rows = stmt.query_map([&session_id], |row| {
                        Ok(FileErrorRow {
                            session_id: row.get(0)?,
                            file: row.get(1)?,
                            error: row.get(2)?,
                        })
                    })?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                };

                Ok(Some(ConversionBundle {
                    session,
                    files,
                    errors,
                    history: Vec::new(),
                }))
            })
            .await
    }

    /// Get a session row (synchronous version for use within other operations)
    fn get_session_sync(conn: &Connection, session_id: &str) -> Result<Option<ConversionSessionRecord>> {
        let result = conn
            .query_row(
                r#"
                SELECT id, user_id, conversion_type, source_dir, target_dir, archive_path,
                       ai_used, warnings, manifests, next_steps, analysis, created_at
                FROM conversion_sessions WHERE id = ?1
                "#,
                [session_id],
                Self::session_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn session_from_row(row: &Row<'_>) -> rusqlite::Result<ConversionSessionRecord> {
        Ok(ConversionSessionRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            conversion_type: row.get(2)?,
            source_dir: row.get(3)?,
            target_dir: row.get(4)?,
            archive_path: row.get(5)?,
            ai_used: row.get(6)?,
            warnings: decode_list(&row.get::<_, String>(7)?),
            manifests: decode_list(&row.get::<_, String>(8)?),
            next_steps: row.get(9)?,
            analysis: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    /// Sessions created strictly before `cutoff`, oldest first
    pub async fn sessions_created_before(&self, cutoff: &str) -> Result<Vec<ConversionSessionRecord>> {
        let cutoff = cutoff.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, conversion_type, source_dir, target_dir, archive_path,
                           ai_used, warnings, manifests, next_steps, analysis, created_at
                    FROM conversion_sessions WHERE created_at < ?1 ORDER BY created_at
                    "#,
                )?;
                let rows = stmt.query_map([cutoff], Self::session_from_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Delete a session; file records and errors go with it
    pub async fn delete_conversion(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();

        self.db
            .execute_async(move |conn| {
                let removed = conn.execute("DELETE FROM conversion_sessions WHERE id = ?1", [session_id])?;
                Ok(removed > 0)
            })
            .await
    }

    // =========================================================================
    // History Operations
    // =========================================================================

    /// Most recent history entries of a user, newest first
    pub async fn history_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<HistoryRecord>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, user_id, session_id, source_path, target_path, source_code, target_code,
                           source_language, target_language, conversion_time_ms, output_non_empty,
                           delimiters_balanced, ai_used, model, created_at
                    FROM conversion_history
                    WHERE user_id = ?1
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?2
                    "#,
                )?;
                let rows = stmt.query_map(params![user_id, limit as i64], |row| {
                    Ok(HistoryRecord {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        session_id: row.get(2)?,
                        source_path: row.get(3)?,
                        target_path: row.get(4)?,
                        source_code: row.get(5)?,
                        target_code: row.get(6)?,
                        source_language: row.get(7)?,
                        target_language: row.get(8)?,
                        conversion_time_ms: row.get(9)?,
                        output_non_empty: row.get(10)?,
                        delimiters_balanced: row.get(11)?,
                        ai_used: row.get(12)?,
                        model: row.get(13)?,
                        created_at: row.get(14)?,
                    })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }
}

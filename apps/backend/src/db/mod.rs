//! SQLite record store with optimistic concurrency
//!
//! Every learner and set row carries a `version` that is bumped on each
//! write. Writers pass the version they read and the `UPDATE` only matches
//! that version; no affected row means someone else wrote in between and
//! the write is refused with `VersionConflict`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::models::*;

/// Everything one graded submission writes, applied all-or-nothing
#[derive(Debug, Clone)]
pub struct GradingCommit {
    pub learner_id: Uuid,
    pub learner_version: u64,
    pub progress: LearnerProgress,
    pub set_id: Uuid,
    pub set_version: u64,
    /// Graded set, or `None` when grading left every item unchanged
    pub set: Option<VocabularySet>,
    pub record: QuizRecord,
}

/// Versions after a successful commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedVersions {
    pub learner_version: u64,
    pub set_version: u64,
}

/// Everything cloning a public set writes, applied all-or-nothing
#[derive(Debug, Clone)]
pub struct CloneCommit {
    pub learner_id: Uuid,
    pub source_id: Uuid,
    pub set_id: Uuid,
    /// The learner's private copy
    pub set: VocabularySet,
    pub created_at: DateTime<Utc>,
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` opens its own empty database
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory database with migrations applied
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect("sqlite::memory:").await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ServiceError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // === Learner Repository ===

    /// Create a learner with zeroed progress
    pub async fn create_learner(&self, name: &str, created_at: DateTime<Utc>) -> Result<Learner> {
        let learner = Learner {
            id: Uuid::new_v4(),
            name: name.to_string(),
            progress: LearnerProgress::default(),
            cloned_sets: Vec::new(),
            created_at,
            version: 1,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO learners (id, name, created_at, version)
            VALUES (?1, ?2, ?3, 1)
            "#,
        )
        .bind(learner.id)
        .bind(name)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(learner),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                ServiceError::BadRequest("Username is already taken".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Get learner by ID
    pub async fn get_learner(&self, id: Uuid) -> Result<Option<Learner>> {
        let mut conn = self.pool.acquire().await?;
        load_learner(&mut conn, id).await
    }

    /// Replace a learner's progress
    pub async fn save_progress(
        &self,
        learner_id: Uuid,
        progress: &LearnerProgress,
        expected_version: u64,
    ) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        update_progress(&mut conn, learner_id, progress, expected_version).await
    }

    /// Learners ordered by XP (highest first), earliest account first on ties
    pub async fn top_learners(&self, limit: usize) -> Result<Vec<Learner>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, DbLearner>(
            r#"
            SELECT id, name, experience_points, current_streak, longest_streak,
                   last_studied_date, created_at, version
            FROM learners
            ORDER BY experience_points DESC, created_at ASC, rowid ASC
            LIMIT ?1
            "#,
        )
        .bind(to_i64(limit))
        .fetch_all(&mut *conn)
        .await?;

        let mut learners = Vec::with_capacity(rows.len());
        for row in rows {
            let cloned = cloned_sets(&mut conn, row.id).await?;
            learners.push(row.to_learner(cloned));
        }
        Ok(learners)
    }

    // === Set Repository ===

    /// Insert a new set with its items
    pub async fn insert_set(
        &self,
        id: Uuid,
        set: VocabularySet,
        created_at: DateTime<Utc>,
    ) -> Result<StoredSet> {
        let mut tx = self.pool.begin().await?;
        insert_set_row(&mut tx, id, &set, created_at).await?;
        replace_items(&mut tx, id, &set.items).await?;
        tx.commit().await?;

        Ok(StoredSet {
            id,
            set,
            clone_count: 0,
            created_at,
            version: 1,
        })
    }

    /// Get set by ID
    pub async fn get_set(&self, id: Uuid) -> Result<Option<StoredSet>> {
        let mut conn = self.pool.acquire().await?;
        load_set(&mut conn, id).await
    }

    /// Sets owned by a learner, newest first
    pub async fn get_sets_for_owner(&self, learner_id: Uuid) -> Result<Vec<StoredSet>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, DbSet>(
            r#"
            SELECT id, owner_id, title, description, difficulty, is_public,
                   original_set_id, clone_count, created_at, version
            FROM vocab_sets
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(learner_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut sets = Vec::with_capacity(rows.len());
        for row in rows {
            let items = load_items(&mut conn, row.id).await?;
            sets.push(row.to_stored_set(items));
        }
        Ok(sets)
    }

    /// Public sets not owned by `viewer`, most cloned first.
    ///
    /// `search` matches title, description, or creator name, ignoring case.
    pub async fn public_sets(
        &self,
        viewer: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<PublicSetSummary>> {
        let rows = sqlx::query_as::<_, DbPublicSet>(
            r#"
            SELECT s.id, s.title, s.description, s.difficulty, l.name AS creator,
                   (SELECT COUNT(*) FROM vocab_items i WHERE i.set_id = s.id) AS item_count,
                   s.clone_count
            FROM vocab_sets s
            JOIN learners l ON l.id = s.owner_id
            WHERE s.is_public = 1
              AND s.owner_id != ?1
              AND (?2 IS NULL
                   OR s.title LIKE ?2 ESCAPE '\'
                   OR s.description LIKE ?2 ESCAPE '\'
                   OR l.name LIKE ?2 ESCAPE '\')
            ORDER BY s.clone_count DESC, s.created_at DESC, s.rowid DESC
            "#,
        )
        .bind(viewer)
        .bind(search.map(like_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbPublicSet::to_summary).collect())
    }

    /// Replace a set's content and items
    pub async fn save_set(&self, id: Uuid, set: &VocabularySet, expected_version: u64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let version = update_set_row(&mut tx, id, set, expected_version).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Delete a set and its items
    pub async fn delete_set(&self, id: Uuid, expected_version: u64) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            r#"
            DELETE FROM vocab_sets
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(id)
        .bind(to_i64(expected_version))
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(stale_write(&mut conn, Table::Sets, id, expected_version).await);
        }
        Ok(())
    }

    // === Commits ===

    /// Record a clone, bump the source's clone count, and insert the copy.
    ///
    /// A learner can hold at most one clone of each source set; the second
    /// attempt is refused even when both race.
    pub async fn commit_clone(&self, commit: CloneCommit) -> Result<StoredSet> {
        let mut tx = self.pool.begin().await?;

        let recorded = sqlx::query(
            r#"
            INSERT INTO learner_cloned_sets (learner_id, source_set_id)
            VALUES (?1, ?2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(commit.learner_id)
        .bind(commit.source_id)
        .execute(&mut *tx)
        .await?;
        if recorded.rows_affected() == 0 {
            return Err(ServiceError::BadRequest(
                "You have already added this set.".to_string(),
            ));
        }

        sqlx::query("UPDATE learners SET version = version + 1 WHERE id = ?1")
            .bind(commit.learner_id)
            .execute(&mut *tx)
            .await?;

        let counted = sqlx::query(
            r#"
            UPDATE vocab_sets
            SET clone_count = clone_count + 1
            WHERE id = ?1 AND is_public = 1
            "#,
        )
        .bind(commit.source_id)
        .execute(&mut *tx)
        .await?;
        if counted.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Public set not found".to_string()));
        }

        insert_set_row(&mut tx, commit.set_id, &commit.set, commit.created_at).await?;
        replace_items(&mut tx, commit.set_id, &commit.set.items).await?;
        tx.commit().await?;

        Ok(StoredSet {
            id: commit.set_id,
            set: commit.set,
            clone_count: 0,
            created_at: commit.created_at,
            version: 1,
        })
    }

    /// Write graded progress, graded set, and the quiz record together.
    ///
    /// Runs in one transaction, so a conflict on either record leaves the
    /// store untouched. The set's version is only checked and bumped when
    /// there is a set to write.
    pub async fn commit_grading(&self, commit: GradingCommit) -> Result<CommittedVersions> {
        let mut tx = self.pool.begin().await?;

        let learner_version = update_progress(
            &mut tx,
            commit.learner_id,
            &commit.progress,
            commit.learner_version,
        )
        .await?;

        let set_version = match &commit.set {
            Some(set) => update_set_row(&mut tx, commit.set_id, set, commit.set_version).await?,
            None => current_version(&mut tx, Table::Sets, commit.set_id).await?,
        };

        sqlx::query(
            r#"
            INSERT INTO quiz_records (id, learner_id, set_id, set_title, score, total, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(commit.record.id)
        .bind(commit.record.learner_id)
        .bind(commit.record.set_id)
        .bind(&commit.record.set_title)
        .bind(i64::from(commit.record.score))
        .bind(i64::from(commit.record.total))
        .bind(commit.record.taken_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CommittedVersions {
            learner_version,
            set_version,
        })
    }

    // === Quiz History Repository ===

    /// Quiz records for a learner, newest first
    pub async fn get_quiz_records(
        &self,
        learner_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<QuizRecord>> {
        let rows = sqlx::query_as::<_, DbQuizRecord>(
            r#"
            SELECT id, learner_id, set_id, set_title, score, total, taken_at
            FROM quiz_records
            WHERE learner_id = ?1
            ORDER BY taken_at DESC, seq DESC
            LIMIT ?2
            "#,
        )
        .bind(learner_id)
        // SQLite treats a negative limit as no limit
        .bind(limit.map_or(-1, to_i64))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbQuizRecord::to_record).collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Learners,
    Sets,
}

impl Table {
    fn version_query(self) -> &'static str {
        match self {
            Table::Learners => "SELECT version FROM learners WHERE id = ?1",
            Table::Sets => "SELECT version FROM vocab_sets WHERE id = ?1",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Table::Learners => "learner",
            Table::Sets => "set",
        }
    }

    fn not_found(self) -> ServiceError {
        match self {
            Table::Learners => ServiceError::NotFound("Learner not found".to_string()),
            Table::Sets => ServiceError::NotFound("Set not found".to_string()),
        }
    }
}

async fn load_learner(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Learner>> {
    let row = sqlx::query_as::<_, DbLearner>(
        r#"
        SELECT id, name, experience_points, current_streak, longest_streak,
               last_studied_date, created_at, version
        FROM learners
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let cloned = cloned_sets(conn, id).await?;
            Ok(Some(row.to_learner(cloned)))
        }
        None => Ok(None),
    }
}

async fn cloned_sets(conn: &mut SqliteConnection, learner_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT source_set_id
        FROM learner_cloned_sets
        WHERE learner_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(learner_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

async fn update_progress(
    conn: &mut SqliteConnection,
    learner_id: Uuid,
    progress: &LearnerProgress,
    expected_version: u64,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE learners
        SET experience_points = ?1,
            current_streak = ?2,
            longest_streak = ?3,
            last_studied_date = ?4,
            version = version + 1
        WHERE id = ?5 AND version = ?6
        "#,
    )
    .bind(to_i64(progress.experience_points))
    .bind(i64::from(progress.current_streak))
    .bind(i64::from(progress.longest_streak))
    .bind(progress.last_studied_date)
    .bind(learner_id)
    .bind(to_i64(expected_version))
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale_write(conn, Table::Learners, learner_id, expected_version).await);
    }
    Ok(expected_version + 1)
}

async fn load_set(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<StoredSet>> {
    let row = sqlx::query_as::<_, DbSet>(
        r#"
        SELECT id, owner_id, title, description, difficulty, is_public,
               original_set_id, clone_count, created_at, version
        FROM vocab_sets
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let items = load_items(conn, row.id).await?;
            Ok(Some(row.to_stored_set(items)))
        }
        None => Ok(None),
    }
}

async fn load_items(conn: &mut SqliteConnection, set_id: Uuid) -> Result<Vec<VocabularyItem>> {
    let rows = sqlx::query_as::<_, DbItem>(
        r#"
        SELECT item_id, script, romanization, meaning, example, needs_review,
               srs_level, interval_days, next_review_date
        FROM vocab_items
        WHERE set_id = ?1
        ORDER BY position
        "#,
    )
    .bind(set_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(DbItem::to_item).collect())
}

async fn insert_set_row(
    conn: &mut SqliteConnection,
    id: Uuid,
    set: &VocabularySet,
    created_at: DateTime<Utc>,
) -> Result<()> {
    let owner_id = parse_id(&set.owner_id)?;
    let original_set_id = set.original_set_id.as_deref().map(parse_id).transpose()?;

    sqlx::query(
        r#"
        INSERT INTO vocab_sets (id, owner_id, title, description, difficulty, is_public,
                                original_set_id, clone_count, created_at, version)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, 1)
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(&set.title)
    .bind(set.description.as_deref())
    .bind(difficulty_name(set.difficulty))
    .bind(set.is_public)
    .bind(original_set_id)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Versioned update of a set row, replacing its items
async fn update_set_row(
    conn: &mut SqliteConnection,
    id: Uuid,
    set: &VocabularySet,
    expected_version: u64,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE vocab_sets
        SET title = ?1,
            description = ?2,
            difficulty = ?3,
            is_public = ?4,
            version = version + 1
        WHERE id = ?5 AND version = ?6
        "#,
    )
    .bind(&set.title)
    .bind(set.description.as_deref())
    .bind(difficulty_name(set.difficulty))
    .bind(set.is_public)
    .bind(id)
    .bind(to_i64(expected_version))
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale_write(conn, Table::Sets, id, expected_version).await);
    }

    replace_items(conn, id, &set.items).await?;
    Ok(expected_version + 1)
}

async fn replace_items(
    conn: &mut SqliteConnection,
    set_id: Uuid,
    items: &[VocabularyItem],
) -> Result<()> {
    sqlx::query("DELETE FROM vocab_items WHERE set_id = ?1")
        .bind(set_id)
        .execute(&mut *conn)
        .await?;

    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO vocab_items (set_id, position, item_id, script, romanization, meaning,
                                     example, needs_review, srs_level, interval_days,
                                     next_review_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(set_id)
        .bind(to_i64(position))
        .bind(&item.item_id)
        .bind(&item.script)
        .bind(&item.romanization)
        .bind(&item.meaning)
        .bind(item.example.as_deref())
        .bind(item.needs_review)
        .bind(i64::from(item.srs.srs_level))
        .bind(i64::from(item.srs.interval_days))
        .bind(item.srs.next_review_date)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn current_version(conn: &mut SqliteConnection, table: Table, id: Uuid) -> Result<u64> {
    let version = sqlx::query_scalar::<_, i64>(table.version_query())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    version
        .map(|v| u64::try_from(v).unwrap_or_default())
        .ok_or_else(|| table.not_found())
}

/// Explain why a versioned write matched no row
async fn stale_write(
    conn: &mut SqliteConnection,
    table: Table,
    id: Uuid,
    expected: u64,
) -> ServiceError {
    let found = match current_version(conn, table, id).await {
        Ok(found) => found,
        Err(e) => return e,
    };

    let record = format!("{} {}", table.label(), id);
    tracing::warn!(record = %record, expected, found, "rejected stale write");
    ServiceError::VersionConflict {
        record,
        expected,
        found,
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::BadRequest(format!("Invalid id: {}", raw)))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// `%term%` with LIKE wildcards in `term` escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_i64<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

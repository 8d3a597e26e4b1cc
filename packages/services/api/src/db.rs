//! SQLite Resource Store
//!
//! 행(Row)은 저장 형식 그대로 읽은 뒤 `slate_core::model` 레코드로 변환합니다.
//! 시각은 나노초 고정 자릿수 RFC 3339 문자열로 저장하여 문자열 정렬이 시간 순서와 같습니다.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use slate_core::model::{Permission, ShareGrant, Slate, SlatePatch, User};
use slate_core::store::{ResourceStore, StoreResult};
use slate_core::StoreError;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> anyhow::Result<()> {
        let queries = [
            r#"CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );"#,
            r#"CREATE TABLE IF NOT EXISTS slates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                preview_color TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                last_modified TEXT NOT NULL,
                created_at TEXT NOT NULL
            );"#,
            r#"CREATE INDEX IF NOT EXISTS idx_slates_owner_id ON slates (owner_id);"#,
            r#"CREATE TABLE IF NOT EXISTS shared_slates (
                id TEXT PRIMARY KEY,
                slate_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                permission TEXT NOT NULL CHECK (permission IN ('read', 'write')),
                joined_at TEXT NOT NULL,
                UNIQUE(slate_id, user_id)
            );"#,
            r#"CREATE INDEX IF NOT EXISTS idx_shared_slates_slate_id ON shared_slates (slate_id);"#,
            r#"CREATE INDEX IF NOT EXISTS idx_shared_slates_user_id ON shared_slates (user_id);"#,
        ];

        for q in queries {
            sqlx::query(q).execute(&self.pool).await?;
        }

        Ok(())
    }
}

fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(column: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(column, e))
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable {
        message: format!("corrupt value in {}: {}", column, err),
    }
}

fn store_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey {
            key: db.message().to_string(),
        },
        _ => StoreError::Unavailable {
            message: err.to_string(),
        },
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            created_at: parse_ts("users.created_at", &row.created_at)?,
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SlateRow {
    id: String,
    name: String,
    preview_color: String,
    owner_id: String,
    last_modified: String,
    created_at: String,
}

impl TryFrom<SlateRow> for Slate {
    type Error = StoreError;

    fn try_from(row: SlateRow) -> StoreResult<Self> {
        Ok(Slate {
            last_modified: parse_ts("slates.last_modified", &row.last_modified)?,
            created_at: parse_ts("slates.created_at", &row.created_at)?,
            id: row.id,
            name: row.name,
            preview_color: row.preview_color,
            owner_id: row.owner_id,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct GrantRow {
    id: String,
    slate_id: String,
    user_id: String,
    permission: String,
    joined_at: String,
}

impl TryFrom<GrantRow> for ShareGrant {
    type Error = StoreError;

    fn try_from(row: GrantRow) -> StoreResult<Self> {
        Ok(ShareGrant {
            permission: Permission::from_str(&row.permission)
                .map_err(|e| corrupt("shared_slates.permission", e))?,
            joined_at: parse_ts("shared_slates.joined_at", &row.joined_at)?,
            id: row.id,
            slate_id: row.slate_id,
            user_id: row.user_id,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const SLATE_COLUMNS: &str = "id, name, preview_color, owner_id, last_modified, created_at";
const GRANT_COLUMNS: &str = "id, slate_id, user_id, permission, joined_at";

#[async_trait]
impl ResourceStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(ts(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE email = ?1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = ?1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(User::try_from).transpose()
    }

    async fn insert_slate(&self, slate: &Slate) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO slates (id, name, preview_color, owner_id, last_modified, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(&slate.id)
        .bind(&slate.name)
        .bind(&slate.preview_color)
        .bind(&slate.owner_id)
        .bind(ts(slate.last_modified))
        .bind(ts(slate.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn find_slate(&self, slate_id: &str) -> StoreResult<Option<Slate>> {
        let row = sqlx::query_as::<_, SlateRow>(&format!(
            "SELECT {} FROM slates WHERE id = ?1",
            SLATE_COLUMNS
        ))
        .bind(slate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(Slate::try_from).transpose()
    }

    async fn find_slates_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Slate>> {
        let rows = sqlx::query_as::<_, SlateRow>(&format!(
            "SELECT {} FROM slates WHERE owner_id = ?1 ORDER BY created_at, id",
            SLATE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        convert_all(rows)
    }

    async fn find_slates_by_ids(&self, slate_ids: &[String]) -> StoreResult<Vec<Slate>> {
        if slate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM slates WHERE id IN (", SLATE_COLUMNS));
        let mut separated = builder.separated(", ");
        for id in slate_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY created_at, id");

        let rows = builder
            .build_query_as::<SlateRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        convert_all(rows)
    }

    async fn update_slate(
        &self,
        slate_id: &str,
        patch: &SlatePatch,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Slate>> {
        let row = sqlx::query_as::<_, SlateRow>(&format!(
            r#"UPDATE slates
               SET name = COALESCE(?1, name),
                   preview_color = COALESCE(?2, preview_color),
                   last_modified = ?3
               WHERE id = ?4
               RETURNING {}"#,
            SLATE_COLUMNS
        ))
        .bind(patch.name.as_deref())
        .bind(patch.preview_color.as_deref())
        .bind(ts(at))
        .bind(slate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(Slate::try_from).transpose()
    }

    async fn delete_slate_cascade(&self, slate_id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        sqlx::query(r#"DELETE FROM shared_slates WHERE slate_id = ?1"#)
            .bind(slate_id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        let deleted = sqlx::query(r#"DELETE FROM slates WHERE id = ?1"#)
            .bind(slate_id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?
            .rows_affected();

        tx.commit().await.map_err(store_err)?;
        Ok(deleted > 0)
    }

    async fn find_grant(&self, slate_id: &str, user_id: &str) -> StoreResult<Option<ShareGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(&format!(
            "SELECT {} FROM shared_slates WHERE slate_id = ?1 AND user_id = ?2",
            GRANT_COLUMNS
        ))
        .bind(slate_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(ShareGrant::try_from).transpose()
    }

    async fn find_grants_for_user(&self, user_id: &str) -> StoreResult<Vec<ShareGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(&format!(
            "SELECT {} FROM shared_slates WHERE user_id = ?1 ORDER BY joined_at, id",
            GRANT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        convert_all(rows)
    }

    async fn insert_grant(&self, grant: &ShareGrant) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO shared_slates (id, slate_id, user_id, permission, joined_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(&grant.id)
        .bind(&grant.slate_id)
        .bind(&grant.user_id)
        .bind(grant.permission.as_str())
        .bind(ts(grant.joined_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn update_grant(
        &self,
        slate_id: &str,
        user_id: &str,
        permission: Permission,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ShareGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(&format!(
            r#"UPDATE shared_slates SET permission = ?1, joined_at = ?2
               WHERE slate_id = ?3 AND user_id = ?4
               RETURNING {}"#,
            GRANT_COLUMNS
        ))
        .bind(permission.as_str())
        .bind(ts(at))
        .bind(slate_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(ShareGrant::try_from).transpose()
    }
}

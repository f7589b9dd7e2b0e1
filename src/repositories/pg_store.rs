// src/repositories/pg_store.rs - PostgreSQL back end over a deadpool pool
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::models::post::{Post, PostView};
use crate::models::user::{User, UserSummary};
use crate::repositories::{PostRepository, StoreError, UserRepository};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT '',
    posts UUID[] NOT NULL DEFAULT '{}'
);
CREATE TABLE IF NOT EXISTS posts (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    image_url TEXT NOT NULL,
    creator UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS posts_created_at_idx ON posts (created_at DESC);
"#;

const POPULATED_COLUMNS: &str = "p.id, p.title, p.content, p.image_url, p.creator, \
     p.created_at, p.updated_at, u.name AS creator_name";

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the tables on first start.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        Ok(())
    }
}

/// OFFSET/LIMIT are BIGINT; anything past `i64::MAX` clamps instead of wrapping negative.
fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn row_to_post(row: &Row) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        creator: row.get("creator"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_view(row: &Row) -> PostView {
    let post = row_to_post(row);
    let name: Option<String> = row.get("creator_name");
    let creator = UserSummary {
        id: post.creator,
        name: name.unwrap_or_default(),
    };
    post.populate(creator)
}

fn row_to_user(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get("status"),
        posts: row.get("posts"),
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn count(&self) -> Result<u64, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_one("SELECT COUNT(*) FROM posts", &[]).await?;
        let total: i64 = row.get(0);
        Ok(total.max(0) as u64)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<PostView>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM posts p LEFT JOIN users u ON u.id = p.creator \
             ORDER BY p.created_at DESC, p.id DESC OFFSET $1 LIMIT $2",
            POPULATED_COLUMNS
        );
        let (offset, limit) = (sql_bound(skip), sql_bound(limit));
        let rows = client.query(sql.as_str(), &[&offset, &limit]).await?;
        Ok(rows.iter().map(row_to_view).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, title, content, image_url, creator, created_at, updated_at \
                 FROM posts WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<PostView>, StoreError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {} FROM posts p LEFT JOIN users u ON u.id = p.creator WHERE p.id = $1",
            POPULATED_COLUMNS
        );
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(row_to_view))
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO posts (id, title, content, image_url, creator, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, \
                 content = EXCLUDED.content, image_url = EXCLUDED.image_url, \
                 updated_at = EXCLUDED.updated_at",
                &[
                    &post.id,
                    &post.title,
                    &post.content,
                    &post.image_url,
                    &post.creator,
                    &post.created_at,
                    &post.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let removed = client.execute("DELETE FROM posts WHERE id = $1", &[&id]).await?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, name, status, posts FROM users WHERE id = $1", &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO users (id, name, status, posts) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, \
                 status = EXCLUDED.status, posts = EXCLUDED.posts",
                &[&user.id, &user.name, &user.status, &user.posts],
            )
            .await?;
        Ok(())
    }
}

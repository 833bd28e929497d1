use crate::db::models::{Message, Project, Skill};
use crate::db::schema::SQLITE_INIT;
use crate::error::PortfolioError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// Data access handle shared by all handlers.
///
/// Holds at most one connection for the life of the process. When the startup
/// connection failed the store is *disconnected* and every call returns
/// [`PortfolioError::StoreUnavailable`]; there is no reconnect.
///
/// Row ids arrive as raw path segments and are bound as given. A segment that
/// does not name a row simply affects zero rows.
#[derive(Clone, Debug)]
pub struct PortfolioStore {
    pool: Option<SqlitePool>,
}

impl PortfolioStore {
    pub async fn connect(database_url: &str) -> Result<Self, PortfolioError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool: Some(pool) }
    }

    pub fn disconnected() -> Self {
        Self { pool: None }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> Result<&SqlitePool, PortfolioError> {
        self.pool.as_ref().ok_or(PortfolioError::StoreUnavailable)
    }

    /// Create the three tables if they are missing.
    pub async fn init_schema(&self) -> Result<(), PortfolioError> {
        let pool = self.pool()?;
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(pool).await?;
        }
        Ok(())
    }

    pub async fn insert_skill(
        &self,
        title: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<i64, PortfolioError> {
        let result = sqlx::query("INSERT INTO skills (title, image_path) VALUES (?, ?)")
            .bind(title)
            .bind(image_path)
            .execute(self.pool()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, PortfolioError> {
        let rows = sqlx::query_as::<_, Skill>("SELECT id, title, image_path FROM skills ORDER BY id")
            .fetch_all(self.pool()?)
            .await?;
        Ok(rows)
    }

    /// Update a skill's title, and its image path only when one is given.
    /// Returns the number of rows affected.
    pub async fn update_skill(
        &self,
        id: &str,
        title: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<u64, PortfolioError> {
        let mut sql = String::from("UPDATE skills SET title = ?");
        if image_path.is_some() {
            sql.push_str(", image_path = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&sql).bind(title);
        if let Some(path) = image_path {
            query = query.bind(path);
        }
        let result = query.bind(id).execute(self.pool()?).await?;
        Ok(result.rows_affected())
    }

    /// `None` both when the row is missing and when it has no image.
    pub async fn skill_image_path(&self, id: &str) -> Result<Option<String>, PortfolioError> {
        let path: Option<Option<String>> =
            sqlx::query_scalar("SELECT image_path FROM skills WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool()?)
                .await?;
        Ok(path.flatten())
    }

    pub async fn delete_skill(&self, id: &str) -> Result<u64, PortfolioError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_project(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<i64, PortfolioError> {
        let result = sqlx::query(
            "INSERT INTO projects (title, description, image_path) VALUES (?, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(image_path)
        .execute(self.pool()?)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, PortfolioError> {
        let rows = sqlx::query_as::<_, Project>(
            "SELECT id, title, description, image_path FROM projects ORDER BY id",
        )
        .fetch_all(self.pool()?)
        .await?;
        Ok(rows)
    }

    pub async fn update_project(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<u64, PortfolioError> {
        let mut sql = String::from("UPDATE projects SET title = ?, description = ?");
        if image_path.is_some() {
            sql.push_str(", image_path = ?");
        }
        sql.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&sql).bind(title).bind(description);
        if let Some(path) = image_path {
            query = query.bind(path);
        }
        let result = query.bind(id).execute(self.pool()?).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_project(&self, id: &str) -> Result<u64, PortfolioError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_message(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        message: Option<&str>,
    ) -> Result<i64, PortfolioError> {
        let result = sqlx::query("INSERT INTO messages (name, email, message) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(message)
            .execute(self.pool()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Not exposed over HTTP; used for direct store inspection.
    pub async fn list_messages(&self) -> Result<Vec<Message>, PortfolioError> {
        let rows = sqlx::query_as::<_, Message>(
            "SELECT id, name, email, message FROM messages ORDER BY id",
        )
        .fetch_all(self.pool()?)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> PortfolioStore {
        let store = PortfolioStore::connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        store.init_schema().await.expect("failed to init schema");
        store
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = memory_store().await;
        let first = store.insert_skill(Some("Rust"), None).await.unwrap();
        let second = store.insert_skill(Some("SQL"), None).await.unwrap();
        assert!(second > first);

        let skills = store.list_skills().await.unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].title, "Rust");
        assert!(skills[0].image_path.is_none());
    }

    #[tokio::test]
    async fn update_without_image_keeps_stored_path() {
        let store = memory_store().await;
        let id = store
            .insert_skill(Some("Rust"), Some("uploads/1.png"))
            .await
            .unwrap()
            .to_string();

        let affected = store.update_skill(&id, Some("Rust 2024"), None).await.unwrap();
        assert_eq!(affected, 1);

        let skills = store.list_skills().await.unwrap();
        assert_eq!(skills[0].title, "Rust 2024");
        assert_eq!(skills[0].image_path.as_deref(), Some("uploads/1.png"));

        store
            .update_skill(&id, Some("Rust 2024"), Some("uploads/2.png"))
            .await
            .unwrap();
        let skills = store.list_skills().await.unwrap();
        assert_eq!(skills[0].image_path.as_deref(), Some("uploads/2.png"));
    }

    #[tokio::test]
    async fn update_project_with_and_without_image() {
        let store = memory_store().await;
        let id = store
            .insert_project(Some("Site"), Some("Portfolio"), Some("uploads/a.jpg"))
            .await
            .unwrap()
            .to_string();

        store
            .update_project(&id, Some("Site v2"), Some("Rewritten"), None)
            .await
            .unwrap();
        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects[0].title, "Site v2");
        assert_eq!(projects[0].description, "Rewritten");
        assert_eq!(projects[0].image_path.as_deref(), Some("uploads/a.jpg"));

        let affected = store
            .update_project(&id, Some("Site v3"), Some("Final"), Some("uploads/b.jpg"))
            .await
            .unwrap();
        assert_eq!(affected, 1);
        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects[0].title, "Site v3");
        assert_eq!(projects[0].description, "Final");
        assert_eq!(projects[0].image_path.as_deref(), Some("uploads/b.jpg"));
    }

    #[tokio::test]
    async fn mutations_on_missing_ids_affect_nothing() {
        let store = memory_store().await;
        assert_eq!(store.delete_project("42").await.unwrap(), 0);
        assert_eq!(store.delete_skill("not-a-number").await.unwrap(), 0);
        assert_eq!(store.update_skill("7", Some("x"), None).await.unwrap(), 0);
        assert_eq!(store.skill_image_path("7").await.unwrap(), None);
    }

    #[tokio::test]
    async fn skill_image_path_reads_single_column() {
        let store = memory_store().await;
        let with = store
            .insert_skill(Some("a"), Some("uploads/x.png"))
            .await
            .unwrap();
        let without = store.insert_skill(Some("b"), None).await.unwrap();

        assert_eq!(
            store.skill_image_path(&with.to_string()).await.unwrap(),
            Some("uploads/x.png".to_string())
        );
        assert_eq!(
            store.skill_image_path(&without.to_string()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn null_into_not_null_column_is_a_store_error() {
        let store = memory_store().await;
        let err = store.insert_message(None, Some("a@b.c"), Some("hi")).await;
        assert!(matches!(err, Err(PortfolioError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn disconnected_store_fails_every_call() {
        let store = PortfolioStore::disconnected();
        assert!(!store.is_connected());
        assert!(matches!(
            store.list_skills().await,
            Err(PortfolioError::StoreUnavailable)
        ));
        assert!(matches!(
            store.insert_message(Some("a"), Some("b"), Some("c")).await,
            Err(PortfolioError::StoreUnavailable)
        ));
    }
}

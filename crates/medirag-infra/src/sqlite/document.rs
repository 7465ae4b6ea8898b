//! SQLite document repository implementation.

use sqlx::Row;

use medirag_core::repository::document::DocumentRepository;
use medirag_types::error::RepositoryError;
use medirag_types::knowledge::{Category, Document};

use super::codec::{format_datetime, from_json, parse_datetime, query_error, to_json};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `DocumentRepository`.
pub struct SqliteDocumentRepository {
    pool: DatabasePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct DocumentRow {
    id: String,
    title: String,
    content: String,
    category: String,
    source: String,
    tags: String,
    added_at: String,
    word_count: i64,
    char_count: i64,
}

impl DocumentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            category: row.try_get("category")?,
            source: row.try_get("source")?,
            tags: row.try_get("tags")?,
            added_at: row.try_get("added_at")?,
            word_count: row.try_get("word_count")?,
            char_count: row.try_get("char_count")?,
        })
    }

    fn into_document(self) -> Result<Document, RepositoryError> {
        let category: Category = self
            .category
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Document {
            id: self.id,
            title: self.title,
            content: self.content,
            category,
            source: self.source,
            tags: from_json("tags", &self.tags)?,
            added_at: parse_datetime(&self.added_at)?,
            word_count: self.word_count as usize,
            char_count: self.char_count as usize,
        })
    }
}

impl DocumentRepository for SqliteDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO documents (id, title, content, category, source, tags, added_at, word_count, char_count)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&document.id)
        .bind(&document.title)
        .bind(&document.content)
        .bind(document.category.as_str())
        .bind(&document.source)
        .bind(to_json(&document.tags)?)
        .bind(format_datetime(&document.added_at))
        .bind(document.word_count as i64)
        .bind(document.char_count as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|r| DocumentRow::from_row(&r).map_err(query_error)?.into_document())
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM documents ORDER BY added_at ASC, id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|r| DocumentRow::from_row(r).map_err(query_error)?.into_document())
            .collect()
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM documents")
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    async fn test_repo() -> (SqliteDocumentRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        (SqliteDocumentRepository::new(pool), dir)
    }

    fn document(id: &str, minutes: i64) -> Document {
        Document {
            id: id.to_string(),
            title: format!("Title {id}"),
            content: "Drink water. Sleep well.".to_string(),
            category: Category::Wellness,
            source: "manual".to_string(),
            tags: vec!["sleep".to_string(), "hydration".to_string()],
            added_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes),
            word_count: 4,
            char_count: 24,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let (repo, _dir) = test_repo().await;
        let doc = document("abc123def456", 0);
        repo.save(&doc).await.unwrap();

        let loaded = repo.get("abc123def456").await.unwrap().unwrap();
        assert_eq!(loaded, doc);
        assert!(repo.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let (repo, _dir) = test_repo().await;
        let mut doc = document("a", 0);
        repo.save(&doc).await.unwrap();
        doc.content = "Updated.".to_string();
        repo.save(&doc).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.get("a").await.unwrap().unwrap().content, "Updated.");
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let (repo, _dir) = test_repo().await;
        repo.save(&document("late", 10)).await.unwrap();
        repo.save(&document("early", 1)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let (repo, _dir) = test_repo().await;
        repo.save(&document("a", 0)).await.unwrap();
        repo.save(&document("b", 1)).await.unwrap();
        repo.save(&document("c", 2)).await.unwrap();

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());
        assert_eq!(repo.clear().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

use crate::db::models::Page;
use crate::db::sqlite::Storage;
use crate::error::ConsoleError;

const PAGE_COLUMNS: &str = r#"SELECT id, slug, content, created_at, updated_at FROM "page""#;

impl Storage {
    pub async fn list_pages(&self) -> Result<Vec<Page>, ConsoleError> {
        let pages = sqlx::query_as::<_, Page>(&format!("{PAGE_COLUMNS} ORDER BY id"))
            .fetch_all(self.pool())
            .await?;
        Ok(pages)
    }

    pub async fn find_page(&self, id: i64) -> Result<Option<Page>, ConsoleError> {
        let page = sqlx::query_as::<_, Page>(&format!("{PAGE_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(page)
    }

    /// Public lookup by URL key.
    pub async fn find_page_by_slug(&self, slug: &str) -> Result<Option<Page>, ConsoleError> {
        let page = sqlx::query_as::<_, Page>(&format!("{PAGE_COLUMNS} WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(self.pool())
            .await?;
        Ok(page)
    }

    pub async fn insert_page(&self, page: &Page) -> Result<Page, ConsoleError> {
        let done = sqlx::query(
            r#"INSERT INTO "page" (slug, content, created_at, updated_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&page.slug)
        .bind(&page.content)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(self.pool())
        .await?;

        Ok(Page {
            id: done.last_insert_rowid(),
            ..page.clone()
        })
    }

    pub async fn save_page(&self, page: &Page) -> Result<(), ConsoleError> {
        sqlx::query(
            r#"UPDATE "page" SET
                slug = ?,
                content = ?,
                created_at = ?,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&page.slug)
        .bind(&page.content)
        .bind(page.created_at)
        .bind(page.updated_at)
        .bind(page.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn delete_page(&self, id: i64) -> Result<u64, ConsoleError> {
        let done = sqlx::query(r#"DELETE FROM "page" WHERE id = ?"#)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::models::Page;
    use crate::db::sqlite::tests::memory_storage;

    #[tokio::test]
    async fn slug_lookup() {
        let storage = memory_storage().await;
        storage
            .insert_page(&Page::new("about", "About us"))
            .await
            .expect("insert");

        let page = storage
            .find_page_by_slug("about")
            .await
            .expect("query")
            .expect("found");
        assert_eq!(page.content, "About us");
        assert!(storage.find_page_by_slug("missing").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn duplicate_slug_fails_once() {
        let storage = memory_storage().await;
        storage
            .insert_page(&Page::new("home", "first"))
            .await
            .expect("first");
        assert!(storage.insert_page(&Page::new("home", "second")).await.is_err());

        let pages = storage.list_pages().await.expect("list");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "first");
    }

    #[tokio::test]
    async fn save_overwrites_fields() {
        let storage = memory_storage().await;
        let mut page = storage
            .insert_page(&Page::new("draft", "v1"))
            .await
            .expect("insert");
        page.slug = "final".to_string();
        page.content = "v2".to_string();
        storage.save_page(&page).await.expect("save");

        let stored = storage.find_page(page.id).await.expect("find").expect("exists");
        assert_eq!(stored.slug, "final");
        assert_eq!(stored.content, "v2");
        assert_eq!(storage.delete_page(page.id).await.expect("delete"), 1);
    }
}

use crate::db::models::User;
use crate::db::sqlite::Storage;
use crate::error::ConsoleError;

const USER_COLUMNS: &str = r#"SELECT id, login, password, created_at, updated_at FROM "user""#;

impl Storage {
    pub async fn list_users(&self) -> Result<Vec<User>, ConsoleError> {
        let users = sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} ORDER BY id"))
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    pub async fn count_users(&self) -> Result<i64, ConsoleError> {
        let rec: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "user""#)
            .fetch_one(self.pool())
            .await?;
        Ok(rec.0)
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>, ConsoleError> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, ConsoleError> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_COLUMNS} WHERE login = ?"))
            .bind(login)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// Insert and return the stored row with its assigned id.
    pub async fn insert_user(&self, user: &User) -> Result<User, ConsoleError> {
        let done = sqlx::query(
            r#"INSERT INTO "user" (login, password, created_at, updated_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&user.login)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await?;

        Ok(User {
            id: done.last_insert_rowid(),
            ..user.clone()
        })
    }

    /// Overwrite every column of the row with `user.id`.
    pub async fn save_user(&self, user: &User) -> Result<(), ConsoleError> {
        sqlx::query(
            r#"UPDATE "user" SET
                login = ?,
                password = ?,
                created_at = ?,
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(&user.login)
        .bind(&user.password)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Returns the number of rows removed (0 when the id was unknown).
    pub async fn delete_user(&self, id: i64) -> Result<u64, ConsoleError> {
        let done = sqlx::query(r#"DELETE FROM "user" WHERE id = ?"#)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected())
    }
}

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::auth::CurrentUser;
use crate::features::files::dtos::FileFormDto;
use crate::features::files::models::{FileDownload, FileListing, FileRef};

/// Service for file operations
pub struct FileService {
    pool: SqlitePool,
}

impl FileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn not_found(id: i64) -> AppError {
        AppError::NotFound(format!("File id {} doesn't exist.", id))
    }

    /// All files owned by `user`, most recently written first
    pub async fn list_for_author(&self, user: &CurrentUser) -> Result<Vec<FileListing>> {
        let files = sqlx::query_as::<_, FileListing>(
            r#"
            SELECT f.id, u.username, f.friendly_title, f.created,
                   length(f.contents) AS size
            FROM files f
            JOIN users u ON f.author_id = u.id
            WHERE u.id = ?
            ORDER BY f.created DESC, f.id DESC
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        debug!("Listed {} files for user_id={}", files.len(), user.id);

        Ok(files)
    }

    /// Look up a file for an ownership decision.
    ///
    /// # Arguments
    /// * `id` - The file id
    /// * `user` - The user asking
    /// * `check_author` - Require `user` to be the author
    ///
    /// # Returns
    /// The id/author/title projection, `NotFound` if absent, or `Forbidden`
    /// if `check_author` is set and `user` is not the author.
    pub async fn get_file(
        &self,
        id: i64,
        user: &CurrentUser,
        check_author: bool,
    ) -> Result<FileRef> {
        let file = sqlx::query_as::<_, FileRef>(
            r#"
            SELECT f.id, f.author_id, f.friendly_title
            FROM files f
            JOIN users u ON f.author_id = u.id
            WHERE f.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let file = file.ok_or_else(|| Self::not_found(id))?;

        if check_author && file.author_id != user.id {
            debug!(
                "User {} denied access to file {} owned by {}",
                user.id, file.id, file.author_id
            );
            return Err(AppError::Forbidden(
                "You do not have permission to modify this file".to_string(),
            ));
        }

        Ok(file)
    }

    /// Store a new file for `user`.
    ///
    /// An empty title is rejected with `AppError::Validation` and nothing is written.
    pub async fn create_file(&self, user: &CurrentUser, form: FileFormDto) -> Result<FileRef> {
        form.check()?;

        let file = sqlx::query_as::<_, FileRef>(
            r#"
            INSERT INTO files (author_id, friendly_title, contents)
            VALUES (?, ?, ?)
            RETURNING id, author_id, friendly_title
            "#,
        )
        .bind(user.id)
        .bind(&form.friendly_title)
        .bind(&form.contents)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "File created: id={}, author_id={}, size={}",
            file.id,
            file.author_id,
            form.contents.len()
        );

        Ok(file)
    }

    /// Title and bytes of any file. Ownership is not checked.
    pub async fn download(&self, id: i64) -> Result<FileDownload> {
        let file = sqlx::query_as::<_, FileDownload>(
            "SELECT friendly_title, contents FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        file.ok_or_else(|| Self::not_found(id))
    }

    /// Replace title and contents of a file `user` owns and bump its timestamp
    pub async fn update_file(
        &self,
        user: &CurrentUser,
        id: i64,
        form: FileFormDto,
    ) -> Result<FileRef> {
        self.get_file(id, user, true).await?;
        form.check()?;

        let file = sqlx::query_as::<_, FileRef>(
            r#"
            UPDATE files
            SET contents = ?, friendly_title = ?,
                created = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING id, author_id, friendly_title
            "#,
        )
        .bind(&form.contents)
        .bind(&form.friendly_title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        // The row can vanish between the ownership check and the write.
        let file = file.ok_or_else(|| Self::not_found(id))?;

        info!(
            "File updated: id={}, author_id={}, size={}",
            file.id,
            file.author_id,
            form.contents.len()
        );

        Ok(file)
    }

    /// Permanently remove a file `user` owns
    pub async fn delete_file(&self, user: &CurrentUser, id: i64) -> Result<()> {
        self.get_file(id, user, true).await?;

        sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("File deleted: id={}, author_id={}", id, user.id);

        Ok(())
    }
}

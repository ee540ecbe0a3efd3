use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Id, owner and title of a stored file; never carries the blob
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRef {
    pub id: i64,
    pub author_id: i64,
    pub friendly_title: String,
}

/// One row of the owner's listing, joined with the author's username
#[derive(Debug, Clone, FromRow)]
pub struct FileListing {
    pub id: i64,
    pub username: String,
    pub friendly_title: String,
    pub created: DateTime<Utc>,
    pub size: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct FileDownload {
    pub friendly_title: String,
    pub contents: Vec<u8>,
}

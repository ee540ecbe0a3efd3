mod file;

pub use file::{FileDownload, FileListing, FileRef};

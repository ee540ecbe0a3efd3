mod file_dto;

pub use file_dto::{
    content_disposition, content_type, FileFormDto, FileListItemDto, FileRefDto, TITLE_REQUIRED,
};

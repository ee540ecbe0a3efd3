mod file_handler;

pub use file_handler::{
    create_file, create_form, delete_file, download_file, list_files, update_file, update_form,
};

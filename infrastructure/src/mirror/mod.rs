//! Client-local mirror stored as JSON files.

mod json_file;

pub use json_file::JsonFileMirror;

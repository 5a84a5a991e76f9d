pub mod download;
pub mod repo;

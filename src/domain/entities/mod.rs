pub mod entity;
pub mod query;
pub mod schema;
pub mod selection;

pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod delete;
pub mod edit;
pub mod facets;
pub mod list;

//! User mirroring and search.

pub mod db;
pub mod handlers;

//! Application services and the capability traits they depend on.

pub mod auth;
pub mod error;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod users;

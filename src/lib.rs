//! Plume: the cache-aside data-access layer and pagination engine of a blog backend.

pub mod application;
pub mod cache;
pub mod config;
pub mod context;
pub mod domain;
pub mod infra;

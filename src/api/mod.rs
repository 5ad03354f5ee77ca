pub mod error;
pub mod handlers;
pub mod rest;
pub mod types;

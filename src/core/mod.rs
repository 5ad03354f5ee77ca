pub mod identity;
pub mod image;
pub mod recognition;
pub mod services;

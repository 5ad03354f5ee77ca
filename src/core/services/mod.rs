pub mod health;
pub mod identity;
pub mod saga;

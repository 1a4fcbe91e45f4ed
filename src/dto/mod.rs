pub mod admin;
pub mod auth;
pub mod budget;
pub mod orders;
pub mod security;

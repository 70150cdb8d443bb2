pub mod admin;
pub mod auth;
pub mod donations;
pub mod pledges;
pub mod public;
pub mod root;

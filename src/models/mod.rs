pub mod document;
pub mod user;
pub mod vehicle;

pub mod admin;
pub mod auth;
pub mod comment;
pub mod problem_set;
pub mod question;
pub mod reputation;
pub mod vote;

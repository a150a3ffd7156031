pub mod auth;
pub mod catalog;
pub mod feedback;
pub mod history;
pub mod images;
pub mod interactions;
pub mod profile;
pub mod session_gate;
pub mod views;
pub mod watchlist;

pub mod api;
pub mod feed;
pub mod mongodb;
pub mod ops;
pub mod question;
pub mod store;

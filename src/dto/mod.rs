pub mod admin;
pub mod auth;
pub mod cart;
pub mod contacts;
pub mod orders;
pub mod products;
pub mod reports;
pub mod reviews;
pub mod wishlist;

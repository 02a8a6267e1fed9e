pub mod admin;
pub mod booking;
pub mod content;
pub mod pages;
pub mod relay;

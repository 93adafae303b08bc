pub mod api;
pub mod contracts;
pub mod error;
pub mod resource;

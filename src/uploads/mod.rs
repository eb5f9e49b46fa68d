// src/uploads/mod.rs

pub mod handlers;
pub mod routes;


pub use routes::uploads_routes;

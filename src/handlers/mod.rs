// src/handlers/mod.rs

pub mod actor;
pub mod movie;
pub mod rating;
pub mod review;

// src/utils/mod.rs

pub mod client_ip;
pub mod html;
pub mod review_tree;

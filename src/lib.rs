// src/lib.rs

pub mod clustering;
pub mod identity;
pub mod ingest;
pub mod models;
pub mod network;
pub mod scoring;
pub mod utils;

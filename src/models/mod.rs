// src/models/mod.rs

pub mod record;

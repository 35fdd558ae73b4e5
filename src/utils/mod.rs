// src/utils/mod.rs

pub mod hash;
pub mod scoring;
pub mod student;

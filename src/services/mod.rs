// src/services/mod.rs

pub mod allocator;
pub mod catalog;
pub mod gate;
pub mod ledger;
pub mod notify;
pub mod session;

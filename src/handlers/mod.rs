//! HTTP handlers

pub mod analytics;
pub mod fraud;
pub mod health;

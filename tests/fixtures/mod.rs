//! Shared fixtures for the integration tests
#![allow(dead_code)]

pub mod openapi;
pub mod requests;
pub mod upstream;

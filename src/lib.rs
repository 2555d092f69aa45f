//! Library exports for the URL shortener application
//!
//! This module exposes internal components for testing and for the binary.

pub mod config;
pub mod database;
pub mod error;
pub mod generator;
pub mod handler;
pub mod model;
pub mod route;
pub mod service;
pub mod state;
pub mod validation;

#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else, clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod avatar;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod maud_conveniences;
pub mod persistence;
pub mod routes;
pub mod service;
pub mod state;
pub mod validation;

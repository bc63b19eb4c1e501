pub extern crate actix_web;

mod admin;
pub mod allocator;
pub mod config;
pub mod connection;
pub mod handlers;
pub mod lifecycle;
pub mod outbox;
pub mod registry;
pub mod relay;
pub mod server;
pub mod server_state;

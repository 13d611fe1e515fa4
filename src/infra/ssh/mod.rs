pub mod auth;
pub mod client;

pub use client::SftpTransport;

pub mod client;

pub use client::FtpTransport;

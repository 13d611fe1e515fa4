pub mod config_store;
pub mod factory;
pub mod ftp;
pub mod net;
pub mod ssh;

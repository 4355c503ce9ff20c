pub mod config;
pub mod error;
pub mod identity;
pub mod pagination;
pub mod session;
pub mod storage;
pub mod theme;

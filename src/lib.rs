pub mod bench;
pub mod conf;
pub mod core;
pub mod endpoint;
pub mod service;
pub mod source;

#[cfg(feature = "testutil")]
pub mod testutil;

//! Library crate for atem-scan-rs: finds ATEM switchers on the local /24 with a UDP hello.
pub mod error;
pub mod logging;
pub mod netdetect;
pub mod probe;
pub mod scanner;
pub mod types;

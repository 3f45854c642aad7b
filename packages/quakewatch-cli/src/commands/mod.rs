pub mod monitor;
pub mod ports;
pub mod replay;

pub mod config;
pub mod intent;
pub mod orchestration;
pub mod shared;

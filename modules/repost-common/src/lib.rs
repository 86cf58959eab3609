pub mod config;
pub mod text;
pub mod types;

pub use config::Config;
pub use text::{strip_code_blocks, truncate_chars};
pub use types::*;

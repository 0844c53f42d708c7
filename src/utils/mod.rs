pub mod environment;
pub mod files;
pub mod logging;

pub use environment::Config;
pub use files::{read_to_string_bounded, validate_file_size};
pub use logging::init_logging;

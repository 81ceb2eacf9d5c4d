pub mod debug_logger;
pub mod discovery;

pub use debug_logger::{get_debug_logger, EnhancedDebugLogger};

pub mod logging;
pub mod panic;

pub use logging::*;
pub use panic::*;

pub mod extract;
pub mod health;
pub mod index;

pub use extract::*;
pub use health::*;
pub use index::*;

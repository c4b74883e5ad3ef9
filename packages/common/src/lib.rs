pub mod clock;
pub mod listeners;

pub use clock::*;
pub use listeners::*;

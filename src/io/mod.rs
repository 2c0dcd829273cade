pub mod input;
pub mod output;
pub mod quarantine;

pub use input::*;
pub use output::*;
pub use quarantine::*;

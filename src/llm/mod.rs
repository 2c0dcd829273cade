pub mod client;
pub mod error;
pub mod parse;
pub mod prompts;
pub mod stream;

pub use client::*;
pub use error::*;
pub use parse::*;
pub use prompts::*;
pub use stream::*;

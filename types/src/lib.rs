mod transcript;
mod types;

pub use transcript::*;
pub use types::*;

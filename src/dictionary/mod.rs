pub mod record;
pub mod variants;
pub mod provider;
pub mod builtin;

pub use record::*;
pub use variants::*;
pub use provider::*;

pub mod index;
pub mod matcher;
pub mod annotate;
pub mod content;
pub mod driver;

pub use index::*;
pub use matcher::*;
pub use annotate::*;
pub use content::*;
pub use driver::*;

#[cfg(test)]
mod tests;

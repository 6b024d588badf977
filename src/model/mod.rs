pub mod member;
pub mod workspace;

pub use member::*;
pub use workspace::*;

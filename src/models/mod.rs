pub mod enums;
mod member;
mod record;
mod schedule;

pub use member::*;
pub use record::*;
pub use schedule::*;

pub mod core;
pub mod identity;

pub use self::core::{Address, Paper, PaperAuthor, Reference, StudySystem};
pub use self::identity::{AltNameRow, CanonicalKey, NameLookup, NameVariant, RosterExpansion};

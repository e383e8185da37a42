mod compound;
mod errors;
mod identity;

pub use compound::{CompoundRecord, DeleteOutcome, DeletedCompound};
pub use errors::DomainError;
pub use identity::{compound_identity, normalize_code, IDENTITY_LEN, LONG_DASH};

pub mod memory;
pub mod pg;

pub use memory::InMemoryEntryStore;
pub use pg::PgEntryStore;

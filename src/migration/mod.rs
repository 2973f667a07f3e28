//! Bulk import of a complete namespace tree for one user, plus the record
//! of when an importer last ran.

mod status;
mod structure;

pub use status::{MigrationStatus, get_migration_status, set_migration_status};
pub use structure::{ListStructure, NamespaceStructure, insert_from_structure};

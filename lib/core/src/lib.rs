pub mod collab;
pub mod envelope;
pub mod error;
pub mod module;
pub mod types;

pub use collab::{
    CalorieLedger, ContributionStats, Identity, RecipeCatalog, RecipeSummary, UserDirectory,
    UserRef,
};
pub use error::ServiceError;
pub use module::Module;
pub use types::{ListParams, ListResult, new_id, now_rfc3339, parse_rfc3339};

//! Crewdesk Users Crate
//!
//! Domain services for user management: exhaustive batch validation,
//! transactional bulk insert, search listing with pagination, field
//! updates, and soft/batch deletion. The HTTP layer lives in
//! `crewdesk-gateway`; persistence lives in `crewdesk-database`.

pub mod services;
pub mod types;
pub mod utils;

pub use crewdesk_database::{User, UserRole};

pub use services::{BulkCreateError, UserService};
pub use types::{BatchErrors, NewUser, Page, UpdateUser, ValidationErrors};

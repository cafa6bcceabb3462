pub mod db;
pub mod error;
pub mod repo;
pub mod types;

pub use error::{LeadError, Result};
pub use repo::LeadRepository;
pub use types::{Lead, LeadPayload, LeadStatus};

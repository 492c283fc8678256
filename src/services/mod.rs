pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{Access, AuthError, SessionGate, View, check_access};
pub use auth_service_impl::{LocalSessionGate, hash_password, verify_password};

pub mod beehive_service;
pub mod beehive_service_impl;
pub use beehive_service::{BeehiveError, BeehiveService};
pub use beehive_service_impl::LocalBeehiveService;

pub mod bulk;
pub use bulk::{BulkFailure, BulkReport, create_batch, create_many};

pub mod validation;
pub use validation::ValidationError;

pub mod views;
pub use views::{HealthTally, HiveFilter, HiveStats, Page, SortKey, SortOrder};

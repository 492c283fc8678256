pub mod backend;

pub use backend::{BackendClient, ClientError, RemoteSessionGate};

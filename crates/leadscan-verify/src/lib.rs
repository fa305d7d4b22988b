//! Deliverability verifiers: the EmailHippo API, a bulk EmailHippo CSV
//! export, and a plain DNS MX lookup.

pub mod csv;
pub mod dns;
pub mod error;
pub mod hippo;
pub(crate) mod types;

pub use csv::EmailHippoCsvVerifier;
pub use dns::DnsMxVerifier;
pub use error::VerifyError;
pub use hippo::EmailHippoClient;

//! Remote publishing of generated artifacts.
//!
//! [`store::RemoteStore`] is the seam between the pipeline and the remote
//! service; [`google::GoogleWorkspaceStore`] implements it against the
//! Google Drive and Sheets REST APIs. [`publisher::RemotePublisher`] runs
//! the upload, permission, and link steps on top of any store.

pub mod credentials;
pub mod error;
pub mod google;
pub mod publisher;
pub mod store;
pub mod token;

pub use error::CloudError;

//! Media adapter: the narrow seam between the gate and Cloudinary.
//!
//! ```text
//! gate operation
//!   │
//!   ▼
//! MediaApi (trait)
//!   ├── CloudinaryClient   feature "http", reqwest
//!   ├── Unconfigured       development run without credentials
//!   └── FakeMediaApi       feature "test-helpers", scripted replies
//! ```
//!
//! Delivery URLs are built locally by [`transformation::delivery_url`];
//! every other operation is one remote round trip.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-helpers"))]
pub mod fake;
#[cfg(feature = "http")]
pub mod http;
pub mod signing;
pub mod transformation;
pub mod types;

pub use client::{MediaApi, Unconfigured};
pub use error::AdapterError;
#[cfg(feature = "http")]
pub use http::CloudinaryClient;
pub use transformation::Transformation;
pub use types::{
    DestroyResult, RenameOptions, Resource, SearchQuery, SearchResult, SortDirection, SortField,
    TagCommand, TagResult, UploadParams,
};

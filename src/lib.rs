//! Persona Service
//!
//! Minimal HTTP service that appends person records (name, age, height) to
//! a single CSV document in an S3-compatible object store and reports the
//! current record count. Every mutation is a whole-document cycle: download
//! the object, decode it, append one row, re-encode, and overwrite the
//! object. An absent object is treated as an empty document, so the first
//! write creates it.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request          Validation            Object store
//! ┌──────────────┐     ┌──────────────┐      ┌──────────────┐
//! │ POST         │────▶│ NewPerson::  │      │ bucket/key   │
//! │ /personas    │     │ validate     │      │ personas.csv │
//! └──────────────┘     └──────────────┘      └──────────────┘
//!        │                    │                     ▲
//!        ▼                    ▼                     │
//! ┌──────────────┐     ┌──────────────┐      ┌──────────────┐
//! │ GET          │────▶│ Person       │─────▶│ CSV codec    │
//! │ /personas/   │     │ Repository   │      │ encode/      │
//! │ count        │     │ load/save    │◀─────│ decode       │
//! └──────────────┘     └──────────────┘      └──────────────┘
//! ```
//!
//! ## Known limitation
//!
//! There is no cross-request coordination: concurrent create calls each run
//! an independent load-modify-save cycle with no locking, versioning token,
//! or retry-on-conflict. Under concurrent writers the last upload wins and
//! earlier appends can be lost. The store's atomic object replacement means
//! the document is never observed corrupt or partially written, only
//! possibly stale.

pub mod api;
pub mod codec;
pub mod config;
pub mod person;
pub mod repository;
pub mod store;

pub use api::{AppState, CountResponse, CreatePersonResponse};
pub use config::Config;
pub use person::{NewPerson, Person, ValidationError};
pub use repository::PersonRepository;
pub use store::{ObjectStore, S3ObjectStore, StoreError};

//! Dual-persistence synchronization.
//!
//! Records live locally for anonymous sessions and remotely (with a local
//! mirror) for signed-in users:
//!
//! - **Repository**: load/save/delete dispatched on auth state
//! - **Reconcile**: one-time upload of local-only records after sign-in
//! - **Types**: auth and load state, notices
//!
//! # Example
//!
//! ```ignore
//! use ft::sync::{AuthState, Repository};
//!
//! let mut workouts = Repository::new(storage, remote).with_auth(AuthState::for_user(Some("u-1")));
//! let outcome = workouts.load().await;
//! for notice in &outcome.notices {
//!     eprintln!("{notice}");
//! }
//! ```

pub mod reconcile;
pub mod repository;
pub mod types;

pub use reconcile::{plan_upload, reconcile};
pub use repository::Repository;
pub use types::{AuthState, LoadOutcome, LoadState, Notice, ReconcileOutcome};

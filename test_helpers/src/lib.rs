//! Test helpers shared across crates.
//!
//! [`with_jail`] isolates environment and working-directory changes;
//! [`project`] builds throwaway settings trees on disk.

mod jail;
pub mod project;

pub use jail::with_jail;

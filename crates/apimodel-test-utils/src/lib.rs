//! Utilities shared by apimodel tests.
//!
//! The main piece is [`ProviderMatrix`]: one test body, run against every provider and input
//! format a fixture can be loaded with.

mod fixtures;
mod matrix;

pub use fixtures::{foo_bar_fixture, ApiFixture};
pub use matrix::{default_registry, ProviderCase, ProviderMatrix};

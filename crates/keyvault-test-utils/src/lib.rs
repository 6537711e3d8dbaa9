// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keyvault integration tests.
//!
//! - [`TestVault`] - a vault service over in-memory or temp SQLite stores
//!   with cheap KDF profiles
//! - [`FailingKeyValueStore`] - a slot store whose every call fails

pub mod failing_store;
pub mod harness;

pub use failing_store::FailingKeyValueStore;
pub use harness::{TestVault, TestVaultBuilder, TEST_MASTER_ITERATIONS, TEST_PIN_ITERATIONS};

// SPDX-FileCopyrightText: 2026 Keyvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed SQL operations on the Keyvault tables.

pub mod kv;
pub mod records;

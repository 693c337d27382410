// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for vault I/O: file access and reference discovery

pub mod fs;
pub mod scan;
pub mod traced;

pub use fs::{FsError, LocalFs, VaultFs};
pub use scan::{ReferenceLocation, ReferenceScanner, ScanError, VaultScanner};
pub use traced::{TracedFs, TracedScanner};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fs::{FaultyFs, FsCall, FsOp};
#[cfg(any(test, feature = "test-support"))]
pub use scan::FakeScanner;

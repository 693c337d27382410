// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lv-storage: durable primitives for the rename engine
//!
//! - Atomic temp-file-then-rename writes with retry on transient I/O errors
//! - The write-ahead log of transaction manifests, kept outside the vault
//! - Pre-staging backups of every file a transaction will overwrite
//! - Liveness checks on the process that owns a WAL

mod atomic;
mod error;
mod process;
pub mod wal;

pub use atomic::{
    atomic_write, exists, is_temp_name, is_transient, read_with_retry, remove_if_exists,
    rename_no_clobber, rename_with_retry, temp_path_for, RetryPolicy,
};
pub use error::{StorageError, WalError};
pub use process::process_exists;
pub use wal::{PendingWal, WalEntry, WriteAheadLog, RENAME_OPERATION, WAL_VERSION};

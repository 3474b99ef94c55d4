// SPDX-License-Identifier: GPL-3.0-only
pub mod service;

pub use service::{SyncChecker, SyncDecision, SyncReport, build_repo_name};

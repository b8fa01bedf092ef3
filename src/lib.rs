// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Varpath: packed variable-font outlines and transactional point editing
//!
//! - [`path`] holds the packed outline format, curve reconstruction and
//!   the itemwise arithmetic used for interpolation
//! - [`editing`] holds selections, change records, drag behaviors, edit
//!   sessions and undo
//! - [`tools`] drives the pointer and shapes tools from async pointer
//!   event streams

pub mod editing;
pub mod error;
pub mod path;
pub mod settings;
pub mod tools;

pub use editing::{
    BehaviorName, Change, ChangeSet, EditBehavior, EditBehaviorFactory, EditContext, EditSession,
    GlyphInstance, Selection, SelectionItem, UndoInfo,
};
pub use error::{EditError, PathError, VariationError};
pub use path::{PackedPath, PathConsumer, PathPoint, PointType};
pub use settings::EditorSettings;

/// Install the tracing subscriber
///
/// Controlled by the `RUST_LOG` env var; this crate logs at `info` unless
/// told otherwise. Does nothing if a subscriber is already installed.
pub fn init_logging() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "varpath=info".parse() {
        filter = filter.add_directive(directive);
    }
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

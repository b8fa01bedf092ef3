// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit sessions: the transaction around one gesture.
//!
//! An [`EditContext`] owns the live glyph instance and its undo history.
//! Every mutation goes through an [`EditSession`] borrowed from it:
//!
//! 1. [`EditContext::begin`] snapshots the baseline
//! 2. [`EditSession::set_rollback`] installs the change that restores it
//! 3. [`EditSession::incremental_may_drop`] queues preview changes; only the
//!    latest one survives until [`EditSession::flush_preview`]
//! 4. [`EditSession::incremental`] applies a change unconditionally
//! 5. [`EditSession::end`] commits one consolidated undo record
//!
//! A session that is aborted, or dropped before `end`, applies its rollback
//! so the instance is back at the baseline. Holding `&mut EditContext`
//! keeps a second session from starting while one is open.

use super::change::ChangeSet;
use super::instance::GlyphInstance;
use super::undo::{UndoHistory, UndoInfo, UndoRecord};
use crate::error::EditError;
use crate::settings::EditorSettings;

/// The live instance being edited, and its history
#[derive(Debug, Clone, Default)]
pub struct EditContext {
    instance: GlyphInstance,
    history: UndoHistory,
}

impl EditContext {
    pub fn new(instance: GlyphInstance) -> Self {
        Self::with_history(instance, UndoHistory::default())
    }

    pub fn with_history(instance: GlyphInstance, history: UndoHistory) -> Self {
        Self { instance, history }
    }

    /// A context whose history keeps `settings.undo_depth` records
    pub fn with_settings(instance: GlyphInstance, settings: &EditorSettings) -> Self {
        Self::with_history(instance, UndoHistory::new(settings.undo_depth))
    }

    pub fn instance(&self) -> &GlyphInstance {
        &self.instance
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn into_instance(self) -> GlyphInstance {
        self.instance
    }

    /// Open a session on the current instance
    pub fn begin(&mut self) -> EditSession<'_> {
        let baseline = self.instance.clone();
        EditSession {
            context: self,
            baseline,
            rollback: ChangeSet::new(),
            pending: None,
            finished: false,
        }
    }

    /// Apply a discrete edit as one transaction
    pub fn atomic(
        &mut self,
        change: ChangeSet,
        rollback: ChangeSet,
        info: UndoInfo,
    ) -> Result<(), EditError> {
        let mut session = self.begin();
        session.set_rollback(rollback)?;
        session.incremental(&change)?;
        session.end(change, info);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<Option<super::Selection>, EditError> {
        self.history.undo(&mut self.instance)
    }

    pub fn redo(&mut self) -> Result<Option<super::Selection>, EditError> {
        self.history.redo(&mut self.instance)
    }
}

/// One open transaction on an [`EditContext`]
#[derive(Debug)]
pub struct EditSession<'a> {
    context: &'a mut EditContext,
    baseline: GlyphInstance,
    rollback: ChangeSet,
    pending: Option<ChangeSet>,
    finished: bool,
}

impl EditSession<'_> {
    /// The instance as it was when the session began
    pub fn baseline(&self) -> &GlyphInstance {
        &self.baseline
    }

    /// The live instance, including applied previews
    pub fn instance(&self) -> &GlyphInstance {
        &self.context.instance
    }

    /// Install the change that restores the baseline
    ///
    /// Replacing a rollback mid-gesture first applies the old one, so no
    /// point stays where the previous behavior put it. A queued preview
    /// belongs to the old behavior and is dropped.
    pub fn set_rollback(&mut self, rollback: ChangeSet) -> Result<(), EditError> {
        self.pending = None;
        self.rollback.apply(&mut self.context.instance)?;
        self.rollback = rollback;
        Ok(())
    }

    /// Queue a preview change that may be superseded before it is applied
    pub fn incremental_may_drop(&mut self, change: ChangeSet) {
        if self.pending.replace(change).is_some() {
            tracing::trace!("preview change superseded");
        }
    }

    /// Whether a queued preview is waiting for [`flush_preview`](Self::flush_preview)
    pub fn has_pending_preview(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the latest queued preview, if any
    pub fn flush_preview(&mut self) -> Result<(), EditError> {
        match self.pending.take() {
            Some(change) => change.apply(&mut self.context.instance),
            None => Ok(()),
        }
    }

    /// Apply a change now; any queued preview is dropped
    pub fn incremental(&mut self, change: &ChangeSet) -> Result<(), EditError> {
        self.pending = None;
        change.apply(&mut self.context.instance)
    }

    /// Commit the session with its final change
    ///
    /// The final change must already have been applied with
    /// [`incremental`](Self::incremental). An empty change commits nothing.
    pub fn end(mut self, change: ChangeSet, info: UndoInfo) {
        self.finished = true;
        if change.is_empty() {
            tracing::debug!("Edit '{}' ended without changes", info.label);
            return;
        }
        tracing::info!("Committed edit '{}' ({} changes)", info.label, change.len());
        let record = UndoRecord {
            change: change.consolidate(),
            rollback: std::mem::take(&mut self.rollback).consolidate(),
            info,
        };
        self.context.history.push(record);
    }

    /// Discard the session, restoring the baseline
    pub fn abort(mut self) -> Result<(), EditError> {
        self.finished = true;
        self.pending = None;
        let rollback = std::mem::take(&mut self.rollback);
        tracing::debug!("Edit aborted, rolling back {} changes", rollback.len());
        rollback.apply(&mut self.context.instance)
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::debug!("Edit session dropped before end, rolling back");
        if let Err(e) = self.rollback.apply(&mut self.context.instance) {
            tracing::warn!("Rollback of unfinished edit failed: {e}");
        }
    }
}

//! The IED removal dialog: lifecycle, list refresh, and removal dispatch.
//!
//! The dialog is an explicit state object. The host activates it with [`RemoveIedsDialog::run`],
//! every way of dismissing it ends in [`RemoveIedsDialog::close`], and removal goes through
//! [`RemoveIedsDialog::remove_selected`], which hands the host one event per selected IED.

use crate::app::host::Host;
use crate::app::projection::project_items;
use crate::app::removal::remove_ied;
use crate::app::selection::SelectionListState;
use crate::domain::model::{IedHandle, RemovalReport};
use crate::infra::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

/// Behaviour switches for the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogOptions {
    /// Close the dialog once a submit has dispatched its removals.
    pub close_after_remove: bool,
    /// Re-project the items whenever the host's change counter moves while open.
    pub live_refresh: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            close_after_remove: false,
            live_refresh: true,
        }
    }
}

impl DialogOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            close_after_remove: config.dialog.close_after_remove(),
            live_refresh: config.dialog.live_refresh(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoveIedsDialog {
    state: DialogState,
    list: SelectionListState,
    observed_edit_count: Option<u64>,
    options: DialogOptions,
}

impl Default for RemoveIedsDialog {
    fn default() -> Self {
        Self::new(DialogOptions::default())
    }
}

impl RemoveIedsDialog {
    pub fn new(options: DialogOptions) -> Self {
        Self {
            state: DialogState::Closed,
            list: SelectionListState::default(),
            observed_edit_count: None,
            options,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    pub fn options(&self) -> DialogOptions {
        self.options
    }

    pub fn list(&self) -> &SelectionListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut SelectionListState {
        &mut self.list
    }

    /// Open the dialog on the host's current document.
    ///
    /// Running an already open dialog re-projects its items.
    pub fn run<H: Host + ?Sized>(&mut self, host: &H) {
        self.refresh(host);
        if self.state == DialogState::Closed {
            tracing::debug!(items = self.list.items().len(), "removal dialog opened");
        }
        self.state = DialogState::Open;
    }

    /// Pick up document changes before a render.
    ///
    /// Returns `true` when the items were re-projected.
    pub fn sync<H: Host + ?Sized>(&mut self, host: &H) -> bool {
        if !self.is_open()
            || !self.options.live_refresh
            || self.observed_edit_count == Some(host.edit_count())
        {
            return false;
        }
        self.refresh(host);
        true
    }

    /// Close the dialog, clearing the selection and filter and dropping the items.
    ///
    /// Returns `false` when the dialog was not open.
    pub fn close(&mut self) -> bool {
        if self.state == DialogState::Closed {
            return false;
        }
        self.list.clear();
        self.list.take_items();
        self.observed_edit_count = None;
        self.state = DialogState::Closed;
        tracing::debug!("removal dialog closed");
        true
    }

    /// Dismiss gesture (escape). Never hides the dialog by itself; it takes the close path.
    pub fn cancel(&mut self) -> bool {
        self.close()
    }

    /// Remove every selected IED, one event per IED, in list order.
    ///
    /// Each event is computed against the document as it is after the previous one was applied.
    /// IEDs that cannot be resolved or whose event the host rejects are skipped. The selection is
    /// cleared afterwards; the dialog stays open.
    pub fn remove_selected<H: Host + ?Sized>(&mut self, host: &mut H) -> RemovalReport {
        let mut report = RemovalReport::default();
        let mut removed: Vec<IedHandle> = Vec::new();

        for handle in self.list.selected_handles() {
            let label = handle.label();
            // Each same-named IED removed before this one moves it up by one occurrence.
            let shift = removed
                .iter()
                .filter(|done| {
                    done.name() == handle.name() && done.occurrence() < handle.occurrence()
                })
                .count();
            let current = IedHandle::nth(
                handle.name(),
                handle.occurrence().saturating_sub(shift),
            );
            let Some(event) = host.document().and_then(|doc| remove_ied(doc, &current)) else {
                tracing::warn!(ied = %label, "IED not found in document, skipping");
                report.skipped.push(label);
                continue;
            };
            match host.dispatch(event) {
                Ok(()) => {
                    report.removed.push(label);
                    removed.push(handle);
                }
                Err(err) => {
                    tracing::warn!(ied = %label, error = %err, "host rejected removal, skipping");
                    report.skipped.push(label);
                }
            }
        }

        self.list.clear();
        report
    }

    /// Form submit: remove the selection, then close if configured to.
    pub fn submit<H: Host + ?Sized>(&mut self, host: &mut H) -> RemovalReport {
        let report = self.remove_selected(host);
        if self.options.close_after_remove {
            self.close();
        }
        report
    }

    fn refresh<H: Host + ?Sized>(&mut self, host: &H) {
        let items = project_items(host.document());
        tracing::debug!(items = items.len(), edit_count = host.edit_count(), "items projected");
        self.list.set_items(items);
        self.observed_edit_count = Some(host.edit_count());
    }
}

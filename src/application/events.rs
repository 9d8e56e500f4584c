//! FIFO queue of user actions
//!
//! Each action is handled to completion, including its requests, before the
//! next one is dequeued.

use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::debug;

use crate::application::services::{SchemaBrowser, TreeEvent, ViewOutcome};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Click;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    Click(Click),
    SelectSchema(String),
    Toggle(String),
    FormatChanged(usize),
    Download(String),
    DownloadAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Viewed(ViewOutcome),
    Toggled { id: Option<String>, expanded: bool },
    Downloaded(PathBuf),
    Nothing,
}

impl From<Option<ViewOutcome>> for EventOutcome {
    fn from(outcome: Option<ViewOutcome>) -> Self {
        outcome.map_or(EventOutcome::Nothing, EventOutcome::Viewed)
    }
}

impl SchemaBrowser {
    /// Handle a single event.
    pub fn handle(&mut self, event: BrowserEvent) -> ApplicationResult<EventOutcome> {
        debug!("handle {:?}", event);
        Ok(match event {
            BrowserEvent::Click(click) => self.click(click)?.into(),
            BrowserEvent::SelectSchema(id) => self.select_schema(&id)?.into(),
            BrowserEvent::Toggle(id) => match self.toggle(&id)? {
                Some(TreeEvent::Toggled { id, expanded, .. }) => {
                    EventOutcome::Toggled { id, expanded }
                }
                _ => EventOutcome::Nothing,
            },
            BrowserEvent::FormatChanged(idx) => self.change_format(idx)?.into(),
            BrowserEvent::Download(id) => EventOutcome::Downloaded(self.download(&id)?),
            BrowserEvent::DownloadAll => EventOutcome::Downloaded(self.download_all()?),
        })
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<BrowserEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BrowserEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Handle queued events in order.
    ///
    /// Stops at the first failing event; events behind it stay queued.
    /// Outcomes of the events handled before the failure are kept.
    pub fn run(&mut self, browser: &mut SchemaBrowser) -> QueueRun {
        let mut run = QueueRun {
            outcomes: Vec::with_capacity(self.pending.len()),
            error: None,
        };
        while let Some(event) = self.pending.pop_front() {
            match browser.handle(event) {
                Ok(outcome) => run.outcomes.push(outcome),
                Err(e) => {
                    run.error = Some(e);
                    break;
                }
            }
        }
        run
    }
}

/// Result of draining an [`EventQueue`].
#[derive(Debug)]
pub struct QueueRun {
    /// Outcomes of the handled events, in order
    pub outcomes: Vec<EventOutcome>,
    /// Failure that stopped the run, if any
    pub error: Option<ApplicationError>,
}

impl QueueRun {
    /// All outcomes, or the error when the run stopped early.
    pub fn into_result(self) -> ApplicationResult<Vec<EventOutcome>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.outcomes),
        }
    }
}

// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Follow a stack's event log until the current operation finishes.
//!
//! Each poll fetches the full listing and releases only events not seen
//! before, compared by event id. The newest event is held back until a later
//! poll supersedes it, or until it turns out to be the stack's terminal event.

use crate::domain::stack::model::{StackEvent, StackStatus};
use crate::infrastructure::cloudformation::StackApi;
use crate::shared::error::{Result, StackError};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Receives events in the order the poller releases them.
pub trait EventSink {
    fn emit(&mut self, event: &StackEvent);

    /// The API accepted `operation` for `stack`; events follow.
    fn initiated(&mut self, _operation: &str, _stack: &str) {}
}

impl EventSink for Vec<StackEvent> {
    fn emit(&mut self, event: &StackEvent) {
        self.push(event.clone());
    }
}

/// Which stack to follow and how to query it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailTarget {
    pub stack_name: String,
    /// Name or stack id passed to the event listing
    pub query: String,
}

impl TailTarget {
    pub fn by_name(stack_name: impl Into<String>) -> Self {
        let stack_name = stack_name.into();
        Self {
            query: stack_name.clone(),
            stack_name,
        }
    }

    /// Query by stack id; ids keep resolving after the stack is deleted.
    pub fn by_id(stack_name: impl Into<String>, stack_id: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            query: stack_id.into(),
        }
    }
}

/// Events released by one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub emitted: Vec<StackEvent>,
    pub terminal: Option<StackStatus>,
}

/// Poll-to-poll bookkeeping, independent of any I/O.
#[derive(Debug)]
pub struct EventTracker {
    stack_name: String,
    seen: HashSet<String>,
    held: Option<StackEvent>,
}

impl EventTracker {
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            seen: HashSet::new(),
            held: None,
        }
    }

    pub fn observe(&mut self, listing: &[StackEvent]) -> Delta {
        let fresh: Vec<&StackEvent> = listing
            .iter()
            .filter(|e| !self.seen.contains(&e.event_id))
            .collect();
        if fresh.is_empty() {
            return Delta::default();
        }

        let mut emitted: Vec<StackEvent> = self.held.take().into_iter().collect();
        for event in fresh {
            self.seen.insert(event.event_id.clone());
            emitted.push(event.clone());
        }

        let newest_is_terminal = emitted
            .last()
            .is_some_and(|e| e.is_terminal_for(&self.stack_name));
        if newest_is_terminal {
            let terminal = emitted.last().map(|e| e.resource_status.clone());
            return Delta { emitted, terminal };
        }

        self.held = emitted.pop();
        Delta {
            emitted,
            terminal: None,
        }
    }

    /// The event currently held back, if any.
    pub fn held(&self) -> Option<&StackEvent> {
        self.held.as_ref()
    }
}

pub struct TailPoller<'a> {
    api: &'a dyn StackApi,
    interval: Duration,
}

impl<'a> TailPoller<'a> {
    pub fn new(api: &'a dyn StackApi, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Poll until the stack reports a terminal status and return it. A failed
    /// listing ends the tail immediately.
    pub async fn tail(&self, target: &TailTarget, sink: &mut dyn EventSink) -> Result<StackStatus> {
        let mut tracker = EventTracker::new(&target.stack_name);
        let mut polls: u64 = 0;

        loop {
            polls += 1;
            let listing = self.api.list_events(&target.query).await.map_err(|e| {
                StackError::TailAborted {
                    name: target.stack_name.clone(),
                    reason: e.to_string(),
                }
            })?;

            if !listing.is_empty() {
                let delta = tracker.observe(&listing);
                debug!(
                    stack = %target.stack_name,
                    poll = polls,
                    total = listing.len(),
                    released = delta.emitted.len(),
                    "Polled stack events"
                );

                for event in &delta.emitted {
                    sink.emit(event);
                }

                if let Some(status) = delta.terminal {
                    info!(stack = %target.stack_name, %status, polls, "Stack reached terminal status");
                    return Ok(status);
                }
            }

            sleep(self.interval).await;
        }
    }
}

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

//! Scripted in-memory control plane shared by the integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use serde_json::Value;
use stackctl::domain::stack::{Parameter, ParameterSet, StackResource};
use stackctl::infrastructure::cloudformation::TemplateSummary;
use stackctl::*;
use std::collections::{HashMap, VecDeque};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const POLL: Duration = Duration::from_millis(1);

/// One scripted response of the event listing.
#[derive(Debug, Clone)]
pub enum Listing {
    Events(Vec<StackEvent>),
    Fail(String),
}

#[derive(Default)]
pub struct MockState {
    pub stacks: Mutex<HashMap<String, Stack>>,
    pub templates: Mutex<HashMap<String, Value>>,
    pub listings: Mutex<VecDeque<Listing>>,
    pub calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<StackChangeRequest>>,
    pub updated: Mutex<Vec<StackChangeRequest>>,
    pub create_error: Mutex<Option<String>>,
    pub update_error: Mutex<Option<String>>,
}

/// Cloneable handle: keep one clone for assertions, box the other.
#[derive(Clone, Default)]
pub struct MockStackApi {
    state: Arc<MockState>,
}

impl Deref for MockStackApi {
    type Target = MockState;

    fn deref(&self) -> &MockState {
        &self.state
    }
}

impl MockStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create(self, message: &str) -> Self {
        *self.create_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_update(self, message: &str) -> Self {
        *self.update_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn boxed(&self) -> Box<dyn StackApi> {
        Box::new(self.clone())
    }

    pub fn with_stack(self, stack: Stack, template: Value) -> Self {
        self.templates
            .lock()
            .unwrap()
            .insert(stack.stack_name.clone(), template);
        self.stacks
            .lock()
            .unwrap()
            .insert(stack.stack_name.clone(), stack);
        self
    }

    pub fn with_listings(self, listings: Vec<Listing>) -> Self {
        *self.listings.lock().unwrap() = listings.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn record(&self, operation: &str, stack: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, stack));
    }
}

#[async_trait::async_trait]
impl StackApi for MockStackApi {
    async fn create_stack(&self, request: &StackChangeRequest) -> stackctl::Result<()> {
        self.record("create_stack", &request.stack_name);
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(StackError::api("create-stack", message));
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update_stack(&self, request: &StackChangeRequest) -> stackctl::Result<()> {
        self.record("update_stack", &request.stack_name);
        if let Some(message) = self.update_error.lock().unwrap().clone() {
            return Err(StackError::api("update-stack", message));
        }
        self.updated.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn delete_stack(&self, stack: &str) -> stackctl::Result<()> {
        self.record("delete_stack", stack);
        Ok(())
    }

    async fn describe_stack(&self, stack: &str) -> stackctl::Result<Stack> {
        self.record("describe_stack", stack);
        self.stacks
            .lock()
            .unwrap()
            .get(stack)
            .cloned()
            .ok_or_else(|| StackError::stack_not_found(stack))
    }

    async fn list_events(&self, stack: &str) -> stackctl::Result<Vec<StackEvent>> {
        self.record("list_events", stack);
        let mut listings = self.listings.lock().unwrap();
        let listing = if listings.len() > 1 {
            listings.pop_front()
        } else {
            listings.front().cloned()
        };
        match listing {
            Some(Listing::Events(events)) => Ok(events),
            Some(Listing::Fail(message)) => Err(StackError::api("describe-stack-events", message)),
            None => Err(StackError::stack_not_found(stack)),
        }
    }

    async fn get_template(&self, stack: &str) -> stackctl::Result<Value> {
        self.record("get_template", stack);
        self.templates
            .lock()
            .unwrap()
            .get(stack)
            .map(stackctl::domain::stack::diff::canonicalize)
            .ok_or_else(|| StackError::stack_not_found(stack))
    }

    async fn list_resources(&self, stack: &str) -> stackctl::Result<Vec<StackResource>> {
        self.record("list_resources", stack);
        Ok(Vec::new())
    }

    async fn validate_template(&self, _template_body: &str) -> stackctl::Result<TemplateSummary> {
        self.record("validate_template", "-");
        Ok(TemplateSummary::default())
    }
}

pub fn event(id: &str, logical: &str, status: StackStatus, second: u32) -> StackEvent {
    StackEvent {
        event_id: id.to_string(),
        stack_name: "web-prod".to_string(),
        stack_id: Some(stack_id("web-prod")),
        logical_resource_id: logical.to_string(),
        physical_resource_id: None,
        resource_type: if logical == "web-prod" {
            "AWS::CloudFormation::Stack".to_string()
        } else {
            "AWS::S3::Bucket".to_string()
        },
        timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, second).unwrap(),
        resource_status: status,
        resource_status_reason: None,
    }
}

pub fn stack_id(name: &str) -> String {
    format!(
        "arn:aws:cloudformation:eu-west-1:123456789012:stack/{}/0f1e2d3c",
        name
    )
}

pub fn deployed_stack(name: &str, params: Vec<(&str, &str)>, capabilities: Vec<&str>) -> Stack {
    Stack {
        stack_name: name.to_string(),
        stack_id: Some(stack_id(name)),
        stack_status: StackStatus::CreateComplete,
        stack_status_reason: None,
        parameters: ParameterSet(
            params
                .into_iter()
                .map(|(k, v)| Parameter::new(k, v))
                .collect(),
        ),
        tags: Vec::new(),
        outputs: Vec::new(),
        capabilities: capabilities.into_iter().map(str::to_string).collect(),
        creation_time: None,
    }
}

pub fn write(dir: &Path, file: &str, content: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn ids(events: &[StackEvent]) -> Vec<&str> {
    events.iter().map(|e| e.event_id.as_str()).collect()
}

/// Sink that keeps acknowledgements and events in arrival order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: Vec<String>,
}

impl EventSink for Recorder {
    fn emit(&mut self, event: &StackEvent) {
        self.lines.push(format!("event {}", event.event_id));
    }

    fn initiated(&mut self, operation: &str, stack: &str) {
        self.lines.push(format!("{} {}", operation, stack));
    }
}

/// Template with `count` queues; large counts exceed the inline limit.
pub fn queue_template(count: usize) -> Value {
    let resources: serde_json::Map<String, Value> = (0..count)
        .map(|i| {
            (
                format!("Queue{:03}", i),
                serde_json::json!({
                    "Type": "AWS::SQS::Queue",
                    "Properties": {"QueueName": format!("queue-{:03}", i), "VisibilityTimeout": 30}
                }),
            )
        })
        .collect();
    serde_json::json!({ "Resources": resources })
}

/// Entries left behind in a scratch root.
pub fn leftovers(root: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

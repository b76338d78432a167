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

use crate::domain::config::AwsConf;
use crate::domain::stack::diff::{canonicalize, parse_template};
use crate::domain::stack::model::{
    sort_chronologically, ParameterSet, Stack, StackEvent, StackResource,
};
use crate::domain::stack::modifiers::Modifiers;
use crate::infrastructure::cloudformation::wire::{
    DescribeStackEventsOutput, DescribeStacksOutput, GetTemplateOutput, ListStackResourcesOutput,
    TemplateSummary,
};
use crate::infrastructure::constants::CLOUDFORMATION_SERVICE;
use crate::shared::error::{Result, StackError};
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::debug;

/// Everything needed to start a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct StackChangeRequest {
    pub stack_name: String,
    pub template_body: String,
    pub parameters: Option<ParameterSet>,
    pub modifiers: Modifiers,
}

/// Control-plane operations. Each call is a single request with no retry;
/// mutating calls report only whether the operation was accepted.
#[async_trait::async_trait]
pub trait StackApi: Send + Sync {
    /// Starts creation with rollback disabled.
    async fn create_stack(&self, request: &StackChangeRequest) -> Result<()>;

    async fn update_stack(&self, request: &StackChangeRequest) -> Result<()>;

    async fn delete_stack(&self, stack: &str) -> Result<()>;

    async fn describe_stack(&self, stack: &str) -> Result<Stack>;

    /// Full event history, oldest first. `stack` may be a name or a stack id.
    async fn list_events(&self, stack: &str) -> Result<Vec<StackEvent>>;

    /// Deployed template with keys sorted.
    async fn get_template(&self, stack: &str) -> Result<serde_json::Value>;

    /// Deployed parameters sorted by key.
    async fn get_parameters(&self, stack: &str) -> Result<ParameterSet> {
        Ok(self.describe_stack(stack).await?.parameters.canonical())
    }

    async fn list_resources(&self, stack: &str) -> Result<Vec<StackResource>>;

    async fn validate_template(&self, template_body: &str) -> Result<TemplateSummary>;
}

/// [`StackApi`] backed by the `aws cloudformation` command line.
pub struct AwsCliClient {
    conf: AwsConf,
}

impl AwsCliClient {
    pub fn new(conf: AwsConf) -> Self {
        Self { conf }
    }

    fn command(&self, operation: &str) -> Command {
        let mut cmd = Command::new(&self.conf.cli_path);
        cmd.arg(CLOUDFORMATION_SERVICE)
            .arg(operation)
            .args(["--output", "json"])
            .env("AWS_PAGER", "")
            .kill_on_drop(true);
        if let Some(ref region) = self.conf.region {
            cmd.args(["--region", region.as_str()]);
        }
        if let Some(ref profile) = self.conf.profile {
            cmd.args(["--profile", profile.as_str()]);
        }
        cmd
    }

    /// Run one operation and return its stdout.
    async fn run(&self, operation: &str, stack: Option<&str>, args: &[String]) -> Result<Vec<u8>> {
        debug!(operation, stack = ?stack, "Calling CloudFormation");

        let output = self
            .command(operation)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                StackError::api(
                    operation,
                    format!("failed to run '{}': {}", self.conf.cli_path, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(operation, status = ?output.status.code(), %stderr, "CloudFormation call failed");
            return match stack {
                Some(name) if stderr.contains("does not exist") => {
                    Err(StackError::stack_not_found(name))
                }
                _ => Err(StackError::api(operation, stderr)),
            };
        }

        Ok(output.stdout)
    }

    async fn run_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        stack: Option<&str>,
        args: &[String],
    ) -> Result<T> {
        let stdout = self.run(operation, stack, args).await?;
        serde_json::from_slice(&stdout).map_err(|e| {
            StackError::api(operation, format!("unexpected response from AWS CLI: {}", e))
        })
    }

    fn change_args(request: &StackChangeRequest) -> Result<Vec<String>> {
        let mut args = vec![
            "--stack-name".to_string(),
            request.stack_name.clone(),
            "--template-body".to_string(),
            request.template_body.clone(),
        ];
        if let Some(ref params) = request.parameters {
            args.push("--parameters".to_string());
            args.push(serde_json::to_string(params)?);
        }
        args.extend(request.modifiers.api_options());
        Ok(args)
    }
}

fn stack_args(stack: &str) -> Vec<String> {
    vec!["--stack-name".to_string(), stack.to_string()]
}

#[async_trait::async_trait]
impl StackApi for AwsCliClient {
    async fn create_stack(&self, request: &StackChangeRequest) -> Result<()> {
        let mut args = Self::change_args(request)?;
        args.push("--disable-rollback".to_string());
        self.run("create-stack", None, &args).await?;
        Ok(())
    }

    async fn update_stack(&self, request: &StackChangeRequest) -> Result<()> {
        let args = Self::change_args(request)?;
        self.run("update-stack", Some(&request.stack_name), &args)
            .await?;
        Ok(())
    }

    async fn delete_stack(&self, stack: &str) -> Result<()> {
        self.run("delete-stack", Some(stack), &stack_args(stack))
            .await?;
        Ok(())
    }

    async fn describe_stack(&self, stack: &str) -> Result<Stack> {
        let out: DescribeStacksOutput = self
            .run_json("describe-stacks", Some(stack), &stack_args(stack))
            .await?;
        out.stacks
            .into_iter()
            .next()
            .ok_or_else(|| StackError::stack_not_found(stack))
    }

    async fn list_events(&self, stack: &str) -> Result<Vec<StackEvent>> {
        let out: DescribeStackEventsOutput = self
            .run_json("describe-stack-events", Some(stack), &stack_args(stack))
            .await?;
        // The API lists newest first; reversing keeps emission order for equal timestamps.
        let mut events = out.stack_events;
        events.reverse();
        sort_chronologically(&mut events);
        Ok(events)
    }

    async fn get_template(&self, stack: &str) -> Result<serde_json::Value> {
        let out: GetTemplateOutput = self
            .run_json("get-template", Some(stack), &stack_args(stack))
            .await?;
        let template = match out.template_body {
            serde_json::Value::String(body) => parse_template(&body)?,
            other => other,
        };
        Ok(canonicalize(&template))
    }

    async fn list_resources(&self, stack: &str) -> Result<Vec<StackResource>> {
        let out: ListStackResourcesOutput = self
            .run_json("list-stack-resources", Some(stack), &stack_args(stack))
            .await?;
        Ok(out.stack_resource_summaries)
    }

    async fn validate_template(&self, template_body: &str) -> Result<TemplateSummary> {
        let args = vec!["--template-body".to_string(), template_body.to_string()];
        self.run_json("validate-template", None, &args).await
    }
}

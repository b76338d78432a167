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

use crate::domain::config::StackctlConf;
use crate::domain::stack::diff::{canonicalize, DiffEngine, StackDiff};
use crate::domain::stack::model::{ParameterSet, Stack, StackResource, StackStatus};
use crate::domain::stack::modifiers::Modifiers;
use crate::domain::stack::naming::{NamingResolver, ResolvedStack};
use crate::domain::stack::tail::{EventSink, TailPoller, TailTarget};
use crate::domain::stack::validator::TemplateValidator;
use crate::infrastructure::cloudformation::{
    AwsCliClient, StackApi, StackChangeRequest, TemplateSummary,
};
use crate::infrastructure::constants::{
    NO_UPDATES_MESSAGE, PARAMS_INFIX, RECREATE_SCRATCH_PREFIX, TEMPLATE_EXTENSION,
};
use crate::shared::error::{Result, StackError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The API accepted the update and the tail ended in this status
    Finished(StackStatus),
    /// Template and parameters already match the deployed stack
    NoChanges,
}

/// Drives create/update/delete/recreate and hands each accepted operation
/// to the tail poller.
pub struct StackOrchestrator {
    api: Box<dyn StackApi>,
    poll_interval: Duration,
    validator: TemplateValidator,
    scratch_root: Option<PathBuf>,
}

impl StackOrchestrator {
    pub fn new(conf: &StackctlConf) -> Self {
        Self::with_api(
            Box::new(AwsCliClient::new(conf.aws.clone())),
            conf.tail.poll_interval(),
        )
    }

    pub fn with_api(api: Box<dyn StackApi>, poll_interval: Duration) -> Self {
        Self {
            api,
            poll_interval,
            validator: TemplateValidator::default(),
            scratch_root: None,
        }
    }

    /// Create recreate snapshots under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn api(&self) -> &dyn StackApi {
        self.api.as_ref()
    }

    pub async fn create(
        &self,
        stack: &ResolvedStack,
        modifiers: &Modifiers,
        sink: &mut dyn EventSink,
    ) -> Result<StackStatus> {
        let request = self.change_request(stack, modifiers.clone())?;
        self.submit_create(&request, sink).await
    }

    async fn submit_create(
        &self,
        request: &StackChangeRequest,
        sink: &mut dyn EventSink,
    ) -> Result<StackStatus> {
        info!(stack = %request.stack_name, "Creating stack");
        self.api.create_stack(request).await?;
        sink.initiated("Create", &request.stack_name);

        self.tail(&TailTarget::by_name(&request.stack_name), sink)
            .await
    }

    pub async fn update(
        &self,
        stack: &ResolvedStack,
        modifiers: &Modifiers,
        sink: &mut dyn EventSink,
    ) -> Result<UpdateOutcome> {
        let mut request = self.change_request(stack, modifiers.clone())?;

        if request.modifiers.capabilities.is_none() {
            let deployed = self.api.describe_stack(&stack.name).await?;
            if !deployed.capabilities.is_empty() {
                info!(
                    stack = %stack.name,
                    capabilities = ?deployed.capabilities,
                    "Reusing capabilities of deployed stack"
                );
                request.modifiers.capabilities = Some(deployed.capabilities.join(","));
            }
        }

        info!(stack = %stack.name, "Updating stack");
        match self.api.update_stack(&request).await {
            Ok(()) => {}
            Err(StackError::Api { ref message, .. }) if message.contains(NO_UPDATES_MESSAGE) => {
                return Ok(UpdateOutcome::NoChanges);
            }
            Err(e) => return Err(e),
        }
        sink.initiated("Update", &stack.name);

        let status = self.tail(&TailTarget::by_name(&stack.name), sink).await?;
        Ok(UpdateOutcome::Finished(status))
    }

    pub async fn delete(&self, stack_name: &str, sink: &mut dyn EventSink) -> Result<StackStatus> {
        // Capture the id first so the events stay queryable once the name is gone.
        let deployed = self.api.describe_stack(stack_name).await?;
        let target = match deployed.stack_id {
            Some(ref id) => TailTarget::by_id(stack_name, id),
            None => TailTarget::by_name(stack_name),
        };

        info!(stack = %stack_name, "Deleting stack");
        self.api.delete_stack(stack_name).await?;
        sink.initiated("Delete", stack_name);

        self.tail(&target, sink).await
    }

    /// Snapshot the deployed template and parameters, delete the stack, then
    /// create it again from the snapshot. Not transactional: if the create
    /// fails the stack stays deleted.
    pub async fn recreate(
        &self,
        stack_name: &str,
        modifiers: &Modifiers,
        sink: &mut dyn EventSink,
    ) -> Result<StackStatus> {
        let deployed = self.api.describe_stack(stack_name).await?;
        let template = self.api.get_template(stack_name).await?;

        // Removed on drop, whichever way this function exits.
        let scratch = self.scratch_dir()?;
        write_snapshot(scratch.path(), stack_name, &deployed.parameters, &template)?;
        info!(stack = %stack_name, dir = %scratch.path().display(), "Saved stack snapshot");

        let resolved = NamingResolver::in_dir(scratch.path()).resolve(stack_name, None, None)?;
        let deployed_capabilities = if deployed.capabilities.is_empty() {
            None
        } else {
            Some(deployed.capabilities.join(","))
        };
        let modifiers = Modifiers::new(deployed_capabilities, None).overridden_by(modifiers.clone());

        // Every local precondition of the create must hold before the delete.
        let request = self.change_request(&resolved, modifiers)?;

        let delete_status = self.delete(stack_name, sink).await?;
        if delete_status != StackStatus::DeleteComplete {
            return Err(StackError::OperationFailed {
                name: stack_name.to_string(),
                status: delete_status.to_string(),
            });
        }

        let status = self.submit_create(&request, sink).await;
        if status.is_err() {
            warn!(stack = %stack_name, "Create failed after delete; the stack must be recreated manually");
        }
        status
    }

    pub async fn tail(&self, target: &TailTarget, sink: &mut dyn EventSink) -> Result<StackStatus> {
        TailPoller::new(self.api.as_ref(), self.poll_interval)
            .tail(target, sink)
            .await
    }

    pub async fn diff(&self, stack: &ResolvedStack) -> Result<StackDiff> {
        DiffEngine::new(self.api.as_ref()).diff(stack).await
    }

    /// Local size/existence checks followed by the API's own validation.
    pub async fn validate(&self, stack: &ResolvedStack) -> Result<TemplateSummary> {
        let body = self
            .validator
            .load_template_body(stack.require_template()?)?;
        self.api.validate_template(&body).await
    }

    pub async fn describe(&self, stack_name: &str) -> Result<Stack> {
        self.api.describe_stack(stack_name).await
    }

    pub async fn resources(&self, stack_name: &str) -> Result<Vec<StackResource>> {
        self.api.list_resources(stack_name).await
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(RECREATE_SCRATCH_PREFIX);
        let dir = match self.scratch_root {
            Some(ref root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn change_request(
        &self,
        stack: &ResolvedStack,
        modifiers: Modifiers,
    ) -> Result<StackChangeRequest> {
        let template_body = self
            .validator
            .load_template_body(stack.require_template()?)?;
        let parameters = stack
            .params
            .as_deref()
            .map(ParameterSet::from_file)
            .transpose()?;

        Ok(StackChangeRequest {
            stack_name: stack.name.clone(),
            template_body,
            parameters,
            modifiers,
        })
    }
}

/// Lay the snapshot out so the naming convention finds it again. The template
/// is written compact so it is no larger than what the API returned.
fn write_snapshot(
    dir: &Path,
    name: &str,
    parameters: &ParameterSet,
    template: &serde_json::Value,
) -> Result<()> {
    std::fs::write(
        dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION)),
        serde_json::to_string(&canonicalize(template))?,
    )?;
    if !parameters.is_empty() {
        std::fs::write(
            dir.join(format!("{}{}.{}", name, PARAMS_INFIX, TEMPLATE_EXTENSION)),
            parameters.to_canonical_json()?,
        )?;
    }
    Ok(())
}

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

//! Compare local template/parameter files with what is deployed.

use crate::domain::stack::model::ParameterSet;
use crate::domain::stack::naming::ResolvedStack;
use crate::infrastructure::cloudformation::StackApi;
use crate::shared::error::{Result, StackError};
use serde_json::{Map, Value};
use similar::TextDiff;

/// Outcome of one sub-report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffReport {
    Identical,
    /// Unified diff, deployed on the left and local on the right
    Changed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDiff {
    pub template: DiffReport,
    pub parameters: DiffReport,
}

impl StackDiff {
    pub fn has_changes(&self) -> bool {
        matches!(self.template, DiffReport::Changed(_))
            || matches!(self.parameters, DiffReport::Changed(_))
    }
}

pub struct DiffEngine<'a> {
    api: &'a dyn StackApi,
}

impl<'a> DiffEngine<'a> {
    pub fn new(api: &'a dyn StackApi) -> Self {
        Self { api }
    }

    pub async fn diff(&self, stack: &ResolvedStack) -> Result<StackDiff> {
        // Both preconditions hold before any output is produced.
        self.api.describe_stack(&stack.name).await?;
        let template_path = stack.require_template()?;

        let local_template = parse_template(&std::fs::read_to_string(template_path)?)?;
        let deployed_template = self.api.get_template(&stack.name).await?;
        let template = compare_text(
            &canonical_json(&deployed_template)?,
            &canonical_json(&local_template)?,
            &format!("{}.template", stack.name),
        );

        let parameters = match stack.params {
            Some(ref params_path) => {
                let local = ParameterSet::from_file(params_path)?;
                let deployed = self.api.get_parameters(&stack.name).await?;
                compare_text(
                    &format!("{}\n", deployed.to_canonical_json()?),
                    &format!("{}\n", local.to_canonical_json()?),
                    &format!("{}.parameters", stack.name),
                )
            }
            None => DiffReport::Skipped(format!(
                "No parameters file found for '{}', skipping parameter diff",
                stack.name
            )),
        };

        Ok(StackDiff {
            template,
            parameters,
        })
    }
}

/// Rebuild every object with its keys in sorted order. Array order is kept.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Pretty, key-sorted JSON ending in a newline.
pub fn canonical_json(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&canonicalize(value))?;
    text.push('\n');
    Ok(text)
}

/// Parse a template body; JSON first, YAML as a fallback.
pub fn parse_template(body: &str) -> Result<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(body).map_err(|yaml_err| {
            tracing::debug!(error = %yaml_err, "Template is not YAML either");
            StackError::JsonParse(json_err)
        }),
    }
}

fn compare_text(deployed: &str, local: &str, label: &str) -> DiffReport {
    if deployed == local {
        return DiffReport::Identical;
    }

    let diff = TextDiff::from_lines(deployed, local);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("deployed/{}", label), &format!("local/{}", label))
        .to_string();
    DiffReport::Changed(unified)
}

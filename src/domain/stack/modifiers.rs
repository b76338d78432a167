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

//! Capability and role-arn modifiers.
//!
//! The CLI collects `--capabilities=` and `--role-arn=` as regular options;
//! [`Modifiers::split_tokens`] additionally sweeps them out of positional
//! tokens so they never reach name resolution.

use crate::infrastructure::constants::{CAPABILITIES_FLAG, ROLE_ARN_FLAG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Capabilities,
    RoleArn,
}

/// Optional modifiers passed through to create/update calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub capabilities: Option<String>,
    pub role_arn: Option<String>,
}

impl Modifiers {
    pub fn new(capabilities: Option<String>, role_arn: Option<String>) -> Self {
        Self {
            capabilities,
            role_arn,
        }
    }

    /// Pull modifier tokens out of `tokens`, returning them and the remaining
    /// positional tokens in their original order. Later occurrences overwrite
    /// earlier ones.
    pub fn split_tokens<I, S>(tokens: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modifiers = Self::default();
        let mut positional = Vec::new();

        for raw in tokens {
            for token in raw.as_ref().split_whitespace() {
                match parse_modifier_token(token) {
                    Some((kind, value)) => modifiers.set(kind, value),
                    None => positional.push(token.to_string()),
                }
            }
        }

        (modifiers, positional)
    }

    fn set(&mut self, kind: ModifierKind, value: String) {
        let value = if value.is_empty() { None } else { Some(value) };
        match kind {
            ModifierKind::Capabilities => self.capabilities = value,
            ModifierKind::RoleArn => self.role_arn = value,
        }
    }

    /// Combine with modifiers seen later in the argument stream.
    pub fn overridden_by(self, later: Modifiers) -> Self {
        Self {
            capabilities: later.capabilities.or(self.capabilities),
            role_arn: later.role_arn.or(self.role_arn),
        }
    }

    /// Individual capability names; commas and spaces both separate.
    pub fn capability_list(&self) -> Vec<String> {
        self.capabilities
            .as_deref()
            .map(|caps| {
                caps.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Options in the form the CloudFormation CLI expects them.
    pub fn api_options(&self) -> Vec<String> {
        let mut args = Vec::new();
        let capabilities = self.capability_list();
        if !capabilities.is_empty() {
            args.push(CAPABILITIES_FLAG.to_string());
            args.extend(capabilities);
        }
        if let Some(ref role_arn) = self.role_arn {
            args.push(ROLE_ARN_FLAG.to_string());
            args.push(role_arn.clone());
        }
        args
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_none() && self.role_arn.is_none()
    }
}

/// Recognise `--role-arn=VALUE` / `--capabilities=VALUE`. Only the first
/// `=`-delimited segment of the value is kept.
pub fn parse_modifier_token(token: &str) -> Option<(ModifierKind, String)> {
    let (flag, rest) = token.split_once('=')?;
    let kind = match flag {
        ROLE_ARN_FLAG => ModifierKind::RoleArn,
        CAPABILITIES_FLAG => ModifierKind::Capabilities,
        _ => return None,
    };
    Some((kind, first_segment(rest).to_string()))
}

pub fn is_modifier_token(token: &str) -> bool {
    parse_modifier_token(token).is_some()
}

fn first_segment(value: &str) -> &str {
    value.split_once('=').map_or(value, |(head, _)| head)
}

/// clap value parser applying the same first-segment rule to option values.
pub fn parse_modifier_value(value: &str) -> Result<String, String> {
    let value = first_segment(value);
    if value.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(value.to_string())
}

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

use std::path::PathBuf;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Template file not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Parameters file not found: {}", path.display())]
    ParamsNotFound { path: PathBuf },

    #[error(
        "Template {} is {size} bytes, exceeding the {limit} byte limit for inline submission",
        path.display()
    )]
    TemplateTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("Stack not found: '{name}'")]
    StackNotFound { name: String },

    #[error("CloudFormation {operation} failed: {message}")]
    Api { operation: String, message: String },

    #[error("Stopped tailing '{name}': {reason}")]
    TailAborted { name: String, reason: String },

    #[error("Stack '{name}' finished in {status}")]
    OperationFailed { name: String, status: String },

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl StackError {
    pub fn usage(context: impl Into<String>) -> Self {
        Self::Usage(context.into())
    }

    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn stack_not_found(name: impl Into<String>) -> Self {
        Self::StackNotFound { name: name.into() }
    }

    /// Whether the remote side reported the stack as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::StackNotFound { .. } => true,
            Self::Api { message, .. } => message.contains("does not exist"),
            _ => false,
        }
    }
}

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

use crate::infrastructure::constants::{CONF_FILE_ENV, DEFAULT_AWS_CLI, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::time::Duration;

/// Top-level `stackctl.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackctlConf {
    pub aws: AwsConf,
    pub tail: TailConf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConf {
    /// AWS CLI executable
    pub cli_path: String,
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl Default for AwsConf {
    fn default() -> Self {
        Self {
            cli_path: DEFAULT_AWS_CLI.to_string(),
            region: None,
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailConf {
    pub poll_interval_ms: u64,
}

impl Default for TailConf {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TailConf {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl StackctlConf {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> anyhow::Result<Self> {
        let content = read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.as_ref(), e))?;

        let conf: Self =
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;

        Ok(conf)
    }

    /// Priority: explicit path > `STACKCTL_CONF_FILE` > defaults
    pub fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from(path);
        }
        match std::env::var(CONF_FILE_ENV) {
            Ok(env_path) if !env_path.is_empty() => Self::from(&env_path),
            _ => Ok(Self::default()),
        }
    }

    /// Command-line region/profile take precedence over the file.
    pub fn with_overrides(mut self, region: Option<String>, profile: Option<String>) -> Self {
        if region.is_some() {
            self.aws.region = region;
        }
        if profile.is_some() {
            self.aws.profile = profile;
        }
        self
    }
}

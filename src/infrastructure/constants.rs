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

/// Largest template body accepted inline by CreateStack/UpdateStack
pub const TEMPLATE_BODY_MAX_BYTES: u64 = 51_200;

/// Tail poller
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Modifier flags recognised in the argument stream
pub const ROLE_ARN_FLAG: &str = "--role-arn";
pub const CAPABILITIES_FLAG: &str = "--capabilities";

/// File naming convention: `<token>.json` and `<token>-params-<env>.json`
pub const TEMPLATE_EXTENSION: &str = "json";
pub const PARAMS_INFIX: &str = "-params";

/// AWS CLI defaults
pub const DEFAULT_AWS_CLI: &str = "aws";
pub const CLOUDFORMATION_SERVICE: &str = "cloudformation";

/// Prefix of the scratch directory holding a recreate snapshot
pub const RECREATE_SCRATCH_PREFIX: &str = "stackctl-recreate-";

/// Message fragment returned by UpdateStack when the template and parameters are unchanged
pub const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

/// Environment variable pointing at the configuration file
pub const CONF_FILE_ENV: &str = "STACKCTL_CONF_FILE";

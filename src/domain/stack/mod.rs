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

//! Stack lifecycle core: naming, modifiers, tailing, diffing, orchestration.

pub mod diff;
pub mod model;
pub mod modifiers;
pub mod naming;
pub mod orchestrator;
pub mod tail;
pub mod validator;

pub use self::diff::{DiffEngine, DiffReport, StackDiff};
pub use self::model::{
    Output, Parameter, ParameterSet, Stack, StackEvent, StackResource, StackStatus, Tag,
};
pub use self::modifiers::Modifiers;
pub use self::naming::{NamingResolver, ResolvedStack};
pub use self::orchestrator::{StackOrchestrator, UpdateOutcome};
pub use self::tail::{EventSink, EventTracker, TailPoller, TailTarget};
pub use self::validator::TemplateValidator;

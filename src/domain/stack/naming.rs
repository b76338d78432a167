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

//! Convention-based resolution of a stack argument to its files.
//!
//! `web-prod` looks for `web-prod.json`, then `web.json`, and picks up
//! `web-params-prod.json` alongside the template when it exists.

use crate::domain::stack::modifiers::is_modifier_token;
use crate::infrastructure::constants::{PARAMS_INFIX, TEMPLATE_EXTENSION};
use crate::shared::error::{Result, StackError};
use std::path::{Path, PathBuf};

/// The stack an invocation targets, threaded explicitly through every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStack {
    pub name: String,
    /// Explicit template, or the first convention candidate found on disk
    pub template: Option<PathBuf>,
    /// Path reported when no template could be found
    pub expected_template: PathBuf,
    pub params: Option<PathBuf>,
}

impl ResolvedStack {
    /// The template path, failing with the path that was looked for.
    pub fn require_template(&self) -> Result<&Path> {
        match self.template {
            Some(ref path) if path.is_file() => Ok(path.as_path()),
            Some(ref path) => Err(StackError::TemplateNotFound { path: path.clone() }),
            None => Err(StackError::TemplateNotFound {
                path: self.expected_template.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamingResolver {
    base_dir: Option<PathBuf>,
}

impl NamingResolver {
    /// Look for files next to the stack argument (the working directory for bare names).
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for files in `dir` regardless of the stack argument's directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    pub fn resolve(
        &self,
        stack_arg: &str,
        template_arg: Option<&str>,
        params_arg: Option<&str>,
    ) -> Result<ResolvedStack> {
        let name = stack_name_from_arg(stack_arg)?;
        let dir = self.lookup_dir(stack_arg);

        let candidates = template_candidates(&dir, &name);
        let expected_template = candidates[0].clone();

        let template = match template_arg.filter(|t| !t.is_empty() && !is_modifier_token(t)) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => candidates.into_iter().find(|p| p.is_file()),
        };

        let params = match params_arg.filter(|p| !p.is_empty() && !is_modifier_token(p)) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => template
                .as_deref()
                .and_then(|t| derive_params_path(&name, t))
                .filter(|p| p.is_file()),
        };

        tracing::debug!(
            stack = %name,
            template = ?template,
            params = ?params,
            "Resolved stack files"
        );

        Ok(ResolvedStack {
            name,
            template,
            expected_template,
            params,
        })
    }

    fn lookup_dir(&self, stack_arg: &str) -> PathBuf {
        match self.base_dir {
            Some(ref dir) => dir.clone(),
            None => Path::new(stack_arg)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// Basename of the argument without its extension.
pub fn stack_name_from_arg(arg: &str) -> Result<String> {
    if arg.trim().is_empty() || is_modifier_token(arg) {
        return Err(StackError::usage("no stack argument provided"));
    }

    Path::new(arg)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StackError::usage(format!("cannot derive a stack name from '{}'", arg)))
}

/// `<name>.json`, then `<name minus its last -segment>.json`.
fn template_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut candidates = vec![dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION))];
    if let Some((base, _env)) = name.rsplit_once('-') {
        if !base.is_empty() {
            candidates.push(dir.join(format!("{}.{}", base, TEMPLATE_EXTENSION)));
        }
    }
    candidates
}

/// Insert the params infix after the template's base name inside the stack
/// name: `web-prod` with `web.json` gives `web-params-prod.json`.
fn derive_params_path(name: &str, template: &Path) -> Option<PathBuf> {
    let base = template.file_stem()?.to_str()?;
    if base.is_empty() || !name.contains(base) {
        return None;
    }
    let file = format!(
        "{}.{}",
        name.replacen(base, &format!("{}{}", base, PARAMS_INFIX), 1),
        TEMPLATE_EXTENSION
    );
    let dir = template.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, file: &str) -> PathBuf {
        let path = dir.path().join(file);
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_stack_name_strips_directory_and_extension() {
        assert_eq!(stack_name_from_arg("stacks/web-prod.json").unwrap(), "web-prod");
        assert_eq!(stack_name_from_arg("web-prod").unwrap(), "web-prod");
    }

    #[test]
    fn test_modifier_token_is_not_a_stack() {
        for arg in ["--role-arn=arn:aws:iam::1:role/x", "--capabilities=CAPABILITY_IAM"] {
            let err = stack_name_from_arg(arg).unwrap_err();
            assert!(matches!(err, StackError::Usage(_)), "{} resolved", arg);
        }
    }

    #[test]
    fn test_exact_template_preferred() {
        let dir = TempDir::new().unwrap();
        let exact = touch(&dir, "web-prod.json");
        touch(&dir, "web.json");

        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web-prod", None, None)
            .unwrap();
        assert_eq!(resolved.template, Some(exact));
    }

    #[test]
    fn test_env_suffix_falls_back_to_token_template() {
        let dir = TempDir::new().unwrap();
        let template = touch(&dir, "web.json");
        let params = touch(&dir, "web-params-prod.json");

        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web-prod", None, None)
            .unwrap();
        assert_eq!(resolved.name, "web-prod");
        assert_eq!(resolved.template, Some(template));
        assert_eq!(resolved.params, Some(params));
    }

    #[test]
    fn test_missing_params_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "web.json");

        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web-prod", None, None)
            .unwrap();
        assert!(resolved.params.is_none());
    }

    #[test]
    fn test_missing_template_reports_expected_path() {
        let dir = TempDir::new().unwrap();
        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("api-dev", None, None)
            .unwrap();
        assert!(resolved.template.is_none());

        match resolved.require_template().unwrap_err() {
            StackError::TemplateNotFound { path } => {
                assert_eq!(path, dir.path().join("api-dev.json"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_arguments_used_verbatim() {
        let dir = TempDir::new().unwrap();
        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web-prod", Some("other/site.json"), Some("other/p.json"))
            .unwrap();
        assert_eq!(resolved.template, Some(PathBuf::from("other/site.json")));
        assert_eq!(resolved.params, Some(PathBuf::from("other/p.json")));
    }

    #[test]
    fn test_modifier_in_template_position_is_ignored() {
        let dir = TempDir::new().unwrap();
        let template = touch(&dir, "web.json");
        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web", Some("--capabilities=CAPABILITY_IAM"), None)
            .unwrap();
        assert_eq!(resolved.template, Some(template));
    }

    #[test]
    fn test_params_without_env_suffix() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "web.json");
        let params = touch(&dir, "web-params.json");
        let resolved = NamingResolver::in_dir(dir.path())
            .resolve("web", None, None)
            .unwrap();
        assert_eq!(resolved.params, Some(params));
    }

    #[test]
    fn test_files_are_found_next_to_a_path_argument() {
        let dir = TempDir::new().unwrap();
        let template = touch(&dir, "db.json");
        let arg = dir.path().join("db-staging.json");

        let resolved = NamingResolver::new()
            .resolve(arg.to_str().unwrap(), None, None)
            .unwrap();
        assert_eq!(resolved.name, "db-staging");
        assert_eq!(resolved.template, Some(template));
    }
}

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

use crate::infrastructure::constants::TEMPLATE_BODY_MAX_BYTES;
use crate::shared::error::{Result, StackError};
use std::path::Path;

/// Local checks run before a template is submitted.
pub struct TemplateValidator {
    max_body_bytes: u64,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new(TEMPLATE_BODY_MAX_BYTES)
    }
}

impl TemplateValidator {
    pub fn new(max_body_bytes: u64) -> Self {
        Self { max_body_bytes }
    }

    /// Check the template exists and fits inline, then return its body.
    pub fn load_template_body(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(StackError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.max_body_bytes {
            return Err(StackError::TemplateTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_body_bytes,
            });
        }

        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_at_limit_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.json");
        std::fs::write(&path, vec![b' '; 51200]).unwrap();

        let body = TemplateValidator::default().load_template_body(&path).unwrap();
        assert_eq!(body.len(), 51200);
    }

    #[test]
    fn test_oversized_template_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.json");
        std::fs::write(&path, vec![b' '; 51201]).unwrap();

        match TemplateValidator::default().load_template_body(&path) {
            Err(StackError::TemplateTooLarge { size, limit, .. }) => {
                assert_eq!(size, 51201);
                assert_eq!(limit, 51200);
            }
            other => panic!("expected size-limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_template() {
        let err = TemplateValidator::default()
            .load_template_body(Path::new("/nonexistent/web.json"))
            .unwrap_err();
        assert!(matches!(err, StackError::TemplateNotFound { .. }));
    }
}

use crate::domain::model::PoolProject;
use crate::utils::error::{GraderError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Parent/children lookup over the loaded pool list.
#[derive(Debug, Clone, Default)]
pub struct PoolHierarchy {
    pools: Vec<PoolProject>,
}

impl PoolHierarchy {
    pub fn new(pools: Vec<PoolProject>) -> Self {
        let hierarchy = Self { pools };
        for child_id in hierarchy.duplicate_children() {
            tracing::warn!(
                "🔶 module {} is listed under several pools, the first one wins",
                child_id
            );
        }
        hierarchy
    }

    /// 從 JSON 檔案載入 pool 清單
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GraderError::ConfigError {
            message: format!("cannot read pool list {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content).map_err(|e| GraderError::ConfigError {
            message: format!("{} ({})", e, path.display()),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let pools: Vec<PoolProject> =
            serde_json::from_str(content).map_err(|e| GraderError::ConfigError {
                message: format!("malformed pool list: {}", e),
            })?;
        Ok(Self::new(pools))
    }

    pub fn parent_of(&self, child_id: &str) -> Option<&str> {
        self.pools
            .iter()
            .find(|pool| pool.children_ids.iter().any(|id| id == child_id))
            .map(|pool| pool.parent_id.as_str())
    }

    /// Unknown parents have no children.
    pub fn children_of(&self, parent_id: &str) -> &[String] {
        self.pools
            .iter()
            .find(|pool| pool.parent_id == parent_id)
            .map(|pool| pool.children_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_name(&self, parent_id: &str) -> Option<&str> {
        self.pools
            .iter()
            .find(|pool| pool.parent_id == parent_id)
            .map(|pool| pool.parent_name.as_str())
    }

    pub fn duplicate_children(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for child_id in self.pools.iter().flat_map(|pool| pool.children_ids.iter()) {
            if !seen.insert(child_id.as_str()) && !duplicates.contains(&child_id.as_str()) {
                duplicates.push(child_id.as_str());
            }
        }
        duplicates
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

//! JSON contract frontend.

pub mod ast;
pub mod to_ir;

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{ContractLoader, ContractSet};
use crate::diagnostic::CompilerError;
use ast::ContractFile;

/// Loads `*.json` contract files.
#[derive(Debug, Default)]
pub struct JsonFrontend;

impl JsonFrontend {
    pub fn new() -> Self {
        Self
    }

    fn parse_file(&self, path: &Path) -> Result<ContractFile, CompilerError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| CompilerError::io(path, e.to_string()))?;
        serde_json::from_str(&source).map_err(|e| CompilerError::InvalidContractFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Contract files under `dir`, in sorted path order.
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, CompilerError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| CompilerError::io(dir, e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .map(|ext| self.extensions().contains(&ext.to_string_lossy().as_ref()))
                .unwrap_or(false);
            if matches {
                paths.push(path.to_path_buf());
            }
        }
        Ok(paths)
    }
}

impl ContractLoader for JsonFrontend {
    fn format(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn load(&mut self, path: &Path) -> Result<ContractSet, CompilerError> {
        let paths = if path.is_dir() {
            self.discover(path)?
        } else {
            vec![path.to_path_buf()]
        };
        if paths.is_empty() {
            return Err(CompilerError::InvalidContractFile {
                path: path.to_path_buf(),
                message: "no contract files found".to_string(),
            });
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            debug!(path = %path.display(), "loading contract file");
            let file = self.parse_file(&path)?;
            files.push((path, file));
        }

        to_ir::to_ir(&files)
    }
}

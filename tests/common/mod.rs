#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treemark::TreemarkContext;
use treemark::commands::init::{self, InitOptions};
use treemark::config::Config;

/// A temporary directory holding files, optionally tracked
pub struct TestTree {
    pub temp_dir: TempDir,
    pub ctx: TreemarkContext,
}

impl TestTree {
    /// Empty, untracked directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            ctx: TreemarkContext::with_config(Config::default()),
        })
    }

    /// Directory holding `x.txt` ("hello") and `sub/y.txt` ("world")
    pub fn sample() -> Result<Self> {
        let tree = Self::new()?;
        tree.write("x.txt", "hello")?;
        tree.write("sub/y.txt", "world")?;
        Ok(tree)
    }

    /// Sample directory already tracked under `identity`
    pub fn tracked(identity: &str) -> Result<Self> {
        let tree = Self::sample()?;
        init::execute(&tree.ctx, tree.path(), identity, &InitOptions { yes: true })?;
        Ok(tree)
    }

    /// Write `content` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

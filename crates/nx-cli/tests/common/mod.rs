// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use nx_core::models::{ContainerSnapshot, ContainerState};
use tempfile::TempDir;

/// A throwaway repository with a `stacks/` services root.
pub struct Fleet {
    pub dir: TempDir,
}

impl Fleet {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Add a service whose manifest declares the given containers.
    pub fn service(&self, name: &str, containers: &[&str]) -> &Self {
        let dir = self.root().join("stacks").join(name);
        fs::create_dir_all(&dir).unwrap();
        let mut yaml = String::from("services:\n");
        for container in containers {
            yaml.push_str(&format!("  {container}:\n    image: {container}:latest\n"));
        }
        if containers.is_empty() {
            yaml = "services: {}\n".to_string();
        }
        fs::write(dir.join("compose.yaml"), yaml).unwrap();
        self
    }

    pub fn manifest(&self, text: &str) -> &Self {
        fs::write(self.root().join("compose.yaml"), text).unwrap();
        self
    }

    pub fn read_manifest(&self) -> String {
        fs::read_to_string(self.root().join("compose.yaml")).unwrap()
    }
}

pub fn include_for(names: &[&str]) -> String {
    let mut text = String::from("include:\n");
    for name in names {
        text.push_str(&format!(
            "  - path: stacks/{name}/compose.yaml\n    env_file:\n      - .env\n"
        ));
    }
    text
}

pub fn container(name: &str, state: ContainerState, status: &str) -> ContainerSnapshot {
    ContainerSnapshot {
        name: name.into(),
        state,
        status: status.into(),
        project: None,
    }
}

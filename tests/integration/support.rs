use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Write an agent definition into `dir` and return its path.
pub fn write_agents(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("agents.txt");
    fs::write(&path, text).unwrap();
    path
}

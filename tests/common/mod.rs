#![allow(dead_code)]

use std::{fs, path::Path};

use kakeibo_config::{Config, ConfigManager};
use tempfile::TempDir;

pub const MEMBER: &str = "U-member";
pub const STRANGER: &str = "U-stranger";

/// Config allowing only [`MEMBER`] to post.
pub fn member_config() -> Config {
    Config {
        authorized_users: vec![MEMBER.to_string()],
        ..Config::default()
    }
}

/// Creates an isolated home directory holding `config.json`.
/// Keep the returned guard alive for the duration of the test.
pub fn setup_home(config: &Config) -> TempDir {
    let home = TempDir::new().expect("create temp dir");
    ConfigManager::with_base_dir(home.path().to_path_buf())
        .expect("create config manager for temp dir")
        .save(config)
        .expect("write config");
    home
}

pub fn sheet_file(home: &Path, month: &str) -> String {
    fs::read_to_string(home.join("sheets").join(format!("{month}.json"))).expect("read sheet")
}

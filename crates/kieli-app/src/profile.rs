use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kieli_config::Config;
use serde::{Deserialize, Serialize};

/// `$KIELI_HOME`, else `$HOME/.config/kieli`
pub fn kieli_root() -> Option<PathBuf> {
    if let Ok(home) = env::var("KIELI_HOME") {
        return Some(PathBuf::from(home));
    }
    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("kieli"))
}

fn profiles_dir(root: &Path) -> PathBuf {
    root.join("profiles")
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Create the profiles folder and a default main profile if missing
pub fn init_user_config(root: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(profiles_dir(root))?;

    let main_profile = profiles_dir(root).join("main.json");
    if !main_profile.exists() {
        let profile = Profile {
            name: "main".into(),
            value: Config::default(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(main_profile)
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)?;
    Ok(profile.value)
}

/// Load a profile by name, falling back to main and then to defaults
pub fn load_profile(root: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = profiles_dir(root).join(format!("{name}.json"));
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
    let main_file = profiles_dir(root).join("main.json");
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::default())
    }
}

/// Profile from disk with environment overrides on top
pub fn load_config(name: Option<&str>) -> anyhow::Result<Config> {
    let Some(root) = kieli_root() else {
        return Ok(Config::new());
    };

    if let Err(e) = init_user_config(&root) {
        tracing::warn!("Could not initialize {}: {}", root.display(), e);
    }
    let mut config = load_profile(&root, name.unwrap_or("main"))?;
    config.apply_env();
    Ok(config)
}

//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".remove-ieds/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dialog: Dialog,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub keybindings: Keybindings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dialog {
    #[serde(default)]
    close_after_remove: Option<bool>,
    #[serde(default)]
    live_refresh: Option<bool>,
}

impl Dialog {
    pub fn close_after_remove(&self) -> bool {
        self.close_after_remove.unwrap_or(false)
    }

    pub fn live_refresh(&self) -> bool {
        self.live_refresh.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    backup: Option<bool>,
    #[serde(default)]
    indent: Option<String>,
}

impl Output {
    fn default_indent() -> &'static str {
        "  "
    }

    pub fn backup(&self) -> bool {
        self.backup.unwrap_or(true)
    }

    pub fn indent(&self) -> String {
        self.indent
            .clone()
            .unwrap_or_else(|| Self::default_indent().to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Logging {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Logging {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }
}

/// Key bindings of the removal dialog, as written in the config (`k`, `space`, `ctrl+r`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Keybindings {
    #[serde(default)]
    pub up: Option<String>,
    #[serde(default)]
    pub down: Option<String>,
    #[serde(default)]
    pub toggle: Option<String>,
    #[serde(default)]
    pub toggle_all: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub remove: Option<String>,
}

impl Keybindings {
    pub fn up(&self) -> &str {
        self.up.as_deref().unwrap_or("k")
    }

    pub fn down(&self) -> &str {
        self.down.as_deref().unwrap_or("j")
    }

    pub fn toggle(&self) -> &str {
        self.toggle.as_deref().unwrap_or("space")
    }

    pub fn toggle_all(&self) -> &str {
        self.toggle_all.as_deref().unwrap_or("a")
    }

    pub fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("/")
    }

    pub fn remove(&self) -> &str {
        self.remove.as_deref().unwrap_or("ctrl+r")
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    log_level: Option<String>,
    close_after_remove: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            log_level: env::var("REMOVE_IEDS_LOG").ok(),
            close_after_remove: env::var("REMOVE_IEDS_CLOSE_AFTER_REMOVE")
                .ok()
                .and_then(|value| parse_bool(&value)),
        }
    }

    #[cfg(test)]
    fn for_tests(log_level: &str, close_after_remove: bool) -> Self {
        Self {
            log_level: Some(log_level.to_owned()),
            close_after_remove: Some(close_after_remove),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, an optional
    /// explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        Self::load_with_layers(global, workspace, explicit.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        for path in [global, workspace, explicit]
            .into_iter()
            .flatten()
            .filter(|path| path.exists())
        {
            tracing::debug!(path = %path.display(), "config layer");
            layers.push(Self::from_file(&path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("in config file {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            dialog: merge_dialog(self.dialog, other.dialog),
            output: merge_output(self.output, other.output),
            logging: merge_logging(self.logging, other.logging),
            keybindings: merge_keybindings(self.keybindings, other.keybindings),
        }
    }
}

fn merge_dialog(mut base: Dialog, overlay: Dialog) -> Dialog {
    if let Some(value) = overlay.close_after_remove {
        base.close_after_remove = Some(value);
    }
    if let Some(value) = overlay.live_refresh {
        base.live_refresh = Some(value);
    }
    base
}

fn merge_output(mut base: Output, overlay: Output) -> Output {
    if let Some(value) = overlay.backup {
        base.backup = Some(value);
    }
    if let Some(value) = overlay.indent {
        base.indent = Some(value);
    }
    base
}

fn merge_logging(base: Logging, overlay: Logging) -> Logging {
    Logging {
        level: overlay.level.or(base.level),
        file: overlay.file.or(base.file),
    }
}

fn merge_keybindings(base: Keybindings, overlay: Keybindings) -> Keybindings {
    Keybindings {
        up: overlay.up.or(base.up),
        down: overlay.down.or(base.down),
        toggle: overlay.toggle.or(base.toggle),
        toggle_all: overlay.toggle_all.or(base.toggle_all),
        filter: overlay.filter.or(base.filter),
        remove: overlay.remove.or(base.remove),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("remove-ieds/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(level) = env.log_level {
        config.logging.level = Some(level);
    }
    if let Some(close) = env.close_after_remove {
        config.dialog.close_after_remove = Some(close);
    }
    config
}

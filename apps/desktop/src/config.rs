use std::{collections::HashMap, fs, io, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use client_core::SupabaseConfig;
use shared::domain::OAuthProvider;

pub const DEFAULT_CONFIG_FILE: &str = "bookmarks.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub redirect_to: String,
    pub oauth_provider: OAuthProvider,
    pub heartbeat_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            redirect_to: "http://localhost:3000/".into(),
            oauth_provider: OAuthProvider::Google,
            heartbeat_secs: 25,
        }
    }
}

impl Settings {
    /// Applies a flat `key = "value"` table.
    pub fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;

        if let Some(v) = file_cfg.get("supabase_url") {
            self.supabase_url = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("supabase_anon_key") {
            self.supabase_anon_key = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("redirect_to") {
            self.redirect_to = v.clone();
        }
        if let Some(v) = file_cfg.get("oauth_provider") {
            self.oauth_provider = v.parse()?;
        }
        if let Some(v) = file_cfg.get("heartbeat_secs") {
            self.heartbeat_secs = parse_heartbeat(v)?;
        }

        Ok(())
    }

    /// Applies environment overrides. `APP__*` names win over the plain ones.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("SUPABASE_URL") {
            self.supabase_url = Some(v);
        }
        if let Some(v) = lookup("APP__SUPABASE_URL") {
            self.supabase_url = Some(v);
        }

        if let Some(v) = lookup("SUPABASE_ANON_KEY") {
            self.supabase_anon_key = Some(v);
        }
        if let Some(v) = lookup("APP__SUPABASE_ANON_KEY") {
            self.supabase_anon_key = Some(v);
        }

        if let Some(v) = lookup("APP__REDIRECT_TO") {
            self.redirect_to = v;
        }

        if let Some(v) = lookup("APP__OAUTH_PROVIDER") {
            self.oauth_provider = v.parse().context("APP__OAUTH_PROVIDER")?;
        }

        if let Some(v) = lookup("APP__HEARTBEAT_SECS") {
            self.heartbeat_secs = parse_heartbeat(&v).context("APP__HEARTBEAT_SECS")?;
        }

        Ok(())
    }

    pub fn to_supabase_config(&self) -> anyhow::Result<SupabaseConfig> {
        let url = self
            .supabase_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("project url missing: set SUPABASE_URL or supabase_url"))?;
        let anon_key = self
            .supabase_anon_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("anon key missing: set SUPABASE_ANON_KEY or supabase_anon_key")
            })?;

        Ok(SupabaseConfig::new(url, anon_key)?
            .with_redirect_to(self.redirect_to.clone())
            .with_heartbeat_interval(Duration::from_secs(self.heartbeat_secs)))
    }
}

fn parse_heartbeat(raw: &str) -> anyhow::Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("heartbeat_secs must be a whole number, got '{raw}'"))?;
    if secs == 0 {
        return Err(anyhow!("heartbeat_secs must be greater than zero"));
    }
    Ok(secs)
}

/// Defaults, then the optional settings file, then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to read settings from '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to open settings file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok())?;

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

//! Configuration CLI commands

use clap::Subcommand;

use crate::audit::SensitivityPolicy;
use crate::config::{AuditPaths, Settings};
use crate::error::{AuditError, AuditResult};

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective settings and file locations
    Show,
    /// Set a setting and save it
    Set {
        /// sensitivity_policy, redaction_token, default_actor, log.level or log.format
        key: String,
        /// New value; an empty default_actor clears it
        value: String,
    },
}

/// Handle a config command
pub fn handle_config_command(
    paths: &AuditPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> AuditResult<()> {
    match cmd {
        ConfigCommands::Show => print!("{}", format_settings(paths, settings)),

        ConfigCommands::Set { key, value } => {
            apply_setting(settings, &key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
    }

    Ok(())
}

fn format_settings(paths: &AuditPaths, settings: &Settings) -> String {
    let mut output = String::new();
    output.push_str("change-audit configuration\n");
    output.push_str("==========================\n");
    output.push_str(&format!("Base directory:     {}\n", paths.base_dir().display()));
    output.push_str(&format!("Settings file:      {}\n", paths.settings_file().display()));
    output.push_str(&format!("Store file:         {}\n", paths.store_file().display()));
    output.push('\n');
    output.push_str(&format!("sensitivity_policy: {}\n", settings.sensitivity_policy));
    output.push_str(&format!("redaction_token:    {}\n", settings.redaction_token));
    output.push_str(&format!(
        "default_actor:      {}\n",
        settings.default_actor.as_deref().unwrap_or("(none)")
    ));
    output.push_str(&format!("log.level:          {}\n", settings.log.level));
    output.push_str(&format!("log.format:         {}\n", settings.log.format));
    output
}

/// Apply one `key = value` pair to the settings
pub fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> AuditResult<()> {
    match key {
        "sensitivity_policy" => settings.sensitivity_policy = value.parse::<SensitivityPolicy>()?,
        "redaction_token" => {
            if value.is_empty() {
                return Err(AuditError::Config("Redaction token cannot be empty".into()));
            }
            settings.redaction_token = value.to_string();
        }
        "default_actor" => {
            let value = value.trim();
            settings.default_actor = (!value.is_empty()).then(|| value.to_string());
        }
        "log.level" => settings.log.level = value.parse()?,
        "log.format" => settings.log.format = value.parse()?,
        _ => return Err(AuditError::Config(format!("Unknown setting: {}", key))),
    }
    Ok(())
}

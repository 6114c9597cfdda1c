//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "search.radius_km")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => print!("{}", render_all(&config)),

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Available keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// All values grouped by section, secrets masked
fn render_all(config: &Config) -> String {
    let mut output = String::new();
    let mut section = "";

    for key in Config::available_keys() {
        let Some((name, field)) = key.split_once('.') else {
            continue;
        };
        if name != section {
            if !section.is_empty() {
                output.push('\n');
            }
            output.push_str(&format!("[{}]\n", name));
            section = name;
        }

        let value = config.get(key).unwrap_or_default();
        let line = match field {
            "api_key" if value.is_empty() => format!("{} = \"\" # not configured", field),
            "api_key" => format!("{} = \"***\" # configured", field),
            _ if value.parse::<f64>().is_ok() || value == "true" || value == "false" => {
                format!("{} = {}", field, value)
            }
            _ => format!("{} = \"{}\"", field, value),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_groups_sections() {
        let output = render_all(&Config::default());

        assert!(output.starts_with("[store]\nurl = \"\"\napi_key = \"\" # not configured\n"));
        assert!(output.contains("\n[location]\nprovider = \"ip\"\n"));
        assert!(output.contains("timeout_ms = 10000\n"));
        assert!(output.contains("enabled = true\n"));
        assert!(output.ends_with("[server]\nhost = \"127.0.0.1\"\nport = 7878\n"));
    }

    #[test]
    fn test_render_all_masks_api_key() {
        let mut config = Config::default();
        config.set("store.api_key", "secret-anon-key").unwrap();

        let output = render_all(&config);
        assert!(output.contains("api_key = \"***\" # configured"));
        assert!(!output.contains("secret-anon-key"));
    }
}

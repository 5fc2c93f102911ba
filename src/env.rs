use std::path::Path;

use tracing::{info, warn};

/// Layered env files, later files overriding earlier ones. Secrets stay out
/// of the repo in `.secrets.env`.
pub fn load_environment() -> anyhow::Result<()> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or_else(|_| "development".to_string()) == "production";

    let profile_env = if is_production {
        "config/prod.env"
    } else {
        "config/dev.env"
    };

    for env_file in ["config/common.env", profile_env, ".secrets.env"] {
        load_env_file(env_file)?;
    }

    Ok(())
}

fn load_env_file(path: &str) -> anyhow::Result<()> {
    if !Path::new(path).exists() {
        warn!("Environment file {} not found, skipping", path);
        return Ok(());
    }

    dotenvy::from_filename_override(path)?;
    info!("Loaded environment from: {}", path);
    Ok(())
}

//! `streamcall config` — Configuration management commands.

use streamcall_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            if config.has_api_key() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                println!("   ⚠️  No API key set (set STREAMCALL_API_KEY or OPENAI_API_KEY)");
            }

            println!();
            println!("   Endpoint:  {}", config.api_url);
            println!("   Model:     {}", config.model);
            println!("   Max depth: {}", config.max_depth);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

//! Config check command handler

use crate::config::Config;

pub fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;

    println!("Configuration OK");
    println!("{:-<50}", "");
    println!("  database:       {}", config.general.database_path);
    println!("  listen port:    {}", config.server.port);
    println!("  public url:     {}", config.server.public_url);
    println!("  token ttl:      {}s", config.security.token_ttl_seconds);
    println!(
        "  token secret:   {}",
        if config.security.token_secret.is_empty() {
            "generated at start-up"
        } else {
            "configured"
        }
    );
    println!(
        "  metrics:        {}",
        if config.observability.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}

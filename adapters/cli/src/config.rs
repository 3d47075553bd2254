use std::{fs, path::Path};

use anyhow::{Context, Result};
use defense_evolution_system_progression::ProgressionConfig;

/// Loads the balance file, falling back to the built-in defaults when none is given.
pub(crate) fn load_balance(path: Option<&Path>) -> Result<ProgressionConfig> {
    let Some(path) = path else {
        return Ok(ProgressionConfig::default());
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read balance file {}", path.display()))?;
    let config = parse_balance(&source)
        .with_context(|| format!("failed to parse balance file {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded balance file");
    Ok(config)
}

fn parse_balance(source: &str) -> Result<ProgressionConfig> {
    Ok(toml::from_str(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_evolution_core::UnitKind;

    #[test]
    fn missing_fields_keep_defaults() {
        let config = parse_balance("starting_gold = 900\n").expect("valid toml");
        assert_eq!(config.starting_gold, 900);
        assert_eq!(config.building_health, 100);
        assert_eq!(config.upgrades.strength, 5);
        assert_eq!(config.column_table, ProgressionConfig::default().column_table);
    }

    #[test]
    fn boost_schedule_can_be_replaced() {
        let source = r#"
            [[boosts]]
            wave = 2
            kind = "Enemy"
            boosts = { health = 30, speed = 0.25 }

            [[column_table]]
            threshold = 3
            half_width = 1
        "#;
        let config = parse_balance(source).expect("valid toml");
        assert_eq!(config.boosts.len(), 1);
        assert_eq!(config.boosts[0].kind, UnitKind::Enemy);
        assert_eq!(config.boosts[0].boosts.health, 30);
        assert_eq!(config.boosts[0].boosts.strength, 0);
        assert_eq!(config.column_table.len(), 1);
    }

    #[test]
    fn malformed_balance_is_an_error() {
        assert!(parse_balance("starting_gold = \"lots\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let error = load_balance(Some(Path::new("no/such/balance.toml")))
            .expect_err("file does not exist");
        assert!(error.to_string().contains("no/such/balance.toml"));
    }
}

use clap::Parser;
use lunchbell::config::{AppConfig, ProviderConfig};
use lunchbell::dispatch::DispatchSettings;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) enum RunOutcome {
    Serve { addr: SocketAddr, config: AppConfig },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    lunchbell::logging::init(&cli.log_level);

    match resolve_config(&cli) {
        Ok(config) => RunOutcome::Serve {
            addr: SocketAddr::new(cli.bind, cli.port),
            config,
        },
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "lunchbell",
    version,
    about = "Tells subscribers when lunch has arrived"
)]
struct Cli {
    #[arg(long, env = "LUNCHBELL_CONFIG", default_value = "lunchbell.toml")]
    config: PathBuf,
    #[arg(long, env = "LUNCHBELL_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
    #[arg(long, env = "LUNCHBELL_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,
    #[arg(long, env = "LUNCHBELL_BATCH_SIZE", default_value = "10")]
    batch_size: NonZeroUsize,
    #[arg(long, env = "LUNCHBELL_COOLDOWN", default_value = "5s")]
    cooldown: String,
    #[arg(long, env = "LUNCHBELL_LOG", default_value = "info")]
    log_level: String,
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    if !cli.data_dir.is_dir() {
        return Err(format!(
            "data dir is not a directory: {}",
            cli.data_dir.display()
        ));
    }
    let cooldown = parse_cooldown(&cli.cooldown)?;
    let providers = ProviderConfig::load(&cli.config).map_err(|err| err.to_string())?;

    Ok(AppConfig {
        data_dir: cli.data_dir.clone(),
        dispatch: DispatchSettings {
            batch_size: cli.batch_size,
            cooldown,
        },
        providers,
    })
}

fn parse_cooldown(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("cooldown cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("invalid cooldown '{value}'; expected <number>[s|m|h]"))?;

    if amount == 0 {
        return Err("cooldown must be greater than 0".to_string());
    }

    match unit {
        's' => Ok(Duration::from_secs(amount)),
        'm' => Ok(Duration::from_secs(amount.saturating_mul(60))),
        'h' => Ok(Duration::from_secs(amount.saturating_mul(3600))),
        _ => Err(format!(
            "invalid cooldown '{value}'; expected <number>[s|m|h]"
        )),
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            config: PathBuf::from("/nonexistent/lunchbell.toml"),
            data_dir: std::env::temp_dir(),
            port: 5000,
            bind: IpAddr::from([0, 0, 0, 0]),
            batch_size: NonZeroUsize::new(10).expect("non-zero"),
            cooldown: "5s".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn parse_cooldown__should_parse_seconds_when_unit_missing() {
        // When
        let duration = parse_cooldown("30").expect("parse cooldown");

        // Then
        assert_eq!(duration, Duration::from_secs(30));
    }

    #[test]
    fn parse_cooldown__should_parse_units() {
        assert_eq!(parse_cooldown("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_cooldown("1H"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn parse_cooldown__should_reject_invalid_values() {
        assert!(parse_cooldown("").is_err());
        assert!(parse_cooldown("0").is_err());
        assert!(parse_cooldown("abc").is_err());
        assert!(parse_cooldown("5d").is_err());
    }

    #[test]
    fn resolve_config__should_apply_defaults_without_provider_file() {
        // When
        let config = resolve_config(&base_cli()).expect("resolve config");

        // Then
        assert_eq!(config.dispatch.batch_size.get(), 10);
        assert_eq!(config.dispatch.cooldown, Duration::from_secs(5));
        assert!(config.providers.twilio.is_none());
    }

    #[test]
    fn resolve_config__should_reject_missing_data_dir() {
        // Given
        let mut cli = base_cli();
        cli.data_dir = PathBuf::from("/nonexistent/lunchbell-data");

        // When
        let result = resolve_config(&cli);

        // Then
        assert!(result.is_err());
    }

    #[test]
    fn cli__should_reject_zero_batch_size() {
        let result = Cli::try_parse_from(["lunchbell", "--batch-size", "0"]);
        assert!(result.is_err());
    }
}

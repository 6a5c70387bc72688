//! LogHub - cross-account log aggregation provisioner.
//!
//! Synthesizes provisioning plans for a central log-receiving account and
//! for source accounts that subscribe their log groups to it. The
//! destination pass must run first; its `LogDestinationARN` output is the
//! input to every source pass.
//!
//! # Usage
//!
//! ```text
//! DESTINATION_ACCOUNT_ID=111111111111 loghub destination
//! LOG_GROUP_NAME=/app/prod LOG_DESTINATION_ARN=arn:... loghub source
//! DESTINATION_ACCOUNT_ID=111111111111 LOG_GROUP_NAME=/app/prod loghub all
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DESTINATION_ACCOUNT_ID` | *(required for destination)* | Account owning the pipeline |
//! | `SOURCE_ACCOUNT_ID` | *(destination account)* | Account allowed to push logs |
//! | `LOG_GROUP_NAME` | *(required for source)* | Log group to subscribe |
//! | `LOG_DESTINATION_ARN` | *(threaded in `all` mode)* | Destination ARN from a prior pass |
//! | `AWS_REGION` | `us-east-1` | Region for region-scoped ARNs |
//! | `OUT_DIR` | `loghub.out` | Directory for rendered plans |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use loghub_core::{AccountId, LogHubConfig};
use loghub_stacks::{DestinationStack, LOG_DESTINATION_OUTPUT, SourceStack};
use loghub_synth::ProvisioningPlan;

/// What a single invocation provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Only the receiving pipeline.
    Destination,
    /// Only one log group subscription.
    Source,
    /// Destination first, then the subscription with the ARN threaded through.
    All,
}

/// Parse the mode argument. Absent means `all`.
fn parse_mode(arg: Option<&str>) -> Result<Mode> {
    match arg {
        None | Some("all") => Ok(Mode::All),
        Some("destination") => Ok(Mode::Destination),
        Some("source") => Ok(Mode::Source),
        Some(other) => bail!("unknown mode: {other} (expected destination, source, or all)"),
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Write a rendered plan into the output directory.
fn write_plan(out_dir: &Path, plan: &ProvisioningPlan) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.plan.json", plan.stack_name));
    fs::write(&path, plan.to_json()?)
        .with_context(|| format!("cannot write plan to {}", path.display()))?;
    info!(stack = %plan.stack_name, path = %path.display(), "wrote provisioning plan");
    Ok(path)
}

/// Synthesize the destination stack and return its output ARN.
fn provision_destination(config: &LogHubConfig, out_dir: &Path) -> Result<String> {
    let destination_account = config
        .destination_account_id
        .as_deref()
        .context("DESTINATION_ACCOUNT_ID is required for the destination pass")?;
    let destination_account = AccountId::new(destination_account)?;

    let source_account = config
        .source_account_id
        .as_deref()
        .map(AccountId::new)
        .transpose()?;

    let stack = DestinationStack::new(destination_account, source_account, &config.region)?;
    let plan = stack.synth()?;
    write_plan(out_dir, &plan)?;

    let arn = stack.log_destination_arn().to_string();
    println!("{LOG_DESTINATION_OUTPUT}: {arn}");
    Ok(arn)
}

/// Synthesize the source stack against the given destination ARN.
fn provision_source(config: &LogHubConfig, out_dir: &Path, destination_arn: &str) -> Result<()> {
    let log_group = config
        .log_group_name
        .as_deref()
        .context("LOG_GROUP_NAME is required for the source pass")?;

    let stack = SourceStack::new(log_group, destination_arn)?;
    let plan = stack.synth()?;
    write_plan(out_dir, &plan)?;
    Ok(())
}

fn run(mode: Mode, config: &LogHubConfig) -> Result<()> {
    let out_dir = PathBuf::from(&config.out_dir);

    match mode {
        Mode::Destination => {
            provision_destination(config, &out_dir)?;
        }
        Mode::Source => {
            let arn = config
                .log_destination_arn
                .as_deref()
                .context("LOG_DESTINATION_ARN is required for the source pass")?;
            provision_source(config, &out_dir, arn)?;
        }
        Mode::All => {
            let arn = provision_destination(config, &out_dir)?;
            // An explicit ARN wins over the threaded output; a missing log
            // group simply skips the source pass.
            let arn = config.log_destination_arn.as_deref().unwrap_or(&arn);
            if config.log_group_name.is_some() {
                provision_source(config, &out_dir, arn)?;
            } else {
                info!("no LOG_GROUP_NAME set, skipping source pass");
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let config = LogHubConfig::from_env();
    init_tracing(&config.log_level)?;

    let arg = std::env::args().nth(1);
    let mode = parse_mode(arg.as_deref())?;

    info!(?mode, region = %config.region, "starting provisioning pass");
    run(mode, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_mode_to_all() {
        assert_eq!(parse_mode(None).unwrap(), Mode::All);
        assert_eq!(parse_mode(Some("all")).unwrap(), Mode::All);
    }

    #[test]
    fn test_should_parse_explicit_modes() {
        assert_eq!(parse_mode(Some("destination")).unwrap(), Mode::Destination);
        assert_eq!(parse_mode(Some("source")).unwrap(), Mode::Source);
    }

    #[test]
    fn test_should_reject_unknown_mode() {
        assert!(parse_mode(Some("teardown")).is_err());
    }

    #[test]
    fn test_should_fail_destination_pass_without_account() {
        let config = LogHubConfig::default();
        let err = provision_destination(&config, Path::new("loghub.out")).unwrap_err();
        assert!(err.to_string().contains("DESTINATION_ACCOUNT_ID"));
    }

    #[test]
    fn test_should_fail_source_pass_without_arn() {
        let mut config = LogHubConfig::default();
        config.log_group_name = Some("/app/prod".to_owned());
        let err = run(Mode::Source, &config).unwrap_err();
        assert!(err.to_string().contains("LOG_DESTINATION_ARN"));
    }

    #[test]
    fn test_should_write_plans_for_both_stacks() {
        let tmp = std::env::temp_dir().join("loghub-test-out");
        let _ = fs::remove_dir_all(&tmp);

        let mut config = LogHubConfig::default();
        config.destination_account_id = Some("111111111111".to_owned());
        config.source_account_id = Some("222222222222".to_owned());
        config.log_group_name = Some("/app/prod".to_owned());
        config.out_dir = tmp.display().to_string();

        run(Mode::All, &config).unwrap();

        assert!(tmp.join("LogDestinationStack.plan.json").exists());
        assert!(tmp.join("LogSourceStack.plan.json").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}

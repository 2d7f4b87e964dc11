use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, OutputFormat};
use clap::Args;
use libretag::config::RepositoryList;
use libretag::{
    BatchProcessor, BatchReport, Client, ReassignmentPlan, RegistryClient, RepositoryState,
    Settings, TagReassigner,
};
use std::path::PathBuf;

/// Inputs of a retag run
///
/// Each flag also reads the matching GitHub Actions input variable, so the
/// binary can run as an action step with `with:` inputs.
#[derive(Args, Debug, Default, Clone)]
pub struct RetagArgs {
    /// Tag that currently points at the image to release
    #[arg(long, env = "INPUT_SOURCE-TAG")]
    pub source_tag: Option<String>,

    /// Release tag to create
    #[arg(long, env = "INPUT_TARGET-TAG")]
    pub target_tag: Option<String>,

    /// Floating tag to move onto the released image
    #[arg(long, env = "INPUT_CURRENT-TAG")]
    pub current_tag: Option<String>,

    /// Comma-separated repository names
    #[arg(long, env = "INPUT_REPOSITORIES")]
    pub repositories: Option<String>,

    /// Registry URL (overrides --aws-account-id/--region)
    #[arg(long, env = "INPUT_REGISTRY")]
    pub registry: Option<String>,

    /// AWS account id of the ECR registry
    #[arg(long, env = "INPUT_AWS-ACCOUNT-ID")]
    pub aws_account_id: Option<String>,

    /// AWS region of the ECR registry
    #[arg(long, env = "INPUT_REGION")]
    pub region: Option<String>,

    /// Registry username (use `AWS` for ECR)
    #[arg(long, env = "INPUT_USERNAME")]
    pub username: Option<String>,

    /// Registry password (for ECR, the output of `aws ecr get-login-password`)
    #[arg(long, env = "INPUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Bearer token, used instead of username/password
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// YAML configuration file
    #[arg(long, env = "RETAG_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Writes every non-blank flag over the loaded settings.
///
/// Actions runners export declared but unset inputs as empty strings, which
/// must not clear values from the configuration file.
pub fn apply_overrides(settings: &mut Settings, args: &RetagArgs) {
    fn set(slot: &mut Option<String>, value: &Option<String>) {
        if let Some(v) = value.as_deref().map(str::trim)
            && !v.is_empty()
        {
            *slot = Some(v.to_string());
        }
    }

    set(&mut settings.source_tag, &args.source_tag);
    set(&mut settings.target_tag, &args.target_tag);
    set(&mut settings.current_tag, &args.current_tag);
    set(&mut settings.registry.url, &args.registry);
    set(&mut settings.registry.aws_account_id, &args.aws_account_id);
    set(&mut settings.registry.region, &args.region);
    set(&mut settings.registry.username, &args.username);
    set(&mut settings.registry.password, &args.password);
    set(&mut settings.registry.token, &args.token);

    if let Some(repositories) = args.repositories.as_deref()
        && !repositories.trim().is_empty()
    {
        settings.repositories = Some(RepositoryList::Csv(repositories.to_string()));
    }
    if let Some(timeout) = args.timeout {
        settings.network.timeout = timeout;
    }
}

/// Loads settings from the optional file and `RETAG_*` environment, then
/// applies the command-line flags.
pub fn resolve_settings(args: &RetagArgs) -> libretag::Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    apply_overrides(&mut settings, args);
    Ok(settings)
}

impl Formattable for BatchReport {
    fn format_pretty(&self) -> String {
        let mut lines = vec![format!(
            "{} -> {}, {}",
            self.source_tag, self.target_tag, self.current_tag
        )];

        let width = self
            .repositories
            .iter()
            .map(|r| r.repository.len())
            .max()
            .unwrap_or(0);

        for entry in &self.repositories {
            let state = match (entry.state, entry.failed_step) {
                (RepositoryState::Failed, Some(step)) => format!("failed ({})", step),
                (state, _) => format!("{:?}", state).to_lowercase(),
            };
            let mut line = format!("  {:<width$}  {}", entry.repository, state, width = width);
            if let Some(digest) = &entry.digest {
                line.push_str("  ");
                line.push_str(digest);
            }
            lines.push(line);
        }

        lines.push(format!(
            "{} of {} repositories retagged",
            self.count(RepositoryState::Done),
            self.repositories.len()
        ));
        lines.join("\n")
    }
}

/// Runs a validated plan and prints the outcome. Returns the process exit code.
pub async fn run_plan<C: RegistryClient>(
    ctx: &AppContext,
    processor: &BatchProcessor<C>,
    plan: &ReassignmentPlan,
    output: OutputFormat,
) -> i32 {
    let (report, result) = processor.run_with_report(plan).await;

    match format::format_output(&report, output) {
        Ok(text) => println!("{}", text),
        Err(e) => format::error(ctx, &format!("Error formatting output: {}", e)),
    }

    match result {
        Ok(()) => {
            // json/yaml keep stdout to the summary document alone.
            if output == OutputFormat::Pretty {
                format::success(
                    ctx,
                    &format!(
                        "Moved {} and {} to {} in {} repositories",
                        plan.target_tag(),
                        plan.current_tag(),
                        plan.source_tag(),
                        plan.repositories().len()
                    ),
                );
            }
            0
        }
        Err(e) => {
            format::error(ctx, &e.to_string());
            1
        }
    }
}

/// Handle a retag run from command-line arguments
pub async fn handle_retag(ctx: &AppContext, args: &RetagArgs, output: OutputFormat) -> i32 {
    let prepared = resolve_settings(args).and_then(|settings| {
        let plan = settings.validate()?;
        let endpoint = settings.registry_endpoint()?;
        let client = Client::with_config(
            &endpoint,
            settings.client_config(),
            Some(settings.credentials()),
        )?;
        Ok((plan, client))
    });

    let (plan, client) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            format::error(ctx, &e.to_string());
            return 1;
        }
    };

    // Reject an unreachable registry or bad credentials before any tag moves.
    let version = match client.check_version().await {
        Ok(version) => version,
        Err(e) => {
            format::error(ctx, &e.to_string());
            return 1;
        }
    };

    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!(
            "Registry {} (API {}), repositories: {}",
            client.registry_url(),
            version.api_version.as_deref().unwrap_or("unknown"),
            plan.repositories().join(", ")
        ),
    );

    let processor = BatchProcessor::new(TagReassigner::new(client));
    run_plan(ctx, &processor, &plan, output).await
}

#[cfg(test)]
#[path = "retag_tests.rs"]
mod tests;

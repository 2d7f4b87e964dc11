use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod format;

/// Retag - container image tag promotion
///
/// Copies the manifest behind a source tag to a release tag and moves a
/// floating tag onto the same image, for every listed repository.
#[derive(Parser, Debug)]
#[command(name = "retag")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, default_value = "auto")]
    color: String,

    /// Summary format: pretty, json, yaml
    #[arg(short, long, default_value = "pretty")]
    format: String,

    #[command(flatten)]
    args: commands::retag::RetagArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = context::AppContext::build(
        format::ColorChoice::from(cli.color.as_str()),
        context::VerbosityLevel::from_count(cli.verbose),
    );

    // Logs go to stderr so json/yaml summaries on stdout stay parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(ctx.verbosity.filter_directive())),
        )
        .with_ansi(format::should_color(&ctx))
        .with_writer(std::io::stderr)
        .init();

    let output = format::OutputFormat::from(cli.format.as_str());
    let code = commands::retag::handle_retag(&ctx, &cli.args, output).await;
    std::process::exit(code);
}

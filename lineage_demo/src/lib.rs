//! Library half of the `config-lineage` binary: argument parsing, logging
//! setup and the report.

pub mod cli;
pub mod error;
pub mod report;

use config_lineage::{DirectoryParameterStore, Resolver, ResolverSettings};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::Cli;
use crate::error::Result;
use crate::report::ReportContext;

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence when it is set and valid. Otherwise `verbose`
/// selects debug output and the default is warnings only.
pub fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    if tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(verbose, rust_log.as_deref()))
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Build the resolver described by `cli` and print the report.
///
/// # Errors
///
/// Returns [`error::DemoError`] when the settings, a key, a required source
/// or the output fails.
pub fn run(cli: &Cli) -> Result<()> {
    let mut settings = ResolverSettings::load()?;
    cli.apply_to(&mut settings);
    let keys = cli.key_paths()?;

    let mut builder = Resolver::builder(settings);
    if let Some(root) = &cli.parameter_store_dir {
        builder = builder.parameter_store(DirectoryParameterStore::new(root.clone()));
    }
    let resolver = builder.build_from_process(&cli.overrides)?;

    let working_dir = std::env::current_dir()?;
    report::print_report(
        &resolver,
        ReportContext {
            working_dir: &working_dir,
            settings: builder.settings(),
            keys: &keys,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::log_filter;
    use rstest::rstest;
    use tracing_subscriber::filter::LevelFilter;

    #[rstest]
    #[case(false, None, LevelFilter::WARN)]
    #[case(true, None, LevelFilter::DEBUG)]
    #[case(false, Some(""), LevelFilter::WARN)]
    #[case(false, Some("debug"), LevelFilter::DEBUG)]
    #[case(true, Some("trace"), LevelFilter::TRACE)]
    #[case(true, Some("info"), LevelFilter::INFO)]
    fn rust_log_takes_precedence_over_verbose(
        #[case] verbose: bool,
        #[case] rust_log: Option<&str>,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(log_filter(verbose, rust_log).max_level_hint(), Some(expected));
    }
}

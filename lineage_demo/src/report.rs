//! Human-readable rendering of a resolver and the keys asked about.
use std::io::{self, Write};
use std::path::Path;

use camino::Utf8Path;
use config_lineage::{KeyPath, Resolver, ResolverSettings};

/// Marker printed for a key no provider supplies.
pub const ABSENT_VALUE: &str = "<null>";
/// Marker printed when there is no winning provider.
pub const NO_WINNER: &str = "<none>";

/// Inputs to the report besides the resolver itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Directory the process was started in.
    pub working_dir: &'a Path,
    /// Settings the resolver was built from.
    pub settings: &'a ResolverSettings,
    /// Keys to report, in order.
    pub keys: &'a [KeyPath],
}

/// Write the diagnostics header followed by one block per key.
///
/// # Errors
///
/// Returns an [`io::Error`] when writing to `out` fails.
pub fn write_report_to<W: Write>(
    out: &mut W,
    resolver: &Resolver,
    ctx: ReportContext<'_>,
) -> io::Result<()> {
    write_header(out, resolver, ctx)?;
    writeln!(out)?;
    for key in ctx.keys {
        write_key(out, resolver, key)?;
    }
    Ok(())
}

/// Print the report to standard output.
///
/// # Errors
///
/// Returns an [`io::Error`] when writing to standard output fails.
pub fn print_report(resolver: &Resolver, ctx: ReportContext<'_>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_report_to(&mut stdout, resolver, ctx)
}

fn write_header<W: Write>(out: &mut W, resolver: &Resolver, ctx: ReportContext<'_>) -> io::Result<()> {
    let settings = ctx.settings;
    writeln!(out, "Working directory: {}", ctx.working_dir.display())?;
    writeln!(out, "Environment: {}", resolver.environment_name())?;
    writeln!(out, "Settings files:")?;
    for path in [
        settings.base_file(),
        settings.environment_file(resolver.environment_name()),
    ] {
        writeln!(out, "  {path} ({})", presence(&path))?;
    }
    let dotenv = settings.dotenv_path();
    writeln!(out, "Dotenv file: {dotenv} ({})", presence(&dotenv))?;
    writeln!(out, "Providers (lowest precedence first):")?;
    for (index, entry) in resolver.chain().entries().iter().enumerate() {
        writeln!(
            out,
            "  {}. {} {} [{}]",
            index + 1,
            entry.kind(),
            entry.origin(),
            entry.status()
        )?;
    }
    Ok(())
}

fn write_key<W: Write>(out: &mut W, resolver: &Resolver, key: &KeyPath) -> io::Result<()> {
    let result = resolver.resolve(key);
    writeln!(out, "{key} = {}", result.value().unwrap_or(ABSENT_VALUE))?;
    let winner = result.resolution().map_or_else(
        || NO_WINNER.to_owned(),
        |resolution| format!("{} ({})", resolution.winner(), resolution.origin()),
    );
    writeln!(out, "  winner: {winner}")?;
    for shadowed in resolver.chain().candidates(key).iter().skip(1) {
        writeln!(
            out,
            "  shadowed: {} ({}) = {}",
            shadowed.kind(),
            shadowed.origin(),
            shadowed.value()
        )?;
    }
    Ok(())
}

fn presence(path: &Utf8Path) -> &'static str {
    if path.is_file() { "present" } else { "missing" }
}

#[cfg(test)]
mod tests {
    use super::{ReportContext, write_report_to};
    use config_lineage::{EnvironmentSnapshot, FeatureFlags, KeyPath, Resolver, ResolverSettings};
    use std::path::Path;
    use test_helpers::project::Project;

    fn render(project: &Project, env: &EnvironmentSnapshot, args: &[String]) -> String {
        let settings = ResolverSettings {
            settings_dir: project.root().to_owned(),
            ..ResolverSettings::default()
        };
        let resolver = Resolver::builder(settings.clone())
            .build(env, FeatureFlags::none(), args)
            .expect("build");
        let keys = [
            KeyPath::parse("Db:ConnectionString").expect("key"),
            KeyPath::parse("ApiIntegration:ApiKey").expect("key"),
        ];
        let mut out = Vec::new();
        write_report_to(
            &mut out,
            &resolver,
            ReportContext {
                working_dir: Path::new("/work"),
                settings: &settings,
                keys: &keys,
            },
        )
        .expect("write report");
        String::from_utf8(out).expect("utf8 report")
    }

    #[test]
    fn reports_winner_and_shadowed_values() {
        let project = Project::new().expect("project");
        project
            .write("appsettings.json", r#"{ "Db": { "ConnectionString": "fileval" } }"#)
            .expect("settings file");
        let env = EnvironmentSnapshot::new().with_var("Db__ConnectionString", "envval");
        let args = vec!["--Db:ConnectionString=clival".to_owned()];

        let report = render(&project, &env, &args);

        assert!(report.contains("Working directory: /work"), "{report}");
        assert!(report.contains("Environment: Production"), "{report}");
        assert!(report.contains("appsettings.json (present)"), "{report}");
        assert!(report.contains("appsettings.Production.json (missing)"), "{report}");
        assert!(report.contains("Db:ConnectionString = clival\n  winner: CommandLine (argv)"), "{report}");
        assert!(report.contains("  shadowed: Environment (process environment) = envval"), "{report}");
        assert!(report.contains("  shadowed: JsonFile"), "{report}");
    }

    #[test]
    fn reports_absent_keys_with_markers() {
        let project = Project::new().expect("project");
        let report = render(&project, &EnvironmentSnapshot::new(), &[]);
        assert!(
            report.contains("ApiIntegration:ApiKey = <null>\n  winner: <none>\n"),
            "{report}"
        );
    }

    #[test]
    fn lists_providers_in_precedence_order() {
        let project = Project::new().expect("project");
        let report = render(&project, &EnvironmentSnapshot::new(), &[]);
        let order: Vec<&str> = report
            .lines()
            .filter(|line| line.starts_with("  ") && line.contains(". "))
            .filter_map(|line| line.split_whitespace().nth(1))
            .collect();
        assert_eq!(
            order,
            ["JsonFile", "JsonFile", "UserSecrets", "Environment", "CommandLine"]
        );
        assert!(report.contains("[skipped (not found)]"), "{report}");
    }
}

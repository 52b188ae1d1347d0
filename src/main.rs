use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use version_check::config::{CheckerConfig, LogConfig, ROOT_ENV_VAR};
use version_check::manifest::discovery::{construct_roots, find_manifests};
use version_check::manifest::json::JsonManifestParser;
use version_check::package::binding::{PackageBinding, VersionCheck};
use version_check::package::checker::CheckResult;
use version_check::package::graph::PackageGraph;
use version_check::package::loader::{FsManifestSource, load_graph};
use version_check::package::workspace::check_all;
use version_check::version::error::GraphError;

/// Exit code for configuration errors (bad config, manifests or graph)
const EXIT_CONFIG_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "version-check")]
#[command(version, about = "Check version consistency across a package dependency graph")]
struct Cli {
    /// Search roots, separated like PATH
    #[arg(long, global = true)]
    root: Option<String>,

    /// Config file (defaults to ~/.config/version-check/config.json)
    #[arg(long, global = true)]
    conf: Option<PathBuf>,

    /// Directory levels searched below each root
    #[arg(long, global = true)]
    depth: Option<usize>,

    /// Skip malformed manifests instead of failing
    #[arg(long, global = true)]
    keep_going: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a package and everything it depends on
    Check { package: String },
    /// Print name, version and dependencies of a package
    Info { package: String },
    /// Print the dependency tree of a package
    Tree { package: String },
    /// Print the packages needed to build a package, dependencies first
    Buildorder {
        package: String,
        /// Print package directories instead of names
        #[arg(long)]
        printpaths: bool,
    },
    /// Print the packages a package depends on
    Upstreams {
        package: String,
        /// Include indirect dependencies, dependencies first
        #[arg(long)]
        recursive: bool,
    },
    /// Print every dependency below a package that no package provides
    Missing { package: String },
    /// Print the packages that depend on a package
    Downstreams {
        package: String,
        /// Include indirect dependents
        #[arg(long)]
        recursive: bool,
    },
    /// Check every package
    CheckAll,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = CheckerConfig::load_or_default(cli.conf.as_deref())?;
    let _guard = init_logging(cli.verbose, &config.log)?;

    let graph = load(&cli, &config)?;

    match cli.command {
        Command::Check { package } => {
            let binding = binding(&graph, &package)?;
            let passed = report_check(
                &mut std::io::stdout().lock(),
                binding.name(),
                &binding.check(),
            )?;
            Ok(exit_code(passed))
        }
        Command::Info { package } => {
            let mut stdout = std::io::stdout().lock();
            binding(&graph, &package)?.info(&mut stdout);
            Ok(ExitCode::SUCCESS)
        }
        Command::Tree { package } => {
            for line in graph.tree(&package)? {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Buildorder {
            package,
            printpaths,
        } => {
            for entry in graph.build_order(&package)? {
                match entry.path() {
                    Some(path) if printpaths => println!("{}", path.display()),
                    _ => println!("{entry}"),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Upstreams { package, recursive } => {
            for entry in graph.upstreams(&package, recursive)? {
                println!("{entry}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Missing { package } => {
            for entry in graph.missing(&package)? {
                println!("{entry}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Downstreams { package, recursive } => {
            binding(&graph, &package)?;
            for entry in graph.downstreams(&package, recursive) {
                println!("{entry}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckAll => {
            let results = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(check_all(Arc::new(graph)))?;

            let mut stdout = std::io::stdout().lock();
            let mut all_passed = true;
            for root_check in results {
                all_passed &= report_check(&mut stdout, &root_check.root, &root_check.result?)?;
            }
            Ok(exit_code(all_passed))
        }
    }
}

fn load(cli: &Cli, config: &CheckerConfig) -> anyhow::Result<PackageGraph> {
    let depth = cli.depth.unwrap_or(config.depth);
    let cli_roots: Vec<PathBuf> = cli
        .root
        .as_deref()
        .map(|roots| std::env::split_paths(roots).collect())
        .unwrap_or_default();
    let roots = construct_roots(
        &cli_roots,
        std::env::var_os(ROOT_ENV_VAR),
        &config.roots,
        depth,
    );

    let parser = JsonManifestParser::new(config.manifest_name.as_str());
    let paths = find_manifests(&roots, parser.file_name(), depth, &config.blacklist_paths);

    load_graph(
        &FsManifestSource::new(paths),
        &parser,
        cli.keep_going || config.keep_going,
    )
    .context("failed to load packages")
}

fn binding<'g>(graph: &'g PackageGraph, name: &str) -> Result<PackageBinding<'g>, GraphError> {
    graph
        .binding(name)
        .ok_or_else(|| GraphError::PackageNotFound(name.to_string()))
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print the outcome of a check, returning whether it passed.
fn report_check(out: &mut impl Write, name: &str, result: &CheckResult) -> anyhow::Result<bool> {
    match result {
        CheckResult::Pass => {
            writeln!(out, "version check for {name} : PASS")
                .context("failed to write check result")?;
            Ok(true)
        }
        CheckResult::Fail(failure) => {
            writeln!(
                out,
                "version check for package {} : FAIL\n  {failure}",
                failure.package()
            )
            .context("failed to write check result")?;
            Ok(false)
        }
    }
}

fn init_logging(verbose: bool, log: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let default_directive = if verbose {
        "debug"
    } else {
        log.level.as_deref().unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(file) = &log.file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = file
        .file_name()
        .with_context(|| format!("log file {} has no file name", file.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().json().with_writer(writer))
        .init();
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use version_check::package::checker::CheckFailure;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_check_prints_pass_and_fail() {
        let mut out = Vec::new();
        let failure = CheckFailure::UnresolvedDependency {
            package: "d".to_string(),
            required_by: "a".to_string(),
        };

        assert!(report_check(&mut out, "a", &CheckResult::Pass).unwrap());
        assert!(!report_check(&mut out, "a", &CheckResult::Fail(failure)).unwrap());

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "version check for a : PASS\n\
             version check for package d : FAIL\n  \
             unresolved dependency: d required by a\n"
        );
    }

    #[test]
    fn report_check_surfaces_write_errors() {
        let failure = CheckFailure::VersionMismatch {
            package: "c".to_string(),
            found: Version::new(0, 0, 9),
            required: ">=0.1.0".parse().unwrap(),
            required_by: "b".to_string(),
        };

        assert!(report_check(&mut ClosedPipe, "a", &CheckResult::Pass).is_err());
        assert!(report_check(&mut ClosedPipe, "a", &CheckResult::Fail(failure)).is_err());
    }
}

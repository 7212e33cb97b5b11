use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use markdown_fences_config::{Config, FenceSettings};
use markdown_fences_engine::{FenceNormalizer, FenceRules, io};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser, Debug)]
#[command(name = "markdown-fences")]
#[command(about = "Widen nested code fences so markdown renderers keep them intact")]
#[command(version)]
struct Cli {
    /// Files or directories to normalize (reads stdin when empty or `-`)
    paths: Vec<PathBuf>,

    /// Rewrite changed files in place
    #[arg(short, long, conflicts_with = "check")]
    write: bool,

    /// List files that would change and exit with status 1 if any would
    #[arg(long)]
    check: bool,

    /// Print every rewritten fence pair to stderr
    #[arg(long)]
    explain: bool,

    /// Config file to use instead of ~/.config/markdown-fences/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Print,
    Write,
    Check,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.write {
            Mode::Write
        } else {
            Mode::Print
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Paths whose normalized text differed from the input.
#[derive(Debug, Default)]
struct Summary {
    processed: usize,
    changed: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let summary = run(
        &cli,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    log::info!(
        "Processed {} document(s), {} changed",
        summary.processed,
        summary.changed.len()
    );

    if cli.mode() == Mode::Check && !summary.changed.is_empty() {
        process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run(
    cli: &Cli,
    stdin: &mut impl Read,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Summary> {
    let settings = load_settings(cli.config.as_deref())?;
    let normalizer = FenceNormalizer::new(FenceRules::from(settings));
    log::debug!("Fence rules: {:?}", normalizer.rules());
    let mode = cli.mode();

    let mut summary = Summary::default();
    for source in collect_sources(&cli.paths)? {
        let label = source.label();
        let text = match &source {
            Source::Stdin => {
                let mut text = String::new();
                stdin
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                text
            }
            Source::File(path) => io::read_document(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        };

        let result = normalizer.normalize_with_report(&text);
        summary.processed += 1;
        log::info!(
            "{label}: {} fence pair(s), changed: {}",
            result.rewrites.len(),
            result.changed()
        );

        if cli.explain {
            for rewrite in &result.rewrites {
                writeln!(
                    err,
                    "{label}:{}-{}: {} fence set to {} backticks",
                    rewrite.open_line + 1,
                    rewrite.close_line + 1,
                    rewrite.kind.label(),
                    rewrite.fence_len
                )?;
            }
        }

        match (mode, &source) {
            (Mode::Check, _) => {
                if result.changed() {
                    writeln!(out, "{label}")?;
                }
            }
            (Mode::Write, Source::File(path)) => {
                if result.changed() {
                    io::write_document(path, &result.text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Rewrote {label}");
                }
            }
            (Mode::Write, Source::Stdin) | (Mode::Print, _) => {
                out.write_all(result.text.as_bytes())?;
            }
        }

        if result.changed() {
            summary.changed.push(label);
        }
    }

    Ok(summary)
}

fn load_settings(config_path: Option<&Path>) -> Result<FenceSettings> {
    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Config::load_from_path(path)?
        }
        None => Config::load()?,
    };

    match config {
        Some(config) => {
            log::debug!("Loaded fence settings: {:?}", config.fences);
            Ok(config.fences)
        }
        None => Ok(FenceSettings::default()),
    }
}

fn collect_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    if paths.is_empty() {
        return Ok(vec![Source::Stdin]);
    }

    let mut sources = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            sources.push(Source::Stdin);
        } else if path.is_dir() {
            let files = io::scan_markdown_files(path)
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            sources.extend(files.into_iter().map(Source::File));
        } else {
            sources.push(Source::File(path.clone()));
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const NESTED: &str = "```markdown\nSome text\n```python\nprint(1)\n```\n```\n";
    const WIDENED: &str = "````markdown\nSome text\n```python\nprint(1)\n```\n````\n";
    const FLAT: &str = "```rust\nfn main() {}\n```\n";

    struct Harness {
        dir: TempDir,
        config: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let config = dir.path().join("config.toml");
            fs::write(&config, "").unwrap();
            Self { dir, config }
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            io::write_document(&path, content).unwrap();
            path
        }

        /// Runs the CLI with the harness config; returns (summary, stdout, stderr).
        fn run(&self, args: &[&str], stdin: &str) -> (Summary, String, String) {
            let mut argv = vec!["markdown-fences", "--config"];
            let config = self.config.to_string_lossy().to_string();
            argv.push(&config);
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).unwrap();

            let mut out = Vec::new();
            let mut err = Vec::new();
            let summary = run(&cli, &mut stdin.as_bytes(), &mut out, &mut err).unwrap();
            (
                summary,
                String::from_utf8(out).unwrap(),
                String::from_utf8(err).unwrap(),
            )
        }
    }

    #[test]
    fn test_stdin_is_normalized_to_stdout() {
        let harness = Harness::new();

        let (summary, out, _) = harness.run(&[], NESTED);

        assert_eq!(out, WIDENED);
        assert_eq!(summary.changed, vec!["<stdin>"]);
    }

    #[test]
    fn test_dash_reads_stdin() {
        let harness = Harness::new();

        let (_, out, _) = harness.run(&["-"], FLAT);

        assert_eq!(out, FLAT);
    }

    #[test]
    fn test_write_rewrites_only_changed_files() {
        let harness = Harness::new();
        let nested = harness.file("nested.md", NESTED);
        let flat = harness.file("flat.md", FLAT);
        let dir = harness.dir.path().to_string_lossy().to_string();

        let (summary, out, _) = harness.run(&["--write", &dir], "");

        assert_eq!(out, "");
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.changed, vec![nested.display().to_string()]);
        assert_eq!(fs::read_to_string(&nested).unwrap(), WIDENED);
        assert_eq!(fs::read_to_string(&flat).unwrap(), FLAT);
    }

    #[test]
    fn test_check_lists_files_without_writing() {
        let harness = Harness::new();
        let nested = harness.file("chats/nested.md", NESTED);
        harness.file("chats/flat.md", FLAT);
        let dir = harness.dir.path().to_string_lossy().to_string();

        let (summary, out, _) = harness.run(&["--check", &dir], "");

        assert_eq!(out, format!("{}\n", nested.display()));
        assert_eq!(summary.changed.len(), 1);
        assert_eq!(fs::read_to_string(&nested).unwrap(), NESTED);
    }

    #[test]
    fn test_explain_reports_one_based_lines() {
        let harness = Harness::new();

        let (_, _, err) = harness.run(&["--explain"], NESTED);

        assert_eq!(err, "<stdin>:1-6: markdown fence set to 4 backticks\n");
    }

    #[test]
    fn test_config_adds_container_language() {
        let harness = Harness::new();
        fs::write(&harness.config, "[fences]\ncontainer_languages = [\"gfm\"]\n").unwrap();
        let input = "```gfm\n```\nx\n```\n```\n";

        let (_, out, _) = harness.run(&[], input);

        assert_eq!(out, "````gfm\n```\nx\n```\n````\n");
    }

    #[test]
    fn test_write_and_check_conflict() {
        let result = Cli::try_parse_from(["markdown-fences", "--write", "--check"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["markdown-fences", "--config", "/no/such/config.toml"])
            .unwrap();

        let result = run(
            &cli,
            &mut "".as_bytes(),
            &mut Vec::<u8>::new(),
            &mut Vec::<u8>::new(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_input_file_is_an_error() {
        let harness = Harness::new();
        let missing = harness.dir.path().join("missing.md");
        let cli = Cli::try_parse_from([
            "markdown-fences".to_string(),
            "--config".to_string(),
            harness.config.to_string_lossy().to_string(),
            missing.to_string_lossy().to_string(),
        ])
        .unwrap();

        let err = run(
            &cli,
            &mut "".as_bytes(),
            &mut Vec::<u8>::new(),
            &mut Vec::<u8>::new(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_byte_order_mark_file_is_widened() {
        let harness = Harness::new();
        let path = harness.file("bom.md", "\u{feff}```markdown\n```py\nx = 1\n```\n```\n");
        let file = path.to_string_lossy().to_string();

        let (_, _, err) = harness.run(&["--write", "--explain", &file], "");

        assert_eq!(err, format!("{file}:1-5: markdown fence set to 4 backticks\n"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\u{feff}````markdown\n```py\nx = 1\n```\n````\n"
        );
    }

    #[test]
    fn test_crlf_file_is_left_byte_identical() {
        let harness = Harness::new();
        let content = "```markdown\r\n```python\r\nprint(1)\r\n```\r\n```\r\n";
        let path = harness.file("windows.md", content);
        let file = path.to_string_lossy().to_string();

        let (summary, _, _) = harness.run(&["--write", &file], "");

        assert!(summary.changed.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}

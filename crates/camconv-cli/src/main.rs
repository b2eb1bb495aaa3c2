use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use camconv_core::{
    AUTO_SOURCE, BatchOptions, BatchResult, ConfigurationError, ConversionRequest, Protocol,
    render_document,
};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CAMCONV_BUILD_COMMIT"),
    " ",
    env!("CAMCONV_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:
  camconv convert CCcam.cfg --from cccam --to oscam -o oscam.server
  cat newcamd.list | camconv convert - --from newcamd --to cccam
  cat mixed.cfg | camconv convert - --from auto --to oscam
  camconv batch 'configs/*.cfg' --from cccam --to mgcamd --out-dir out";

#[derive(Parser, Debug)]
#[command(name = "camconv")]
#[command(version = VERSION)]
#[command(
    about = "Offline converter for card-sharing client configurations \
             (CCcam / NewCamd / MGcamd / OSCam).",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one configuration file (or stdin) into another protocol.
    Convert(ConvertArgs),
    /// Convert every file matching a glob pattern into an output directory.
    Batch(BatchArgs),
    /// List supported protocols.
    Protocols,
}

#[derive(Args, Debug)]
struct ProtocolPair {
    /// Source protocol: cccam, newcamd, mgcamd, oscam, or auto to detect each record
    #[arg(long, value_name = "PROTOCOL")]
    from: String,

    /// Target protocol: cccam, newcamd, mgcamd or oscam
    #[arg(long, value_name = "PROTOCOL")]
    to: String,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input file, glob pattern matching one file, or `-` for stdin
    #[arg(value_name = "INPUT|-")]
    input: PathBuf,

    #[command(flatten)]
    protocols: ProtocolPair,

    /// Output file path
    #[arg(short = 'o', long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the result to stdout (default without -o)
    #[arg(long)]
    stdout: bool,

    /// Emit the per-record batch result as JSON instead of a config document
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (implies --json)
    #[arg(long)]
    compact: bool,

    /// Omit the `# Generated:` header line
    #[arg(long)]
    no_timestamp: bool,

    /// Suppress the summary and warnings
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any record failed to convert
    #[arg(long)]
    strict: bool,

    /// Convert records one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Glob pattern selecting input files (quote it to bypass the shell)
    pattern: String,

    #[command(flatten)]
    protocols: ProtocolPair,

    /// Directory receiving `<stem>.<ext>` outputs
    #[arg(long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Omit the `# Generated:` header line
    #[arg(long)]
    no_timestamp: bool,

    /// Suppress the per-file summary and warnings
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any record failed to convert
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => cmd_convert(args),
        Commands::Batch(args) => cmd_batch(args),
        Commands::Protocols => {
            cmd_protocols();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<ConfigurationError> for CliError {
    fn from(err: ConfigurationError) -> Self {
        let names = Protocol::ALL.map(Protocol::id).join(", ");
        CliError::new(
            err.to_string(),
            Some(format!(
                "choose one of: {names} (see `camconv protocols`); \
                 --from also accepts {AUTO_SOURCE}"
            )),
        )
    }
}

fn cmd_convert(args: ConvertArgs) -> Result<(), CliError> {
    let request = ConversionRequest::new(&args.protocols.from, &args.protocols.to)?;
    debug!(source = ?request.source, target = %request.target, "protocols resolved");
    let (text, input_path) = read_input(&args.input)?;
    if let (Some(output), Some(input)) = (args.output.as_ref(), input_path.as_ref()) {
        ensure_output_differs(input, output)?;
    }

    let options = BatchOptions {
        parallel: !args.sequential,
    };
    let batch = request.convert_batch_with(&text, &options);
    debug!(
        succeeded = batch.succeeded,
        failed = batch.failed,
        "conversion finished"
    );

    let rendered = if args.json || args.pretty || args.compact {
        serialize_batch(&batch, args.pretty)?
    } else {
        let generated_at = generated_at(args.no_timestamp);
        render_document(&batch, generated_at.as_deref())
    };

    report_issues(None, &batch, args.quiet);
    match args.output.as_ref().filter(|_| !args.stdout) {
        Some(output) => {
            write_output(output, &rendered)?;
            if !args.quiet {
                eprintln!(
                    "OK: {} converted, {} failed -> {}",
                    batch.succeeded,
                    batch.failed,
                    output.display()
                );
            }
        }
        None => {
            print!("{}", rendered);
            if !args.quiet {
                eprintln!("OK: {} converted, {} failed", batch.succeeded, batch.failed);
            }
        }
    }

    if args.strict && batch.failed > 0 {
        return Err(strict_failure(batch.failed, batch.len()));
    }
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> Result<(), CliError> {
    let request = ConversionRequest::new(&args.protocols.from, &args.protocols.to)?;
    let inputs = resolve_pattern(&args.pattern)?;
    let outputs = output_paths(&inputs, &args.out_dir, request.target)?;

    fs::create_dir_all(&args.out_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.out_dir.display()
        )
    })?;

    let generated_at = generated_at(args.no_timestamp);
    let mut failed = 0;
    let mut total = 0;
    for (input, output) in inputs.iter().zip(&outputs) {
        ensure_output_differs(input, output)?;
        let text = fs::read_to_string(input)
            .with_context(|| format!("Failed to read input file: {}", input.display()))?;
        let batch = request.convert_batch(&text);
        let rendered = render_document(&batch, generated_at.as_deref());
        write_output(output, &rendered)?;
        info!(input = %input.display(), output = %output.display(), "file converted");

        report_issues(Some(input.as_path()), &batch, args.quiet);
        if !args.quiet {
            eprintln!(
                "OK: {} -> {} ({} converted, {} failed)",
                input.display(),
                output.display(),
                batch.succeeded,
                batch.failed
            );
        }
        failed += batch.failed;
        total += batch.len();
    }

    if args.strict && failed > 0 {
        return Err(strict_failure(failed, total));
    }
    Ok(())
}

fn cmd_protocols() {
    println!("{:<9} {:<9} {:<6} extension", "protocol", "keyword", "port");
    for protocol in Protocol::ALL {
        let keyword = protocol
            .keyword()
            .map(|keyword| format!("{keyword}:"))
            .unwrap_or_else(|| "[reader]".to_string());
        println!(
            "{:<9} {:<9} {:<6} .{}",
            protocol.id(),
            keyword,
            protocol.default_port(),
            protocol.file_extension()
        );
    }
}

fn strict_failure(failed: usize, total: usize) -> CliError {
    CliError::new(
        format!("{failed} of {total} records failed to convert"),
        Some("fix the listed lines or drop --strict".to_string()),
    )
}

fn generated_at(no_timestamp: bool) -> Option<String> {
    if no_timestamp {
        return None;
    }
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

fn serialize_batch(batch: &BatchResult, pretty: bool) -> Result<String, CliError> {
    let mut json = if pretty {
        serde_json::to_string_pretty(batch).context("JSON serialization failed")?
    } else {
        serde_json::to_string(batch).context("JSON serialization failed")?
    };
    json.push('\n');
    Ok(json)
}

fn report_issues(input: Option<&Path>, batch: &BatchResult, quiet: bool) {
    let prefix = input
        .map(|path| format!("{}: ", path.display()))
        .unwrap_or_default();
    for (line, err) in batch.errors() {
        eprintln!("{prefix}line {}: {}", err.line.unwrap_or(line), err);
    }
    if quiet {
        return;
    }
    for (line, issue) in batch.warnings() {
        eprintln!("{prefix}line {line}: {issue}");
    }
}

/// Read `-` from stdin, anything else as a (possibly glob) file path.
fn read_input(input: &Path) -> Result<(String, Option<PathBuf>), CliError> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok((text, None));
    }

    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved)?;
    let text = fs::read_to_string(&resolved)
        .with_context(|| format!("Failed to read input file: {}", resolved.display()))?;
    Ok((text, Some(resolved)))
}

fn write_output(output: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(output, contents)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    Ok(())
}

fn ensure_output_differs(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Ok(output_abs) = fs::canonicalize(output) else {
        // Output does not exist yet, so it cannot be the input.
        return Ok(());
    };
    if output_abs == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn output_paths(
    inputs: &[PathBuf],
    out_dir: &Path,
    target: Protocol,
) -> Result<Vec<PathBuf>, CliError> {
    let mut seen = HashSet::new();
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = input.file_stem().ok_or_else(|| {
            CliError::new(
                format!("input has no file name: {}", input.display()),
                None,
            )
        })?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(target.file_extension());
        let output = out_dir.join(name);
        if !seen.insert(output.clone()) {
            return Err(CliError::new(
                format!(
                    "several inputs map to the same output: {}",
                    output.display()
                ),
                Some("narrow the pattern or rename inputs with equal stems".to_string()),
            ));
        }
        outputs.push(output);
    }
    Ok(outputs)
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a configuration file, or `-` to read stdin".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a configuration file, or `-` to read stdin".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = resolve_pattern(&pattern)?;
    if matches.len() > 1 {
        let hint = "pass a single file, or use `camconv batch` for several".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

/// Every regular file matching `pattern`, in glob order. Never empty.
fn resolve_pattern(pattern: &str) -> Result<Vec<PathBuf>, CliError> {
    let paths = glob(pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

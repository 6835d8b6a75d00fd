//! Alarm Health Core - analytics engine CLI
//!
//! The main entry point for ah-core, handling:
//! - Record ingestion from files or stdin
//! - Observation window selection and Top-K charting
//! - Risk scoring, flood detection and bad actor ranking
//! - Configuration inspection and JSON Schema output

use std::path::PathBuf;

use ah_common::{
    ingest, ActivationRecord, Error, OutputFormat, RawActivationRecord, StructuredError,
    SCHEMA_VERSION,
};
use ah_config::{
    list_presets, load_config, load_config_from_file, validate_config, ConfigError,
    ConfigOptions, EngineConfig, PresetName, ResolvedConfig,
};
use ah_core::bad_actor;
use ah_core::cli::{BadActorArgs, FloodArgs, InputArgs, RiskArgs, TopKArgs, WindowArgs};
use ah_core::engine::{self, AnalyticsReport};
use ah_core::exit_codes::ExitCode;
use ah_core::flood::{self, FloodParams, FloodSummary};
use ah_core::input::load_items;
use ah_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel,
    Stage,
};
use ah_core::output;
use ah_core::risk::{self, RiskInput};
use ah_core::schema::{
    available_schemas, format_schema, generate_all_schemas, generate_schema, SchemaFormat,
};
use ah_core::unhealthy::SourceWindow;
use ah_core::window;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info_span;

/// Alarm Health Core - alarm activation analytics
#[derive(Parser)]
#[command(name = "ah-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

fn parse_preset(s: &str) -> Result<PresetName, String> {
    PresetName::parse(s).ok_or_else(|| {
        let names: Vec<&str> = PresetName::ALL.iter().map(|p| p.as_str()).collect();
        format!("unknown preset '{s}' (available: {})", names.join(", "))
    })
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Engine config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named configuration preset
    #[arg(long, global = true, value_parser = parse_preset)]
    preset: Option<PresetName>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Diagnostic log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print a report
    Analyze(AnalyzeArgs),

    /// Show the selected observation window
    Window(WindowCmdArgs),

    /// Group records into Top-K chart rows
    Aggregate(AggregateArgs),

    /// Rank entities by composite risk
    Risk(RiskCmdArgs),

    /// Detect multi-source flood windows
    Floods(FloodsCmdArgs),

    /// Rank sources by flood contribution
    BadActors(BadActorsCmdArgs),

    /// Print JSON Schemas for input and output types
    Schema(SchemaArgs),

    /// Inspect and validate configuration
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    top_k: TopKArgs,
    #[command(flatten)]
    risk: RiskArgs,
    #[command(flatten)]
    flood: FloodArgs,
    #[command(flatten)]
    bad_actor: BadActorArgs,
}

#[derive(Args, Debug)]
struct WindowCmdArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Args, Debug)]
struct AggregateArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    top_k: TopKArgs,
}

#[derive(Args, Debug)]
struct RiskCmdArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    risk: RiskArgs,

    /// Pre-computed entities ({key, frequencyCount, severitySum}) instead of records
    #[arg(long, conflicts_with = "input")]
    entities: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FloodsCmdArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    flood: FloodArgs,

    /// Pre-computed unhealthy source windows instead of records
    #[arg(long, conflicts_with = "input")]
    windows: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BadActorsCmdArgs {
    #[command(flatten)]
    floods: FloodsCmdArgs,
    #[command(flatten)]
    bad_actor: BadActorArgs,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name to generate schema for
    #[arg(value_name = "TYPE")]
    type_name: Option<String>,

    /// List available types
    #[arg(long, conflicts_with_all = ["type_name", "all"])]
    list: bool,

    /// Generate schemas for all types
    #[arg(long)]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
    /// Validate a config file (or the resolved configuration)
    Validate {
        /// File to validate
        path: Option<PathBuf>,
    },
    /// List available presets
    Presets,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Analyze(_) => "analyze",
            Commands::Window(_) => "window",
            Commands::Aggregate(_) => "aggregate",
            Commands::Risk(_) => "risk",
            Commands::Floods(_) => "floods",
            Commands::BadActors(_) => "bad-actors",
            Commands::Schema(_) => "schema",
            Commands::Config(_) => "config",
            Commands::Version => "version",
        }
    }
}

/// A failed command: the exit code plus the error reported on stderr.
struct CliFailure {
    code: ExitCode,
    error: Error,
}

impl CliFailure {
    fn new(code: ExitCode, error: impl Into<Error>) -> Self {
        Self {
            code,
            error: error.into(),
        }
    }
}

impl From<Error> for CliFailure {
    fn from(error: Error) -> Self {
        Self {
            code: ExitCode::from_error(&error),
            error,
        }
    }
}

impl From<ConfigError> for CliFailure {
    fn from(error: ConfigError) -> Self {
        let code = match error {
            ConfigError::NotFound { .. } => ExitCode::ArgsError,
            ConfigError::IoError { .. } => ExitCode::IoError,
            _ => ExitCode::ConfigError,
        };
        Self::new(code, error)
    }
}

type CliResult<T> = Result<T, CliFailure>;

/// Our own payloads failing to serialize is a bug, not bad input.
fn internal(error: impl Into<Error>) -> CliFailure {
    CliFailure::new(ExitCode::InternalError, error)
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let run_id = generate_run_id();
    let ctx = LogContext::new(run_id.clone());
    let span = info_span!("run", run_id = %run_id);
    let _run = span.enter();

    ctx.info(event_names::RUN_STARTED, Stage::Init, "run started")
        .with_field("command", cli.command.name())
        .emit();

    let exit_code = match run(&cli, &ctx) {
        Ok(code) => code,
        Err(failure) => report_failure(&cli.global, &ctx, &failure),
    };

    ctx.info(event_names::RUN_FINISHED, Stage::Output, "run finished")
        .with_field("exit_code", exit_code.as_i32())
        .with_field("exit_name", exit_code.code_name())
        .emit();

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, ctx: &LogContext) -> CliResult<ExitCode> {
    let global = &cli.global;
    match &cli.command {
        Commands::Analyze(args) => run_analyze(global, ctx, args),
        Commands::Window(args) => run_window(global, ctx, args),
        Commands::Aggregate(args) => run_aggregate(global, ctx, args),
        Commands::Risk(args) => run_risk(global, ctx, args),
        Commands::Floods(args) => run_floods(global, ctx, args),
        Commands::BadActors(args) => run_bad_actors(global, ctx, args),
        Commands::Schema(args) => run_schema(args),
        Commands::Config(args) => run_config(global, ctx, args),
        Commands::Version => {
            print_version(global);
            Ok(ExitCode::Clean)
        }
    }
}

/// Print a structured error on stderr and pick the exit code.
fn report_failure(global: &GlobalOpts, ctx: &LogContext, failure: &CliFailure) -> ExitCode {
    let structured =
        StructuredError::from(&failure.error).with_context("exit_code", failure.code.as_i32());
    let event = match failure.code {
        ExitCode::ConfigError => event_names::CONFIG_ERROR,
        ExitCode::InputError | ExitCode::IoError => event_names::INGEST_ERROR,
        _ => event_names::INTERNAL_ERROR,
    };
    ctx.error(event, Stage::Init, failure.error.to_string())
        .with_field("code", structured.code)
        .emit();

    if global.format.is_machine_readable() {
        eprintln!("{}", structured.to_json());
    } else {
        eprintln!("error[{}]: {}", structured.code, structured.message);
        eprintln!("hint: {}", structured.remediation);
    }
    failure.code
}

// ============================================================================
// Configuration
// ============================================================================

fn resolve_config(global: &GlobalOpts, ctx: &LogContext) -> CliResult<ResolvedConfig> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
        preset: global.preset,
    };
    let resolved = load_config(&options)?;

    let snapshot = resolved.snapshot();
    let event = match resolved.path {
        Some(_) => event_names::CONFIG_LOADED,
        None => event_names::CONFIG_DEFAULT_USED,
    };
    ctx.info(event, Stage::Init, format!("config from {}", resolved.source))
        .with_field("config_id", snapshot.short_id())
        .with_field("path", &snapshot.path)
        .emit();
    Ok(resolved)
}

/// Resolve configuration and apply command-line overrides.
///
/// Overrides are validated again; a bad flag value is an argument error.
fn effective_config(
    global: &GlobalOpts,
    ctx: &LogContext,
    apply: impl FnOnce(&mut EngineConfig) -> ah_common::Result<()>,
) -> CliResult<(EngineConfig, String)> {
    let resolved = resolve_config(global, ctx)?;
    let config_id = resolved.snapshot().short_id();
    let mut config = resolved.config;
    apply(&mut config).map_err(|e| CliFailure::new(ExitCode::ArgsError, e))?;
    validate_config(&config).map_err(|e| CliFailure::new(ExitCode::ArgsError, e))?;
    Ok((config, config_id))
}

// ============================================================================
// Input
// ============================================================================

fn load_records(ctx: &LogContext, args: &InputArgs) -> CliResult<Vec<ActivationRecord>> {
    let raws: Vec<RawActivationRecord> = load_items(args.input.as_deref())?;
    let (records, stats) = ingest(raws);
    ctx.info(event_names::INGEST_FINISHED, Stage::Ingest, "records ingested")
        .with_field("total", stats.total)
        .with_field("without_timestamp", stats.without_timestamp)
        .emit();
    Ok(records)
}

/// Exit code for a command whose result may be empty.
fn data_exit(has_data: bool) -> ExitCode {
    if has_data {
        ExitCode::Clean
    } else {
        ExitCode::NoData
    }
}

// ============================================================================
// Output
// ============================================================================

/// Write a payload to stdout in the requested format.
fn emit<T: Serialize + ?Sized>(
    global: &GlobalOpts,
    ctx: &LogContext,
    value: &T,
    markdown: impl FnOnce() -> String,
    summary: impl FnOnce() -> String,
) -> CliResult<()> {
    let text = match global.format {
        OutputFormat::Json => output::to_json(value).map_err(internal)?,
        OutputFormat::Jsonl => serde_json::to_string(value).map_err(internal)?,
        OutputFormat::Md => markdown(),
        OutputFormat::Summary => summary(),
    };
    println!("{}", text.trim_end());
    ctx.debug(event_names::OUTPUT_WRITTEN, Stage::Output, "payload written")
        .with_field("bytes", text.len())
        .emit();
    Ok(())
}

/// Like [`emit`], but JSONL writes one line per item.
fn emit_list<T: Serialize>(
    global: &GlobalOpts,
    ctx: &LogContext,
    items: &[T],
    markdown: impl FnOnce() -> String,
    summary: impl FnOnce() -> String,
) -> CliResult<()> {
    if global.format == OutputFormat::Jsonl {
        let text = output::to_jsonl(items).map_err(internal)?;
        print!("{text}");
        ctx.debug(event_names::OUTPUT_WRITTEN, Stage::Output, "payload written")
            .with_field("items", items.len())
            .emit();
        return Ok(());
    }
    emit(global, ctx, items, markdown, summary)
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_analyze(global: &GlobalOpts, ctx: &LogContext, args: &AnalyzeArgs) -> CliResult<ExitCode> {
    let (config, config_id) = effective_config(global, ctx, |config| {
        args.window.apply(config)?;
        args.top_k.apply(config);
        args.risk.apply(config);
        args.flood.apply(config);
        args.bad_actor.apply(config);
        Ok(())
    })?;
    let records = load_records(ctx, &args.input)?;

    let report: AnalyticsReport = engine::analyze(&records, &config).with_config_id(config_id);
    log_report(ctx, &report);

    emit(
        global,
        ctx,
        &report,
        || output::report_markdown(&report),
        || output::report_summary(&report),
    )?;

    Ok(if report.is_empty() {
        ExitCode::NoData
    } else if report.has_floods() {
        ExitCode::FloodsDetected
    } else {
        ExitCode::Clean
    })
}

fn log_report(ctx: &LogContext, report: &AnalyticsReport) {
    match report.window {
        Some(range) => ctx
            .debug(event_names::WINDOW_SELECTED, Stage::Window, "window selected")
            .with_field("start", range.start)
            .with_field("end", range.end)
            .emit(),
        None => ctx
            .debug(event_names::WINDOW_NONE, Stage::Window, "no window applied")
            .emit(),
    }
    ctx.info(event_names::AGGREGATE_FINISHED, Stage::Aggregate, "chart rows built")
        .with_field("rows", report.chart.rows.len())
        .with_field("records_in_window", report.records_in_window)
        .emit();
    ctx.info(event_names::SCORE_FINISHED, Stage::Score, "risk scored")
        .with_field("entities", report.risk.len())
        .emit();
    ctx.info(event_names::FLOOD_DETECTED, Stage::Flood, "flood detection finished")
        .with_field("unhealthy_periods", report.unhealthy_periods)
        .with_field("floods", report.floods.len())
        .emit();
    ctx.info(event_names::RANK_FINISHED, Stage::Rank, "bad actors ranked")
        .with_field("bad_actors", report.bad_actors.len())
        .emit();
}

#[derive(Serialize)]
struct WindowPayload {
    schema_version: &'static str,
    window_mode: &'static str,
    window: Option<ah_common::TimeRange>,
    ingest: ah_common::IngestStats,
    records_in_window: usize,
}

fn run_window(global: &GlobalOpts, ctx: &LogContext, args: &WindowCmdArgs) -> CliResult<ExitCode> {
    let (config, _) = effective_config(global, ctx, |config| args.window.apply(config))?;
    let records = load_records(ctx, &args.input)?;

    let selected = engine::select_window(&records, &config.window);
    let payload = WindowPayload {
        schema_version: SCHEMA_VERSION,
        window_mode: config.window.mode.as_str(),
        window: selected,
        ingest: engine::stats_for(&records),
        records_in_window: window::filter_records(&records, selected.as_ref()).len(),
    };
    let line = format!(
        "window={} range={} records_in_window={}",
        payload.window_mode,
        selected.map_or_else(
            || "none".to_string(),
            |r| format!("{}..{}", r.start, r.end)
        ),
        payload.records_in_window
    );
    let markdown = || format!("# Observation Window\n\n{line}\n");
    emit(global, ctx, &payload, markdown, || line.clone())?;
    Ok(data_exit(!records.is_empty()))
}

fn run_aggregate(global: &GlobalOpts, ctx: &LogContext, args: &AggregateArgs) -> CliResult<ExitCode> {
    let (config, _) = effective_config(global, ctx, |config| {
        args.window.apply(config)?;
        args.top_k.apply(config);
        Ok(())
    })?;
    let records = load_records(ctx, &args.input)?;

    let selected = engine::select_window(&records, &config.window);
    let in_window = window::filter_records(&records, selected.as_ref());
    let reduction = engine::top_k(&in_window, &config.top_k);
    let result = &reduction.result;
    let group_field = config.top_k.group_by.field_name();
    let markdown = output::topk_markdown(result, &group_field);
    let summary = format!(
        "rows={} inner_keys={} remainder_groups={}",
        result.rows.len(),
        result.inner_keys.len(),
        result.remainder.as_ref().map_or(0, |r| r.groups)
    );
    let has_rows = !result.rows.is_empty();
    let section = engine::chart_section(reduction, &config.top_k, config.severity.percentile);

    ctx.info(event_names::AGGREGATE_FINISHED, Stage::Aggregate, "chart rows built")
        .with_field("rows", section.rows.len())
        .emit();
    emit(global, ctx, &section, || markdown, || summary)?;
    Ok(data_exit(has_rows))
}

fn run_risk(global: &GlobalOpts, ctx: &LogContext, args: &RiskCmdArgs) -> CliResult<ExitCode> {
    let (config, _) = effective_config(global, ctx, |config| {
        args.window.apply(config)?;
        args.risk.apply(config);
        Ok(())
    })?;

    let ranked = match &args.entities {
        Some(path) => {
            let entities: Vec<RiskInput> = load_items(Some(path.as_path()))?;
            risk::score(
                &entities,
                config.risk.weights,
                config.risk.limit,
                &config.risk.magnitude,
            )
        }
        None => {
            let records = load_records(ctx, &args.input)?;
            let selected = engine::select_window(&records, &config.window);
            let in_window = window::filter_records(&records, selected.as_ref());
            engine::risk_ranking(&in_window, &config.risk)
        }
    };

    ctx.info(event_names::SCORE_FINISHED, Stage::Score, "risk scored")
        .with_field("entities", ranked.len())
        .emit();
    let summary = format!(
        "entities={} top={}",
        ranked.len(),
        ranked.first().map_or("-", |e| e.key.as_str())
    );
    emit_list(global, ctx, &ranked, || output::risk_markdown(&ranked), || summary)?;
    Ok(data_exit(!ranked.is_empty()))
}

/// Flood windows for a floods/bad-actors invocation, plus the observed range.
fn detect_floods(
    ctx: &LogContext,
    args: &FloodsCmdArgs,
    config: &EngineConfig,
) -> CliResult<(Vec<flood::FloodWindow>, Option<ah_common::TimeRange>, bool)> {
    let (floods, selected, has_data) = match &args.windows {
        Some(path) => {
            let periods: Vec<SourceWindow> = load_items(Some(path.as_path()))?;
            let selected = engine::select_window(&[], &config.window);
            let mut floods = flood::detect(&periods, FloodParams::from(&config.flood));
            if let (true, Some(range)) = (config.flood.filter_to_window, selected.as_ref()) {
                floods = flood::filter_by_range(floods, range.start, range.end);
            }
            (floods, selected, !periods.is_empty())
        }
        None => {
            let records = load_records(ctx, &args.input)?;
            let selected = engine::select_window(&records, &config.window);
            let (_, floods) = engine::flood_analysis(&records, &config.flood, selected.as_ref());
            (floods, selected, !records.is_empty())
        }
    };
    ctx.info(event_names::FLOOD_DETECTED, Stage::Flood, "flood detection finished")
        .with_field("floods", floods.len())
        .emit();
    Ok((floods, selected, has_data))
}

fn flood_exit(has_data: bool, flood_count: usize) -> ExitCode {
    if !has_data {
        ExitCode::NoData
    } else if flood_count > 0 {
        ExitCode::FloodsDetected
    } else {
        ExitCode::Clean
    }
}

#[derive(Serialize)]
struct FloodsPayload<'a> {
    schema_version: &'static str,
    window: Option<ah_common::TimeRange>,
    summary: &'a FloodSummary,
    floods: &'a [flood::FloodWindow],
}

fn run_floods(global: &GlobalOpts, ctx: &LogContext, args: &FloodsCmdArgs) -> CliResult<ExitCode> {
    let (config, _) = effective_config(global, ctx, |config| {
        args.window.apply(config)?;
        args.flood.apply(config);
        Ok(())
    })?;
    let (floods, selected, has_data) = detect_floods(ctx, args, &config)?;
    let summary = FloodSummary::from_windows(&floods, selected.as_ref());

    if global.format == OutputFormat::Jsonl {
        emit_list(global, ctx, &floods, String::new, String::new)?;
    } else {
        let payload = FloodsPayload {
            schema_version: SCHEMA_VERSION,
            window: selected,
            summary: &summary,
            floods: &floods,
        };
        let line = format!(
            "floods={} activations={} sources={} peak_rate_per_min={:.2}",
            summary.window_count,
            summary.total_activations,
            summary.distinct_sources,
            summary.peak_rate_per_min
        );
        emit(global, ctx, &payload, || output::floods_markdown(&floods), || line)?;
    }
    Ok(flood_exit(has_data, floods.len()))
}

fn run_bad_actors(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &BadActorsCmdArgs,
) -> CliResult<ExitCode> {
    let (config, _) = effective_config(global, ctx, |config| {
        args.floods.window.apply(config)?;
        args.floods.flood.apply(config);
        args.bad_actor.apply(config);
        Ok(())
    })?;
    let (floods, _, has_data) = detect_floods(ctx, &args.floods, &config)?;
    let actors = bad_actor::rank(
        &floods,
        config.bad_actor.include_system,
        config.bad_actor.limit,
    );

    ctx.info(event_names::RANK_FINISHED, Stage::Rank, "bad actors ranked")
        .with_field("bad_actors", actors.len())
        .emit();
    let summary = format!(
        "bad_actors={} top={}",
        actors.len(),
        actors.first().map_or("-", |a| a.source.as_str())
    );
    emit_list(global, ctx, &actors, || output::bad_actors_markdown(&actors), || summary)?;
    Ok(flood_exit(has_data, floods.len()))
}

fn run_schema(args: &SchemaArgs) -> CliResult<ExitCode> {
    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };

    if args.list {
        for (name, description) in available_schemas() {
            println!("{name:<22} {description}");
        }
        return Ok(ExitCode::Clean);
    }

    if args.all {
        let schemas = serde_json::to_value(generate_all_schemas()).map_err(Error::from)?;
        println!("{}", format_schema(&schemas, format));
        return Ok(ExitCode::Clean);
    }

    let Some(type_name) = &args.type_name else {
        return Err(CliFailure::new(
            ExitCode::ArgsError,
            Error::InvalidParameter {
                field: "TYPE".to_string(),
                message: "give a type name, --list or --all".to_string(),
            },
        ));
    };
    match generate_schema(type_name) {
        Some(schema) => {
            println!("{}", format_schema(&schema, format));
            Ok(ExitCode::Clean)
        }
        None => Err(CliFailure::new(
            ExitCode::ArgsError,
            Error::InvalidParameter {
                field: "TYPE".to_string(),
                message: format!("unknown type '{type_name}'; see 'schema --list'"),
            },
        )),
    }
}

fn run_config(global: &GlobalOpts, ctx: &LogContext, args: &ConfigArgs) -> CliResult<ExitCode> {
    match &args.command {
        ConfigCommands::Show => run_config_show(global, ctx),
        ConfigCommands::Validate { path } => run_config_validate(global, ctx, path.as_ref()),
        ConfigCommands::Presets => {
            let presets = list_presets();
            let markdown = || {
                let mut out = String::from("# Presets\n\n| Name | Description |\n|---|---|\n");
                for p in &presets {
                    out.push_str(&format!("| {} | {} |\n", p.name, p.description));
                }
                out
            };
            let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
            let summary = format!("presets: {}", names.join(", "));
            emit_list(global, ctx, &presets, markdown, || summary)?;
            Ok(ExitCode::Clean)
        }
    }
}

fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> CliResult<ExitCode> {
    let resolved = resolve_config(global, ctx)?;
    let snapshot = resolved.snapshot();
    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "source": snapshot.source,
        "path": snapshot.path,
        "config_id": snapshot.short_id(),
        "config": resolved.config,
    });
    let summary = format!(
        "config {} from {}{}",
        snapshot.short_id(),
        snapshot.source,
        snapshot
            .path
            .as_deref()
            .map(|p| format!(" ({p})"))
            .unwrap_or_default()
    );
    let markdown = || {
        let body = serde_json::to_string_pretty(&resolved.config).unwrap_or_default();
        format!("# Effective Configuration\n\n{summary}\n\n```json\n{body}\n```\n")
    };
    emit(global, ctx, &response, markdown, || summary.clone())?;
    Ok(ExitCode::Clean)
}

fn run_config_validate(
    global: &GlobalOpts,
    ctx: &LogContext,
    path: Option<&PathBuf>,
) -> CliResult<ExitCode> {
    let (source, config_hash) = match path {
        Some(p) => {
            let (_, hash) = load_config_from_file(p)?;
            (p.display().to_string(), hash)
        }
        None => {
            let resolved = resolve_config(global, ctx)?;
            let snapshot = resolved.snapshot();
            let source = snapshot.path.clone().unwrap_or_else(|| resolved.source.to_string());
            (source, snapshot.config_hash)
        }
    };
    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "status": "valid",
        "source": source,
        "config_hash": config_hash,
    });
    let line = format!("config validate: OK ({source})");
    let markdown = || format!("# Configuration Validation\n\nStatus: valid\n\nSource: {source}\n");
    emit(global, ctx, &response, markdown, || line.clone())?;
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    let version = env!("CARGO_PKG_VERSION");
    if global.format.is_machine_readable() {
        let info = serde_json::json!({
            "name": "ah-core",
            "version": version,
            "schema_version": SCHEMA_VERSION,
            "config_schema_version": ah_config::CONFIG_SCHEMA_VERSION,
        });
        println!("{info}");
    } else {
        println!("ah-core {version} (schema {SCHEMA_VERSION})");
    }
}

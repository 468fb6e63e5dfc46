//! workflow-tool: create, validate, lay out and export workflow payload files

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use workflow_editor::{EditorConfig, EditorSession, NullEventSink, SaveOutcome};
use workflow_graph::{
    deserialize, recompute_layout_with, serialize, validate_workflow, LayoutKind, SaveIntent,
    ValidationFeedback, ValidationMode, ValidationResult, Workflow, WorkflowPayload,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Work with visual workflow payload files
#[derive(Parser, Debug)]
#[command(name = "workflow-tool", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a workflow holding only the Start node
    New {
        /// Workflow name (defaults to the configured name)
        #[arg(short, long)]
        name: Option<String>,

        /// Editor configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a workflow payload; exits non-zero when there are errors
    Validate {
        file: PathBuf,

        /// save or publish
        #[arg(short, long, default_value = "save")]
        mode: ValidationMode,
    },

    /// Recompute node positions
    Layout {
        file: PathBuf,

        /// compact or grid (defaults to the configured strategy)
        #[arg(short, long)]
        strategy: Option<LayoutKind>,

        /// Editor configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate and write a draft or published payload
    Export {
        file: PathBuf,

        /// Validate in publish mode and stamp the payload as published
        #[arg(long)]
        publish: bool,

        /// Editor configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::New {
            name,
            config,
            output,
        } => cmd_new(name, config.as_deref(), output.as_deref()),
        Commands::Validate { file, mode } => cmd_validate(&file, mode),
        Commands::Layout {
            file,
            strategy,
            config,
            output,
        } => cmd_layout(&file, strategy, config.as_deref(), output.as_deref()),
        Commands::Export {
            file,
            publish,
            config,
            output,
        } => cmd_export(&file, publish, config.as_deref(), output.as_deref()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_new(name: Option<String>, config: Option<&Path>, output: Option<&Path>) -> CliResult<bool> {
    let sink = Arc::new(NullEventSink);
    let mut session = match config {
        Some(path) => EditorSession::from_config_file(path, sink)?,
        None => EditorSession::new(EditorConfig::default(), sink),
    };
    if let Some(name) = name {
        session.set_name(name)?;
    }

    let workflow = session.workflow();
    write_payload(&serialize(workflow, SaveIntent::Draft), output)?;
    log::info!("Created workflow '{}'", workflow.name);
    Ok(true)
}

fn cmd_validate(file: &Path, mode: ValidationMode) -> CliResult<bool> {
    let workflow = read_workflow(file)?;
    let result = validate_workflow(&workflow, mode);
    print_report(&result);
    Ok(result.is_valid)
}

fn cmd_layout(
    file: &Path,
    strategy: Option<LayoutKind>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> CliResult<bool> {
    let config = load_config(config)?;
    let strategy = strategy.unwrap_or(config.layout_strategy);

    let payload = read_payload(file)?;
    let intent = if payload.is_published() {
        SaveIntent::Publish
    } else {
        SaveIntent::Draft
    };
    let workflow = deserialize(payload)?;
    let laid_out = recompute_layout_with(&workflow, strategy.strategy(), &config.layout);

    write_payload(&serialize(&laid_out, intent), output)?;
    log::info!("Applied {:?} layout to {} nodes", strategy, laid_out.node_count());
    Ok(true)
}

fn cmd_export(
    file: &Path,
    publish: bool,
    config: Option<&Path>,
    output: Option<&Path>,
) -> CliResult<bool> {
    let config = load_config(config)?;
    let contents = fs::read_to_string(file)?;
    let mut session = EditorSession::open_json(&contents, config, Arc::new(NullEventSink))?;
    let outcome = if publish {
        session.publish()?
    } else {
        session.save_draft()?
    };

    match outcome {
        SaveOutcome::Saved(payload) => {
            write_payload(&payload, output)?;
            Ok(true)
        }
        SaveOutcome::Blocked(result) => {
            print_report(&result);
            Ok(false)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<EditorConfig> {
    Ok(match path {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    })
}

fn read_payload(file: &Path) -> CliResult<WorkflowPayload> {
    let contents = fs::read_to_string(file)?;
    Ok(WorkflowPayload::from_json(&contents)?)
}

fn read_workflow(file: &Path) -> CliResult<Workflow> {
    Ok(deserialize(read_payload(file)?)?)
}

fn write_payload(payload: &WorkflowPayload, output: Option<&Path>) -> CliResult<()> {
    let json = payload.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("Wrote {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_report(result: &ValidationResult) {
    let feedback = ValidationFeedback::new(result);
    for group in feedback.groups() {
        println!("{}", group.node_name);
        for issue in group.errors.iter().chain(group.warnings.iter()) {
            println!("  {:?} {}", issue.severity, issue);
        }
    }

    if result.is_valid {
        println!("Valid ({} warnings)", result.warnings.len());
    } else {
        println!(
            "Invalid: {} errors, {} warnings",
            result.errors.len(),
            result.warnings.len()
        );
    }
}

mod config;
mod init;
mod trace;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fp_api::{
    HttpLocationRegistry, HttpObjectStore, LocationRegistry, LocationUploader, MemoryObjectStore,
};
use fp_codec::ExportFormat;
use fp_editor::{NavigationStore, ToolbarAction, UploadQueue};
use fp_models::MappingDocument;
use miette::{Context, IntoDiagnostic, Result};
use tracing::{error, info, info_span};
use uuid::Uuid;

use config::FloorplanConfig;

#[derive(Debug, Parser)]
#[command(name = "floorplan", version, about = "Export and publish floor-plan mappings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Converts a mapping document to the given format.
    Export {
        /// Mapping document, its format is guessed from the extension.
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        format: ExportFormat,
        /// Directory receiving `floor-plan-mapping.<format>`.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Publishes a mapping document as a named location.
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long)]
        input: PathBuf,
        /// Package into an in-memory store and skip the registry.
        #[arg(long)]
        dry_run: bool,
    },
    /// Shows one registered location.
    Get { uuid: Uuid },
    /// Lists every registered location.
    List,
}

pub fn start_floorplan() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = init::get_data_dir()?;
    let log_file_flush_guard = trace::install_tracing(&data_dir)?;

    let config = FloorplanConfig::from_env(&data_dir)?;
    let _span = info_span!("floorplan", data_dir = %data_dir.display()).entered();
    let result = run(cli.command, &config);
    if let Err(e) = &result {
        error!(?e, "command failed");
    }
    std::mem::drop(log_file_flush_guard);
    result
}

fn run(command: Command, config: &FloorplanConfig) -> Result<()> {
    match command {
        Command::Export { input, format, out } => {
            let document = read_document(&input)?;
            let file = fp_codec::export(&document, format)?;
            let path = out.join(&file.file_name);
            std::fs::write(&path, &file.content)
                .into_diagnostic()
                .wrap_err(path.display().to_string())
                .wrap_err("failed to write export")?;
            info!(path = %path.display(), mime_type = file.mime_type, "export written");
            println!("{}", path.display());
        }
        Command::Upload {
            name,
            input,
            dry_run,
        } => {
            let document = read_document(&input)?;
            let api = &config.api;
            let registry = HttpLocationRegistry::from_config(api, api.agent());
            if dry_run {
                let store = MemoryObjectStore::new(api.public_objects_url().into_diagnostic()?);
                let result = LocationUploader::new(store, registry).upload(&name, &document)?;
                println!("{} {} (dry run)", result.uuid, result.public_url);
            } else {
                let store = HttpObjectStore::from_config(api, api.agent());
                let queue = UploadQueue::new(LocationUploader::new(store, registry));
                let mut editor = NavigationStore::from_document(document);
                editor.dispatch(ToolbarAction::SelectLocation(name))?;
                editor.start_upload(&queue)?;
                let published = queue.wait_result()??;
                println!(
                    "{} {}",
                    published.upload.uuid, published.upload.public_url
                );
            }
        }
        Command::Get { uuid } => {
            let api = &config.api;
            let response = HttpLocationRegistry::from_config(api, api.agent()).get(&uuid)?;
            if !response.success {
                return Err(miette::miette!("location {uuid} not found: {}", response.message));
            }
            let record = response
                .record()
                .into_diagnostic()
                .wrap_err("registry sent an unexpected location")?
                .ok_or_else(|| miette::miette!("registry sent no data for {uuid}"))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&record).into_diagnostic()?
            );
        }
        Command::List => {
            let api = &config.api;
            let response = HttpLocationRegistry::from_config(api, api.agent()).list()?;
            let records = response
                .records()
                .into_diagnostic()
                .wrap_err("registry sent unexpected locations")?;
            for record in records {
                println!("{}\t{}\t{}", record.uuid, record.location_name, record.json_url);
            }
        }
    }
    Ok(())
}

/// Reads a mapping document, picking the codec from the file extension.
fn read_document(path: &Path) -> Result<MappingDocument> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| miette::miette!("`{}` is not a file", path.display()))?;
    let format = ExportFormat::from_file_name(file_name).ok_or_else(|| {
        miette::miette!("cannot tell the format of `{file_name}`, use a .json or .xml file")
    })?;
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(path.display().to_string())
        .wrap_err("failed to read mapping document")?;
    let document = fp_codec::from_str(&content, format)?;
    info!(path = %path.display(), %format, entities = document.entities.len(), "mapping read");
    Ok(document)
}

//! desc2proto - Regenerate .proto source files from a compiled descriptor set
//!
//! This tool decodes a binary `FileDescriptorSet` (e.g. produced by
//! `protoc --descriptor_set_out` or captured via server reflection) and
//! writes one reconstructed `.proto` source file per file entry under a
//! destination folder.
//!
//! Exit codes: argument errors exit with clap's usage code (2); runtime
//! errors (unreadable source, render or I/O failures) exit with 1.

use anyhow::{bail, Context, Result};
use clap::Parser;
use desc2proto_core::{decode_descriptor_set, render_descriptor_set, RenderedFile};
use std::fs;
use std::path::Path;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Regenerate .proto source files from a compiled descriptor set
#[derive(Parser, Debug)]
#[command(name = "desc2proto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source descriptor set file (aka protoset)
    #[arg(short, long)]
    source: std::path::PathBuf,

    /// Destination folder for the generated protos
    #[arg(short, long)]
    destination: std::path::PathBuf,

    /// Clean the destination folder before writing
    #[arg(short, long)]
    clean: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    debug!("desc2proto-core {}", desc2proto_core::VERSION);
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.source.exists() {
        bail!("source file does not exist: {}", cli.source.display());
    }
    if !cli.source.is_file() {
        bail!("source path is not a file: {}", cli.source.display());
    }
    if cli.destination.exists() && cli.destination.is_file() {
        bail!(
            "destination folder is a file: {}",
            cli.destination.display()
        );
    }

    let data = fs::read(&cli.source)
        .with_context(|| format!("failed to read source file: {}", cli.source.display()))?;
    let set = decode_descriptor_set(&data)
        .with_context(|| format!("failed to decode descriptor set: {}", cli.source.display()))?;
    debug!("decoded descriptor set with {} file entr(ies)", set.file.len());

    fs::create_dir_all(&cli.destination).with_context(|| {
        format!(
            "failed to create destination folder: {}",
            cli.destination.display()
        )
    })?;
    if cli.clean {
        clean_destination(&cli.destination)?;
    }

    let rendered = render_descriptor_set(&set)?;
    for file in &rendered {
        let output_path = cli.destination.join(&file.path);
        write_rendered_file(&output_path, file)?;
        info!("wrote {}", output_path.display());
    }

    println!("generated {} proto file(s)", rendered.len());
    Ok(())
}

/// Removes every entry inside the destination folder. The folder itself
/// stays in place.
fn clean_destination(destination: &Path) -> Result<()> {
    for entry in fs::read_dir(destination)
        .with_context(|| format!("unable to clean destination: {}", destination.display()))?
    {
        let entry = entry
            .with_context(|| format!("unable to clean destination: {}", destination.display()))?;
        let path = entry.path();
        let removed = if entry
            .file_type()
            .with_context(|| format!("unable to inspect {}", path.display()))?
            .is_dir()
        {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("unable to remove {}", path.display()))?;
        debug!("removed {}", path.display());
    }
    Ok(())
}

/// Writes one rendered proto, creating parent directories as needed.
/// Existing files are overwritten; each entry's artifact is independently
/// complete once written.
fn write_rendered_file(output_path: &Path, file: &RenderedFile) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, &file.content)
        .with_context(|| format!("failed to write file: {}", output_path.display()))?;
    Ok(())
}

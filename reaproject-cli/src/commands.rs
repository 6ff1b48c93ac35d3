//! Subcommand handlers

use crate::output::OutputNames;
use clap::ArgMatches;
use reaproject::rpp::chunk::Chunk;
use reaproject::rpp::document::{name_from_path, DocumentError, DocumentSet};
use reaproject::rpp::error::{FormatError, ParseError, ScriptError};
use reaproject::rpp::formats::FormatRegistry;
use reaproject::rpp::parser::parse_bytes;
use reaproject::rpp::serializer::serialize_with;
use reaproject::rpp::transform::catalog::{builtin_scripts, find};
use reaproject::rpp::transform::helpers::SCRIPT_FUNCTIONS;
use reaproject::rpp::transform::{TransformEngine, TransformScript};
use reaproject_config::{ConfigError, ReaprojectConfig};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{path}: {source}")]
    Parse { path: PathBuf, source: ParseError },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("transform failed: {0}")]
    Script(#[from] ScriptError),

    #[error("no built-in script named '{0}' (see `reaproject scripts`)")]
    UnknownScript(String),

    #[error("interrupted")]
    Interrupted,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    /// Process exit status for this error. Interruption uses the shell's 128 + SIGINT.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Interrupted => 130,
            _ => 1,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn registry(config: &ReaprojectConfig) -> FormatRegistry {
    FormatRegistry::with_options(config.serialize_options())
}

/// Format name for a file, from its extension.
fn format_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => "json",
        Some("yaml") | Some("yml") => "yaml",
        _ => "rpp",
    }
}

async fn read_text(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(io_error(path))
}

pub async fn inspect(config: &ReaprojectConfig, matches: &ArgMatches) -> Result<(), CliError> {
    let path = matches
        .get_one::<PathBuf>("path")
        .expect("path is required");
    let format = matches
        .get_one::<String>("format")
        .unwrap_or(&config.inspect.format);

    let bytes = tokio::fs::read(path).await.map_err(io_error(path))?;
    let root = parse_bytes(&bytes).map_err(|source| CliError::Parse {
        path: path.clone(),
        source,
    })?;
    print!("{}", registry(config).serialize(&root, format)?);
    Ok(())
}

pub async fn convert(config: &ReaprojectConfig, matches: &ArgMatches) -> Result<(), CliError> {
    let path = matches
        .get_one::<PathBuf>("path")
        .expect("path is required");
    let to = matches.get_one::<String>("to").expect("--to is required");
    let from = matches
        .get_one::<String>("from")
        .map(String::as_str)
        .unwrap_or_else(|| format_for_path(path));

    let registry = registry(config);
    let text = read_text(path).await?;
    let root = registry.parse(&text, from)?;
    let rendered = registry.serialize(&root, to)?;

    match matches.get_one::<PathBuf>("output") {
        Some(output) => {
            tokio::fs::write(output, rendered)
                .await
                .map_err(io_error(output))?;
            tracing::info!(from, to, output = %output.display(), "converted");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Read and parse every file concurrently. Results come back in argument order.
async fn load_all(paths: Vec<PathBuf>) -> Result<Vec<(PathBuf, Chunk)>, CliError> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            tokio::spawn(async move {
                let bytes = tokio::fs::read(&path).await.map_err(io_error(&path))?;
                let parsed = tokio::task::spawn_blocking(move || parse_bytes(&bytes)).await?;
                match parsed {
                    Ok(root) => Ok((path, root)),
                    Err(source) => Err(CliError::Parse { path, source }),
                }
            })
        })
        .collect();

    let mut loaded = Vec::with_capacity(handles.len());
    for handle in handles {
        loaded.push(handle.await??);
    }
    Ok(loaded)
}

fn selected_script(matches: &ArgMatches) -> Result<TransformScript, CliError> {
    if let Some(path) = matches.get_one::<PathBuf>("script-file") {
        let body = std::fs::read_to_string(path).map_err(io_error(path))?;
        return Ok(TransformScript::custom(name_from_path(path), body));
    }
    match matches.get_one::<String>("script") {
        Some(name) => find(name)
            .cloned()
            .ok_or_else(|| CliError::UnknownScript(name.clone())),
        None => builtin_scripts()
            .first()
            .cloned()
            .ok_or_else(|| CliError::UnknownScript(String::new())),
    }
}

pub async fn transform(config: &ReaprojectConfig, matches: &ArgMatches) -> Result<(), CliError> {
    let source = matches
        .get_one::<PathBuf>("source")
        .expect("source is required")
        .clone();
    let mut paths = vec![source];
    if let Some(others) = matches.get_many::<PathBuf>("others") {
        paths.extend(others.cloned());
    }
    let out_dir = matches
        .get_one::<PathBuf>("out-dir")
        .expect("out-dir has a default")
        .clone();
    let script = selected_script(matches)?;

    let mut set = DocumentSet::new();
    for (path, root) in load_all(paths).await? {
        set.import_parsed(name_from_path(&path), root);
    }
    let source_id = set
        .source()
        .map(|doc| doc.id())
        .expect("at least the source file was imported");
    let inputs = set.transform_inputs(source_id)?;

    tracing::info!(script = %script.name, inputs = set.len(), "running transform");
    let engine = TransformEngine::new(config.engine_limits());
    let body = script.body.into_owned();
    let run = tokio::task::spawn_blocking(move || engine.run_inputs(&body, &inputs));

    let documents = tokio::select! {
        joined = run => joined??,
        _ = tokio::signal::ctrl_c() => return Err(CliError::Interrupted),
    };

    tokio::fs::create_dir_all(&out_dir)
        .await
        .map_err(io_error(&out_dir))?;
    let options = config.serialize_options();
    let mut names = OutputNames::new();
    for document in documents {
        let target = out_dir.join(names.file_name(&document.name));
        tokio::fs::write(&target, serialize_with(&document.root, &options))
            .await
            .map_err(io_error(&target))?;
        println!("{}", target.display());
    }
    Ok(())
}

pub fn scripts(matches: &ArgMatches) -> Result<(), CliError> {
    if matches.get_flag("functions") {
        for function in SCRIPT_FUNCTIONS {
            println!("{}", function.signature);
            println!("    {}", function.description);
        }
        return Ok(());
    }

    if let Some(name) = matches.get_one::<String>("show") {
        let script = find(name).ok_or_else(|| CliError::UnknownScript(name.clone()))?;
        print!("{}", script.body);
        return Ok(());
    }

    println!("Built-in scripts:\n");
    for script in builtin_scripts() {
        println!("  {}", script.name);
        println!("    {}", script.description);
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Interrupted.exit_code(), 130);
        assert_eq!(CliError::UnknownScript("x".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a.rpp")), "rpp");
        assert_eq!(format_for_path(Path::new("a.JSON")), "json");
        assert_eq!(format_for_path(Path::new("a.yml")), "yaml");
        assert_eq!(format_for_path(Path::new("a")), "rpp");
    }
}

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use pipeline_engine::assets::pipeline_files;
use pipeline_engine::foundation::logging;
use pipeline_engine::prelude::*;

fn main() -> Result<()> {
    let matches = Command::new("pipeline_tool")
        .about("Loads compiled shaders and pipeline descriptions, and builds every pipeline headlessly")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Registry configuration (.toml or .ron)")
        )
        .arg(
            Arg::new("shaders")
                .short('s')
                .long("shaders")
                .value_name("DIR")
                .help("Directory of compiled .spv shaders")
        )
        .arg(
            Arg::new("pipelines")
                .short('p')
                .long("pipelines")
                .value_name("DIR")
                .help("Directory of pipeline description files")
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Pipeline description format")
                .value_parser(["json", "ron"]),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Default log filter when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Stop at the first pipeline that fails to build")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => RegistryConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => RegistryConfig::default(),
    };

    if let Some(dir) = matches.get_one::<String>("shaders") {
        config.shader_dir = PathBuf::from(dir);
    }
    if let Some(dir) = matches.get_one::<String>("pipelines") {
        config.pipeline_dir = PathBuf::from(dir);
    }
    if let Some(format) = matches.get_one::<String>("format").and_then(|f| LoaderFormat::from_extension(f)) {
        config.loader_format = format;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.log_level = level.clone();
    }
    config.validate().context("Invalid configuration")?;

    logging::init_with_level(&config.log_level);

    run(&config, matches.get_flag("strict"))
}

fn run(config: &RegistryConfig, strict: bool) -> Result<()> {
    let backend = HeadlessBackend::with_features(config.features);
    let mut shaders = ShaderManager::new();

    let shader_dir = config.resolve_shader_dir();
    shaders
        .load_directory(&backend, &shader_dir)
        .with_context(|| format!("Failed to load shaders from {:?}", shader_dir))?;

    let loader = config.loader_format.create_loader();
    let files = pipeline_files(loader.as_ref(), &config.pipeline_dir)
        .with_context(|| format!("Failed to list pipelines in {:?}", config.pipeline_dir))?;

    let mut pipelines = PipelineManager::new();
    let mut skipped = 0usize;
    for path in &files {
        match pipelines.create_from_file(&backend, &shaders, loader.as_ref(), path) {
            Ok(id) => log::debug!("{:?} -> pipeline {}", path, id),
            Err(e) if strict => {
                return Err(e).with_context(|| format!("Failed to build pipeline from {:?}", path));
            }
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                skipped += 1;
            }
        }
    }

    for pipeline in pipelines.iter() {
        log::info!(
            "  {} {:<24} stages={:?} blend={:?}",
            pipeline.id(),
            pipeline.name().unwrap_or("<unnamed>"),
            pipeline.stage_mask(),
            pipeline.state().blend.mode
        );
    }
    log::info!(
        "Built {} pipeline(s) from {} file(s), {} skipped",
        pipelines.len(),
        files.len(),
        skipped
    );

    Ok(())
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::helpers::*;
use anyhow::{Context, Result};
use clap::Subcommand;
use khora_core::asset::{get_asset_type, AssetType};
use khora_resources::{AssetDatabase, ResourcesConfig};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

#[derive(Subcommand, Debug)]
pub enum AssetsCommand {
    /// Print the canonical engine and project directories.
    Dirs,
    /// Print the category of a file extension or path.
    Classify {
        /// An extension (`png`, `.PNG`) or a file path.
        input: String,
    },
    /// Resolve a file name in the assets tree.
    Find {
        /// A bare file name or a relative path such as `Textures/hero.png`.
        filename: String,
        /// Search the system tree instead of the assets tree.
        #[arg(long)]
        system: bool,
    },
    /// Import every new file under the assets root and report the result.
    Import {
        /// Override the assets root from the configuration.
        #[arg(long)]
        assets: Option<PathBuf>,
    },
}

pub fn run(config_path: &Path, command: AssetsCommand) -> Result<()> {
    let config = ResourcesConfig::load_or_default(config_path)?;
    log::debug!("Resources configuration: {config:?}");
    match command {
        AssetsCommand::Dirs => dirs(config),
        AssetsCommand::Classify { input } => {
            classify(&config, &input);
            Ok(())
        }
        AssetsCommand::Find { filename, system } => find(config, &filename, system),
        AssetsCommand::Import { assets } => import(config, assets),
    }
}

fn open(config: ResourcesConfig) -> Result<AssetDatabase> {
    AssetDatabase::open(config).context("Failed to open the asset database")
}

fn dirs(config: ResourcesConfig) -> Result<()> {
    print_task_start("Asset Directories", FOLDER, CYAN);
    let db = open(config)?;

    let rows = [
        ("shaders", db.shader_root_directory()?),
        ("shader headers", db.shader_header_directory()?),
        ("textures", db.texture_root_directory()?),
        ("models", db.model_root_directory()?),
        ("fonts", db.font_root_directory()?),
        ("examples", db.example_root_directory()?),
    ];
    for (name, path) in rows {
        let marker = if path.is_dir() { CHECK } else { CROSS };
        println!("  {marker} {BOLD}{name:<15}{RESET} {}", path.display());
    }
    match db.assets_directory() {
        Ok(path) => println!("  {CHECK} {BOLD}{:<15}{RESET} {}", "assets", path.display()),
        Err(_) => print_info("No assets root configured."),
    }
    Ok(())
}

fn classify(config: &ResourcesConfig, input: &str) {
    let table = config.extension_table();
    let path = Path::new(input);
    let asset_type = if path.extension().is_some() {
        table.classify_path(path)
    } else {
        table.classify(input)
    };
    let color = type_color(asset_type);
    println!("{BOLD}{input}{RESET} -> {color}{asset_type}{RESET}");
    if asset_type != get_asset_type(input.rsplit('.').next().unwrap_or(input)) {
        print_info("Classification differs from the built-in table (configuration override).");
    }
}

fn find(config: ResourcesConfig, filename: &str, system: bool) -> Result<()> {
    print_task_start("Finding File", MAGNIFIER, BLUE);
    let db = open(config)?;
    let found = if system {
        db.find_system_file(filename)?
    } else {
        db.find_asset_file(filename)?
    };
    match found {
        Some(path) => print_success(&format!("{}", path.display())),
        None => anyhow::bail!("'{filename}' was not found"),
    }
    Ok(())
}

fn import(mut config: ResourcesConfig, assets: Option<PathBuf>) -> Result<()> {
    print_task_start("Importing Assets", PACKAGE, MAGENTA);
    if assets.is_some() {
        config.assets_root = assets;
    }
    let mut db = open(config)?;
    db.assets_directory()
        .context("No assets root: set `assets_root` in the configuration or pass --assets")?;

    let report = db.refresh()?;

    let mut per_type: BTreeMap<AssetType, usize> = BTreeMap::new();
    for (path, guid) in &report.imported {
        let asset_type = db.asset_type(path);
        *per_type.entry(asset_type).or_default() += 1;
        println!(
            "  {}{:<8}{} {} {}",
            type_color(asset_type),
            asset_type,
            RESET,
            guid,
            path.display()
        );
    }
    for (path, error) in &report.failed {
        print_error(&format!("{}: {error}", path.display()));
    }

    println!("\n{BOLD}{GEAR} Summary{RESET}");
    for (asset_type, count) in &per_type {
        println!("  {asset_type:<8} {count}");
    }
    println!(
        "  {} imported, {} unchanged, {} skipped, {} failed",
        report.imported.len(),
        report.unchanged,
        report.skipped.len(),
        report.failed.len()
    );

    if report.failed.is_empty() {
        print_success("Asset import finished successfully.");
        Ok(())
    } else {
        anyhow::bail!("{} assets failed to import", report.failed.len())
    }
}

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

// Asset tooling for Khora Engine
// Run with: cargo xtask assets <command>

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::assets::AssetsCommand;
use helpers::print_error;
use khora_resources::config::CONFIG_FILE_NAME;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Khora Engine asset tooling")]
struct Cli {
    /// The resources configuration file.
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Commands for asset database management.
    #[command(subcommand)]
    Assets(AssetsCommand),
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Assets(command) => commands::assets::run(&cli.config, command),
    }
}

fn main() {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

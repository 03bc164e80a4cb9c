/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pinconv::exporter::ExportFormat;
use pinconv::loader::read_text;
use pinconv::model::BoardKind;
use pinconv::session::{ListScope, Session, Step};
use pinconv::ucf::GenerateOptions;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "pinconv - UCF pin constraint converter for Papilio boards and wings",
    long_about = None
)]
struct Args {
    #[arg(long = "board-file", global = true, help = "Load extra board definitions (repeatable, .gz accepted)")]
    board_files: Vec<PathBuf>,
    #[arg(long = "wing-file", global = true, help = "Load extra wing definitions (repeatable, .gz accepted)")]
    wing_files: Vec<PathBuf>,
    #[arg(long, global = true, help = "Do not load the built-in board and wing definitions")]
    no_builtin: bool,
    #[arg(short = 's', long, global = true, help = "Board the input file was written for")]
    source_board: Option<String>,
    #[arg(short = 'd', long, global = true, help = "Board to convert to")]
    destination_board: Option<String>,
    #[arg(
        long = "move",
        global = true,
        help = "Move header pins before mapping: A->B, AL->AH, A[15:0]->A[0:15] (repeatable)"
    )]
    moves: Vec<String>,
    #[arg(
        long = "place-wing",
        global = true,
        help = "Place wings on the destination board: B/LED->AL,AH;PS/2->BH (repeatable)"
    )]
    place_wings: Vec<String>,
    #[arg(long, global = true, help = "Sort generated rows by net name")]
    sort: bool,
    #[arg(long, global = true, help = "Don't pad the attribute column of generated rows")]
    collapse_columns: bool,
    #[arg(long, global = true, help = "Leave header pins without a net out of generated files")]
    exclude_unused_pins: bool,
    #[arg(long, global = true, help = "Write LOC = \"P1\" instead of LOC=\"P1\"")]
    spaces_around_equals: bool,
    #[arg(short = 'o', long, global = true, help = "Output file (default: stdout)")]
    output: Option<PathBuf>,
    #[arg(long, global = true, help = "YAML file with generation options")]
    profile: Option<PathBuf>,
    #[command(subcommand)]
    command: SubCommands,
}

#[derive(Parser, Debug)]
struct InputCmd {
    #[arg(help = "UCF file")]
    input: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateCmd {
    #[arg(default_value = "all", help = "Buses or bus ranges to emit: all, CLK,A,BL, C[0:3]")]
    filter: String,
}

#[derive(Parser, Debug)]
struct ListCmd {
    #[arg(default_value = "", help = "boards, wings or all")]
    scope: String,
}

#[derive(Parser, Debug)]
struct ExportCmd {
    #[arg(long, default_value = "json", help = "json or yaml")]
    format: String,
    #[arg(help = "Boards and wings to export, :all for everything (default)")]
    names: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum SubCommands {
    /// Rewrite the pins of a UCF file from the source to the destination board.
    Transform(InputCmd),
    /// Check that every pin of a UCF file exists on the source board.
    Validate(InputCmd),
    /// Write a UCF file for the destination board.
    Generate(GenerateCmd),
    /// List known boards and wings.
    List(ListCmd),
    /// Dump resolved boards and wings.
    Export(ExportCmd),
}

fn load_profile(path: &Path) -> Result<GenerateOptions> {
    let text = read_text(path)?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid profile {}", path.display()))
}

fn generate_options(args: &Args) -> Result<GenerateOptions> {
    let mut options = match &args.profile {
        Some(path) => load_profile(path)?,
        None => GenerateOptions::default(),
    };

    options.sorted |= args.sort;
    options.collapse_columns |= args.collapse_columns;
    options.exclude_unused_pins |= args.exclude_unused_pins;
    options.spaces_around_equals |= args.spaces_around_equals;

    Ok(options)
}

fn steps(args: &Args) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for path in &args.board_files {
        steps.push(Step::LoadDefinitions { path: path.clone(), kind: BoardKind::Board });
    }
    for path in &args.wing_files {
        steps.push(Step::LoadDefinitions { path: path.clone(), kind: BoardKind::Wing });
    }
    if let Some(name) = &args.source_board {
        steps.push(Step::SourceBoard(name.clone()));
    }
    if let Some(name) = &args.destination_board {
        steps.push(Step::DestinationBoard(name.clone()));
    }
    for directive in &args.moves {
        steps.push(Step::Move(directive.clone()));
    }
    for directive in &args.place_wings {
        steps.push(Step::PlaceWing(directive.clone()));
    }

    steps.push(match &args.command {
        SubCommands::Transform(cmd) => Step::Transform { input: cmd.input.clone() },
        SubCommands::Validate(cmd) => Step::Validate { input: cmd.input.clone() },
        SubCommands::Generate(cmd) => Step::Generate { filter: cmd.filter.clone() },
        SubCommands::List(cmd) => Step::List(cmd.scope.parse::<ListScope>()?),
        SubCommands::Export(cmd) => {
            let names = if cmd.names.is_empty() { vec![":all".to_string()] } else { cmd.names.clone() };
            Step::Export { names, format: cmd.format.parse::<ExportFormat>()? }
        }
    });

    Ok(steps)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = generate_options(&args)?;
    let steps = steps(&args)?;

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Can't create {}", path.display()))?
        )),
        None => Box::new(io::stdout()),
    };

    let mut session = if args.no_builtin {
        Session::new(out)
    } else {
        Session::with_builtins(out)?
    };
    session.set_options(options);

    session.run(&steps)?;
    session.into_output().flush()?;

    Ok(())
}

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

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Assignment, BoardId, Catalog, PinRef};
use crate::strings::{CaselessSet, CaselessString};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unknown export format `{0}`")]
    UnknownFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct PinSummary {
    pub canonical: String,
    pub net: Option<String>,
    pub physical: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub additions: Vec<Assignment>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BusSummary {
    pub name: String,
    pub board: String,
    pub pins: Vec<PinSummary>,
}

/// Resolved view of one board: everything inherited, wings already stacked.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct BoardSummary {
    pub names: Vec<String>,
    pub parent: Option<String>,
    pub wing: bool,
    pub header: Option<String>,
    pub configs: Vec<Assignment>,
    pub buses: Vec<BusSummary>,
}

impl BoardSummary {
    pub fn new(catalog: &Catalog, id: BoardId) -> Self {
        let board = catalog.board(id);
        let header = catalog.header(id);

        let buses = catalog.buses(id).into_iter()
            .map(|slot| {
                let bus = catalog.bus(slot);
                let pins = (0 .. bus.pin_count())
                    .map(|index| {
                        let view = catalog.pin_view(PinRef { slot, index });
                        PinSummary {
                            canonical: view.canonical_name(),
                            net: view.net_name(),
                            physical: view.physical_name().map(str::to_string),
                            additions: view.additions().iter().cloned().collect(),
                        }
                    })
                    .collect();
                BusSummary {
                    name: bus.name.clone(),
                    board: catalog.board(slot.board).primary_name().to_string(),
                    pins,
                }
            })
            .collect();

        Self {
            names: board.names.clone(),
            parent: catalog.parent(id).map(|parent| catalog.board(parent).primary_name().to_string()),
            wing: board.is_wing,
            header: if header.is_empty() { None } else { Some(header.trim_end().to_string()) },
            configs: catalog.configs(id),
            buses,
        }
    }
}

/// Decides by name what gets exported. `:all` selects everything.
#[derive(Default)]
struct ExportChecker {
    export: CaselessSet,
    export_all: bool,
}

impl ExportChecker {
    fn new(arg_list: &[String]) -> Self {
        let mut checker = Self::default();
        for arg in arg_list {
            if arg == ":all" {
                checker.export_all = true;
            } else {
                checker.export.insert(CaselessString::new(arg.as_str()));
            }
        }
        checker
    }

    fn should_export(&self, names: &[String]) -> bool {
        self.export_all
            || names.iter().any(|name| self.export.contains(&CaselessString::new(name.as_str())))
    }
}

pub trait Exporter<D> {
    /// Calls `exporter` and keeps its result if any of `names` was asked for.
    fn ignore_or_export<F>(&mut self, names: &[String], exporter: F) -> Result<bool, ExportError>
    where
        F: FnOnce() -> D;

    fn flush(&mut self) -> Result<(), ExportError>;
}

/// Gathers everything into one document written on flush.
pub struct CompoundExporter<D, W> where D: Serialize, W: Write {
    format: ExportFormat,
    out: W,
    data: Vec<D>,
    checker: ExportChecker,
}

impl<D, W> CompoundExporter<D, W> where D: Serialize, W: Write {
    pub fn new(arg_list: &[String], format: ExportFormat, out: W) -> Self {
        Self { format, out, data: Vec::new(), checker: ExportChecker::new(arg_list) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<D, W> Exporter<D> for CompoundExporter<D, W> where D: Serialize, W: Write {
    fn ignore_or_export<F>(&mut self, names: &[String], exporter: F) -> Result<bool, ExportError>
    where
        F: FnOnce() -> D
    {
        if self.checker.should_export(names) {
            self.data.push(exporter());
            return Ok(true);
        }
        Ok(false)
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        let text = match self.format {
            ExportFormat::Json => serde_json::to_string_pretty(&self.data)? + "\n",
            ExportFormat::Yaml => serde_yaml::to_string(&self.data)?,
        };
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

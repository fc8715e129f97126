/* Analyze command - dump the frozen table with opcodes and packet layouts */

use super::common::load_interface;
use crate::diag::Diagnostic;
use crate::error::GenError;
use crate::layout::{EntryLayout, plan_table};
use clap::ValueEnum;
use rpcgen_types::{EntryPoint, GlobalSettings, SpecTable};
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum ReportFormat {
  Json,
  Yaml,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct EntryReport<'a> {
  pub opcode: u32,
  pub entry: &'a EntryPoint,
  pub layout: EntryLayout,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisReport<'a> {
  pub basename: &'a str,
  pub settings: &'a GlobalSettings,
  pub max_param_count: usize,
  pub entries: Vec<EntryReport<'a>>,
  pub diagnostics: Vec<Diagnostic>,
}

/* Build the report, optionally restricted to a single entry point */
pub fn build_report<'a>(
  table: &'a SpecTable,
  diagnostics: Vec<Diagnostic>,
  only: Option<&str>,
) -> Result<AnalysisReport<'a>, GenError> {
  if let Some(name) = only {
    if table.find(name).is_none() {
      return Err(GenError::UnknownEntryPoint(name.to_string()));
    }
  }

  let entries = table
    .iter()
    .zip(plan_table(table))
    .enumerate()
    .filter(|(_, (entry, _))| only.is_none_or(|name| entry.name == name))
    .map(|(idx, (entry, layout))| EntryReport {
      opcode: table.opcode(idx),
      entry,
      layout,
    })
    .collect();

  Ok(AnalysisReport {
    basename: &table.basename,
    settings: &table.settings,
    max_param_count: table.max_param_count(),
    entries,
    diagnostics,
  })
}

/* Execute the analyze command */
pub fn run(input_dir: PathBuf, basename: String, format: ReportFormat, entry: Option<String>) -> anyhow::Result<()> {
  let loaded = load_interface(&input_dir, &basename, false)?;
  let report = build_report(&loaded.table, loaded.diagnostics.iter().cloned().collect(), entry.as_deref())?;

  match format {
    ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    ReportFormat::Yaml => print!("{}", serde_yml::to_string(&report)?),
  }
  Ok(())
}

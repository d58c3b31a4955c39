//! Persisting run outputs.
//!
//! Every file is written through a temp file in the output directory and
//! renamed into place, so a crashed run never leaves a half-written page.
use crate::schema::{DocumentKind, SchemaErrors};
use crate::workflow::ExecutionState;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const EXECUTION_LOG_FILE: &str = "execution_log.txt";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

/// Everything a run recorded besides the pages themselves.
#[derive(Debug, Serialize)]
pub struct Diagnostics<'a> {
    pub parse_errors: &'a [String],
    pub faq_answer_errors: &'a [String],
    pub comparison_error: Option<&'a str>,
    pub schema_validation_errors: &'a SchemaErrors,
    pub question_count: usize,
    pub question_generation_attempts: u32,
    pub max_question_generation_attempts: u32,
    pub min_required_questions: usize,
    pub stages: Vec<&'static str>,
}

impl<'a> Diagnostics<'a> {
    pub fn from_state(state: &'a ExecutionState) -> Self {
        Self {
            parse_errors: &state.parse_errors,
            faq_answer_errors: &state.faq_answer_errors,
            comparison_error: state.comparison_error.as_deref(),
            schema_validation_errors: &state.schema_validation_errors,
            question_count: state.question_count,
            question_generation_attempts: state.question_generation_attempts,
            max_question_generation_attempts: state.max_question_generation_attempts,
            min_required_questions: state.min_required_questions,
            stages: state.visited.iter().map(|stage| stage.as_str()).collect(),
        }
    }
}

/// Write the pages, the execution log and diagnostics into `dir`.
///
/// Pages the run did not produce are removed from `dir` so a stale page from
/// an earlier run is never mistaken for this run's output. Returns the paths
/// written.
pub fn write_run_outputs(dir: &Path, state: &ExecutionState) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let pages = [
        (DocumentKind::Faq, to_value(state.faq_page.as_ref())?),
        (DocumentKind::Product, to_value(state.product_page.as_ref())?),
        (DocumentKind::Comparison, to_value(state.comparison_page.as_ref())?),
    ];
    let mut written = Vec::new();
    for (kind, page) in pages {
        match page {
            Some(page) => written.push(write_json(dir, kind.file_name(), &page)?),
            None => remove_stale(&dir.join(kind.file_name()))?,
        }
    }

    let mut log = state.execution_log.join("\n");
    log.push('\n');
    written.push(write_atomic(dir, EXECUTION_LOG_FILE, log.as_bytes())?);
    written.push(write_json(
        dir,
        DIAGNOSTICS_FILE,
        &Diagnostics::from_state(state),
    )?);

    tracing::info!(dir = %dir.display(), files = written.len(), "outputs written");
    Ok(written)
}

/// Read the three pages back from `dir`; absent files come back as `None`.
pub fn read_documents(dir: &Path) -> Result<Vec<(DocumentKind, Option<Value>)>> {
    DocumentKind::ALL
        .into_iter()
        .map(|kind| {
            let path = dir.join(kind.file_name());
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok((kind, None)),
                Err(err) => {
                    return Err(err).with_context(|| format!("read {}", path.display()));
                }
            };
            let value = serde_json::from_slice(&bytes)
                .with_context(|| format!("parse {}", path.display()))?;
            Ok((kind, Some(value)))
        })
        .collect()
}

fn to_value<T: Serialize>(page: Option<&T>) -> Result<Option<Value>> {
    page.map(|page| serde_json::to_value(page).context("serialize page"))
        .transpose()
}

fn write_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("serialize {file_name}"))?;
    bytes.push(b'\n');
    write_atomic(dir, file_name, &bytes)
}

fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dest = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write {}", dest.display()))?;
    tmp.persist(&dest)
        .with_context(|| format!("persist {}", dest.display()))?;
    Ok(dest)
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale page");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}

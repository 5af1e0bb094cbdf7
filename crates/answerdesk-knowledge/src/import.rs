// SPDX-FileCopyrightText: 2026 Answerdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV knowledge import.
//!
//! Expected headers: `question,answer` plus optional `category`,
//! `subcategory`, and `keywords` (`;`-separated).

use std::io::Read;
use std::path::Path;

use answerdesk_core::AnswerdeskError;
use serde::Deserialize;
use thiserror::Error;

use crate::entry::EntryDraft;

/// Failure to read a knowledge CSV file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Csv { line: u64, source: csv::Error },

    #[error("line {line}: `{field}` must not be blank")]
    BlankField { line: u64, field: &'static str },
}

impl From<ImportError> for AnswerdeskError {
    fn from(err: ImportError) -> Self {
        AnswerdeskError::Input(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    question: String,
    answer: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
}

fn csv_error(err: csv::Error) -> ImportError {
    let line = err.position().map_or(0, |p| p.line());
    ImportError::Csv { line, source: err }
}

/// Parse knowledge drafts from CSV data.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<EntryDraft>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_error)?.clone();

    let mut drafts = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line());
        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|source| ImportError::Csv { line, source })?;

        if row.question.is_empty() {
            return Err(ImportError::BlankField { line, field: "question" });
        }
        if row.answer.is_empty() {
            return Err(ImportError::BlankField { line, field: "answer" });
        }

        drafts.push(EntryDraft {
            question: row.question,
            answer: row.answer,
            category: row.category,
            subcategory: row.subcategory,
            keywords: row
                .keywords
                .map(|k| k.split(';').map(str::to_string).collect()),
            source_document_id: None,
            metadata: None,
        });
    }
    Ok(drafts)
}

/// Parse knowledge drafts from a CSV file.
pub fn read_csv_path(path: &Path) -> Result<Vec<EntryDraft>, ImportError> {
    let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_minimal_columns() {
        let data = "question,answer\nWhat are your opening hours?,9 to 5\n";
        let drafts = read_csv(data.as_bytes()).unwrap();
        assert_eq!(drafts, vec![EntryDraft::new("What are your opening hours?", "9 to 5")]);
    }

    #[test]
    fn reads_optional_columns_and_keywords() {
        let data = "question,answer,category,subcategory,keywords\n\
                    Refunds?,Within 30 days.,billing,, refund ; returns \n";
        let drafts = read_csv(data.as_bytes()).unwrap();
        let draft = &drafts[0];
        assert_eq!(draft.category.as_deref(), Some("billing"));
        assert!(draft.subcategory.is_none());
        let entry = draft.clone().into_entry("bot").unwrap();
        let kws: Vec<&str> = entry.keywords.iter().map(String::as_str).collect();
        assert_eq!(kws, vec!["refund", "returns"]);
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let data = "question,answer\n\"Hours, please?\",\"Mon-Fri, 9 to 5\"\n";
        let drafts = read_csv(data.as_bytes()).unwrap();
        assert_eq!(drafts[0].answer, "Mon-Fri, 9 to 5");
    }

    #[test]
    fn blank_answer_reports_line() {
        let data = "question,answer\nFirst?,ok\nSecond?,  \n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::BlankField { line: 3, field: "answer" }), "{err}");
    }

    #[test]
    fn missing_required_header_is_rejected() {
        let data = "question,category\nHours?,general\n";
        assert!(matches!(
            read_csv(data.as_bytes()),
            Err(ImportError::Csv { .. })
        ));
    }

    #[test]
    fn import_error_converts_to_input() {
        let err: AnswerdeskError = ImportError::BlankField { line: 2, field: "question" }.into();
        assert!(matches!(err, AnswerdeskError::Input(msg) if msg.contains("line 2")));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.csv");
        std::fs::write(&path, "question,answer\nWifi?,Yes\n").unwrap();
        assert_eq!(read_csv_path(&path).unwrap().len(), 1);
        assert!(matches!(
            read_csv_path(&dir.path().join("missing.csv")),
            Err(ImportError::Io { .. })
        ));
    }
}

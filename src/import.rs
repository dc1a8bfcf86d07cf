//! Bulk import of requirements from CSV.
//!
//! The input has no header row. Column 0 is the requirement text and column 1,
//! when present and non-empty, its category. Quoted fields follow RFC 4180:
//! they may contain commas, doubled quotes and line breaks.

use std::io::BufRead;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CreateRequirementInput, Requirement, RequirementStatus};

/// One parsed CSV record and the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Strict streaming CSV reader.
///
/// Blank lines between records are skipped. A bare quote inside an unquoted
/// field, anything but a comma after a closing quote, an unterminated quoted
/// field or invalid UTF-8 is an [`Error::Csv`]; after an error the reader is
/// exhausted. The first record fixes the field count and every later record
/// must match it.
pub struct CsvReader<R> {
    input: R,
    line: usize,
    fields_per_record: Option<usize>,
    failed: bool,
}

impl<R: BufRead> CsvReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            fields_per_record: None,
            failed: false,
        }
    }

    /// Read one physical line without its terminator. `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        String::from_utf8(buf).map(Some).map_err(|_| Error::Csv {
            line: self.line,
            reason: "invalid UTF-8".to_string(),
        })
    }

    fn malformed(&self, reason: &str) -> Error {
        Error::Csv {
            line: self.line,
            reason: reason.to_string(),
        }
    }

    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.failed {
            return Ok(None);
        }
        let result = self.parse_record();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn parse_record(&mut self) -> Result<Option<Record>> {
        let first = loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };

        let start = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut state = State::FieldStart;
        let mut line = first;

        loop {
            for c in line.chars() {
                state = match (state, c) {
                    (State::FieldStart, '"') => State::Quoted,
                    (State::FieldStart | State::Unquoted, ',') => {
                        fields.push(std::mem::take(&mut field));
                        State::FieldStart
                    }
                    (State::FieldStart | State::Unquoted, c) => {
                        if c == '"' {
                            return Err(self.malformed("bare \" in non-quoted field"));
                        }
                        field.push(c);
                        State::Unquoted
                    }
                    (State::Quoted, '"') => State::QuoteInQuoted,
                    (State::Quoted, c) => {
                        field.push(c);
                        State::Quoted
                    }
                    (State::QuoteInQuoted, '"') => {
                        field.push('"');
                        State::Quoted
                    }
                    (State::QuoteInQuoted, ',') => {
                        fields.push(std::mem::take(&mut field));
                        State::FieldStart
                    }
                    (State::QuoteInQuoted, _) => {
                        return Err(self.malformed("extraneous character after closing quote"));
                    }
                };
            }

            if state != State::Quoted {
                fields.push(field);
                return self.check_field_count(Record {
                    line: start,
                    fields,
                });
            }

            // Line break inside a quoted field.
            field.push('\n');
            line = match self.next_line()? {
                Some(line) => line,
                None => {
                    return Err(Error::Csv {
                        line: start,
                        reason: "unterminated quoted field".to_string(),
                    })
                }
            };
        }
    }

    fn check_field_count(&mut self, record: Record) -> Result<Option<Record>> {
        match self.fields_per_record {
            None => self.fields_per_record = Some(record.fields.len()),
            Some(expected) if expected != record.fields.len() => {
                return Err(Error::Csv {
                    line: record.line,
                    reason: "wrong number of fields".to_string(),
                });
            }
            Some(_) => {}
        }
        Ok(Some(record))
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Create one `NOT_MET` requirement per CSV record under `project_id`.
///
/// The project must exist before anything is read. Records with an empty
/// first column are skipped. The first malformed record or store failure
/// stops the import; requirements created before it stay.
pub fn import_requirements<R: BufRead>(
    db: &Database,
    project_id: i64,
    input: R,
) -> Result<Vec<Requirement>> {
    db.get_project(project_id)?;

    let mut created = Vec::new();
    for record in CsvReader::new(input) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(project_id, imported = created.len(), error = %e, "CSV import aborted");
                return Err(e);
            }
        };

        let mut fields = record.fields.into_iter();
        let text = fields.next().unwrap_or_default();
        if text.is_empty() {
            tracing::debug!(line = record.line, "Skipping CSV record without text");
            continue;
        }
        let category = fields.next().filter(|c| !c.is_empty());

        let requirement = db.create_requirement(
            project_id,
            CreateRequirementInput {
                text,
                category,
                status: Some(RequirementStatus::NotMet),
            },
        )?;
        created.push(requirement);
    }

    tracing::info!(project_id, count = created.len(), "Imported requirements from CSV");
    Ok(created)
}

use crate::core::sampling::sample;
use crate::domain::model::ProcessStats;
use crate::domain::ports::{RecordProcessor, Transformation};
use crate::utils::error::{AnonError, ApplyError, Result};
use csv::StringRecord;
use std::io::{Read, Write};

/// 每讀 100 筆就 flush 一次輸出
pub const FLUSH_EVERY: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSettings {
    pub delimiter: u8,
    pub id_column: usize,
    pub modulus: u32,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            delimiter: b',',
            id_column: 0,
            modulus: 1,
        }
    }
}

enum RowOutcome {
    Written,
    SampledOut,
    Skipped,
}

/// Streams headerless CSV rows, applying one transformation per column.
pub struct CsvProcessor<R: Read, W: Write, T: Transformation> {
    reader: csv::Reader<R>,
    writer: csv::Writer<W>,
    actions: Vec<T>,
    id_column: usize,
    modulus: u32,
}

impl<R: Read, W: Write, T: Transformation> CsvProcessor<R, W, T> {
    pub fn new(input: R, output: W, settings: CsvSettings, actions: Vec<T>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .delimiter(settings.delimiter)
            .from_reader(input);
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(settings.delimiter)
            .from_writer(output);

        Self {
            reader,
            writer,
            actions,
            id_column: settings.id_column,
            modulus: settings.modulus,
        }
    }

    fn handle_row(&mut self, record: &StringRecord) -> Result<RowOutcome> {
        // 設定錯誤而不是資料錯誤，所以直接中止
        let id = record
            .get(self.id_column)
            .ok_or(AnonError::IdColumnOutOfRange {
                column: self.id_column,
                len: record.len(),
            })?;

        if !sample(id, self.modulus) {
            return Ok(RowOutcome::SampledOut);
        }

        match anonymise(record, &self.actions) {
            Ok(row) => {
                self.writer.write_record(&row)?;
                Ok(RowOutcome::Written)
            }
            Err(e) => {
                tracing::warn!(
                    line = record.position().map(|p| p.line()),
                    "Skipping row, anonymisation failed: {}",
                    e
                );
                Ok(RowOutcome::Skipped)
            }
        }
    }
}

impl<R: Read, W: Write, T: Transformation> RecordProcessor for CsvProcessor<R, W, T> {
    fn process(&mut self) -> Result<ProcessStats> {
        let mut stats = ProcessStats::default();
        let mut record = StringRecord::new();

        loop {
            let outcome = match self.reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => self.handle_row(&record)?,
                Err(e) if is_row_shape_error(&e) => {
                    tracing::warn!("Skipping malformed row: {}", e);
                    RowOutcome::Skipped
                }
                Err(e) => return Err(e.into()),
            };

            stats.records_read += 1;
            match outcome {
                RowOutcome::Written => stats.records_written += 1,
                RowOutcome::SampledOut => stats.sampled_out += 1,
                RowOutcome::Skipped => stats.rows_skipped += 1,
            }

            if stats.records_read % FLUSH_EVERY == 0 {
                self.writer.flush()?;
            }
        }

        self.writer.flush()?;
        Ok(stats)
    }
}

fn is_row_shape_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::UnequalLengths { .. })
}

/// Applies `actions[i]` to column `i`. Columns past the last action pass through.
/// The first failure aborts the whole row.
pub fn anonymise<T: Transformation>(
    record: &StringRecord,
    actions: &[T],
) -> std::result::Result<Vec<String>, ApplyError> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| match actions.get(i) {
            Some(action) => action.apply(field),
            None => Ok(field.to_string()),
        })
        .collect()
}

use crate::config::json_config::{AnonConfig, ProcessingMode};
use crate::core::csv_processor::{CsvProcessor, CsvSettings};
use crate::core::json_processor::{JsonProcessor, JsonSettings};
use crate::core::registry;
use crate::core::{ProcessStats, RecordProcessor};
use crate::utils::error::Result;
use crate::utils::validation::{validate_delimiter, Validate};
use rand::Rng;
use std::io::{BufReader, Read, Write};
use std::time::Instant;

pub struct AnonEngine<P: RecordProcessor> {
    processor: P,
}

impl<P: RecordProcessor> AnonEngine<P> {
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    pub fn run(&mut self) -> Result<ProcessStats> {
        let started = Instant::now();
        tracing::info!("Starting anonymisation...");

        let stats = self.processor.process()?;

        tracing::info!(
            read = stats.records_read,
            written = stats.records_written,
            sampled_out = stats.sampled_out,
            skipped = stats.rows_skipped,
            field_errors = stats.field_errors,
            "Anonymisation finished in {:.2?}",
            started.elapsed()
        );
        if stats.rows_skipped > 0 || stats.field_errors > 0 {
            tracing::warn!(
                "{} rows skipped and {} fields left unchanged, see warnings above",
                stats.rows_skipped,
                stats.field_errors
            );
        }

        Ok(stats)
    }
}

/// 驗證設定、編譯所有動作，再依模式（CSV / JSON）處理整個輸入串流。
/// 動作在讀取第一筆記錄前就編譯完成，編譯失敗時不會寫出任何東西。
pub fn anonymise_stream<R, W, G>(
    config: &AnonConfig,
    input: R,
    output: W,
    rng: &mut G,
) -> Result<ProcessStats>
where
    R: Read,
    W: Write,
    G: Rng,
{
    config.validate()?;
    let modulus = config.sampling.modulus;

    match config.mode()? {
        ProcessingMode::Csv(csv) => {
            let actions = registry::positional(&config.actions, rng)?;
            tracing::debug!("Compiled {} positional actions", actions.len());

            let settings = CsvSettings {
                delimiter: validate_delimiter("csv.delimiter", &csv.delimiter)?,
                id_column: csv.id_column as usize,
                modulus,
            };
            AnonEngine::new(CsvProcessor::new(input, output, settings, actions)).run()
        }
        ProcessingMode::Json(json) => {
            let actions = registry::keyed(&config.actions, rng)?;
            tracing::debug!(
                "Compiled actions for fields: {:?}",
                actions.keys().collect::<Vec<_>>()
            );

            let settings = JsonSettings {
                id_field: json.id_field.clone(),
                modulus,
            };
            let input = BufReader::new(input);
            AnonEngine::new(JsonProcessor::new(input, output, settings, actions)).run()
        }
    }
}

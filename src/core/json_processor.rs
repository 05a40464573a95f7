use crate::core::sampling::sample;
use crate::domain::model::{JsonRecord, ProcessStats};
use crate::domain::ports::{RecordProcessor, Transformation};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSettings {
    pub id_field: String,
    pub modulus: u32,
}

/// Streams JSON objects (string values only), applying transformations by field name.
///
/// Every record is flushed as soon as it is written. A decode error ends the
/// stream. A failing field keeps its original value and the record is still written.
pub struct JsonProcessor<R: Read, W: Write, T: Transformation> {
    reader: R,
    writer: W,
    actions: HashMap<String, T>,
    id_field: String,
    modulus: u32,
}

impl<R: Read, W: Write, T: Transformation> JsonProcessor<R, W, T> {
    pub fn new(input: R, output: W, settings: JsonSettings, actions: HashMap<String, T>) -> Self {
        Self {
            reader: input,
            writer: output,
            actions,
            id_field: settings.id_field,
            modulus: settings.modulus,
        }
    }
}

impl<R: Read, W: Write, T: Transformation> RecordProcessor for JsonProcessor<R, W, T> {
    fn process(&mut self) -> Result<ProcessStats> {
        let mut stats = ProcessStats::default();
        let records =
            serde_json::Deserializer::from_reader(&mut self.reader).into_iter::<JsonRecord>();

        for record in records {
            let mut record = record?;
            stats.records_read += 1;

            let id = match record.get(&self.id_field) {
                Some(id) => id.as_str(),
                None => {
                    tracing::debug!(
                        "Record #{} has no '{}' field, sampling on an empty id",
                        stats.records_read,
                        self.id_field
                    );
                    ""
                }
            };
            if !sample(id, self.modulus) {
                stats.sampled_out += 1;
                continue;
            }

            stats.field_errors += anonymise_fields(&self.actions, &mut record);

            serde_json::to_writer(&mut self.writer, &record)?;
            self.writer.write_all(b"\n")?;
            // 每筆寫完立即 flush
            self.writer.flush()?;
            stats.records_written += 1;
        }

        self.writer.flush()?;
        Ok(stats)
    }
}

/// 套用有註冊的欄位轉換，回傳失敗的欄位數。失敗的欄位保留原值。
pub fn anonymise_fields<T: Transformation>(
    actions: &HashMap<String, T>,
    record: &mut JsonRecord,
) -> u64 {
    let mut failures = 0;
    for (key, value) in record.iter_mut() {
        let Some(action) = actions.get(key.as_str()) else {
            continue;
        };
        match action.apply(value) {
            Ok(anonymised) => *value = anonymised,
            Err(e) => {
                tracing::warn!(
                    field = key.as_str(),
                    "Error applying anonymisation, field won't be anonymised: {}",
                    e
                );
                failures += 1;
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::Action;
    use crate::utils::error::AnonError;

    fn run(
        input: &str,
        actions: Vec<(&str, Action)>,
        modulus: u32,
    ) -> (Result<ProcessStats>, String) {
        let actions: HashMap<String, Action> = actions
            .into_iter()
            .map(|(field, action)| (field.to_string(), action))
            .collect();
        let settings = JsonSettings {
            id_field: "id".to_string(),
            modulus,
        };
        let mut out = Vec::new();
        let result = {
            let mut processor = JsonProcessor::new(input.as_bytes(), &mut out, settings, actions);
            processor.process()
        };
        (result, String::from_utf8(out).unwrap())
    }

    fn parse(line: &str) -> JsonRecord {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let (result, _) = run("not a json", vec![("id", Action::hash("salt"))], 1);
        assert!(matches!(result, Err(AnonError::SerializationError(_))));
    }

    #[test]
    fn test_non_string_values_are_fatal() {
        let (result, _) = run(r#"{"id": 1}"#, vec![("id", Action::Identity)], 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_failing_field_is_left_untouched() {
        let input = r#"{"id": "id", "date": "not a date"}"#;
        let year = Action::year("%Y%m%d").unwrap();
        let (result, out) = run(input, vec![("id", Action::Identity), ("date", year)], 1);

        let stats = result.unwrap();
        assert_eq!(parse(&out), parse(input));
        assert_eq!(stats.field_errors, 1);
        assert_eq!(stats.records_written, 1);
    }

    #[test]
    fn test_partial_failure_keeps_other_fields_transformed() {
        let input = r#"{"id": "id", "date": "not a date", "postcode": "W1W 8BE"}"#;
        let year = Action::year("%Y%m%d").unwrap();
        let (result, out) = run(
            input,
            vec![("date", year), ("postcode", Action::Outcode)],
            1,
        );
        result.unwrap();

        let record = parse(&out);
        assert_eq!(record["date"], "not a date");
        assert_eq!(record["postcode"], "W1W");
    }

    #[test]
    fn test_unmapped_fields_pass_through() {
        let (result, out) = run(
            r#"{"id": "id", "field": "don't touch it"}"#,
            vec![("id", Action::hash("salt"))],
            1,
        );
        result.unwrap();
        assert_eq!(
            parse(&out),
            parse(r#"{"id": "58619739af7a7374f30a027fe40313491e678ed9", "field": "don't touch it"}"#)
        );
    }

    #[test]
    fn test_sampling() {
        let input = "{\"id\": \"1\"}\n{\"id\": \"2\"}\n{\"id\": \"3\"}\n{\"id\": \"4\"}";
        let (result, out) = run(input, vec![("id", Action::Identity)], 2);
        let stats = result.unwrap();
        assert_eq!(out, "{\"id\":\"1\"}\n{\"id\":\"3\"}\n");
        assert_eq!(stats.sampled_out, 2);
    }

    #[test]
    fn test_all_records_valid() {
        let (result, out) = run(
            "{\"id\": \"1\"}\n  {\"id\": \"2\"}",
            vec![("id", Action::Identity)],
            1,
        );
        assert_eq!(result.unwrap().records_written, 2);
        assert_eq!(out, "{\"id\":\"1\"}\n{\"id\":\"2\"}\n");
    }

    #[test]
    fn test_records_do_not_leak_fields() {
        let (result, out) = run(
            "{\"id\": \"1\", \"extra\": \"x\"}{\"id\": \"3\"}",
            vec![],
            1,
        );
        result.unwrap();
        assert_eq!(out, "{\"extra\":\"x\",\"id\":\"1\"}\n{\"id\":\"3\"}\n");
    }

    #[test]
    fn test_missing_id_field_samples_on_empty_id() {
        // FNV-1a("") 是奇數，modulus 2 時不保留
        let (result, out) = run(r#"{"name": "x"}"#, vec![], 2);
        assert_eq!(result.unwrap().sampled_out, 1);
        assert_eq!(out, "");
    }

    #[derive(Default)]
    struct FlushCounter {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlushCounter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_each_record_is_flushed_when_written() {
        let mut sink = FlushCounter::default();
        let settings = JsonSettings {
            id_field: "id".to_string(),
            modulus: 1,
        };
        let actions: HashMap<String, Action> = HashMap::new();
        let result = {
            let mut processor = JsonProcessor::new(
                "{\"id\": \"1\"}\n{\"id\": \"2\"}\n{\"id\": ".as_bytes(),
                &mut sink,
                settings,
                actions,
            );
            processor.process()
        };

        // 第三筆解碼失敗，前兩筆已經各自 flush 出去
        assert!(matches!(result, Err(AnonError::SerializationError(_))));
        assert_eq!(sink.flushes, 2);
        assert_eq!(
            String::from_utf8(sink.data).unwrap(),
            "{\"id\":\"1\"}\n{\"id\":\"2\"}\n"
        );
    }

    #[test]
    fn test_empty_input() {
        let (result, out) = run("", vec![("id", Action::Identity)], 1);
        assert_eq!(result.unwrap(), ProcessStats::default());
        assert_eq!(out, "");
    }
}

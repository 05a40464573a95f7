use crate::utils::error::Result;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

/// 本機檔案或標準輸入/輸出。路徑未設定時退回 stdin / stdout。
#[derive(Debug, Clone, Default)]
pub struct LocalStreams {
    input: Option<String>,
    output: Option<String>,
}

impl LocalStreams {
    pub fn new(input: Option<String>, output: Option<String>) -> Self {
        Self { input, output }
    }

    pub fn open_input(&self) -> Result<Box<dyn Read>> {
        match &self.input {
            Some(path) => {
                tracing::debug!("Reading records from {}", path);
                Ok(Box::new(BufReader::new(File::open(path)?)))
            }
            None => {
                tracing::debug!("Reading records from stdin");
                Ok(Box::new(io::stdin().lock()))
            }
        }
    }

    pub fn open_output(&self) -> Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => {
                tracing::debug!("Writing records to {}", path);
                Ok(Box::new(BufWriter::new(File::create(path)?)))
            }
            None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        }
    }

    pub fn output_name(&self) -> &str {
        self.output.as_deref().unwrap_or("stdout")
    }
}

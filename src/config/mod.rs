pub mod json_config;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "record-anon")]
#[command(about = "Anonymise CSV rows or JSON records field by field")]
pub struct CliConfig {
    /// Input file. Reads standard input when omitted
    pub input: Option<String>,

    /// Configuration of the data to be anonymised
    #[arg(long, default_value = "config.json")]
    pub config: String,

    /// Output file. Writes to standard output when omitted
    #[arg(long)]
    pub output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Validate and compile the configuration without processing any input
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}

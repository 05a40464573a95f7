use clap::Parser;
use record_anon::config::json_config::{AnonConfig, ProcessingMode};
use record_anon::core::registry;
use record_anon::utils::{logger, validation::Validate};
use record_anon::{anonymise_stream, AnonError, CliConfig, LocalStreams};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting record-anon");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ Anonymisation failed: {} (Category: {:?})",
            e,
            e.category()
        );
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &CliConfig) -> Result<(), AnonError> {
    cli.validate()?;

    tracing::info!("📁 Using configuration in file {}", cli.config);
    let config = AnonConfig::from_file(&cli.config)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated");

    let mut rng = rand::thread_rng();

    if cli.dry_run {
        return dry_run(&config, &mut rng);
    }

    let streams = LocalStreams::new(cli.input.clone(), cli.output.clone());
    let input = streams.open_input()?;
    let output = streams.open_output()?;

    let stats = anonymise_stream(&config, input, output, &mut rng)?;
    tracing::info!(
        "✅ {} of {} records written to {}",
        stats.records_written,
        stats.records_read,
        streams.output_name()
    );
    Ok(())
}

/// 只編譯動作並顯示摘要，不讀取任何輸入
fn dry_run(config: &AnonConfig, rng: &mut impl rand::Rng) -> Result<(), AnonError> {
    eprintln!("🔍 Dry Run Analysis:");
    match config.mode()? {
        ProcessingMode::Csv(csv) => {
            let actions = registry::positional(&config.actions, rng)?;
            eprintln!(
                "  Mode: csv (delimiter '{}', id column {})",
                csv.delimiter, csv.id_column
            );
            for (column, action) in actions.iter().enumerate() {
                eprintln!("  column {} -> {:?}", column, action.kind());
            }
        }
        ProcessingMode::Json(json) => {
            let actions = registry::keyed(&config.actions, rng)?;
            eprintln!("  Mode: json (id field '{}')", json.id_field);
            let mut fields: Vec<_> = actions.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            for (field, action) in fields {
                eprintln!("  {} -> {:?}", field, action.kind());
            }
        }
    }
    eprintln!("  Sampling: keep roughly 1 in {} (by id hash)", config.sampling.modulus);
    eprintln!("  Actions: {}", config.action_count());
    eprintln!("✅ Configuration compiles. No input was read.");
    Ok(())
}

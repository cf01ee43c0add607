use clap::Parser;
use gradebook_client::config::Command;
use gradebook_client::core::grade::round_2_decimals;
use gradebook_client::core::{
    ConfigProvider, Credentials, LoginOutcome, MissingScorePolicy, PeriodScores, PrintOutcome, User,
};
use gradebook_client::utils::error::ErrorSeverity;
use gradebook_client::utils::{logger, validation::Validate};
use gradebook_client::{
    ApiGateway, CallbackObserver, CliConfig, ClientConfig, ClientError, FsPrintHost, GradeSheet,
    GradeSheetExporter, LoginClient, MemorySession, PrintAdapter, Result,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 先讀設定檔，日誌設定可能在裡面
    let file_config = cli.config.as_ref().map(ClientConfig::from_file).transpose();
    let logging = file_config
        .as_ref()
        .ok()
        .and_then(|c| c.as_ref())
        .map(|c| c.logging.clone())
        .unwrap_or_default();

    if logging.json {
        logger::init_json_logger(cli.verbose, logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, logging.level.as_deref());
    }

    tracing::info!("Starting gradebook CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match file_config {
        Ok(file_config) => run(&cli, file_config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig, file_config: Option<ClientConfig>) -> Result<i32> {
    match &cli.command {
        Command::Login { username, password } => {
            let config = resolve_config(cli, file_config)?;
            let session = Arc::new(MemorySession::new(cli.token.clone()));
            let gateway = ApiGateway::from_config(&config, session)?;
            let client = LoginClient::new(gateway);

            let observer = CallbackObserver::new(
                || println!("✅ Login successful"),
                |user: User| println!("{}", user.0),
                |message: String| eprintln!("❌ {}", message),
            );

            let credentials = Credentials::new(username.clone(), password.clone());
            match client.login(&credentials, &observer).await {
                LoginOutcome::Authenticated(_) => Ok(0),
                LoginOutcome::Superseded => Ok(0),
                LoginOutcome::Rejected(_) => Ok(1),
                LoginOutcome::Failed(_) => Ok(2),
            }
        }
        Command::Average {
            prelim,
            midterm,
            finals,
            exclude_missing,
            strict,
        } => {
            let scores = PeriodScores::parse(prelim, midterm, finals);

            if *strict {
                let [p, m, f] = scores.validate()?;
                println!("{}", round_2_decimals((p + m + f) / 3.0));
                return Ok(0);
            }

            let policy = if *exclude_missing {
                MissingScorePolicy::Exclude
            } else {
                file_config
                    .as_ref()
                    .map(|c| c.missing_score_policy())
                    .unwrap_or_default()
            };

            let average = scores.average(policy);
            for period in &average.missing {
                tracing::warn!("{} score is missing or non-numeric", period);
            }

            match average.value {
                Some(value) => println!("{}", round_2_decimals(value)),
                None => println!("n/a"),
            }
            Ok(0)
        }
        Command::Print { input, title } => {
            let (print_config, policy) = ClientConfig::print_settings(file_config.as_ref())?;

            let title = title.clone().unwrap_or_else(|| {
                input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Grades".to_string())
            });
            let file = std::fs::File::open(input)?;
            let sheet = GradeSheet::from_csv_reader(title, file)?;
            let exporter = GradeSheetExporter::new(sheet, policy);

            let adapter = PrintAdapter::new(Arc::new(FsPrintHost::from_config(&print_config)));
            match adapter.print(Some(&exporter)).await {
                PrintOutcome::Printed | PrintOutcome::Skipped => Ok(0),
                PrintOutcome::Failed(message) => Err(ClientError::PrintError { message }),
            }
        }
    }
}

fn resolve_config(cli: &CliConfig, file_config: Option<ClientConfig>) -> Result<ClientConfig> {
    let config = match file_config {
        Some(mut config) => {
            if let Some(base_url) = &cli.base_url {
                config.api.base_url = base_url.clone();
            }
            config
        }
        None => ClientConfig::resolve(cli)?,
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }
    Ok(config)
}

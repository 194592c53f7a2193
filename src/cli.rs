//! Command-line front end. Replies go to stdout, logs to stderr.

use std::{
    env,
    io::{self, Read},
    path::PathBuf,
};

use kakeibo_config::{Config, ConfigManager};
use kakeibo_core::{render_summary, LedgerStore};
use kakeibo_domain::YearMonth;
use kakeibo_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::{
    errors::{AppError, Result},
    handler::MessageHandler,
    utils::build_info,
};

/// Overrides the directory holding `config.json` (and, unless the config
/// names one, the ledger root).
pub const HOME_ENV: &str = "KAKEIBO_HOME";
const APP_DIR: &str = "kakeibo";

const USAGE: &str = "Usage:
  kakeibo message <user-id>        read a chat message on stdin, print the reply
  kakeibo event                    read a webhook body on stdin, print the reply payload
  kakeibo provision <YYYYMM> [budget]
  kakeibo show <YYYYMM>
  kakeibo months
  kakeibo version";

/// Resolved locations and settings for one invocation.
struct Environment {
    config: Config,
    ledger_root: PathBuf,
}

impl Environment {
    fn load() -> Result<Self> {
        let home = env::var_os(HOME_ENV).map(PathBuf::from);
        let base = home.clone().unwrap_or_else(default_home);
        let config = ConfigManager::with_base_dir(base)?.load()?;
        let ledger_root = match (&config.ledger_root, home) {
            (Some(root), _) => root.clone(),
            (None, Some(home)) => home,
            (None, None) => config.resolve_ledger_root(),
        };
        Ok(Self {
            config,
            ledger_root,
        })
    }

    fn storage(&self) -> Result<JsonLedgerStorage> {
        Ok(JsonLedgerStorage::with_retention(
            StoragePaths::under(&self.ledger_root),
            self.config.backup_retention,
        )?)
    }

    fn handler(&self) -> Result<MessageHandler> {
        MessageHandler::from_config(self.config.clone(), &self.ledger_root)
    }
}

fn default_home() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Runs the command named by the process arguments.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let output = run(&args)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Executes one command and returns what it prints.
pub fn run(args: &[String]) -> Result<String> {
    let mut args = args.iter().map(String::as_str);
    let command = args.next().ok_or_else(usage)?;

    match command {
        "message" => {
            let user_id = args.next().ok_or_else(usage)?;
            let text = read_stdin()?;
            Ok(Environment::load()?.handler()?.handle_text(user_id, &text))
        }
        "event" => {
            let body = read_stdin()?;
            let payload = Environment::load()?.handler()?.handle_webhook(&body)?;
            match payload {
                Some(payload) => Ok(serde_json::to_string_pretty(&payload)?),
                None => Ok(String::new()),
            }
        }
        "provision" => {
            let month: YearMonth = args.next().ok_or_else(usage)?.parse()?;
            let environment = Environment::load()?;
            let budget = match args.next() {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| AppError::Input(format!("budget must be an integer: {raw}")))?,
                None => environment.config.monthly_budget,
            };
            environment.storage()?.provision_month(month, budget)?;
            Ok(format!("Provisioned {month} with budget {budget}."))
        }
        "show" => {
            let month: YearMonth = args.next().ok_or_else(usage)?.parse()?;
            let sheet = Environment::load()?
                .storage()?
                .open_month(month)?
                .ok_or(kakeibo_core::CoreError::SheetNotFound(month))?;
            Ok(render_summary(&sheet, month))
        }
        "months" => {
            let months = Environment::load()?.storage()?.list_months()?;
            Ok(months
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "version" => Ok(build_info::current().describe()),
        "help" | "--help" | "-h" => Ok(USAGE.to_string()),
        other => Err(AppError::Input(format!("unknown command `{other}`\n{USAGE}"))),
    }
}

fn usage() -> AppError {
    AppError::Input(USAGE.to_string())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

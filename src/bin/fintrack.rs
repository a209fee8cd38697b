//! CLI front end for the fintrack personal finance ledger.

use std::ffi::OsString;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use fintrack_rs::fin_track::FinTrack;
use fintrack_rs::history::{DayGroup, HistoryFilter};
use fintrack_rs::models::{
    Currency, PreferencesPatch, ThemePreference, Transaction, TransactionId, TransactionKind,
    UserPreferences,
};
use fintrack_rs::storage::FileStorage;
use owo_colors::OwoColorize;

/// Environment variable overriding the data directory.
const DATA_DIR_ENV: &str = "FINTRACK_DATA_DIR";

/// Number of transactions shown on the balance screen.
const RECENT_LIMIT: usize = 5;

/// Track income and expenses from the terminal.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Override the storage directory (default: $FINTRACK_DATA_DIR, then
    /// the XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Finish onboarding: set your name and starting balance.
    Setup(SetupArgs),
    /// Record an income or expense.
    Add(AddArgs),
    /// Show the balance, totals and the most recent transactions.
    Balance,
    /// List transactions grouped by day, newest first.
    History(HistoryArgs),
    /// Show income/expense shares, expense by category and the monthly
    /// trend.
    Analytics,
    /// Show preferences, or update the given fields.
    Prefs(PrefsArgs),
    /// Delete all transactions. With --all, also forget the preferences.
    Reset {
        /// Clear every stored record and return to first launch.
        #[arg(long)]
        all: bool,
    },
}

/// Arguments for the `setup` subcommand.
#[derive(Debug, Args)]
struct SetupArgs {
    /// Your display name.
    #[arg(long)]
    name: String,
    /// Balance you start with, added to the ledger balance.
    #[arg(long, value_name = "AMOUNT")]
    initial_balance: Option<f64>,
    /// Currency code (USD, PKR).
    #[arg(long)]
    currency: Option<Currency>,
    /// Colour scheme (light, dark, system).
    #[arg(long)]
    theme: Option<ThemePreference>,
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// `income` or `expense`.
    kind: TransactionKind,
    /// Positive amount.
    #[arg(long, allow_negative_numbers = true)]
    amount: f64,
    /// Category, e.g. food or salary.
    #[arg(long)]
    category: String,
    /// Optional free-form note.
    #[arg(long)]
    note: Option<String>,
    /// When it happened (RFC 3339 or YYYY-MM-DD, default: now).
    #[arg(long, value_parser = parse_timestamp)]
    date: Option<DateTime<FixedOffset>>,
}

/// Arguments for the `history` subcommand.
#[derive(Debug, Args)]
struct HistoryArgs {
    /// Only `income` or `expense`.
    #[arg(long)]
    kind: Option<TransactionKind>,
    /// Start date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// End date (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Only this category (case-insensitive).
    #[arg(long)]
    category: Option<String>,
}

/// Arguments for the `prefs` subcommand.
#[derive(Debug, Args)]
struct PrefsArgs {
    /// New display name.
    #[arg(long)]
    name: Option<String>,
    /// New initial balance.
    #[arg(long, value_name = "AMOUNT", allow_negative_numbers = true)]
    initial_balance: Option<f64>,
    /// New currency code (USD, PKR).
    #[arg(long)]
    currency: Option<Currency>,
    /// New colour scheme (light, dark, system).
    #[arg(long)]
    theme: Option<ThemePreference>,
}

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses an RFC 3339 timestamp, or a bare date taken as midnight UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at);
    }
    let day = parse_date(s)?;
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc().fixed_offset())
        .ok_or_else(|| format!("invalid date: {s}"))
}

/// Formats a timestamp the way stored transactions carry it.
fn format_timestamp<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an amount with the currency symbol and two decimals.
fn format_money(currency: Currency, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency.symbol(), amount.abs())
    } else {
        format!("{}{amount:.2}", currency.symbol())
    }
}

/// Formats a balance contribution, marking positive values with `+`.
fn format_signed_money(currency: Currency, amount: f64) -> String {
    if amount > 0.0 {
        format!("+{}", format_money(currency, amount))
    } else {
        format_money(currency, amount)
    }
}

/// Picks the data directory: flag, then environment, then `None` for the
/// platform default.
fn resolve_data_dir(flag: Option<PathBuf>, env: Option<OsString>) -> Option<PathBuf> {
    flag.or_else(|| env.filter(|dir| !dir.is_empty()).map(PathBuf::from))
}

/// Creates the storage backend in the resolved data directory.
fn create_storage(data_dir: Option<PathBuf>) -> fintrack_rs::error::Result<FileStorage> {
    let dir = match resolve_data_dir(data_dir, std::env::var_os(DATA_DIR_ENV)) {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Writes an `error:` line to stderr.
fn report_error(message: &str) -> io::Result<()> {
    writeln!(io::stderr().lock(), "{} {message}", "error:".red().bold())
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    let _dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            report_error(&format!("failed to initialize storage: {err}"))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut app = match FinTrack::hydrate_blocking(storage) {
        Ok(app) => app,
        Err(err) => {
            report_error(&format!("failed to load state: {err}"))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let code = dispatch(&mut app, cli.command);
    app.flush_blocking();
    code
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(app: &mut FinTrack, command: Command) -> io::Result<ExitCode> {
    let needs_onboarding = matches!(
        command,
        Command::Add(_) | Command::Balance | Command::History(_) | Command::Analytics
    );
    if needs_onboarding && !app.onboarding_complete() {
        report_error("finish onboarding first: fintrack setup --name <NAME>")?;
        return Ok(ExitCode::FAILURE);
    }
    match command {
        Command::Setup(args) => cmd_setup(app, args),
        Command::Add(args) => cmd_add(app, args, Utc::now()),
        Command::Balance => cmd_balance(app),
        Command::History(args) => cmd_history(app, &args),
        Command::Analytics => cmd_analytics(app),
        Command::Prefs(args) => cmd_prefs(app, args),
        Command::Reset { all } => cmd_reset(app, all),
    }
}

/// Rejects non-finite balances typed on the command line.
fn check_balance(balance: Option<f64>) -> Result<(), String> {
    match balance {
        Some(value) if !value.is_finite() => Err("please enter a valid number".to_owned()),
        Some(_) | None => Ok(()),
    }
}

/// Executes the `setup` subcommand.
fn cmd_setup(app: &mut FinTrack, args: SetupArgs) -> io::Result<ExitCode> {
    let name = args.name.trim();
    if name.is_empty() {
        report_error("name cannot be empty")?;
        return Ok(ExitCode::FAILURE);
    }
    if let Err(message) = check_balance(args.initial_balance) {
        report_error(&message)?;
        return Ok(ExitCode::FAILURE);
    }
    let mut patch = PreferencesPatch::new().display_name(name);
    patch.initial_balance = args.initial_balance;
    patch.currency = args.currency;
    patch.theme = args.theme;
    app.set_preferences(patch);

    let mut out = io::stdout().lock();
    writeln!(out, "{} {}", "Welcome,".green().bold(), name.bold())?;
    print_preferences(&mut out, app.preferences())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `add` subcommand, stamping the entry with `now` unless a
/// date was given.
fn cmd_add(app: &mut FinTrack, args: AddArgs, now: DateTime<Utc>) -> io::Result<ExitCode> {
    let category = args.category.trim();
    if let Err(err) = app.validate_entry(args.kind, args.amount, category) {
        report_error(&err.to_string())?;
        return Ok(ExitCode::FAILURE);
    }
    let occurred_at = args
        .date
        .as_ref()
        .map_or_else(|| format_timestamp(&now), format_timestamp);
    let mut transaction = Transaction::new(
        TransactionId::from_timestamp(now),
        args.kind,
        args.amount,
        category,
        occurred_at,
    );
    if let Some(note) = args.note {
        transaction = transaction.with_note(note);
    }
    let currency = app.preferences().currency;
    let amount = format_money(currency, transaction.amount);
    let kind = transaction.kind;
    app.append_transaction(transaction);

    writeln!(
        io::stdout().lock(),
        "{} {kind} of {amount} ({}). Balance: {}",
        "Recorded".green().bold(),
        category,
        format_money(currency, app.display_balance()).bold()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `balance` subcommand: the home screen.
fn cmd_balance(app: &FinTrack) -> io::Result<ExitCode> {
    let currency = app.preferences().currency;
    let ledger = app.ledger();
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}",
        format_args!("Hi, {}", app.preferences().display_name).bold()
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "Total Balance".cyan(),
        format_money(currency, app.display_balance()).bold()
    )?;
    writeln!(
        out,
        "  {} {}",
        "Income".cyan(),
        format_money(currency, ledger.total_income()).green()
    )?;
    writeln!(
        out,
        "  {} {}",
        "Expense".cyan(),
        format_money(currency, ledger.total_expense()).red()
    )?;
    writeln!(out)?;

    let recent: Vec<&Transaction> = app.recent(RECENT_LIMIT).collect();
    writeln!(out, "{}", "Recent Transactions".green().bold())?;
    if recent.is_empty() {
        writeln!(out, "{}", "No transactions yet.".dimmed())?;
    } else {
        writeln!(out, "{}", transactions_table(currency, &recent))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Builds a [`HistoryFilter`] from CLI arguments.
fn build_history_filter(args: &HistoryArgs) -> HistoryFilter {
    let mut filter = HistoryFilter::new();
    if let Some(kind) = args.kind {
        filter = filter.kind(kind);
    }
    if let Some(from) = args.from {
        filter = filter.date_from(from);
    }
    if let Some(to) = args.to {
        filter = filter.date_to(to);
    }
    if let Some(category) = args.category.as_deref() {
        filter = filter.category(category);
    }
    filter
}

/// Executes the `history` subcommand.
fn cmd_history(app: &FinTrack, args: &HistoryArgs) -> io::Result<ExitCode> {
    let currency = app.preferences().currency;
    let groups = app.history(&build_history_filter(args));
    print_history(&mut io::stdout().lock(), currency, &groups)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `analytics` subcommand.
fn cmd_analytics(app: &FinTrack) -> io::Result<ExitCode> {
    let currency = app.preferences().currency;
    let summary = app.summary();
    let mut out = io::stdout().lock();

    writeln!(out, "{}", "Income vs Expense".green().bold())?;
    writeln!(
        out,
        "  {} {} ({:.1}%)",
        "Income".cyan(),
        format_money(currency, summary.total_income).green(),
        summary.income_share
    )?;
    writeln!(
        out,
        "  {} {} ({:.1}%)",
        "Expense".cyan(),
        format_money(currency, summary.total_expense).red(),
        summary.expense_share
    )?;
    writeln!(out)?;

    let categories = app.expense_by_category();
    writeln!(out, "{}", "Expense by Category".green().bold())?;
    if categories.is_empty() {
        writeln!(out, "{}", "No expenses yet.".dimmed())?;
    } else {
        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(vec![
            Cell::new("Category").fg(Color::Cyan),
            Cell::new("Amount").fg(Color::Cyan),
        ]);
        for total in &categories {
            _ = table.add_row(vec![
                Cell::new(&total.category),
                Cell::new(format_money(currency, total.amount)).fg(Color::Red),
            ]);
        }
        writeln!(out, "{table}")?;
    }
    writeln!(out)?;

    let trend = app.monthly_trend();
    writeln!(out, "{}", "Monthly Trend".green().bold())?;
    if trend.is_empty() {
        writeln!(out, "{}", "No transactions yet.".dimmed())?;
    } else {
        let mut table = Table::new();
        _ = table.load_preset(UTF8_FULL);
        _ = table.set_header(vec![
            Cell::new("Month").fg(Color::Cyan),
            Cell::new("Income").fg(Color::Cyan),
            Cell::new("Expense").fg(Color::Cyan),
            Cell::new("Net").fg(Color::Cyan),
        ]);
        for month in &trend {
            _ = table.add_row(vec![
                Cell::new(&month.month),
                Cell::new(format_money(currency, month.income)).fg(Color::Green),
                Cell::new(format_money(currency, month.expense)).fg(Color::Red),
                Cell::new(format_money(currency, month.net())),
            ]);
        }
        writeln!(out, "{table}")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `prefs` subcommand: shows the record, or merges the given
/// fields into it.
fn cmd_prefs(app: &mut FinTrack, args: PrefsArgs) -> io::Result<ExitCode> {
    let name = args.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        report_error("name cannot be empty")?;
        return Ok(ExitCode::FAILURE);
    }
    if let Err(message) = check_balance(args.initial_balance) {
        report_error(&message)?;
        return Ok(ExitCode::FAILURE);
    }
    let patch = PreferencesPatch {
        display_name: name.map(str::to_owned),
        initial_balance: args.initial_balance,
        currency: args.currency,
        theme: args.theme,
    };
    let mut out = io::stdout().lock();
    if !patch.is_empty() {
        app.set_preferences(patch);
        writeln!(out, "{}", "Preferences updated".green().bold())?;
    }
    print_preferences(&mut out, app.preferences())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `reset` subcommand.
fn cmd_reset(app: &mut FinTrack, all: bool) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    if all {
        app.factory_reset();
        writeln!(
            out,
            "{} your data has been cleared. Run {} to start again.",
            "Reset complete:".green().bold(),
            "fintrack setup".bold()
        )?;
    } else {
        app.reset_transactions();
        writeln!(
            out,
            "{} all transactions deleted.",
            "Reset complete:".green().bold()
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints the preference record.
fn print_preferences<W: io::Write>(out: &mut W, prefs: &UserPreferences) -> io::Result<()> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    let name = if prefs.display_name.is_empty() {
        "\u{2014}"
    } else {
        prefs.display_name.as_str()
    };
    _ = table.add_row(vec![Cell::new("Name"), Cell::new(name)]);
    _ = table.add_row(vec![
        Cell::new("Initial balance"),
        Cell::new(format_money(prefs.currency, prefs.initial_balance)),
    ]);
    _ = table.add_row(vec![
        Cell::new("Currency"),
        Cell::new(format!("{} ({})", prefs.currency, prefs.currency.symbol())),
    ]);
    _ = table.add_row(vec![Cell::new("Theme"), Cell::new(prefs.theme)]);
    writeln!(out, "{table}")
}

/// Prints day groups, one table per day.
fn print_history<W: io::Write>(
    out: &mut W,
    currency: Currency,
    groups: &[DayGroup<'_>],
) -> io::Result<()> {
    if groups.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }
    for group in groups {
        writeln!(
            out,
            "{} {}",
            group.day.format("%A, %B %-d, %Y").to_string().green().bold(),
            format_args!("({})", format_money(currency, group.net())).dimmed()
        )?;
        writeln!(out, "{}", transactions_table(currency, &group.transactions))?;
    }
    Ok(())
}

/// Renders transactions as a table.
fn transactions_table(currency: Currency, txs: &[&Transaction]) -> Table {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Category").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Note").fg(Color::Cyan),
    ]);
    for tx in txs {
        let date = tx.occurred_at_parsed().map_or_else(
            || tx.occurred_at.clone(),
            |at| at.format("%Y-%m-%d %H:%M").to_string(),
        );
        let colour = match tx.kind {
            TransactionKind::Income => Color::Green,
            TransactionKind::Expense => Color::Red,
        };
        let amount_cell = Cell::new(format_signed_money(currency, tx.signed_amount())).fg(colour);
        _ = table.add_row(vec![
            Cell::new(date),
            Cell::new(&tx.category),
            amount_cell,
            Cell::new(tx.note.as_deref().unwrap_or("")),
        ]);
    }
    table
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself may be gone; nothing left to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fintrack_rs::write_through::WriteThrough;

    /// Creates an in-memory app that has finished onboarding.
    fn onboarded_app() -> FinTrack {
        let mut app = FinTrack::new(WriteThrough::detached());
        app.set_preferences(
            PreferencesPatch::new()
                .display_name("Alex")
                .initial_balance(100.0),
        );
        app
    }

    /// Builds `add` arguments.
    fn add_args(kind: TransactionKind, amount: f64, category: &str) -> AddArgs {
        AddArgs {
            kind,
            amount,
            category: category.to_owned(),
            note: None,
            date: None,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    // ── parsing tests ─────────────────────────────────────────────────

    #[test]
    fn parse_date_valid() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("01-15-2024").is_err());
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_bare_dates() {
        let full = parse_timestamp("2024-03-01T10:30:00+05:00").unwrap();
        assert_eq!(format_timestamp(&full), "2024-03-01T05:30:00.000Z");
        let bare = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(format_timestamp(&bare), "2024-03-01T00:00:00.000Z");
        assert!(parse_timestamp("soon").is_err());
    }

    #[test]
    fn cli_parses_add_command() {
        let cli = Cli::try_parse_from([
            "fintrack",
            "add",
            "expense",
            "--amount",
            "12.5",
            "--category",
            "food",
        ])
        .unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.kind, TransactionKind::Expense);
        assert!((args.amount - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn cli_rejects_unknown_kind() {
        assert!(
            Cli::try_parse_from(["fintrack", "add", "gift", "--amount", "1", "--category", "x"])
                .is_err()
        );
    }

    // ── configuration tests ───────────────────────────────────────────

    #[test]
    fn data_dir_flag_beats_environment() {
        let dir = resolve_data_dir(Some(PathBuf::from("/a")), Some(OsString::from("/b")));
        assert_eq!(dir, Some(PathBuf::from("/a")));
    }

    #[test]
    fn data_dir_from_environment() {
        let dir = resolve_data_dir(None, Some(OsString::from("/b")));
        assert_eq!(dir, Some(PathBuf::from("/b")));
        assert_eq!(resolve_data_dir(None, Some(OsString::new())), None);
        assert_eq!(resolve_data_dir(None, None), None);
    }

    #[test]
    fn create_storage_with_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(Some(dir.path().to_path_buf()));
        assert!(storage.is_ok());
    }

    // ── formatting tests ──────────────────────────────────────────────

    #[test]
    fn format_money_uses_symbol() {
        assert_eq!(format_money(Currency::Usd, 12.5), "$12.50");
        assert_eq!(format_money(Currency::Usd, -3.0), "-$3.00");
        assert_eq!(format_money(Currency::Pkr, 0.0), "\u{20a8}0.00");
    }

    #[test]
    fn transactions_table_signs_amounts_once() {
        let income = Transaction::new(
            TransactionId::from("1"),
            TransactionKind::Income,
            5.0,
            "salary",
            "2024-03-01T10:00:00Z",
        );
        let expense = Transaction::new(
            TransactionId::from("2"),
            TransactionKind::Expense,
            3.0,
            "food",
            "2024-03-01T11:00:00Z",
        );
        let negative_income = Transaction::new(
            TransactionId::from("3"),
            TransactionKind::Income,
            -3.0,
            "refund",
            "2024-03-01T12:00:00Z",
        );
        let negative_expense = Transaction::new(
            TransactionId::from("4"),
            TransactionKind::Expense,
            -7.0,
            "refund",
            "2024-03-01T13:00:00Z",
        );
        let rendered = transactions_table(
            Currency::Usd,
            &[&income, &expense, &negative_income, &negative_expense],
        )
        .to_string();
        assert!(rendered.contains("+$5.00"));
        assert!(rendered.contains("-$3.00"));
        assert!(rendered.contains("+$7.00"));
        assert!(!rendered.contains("+-"));
        assert!(!rendered.contains("--$"));
        assert_eq!(format_signed_money(Currency::Usd, 0.0), "$0.00");
    }

    #[test]
    fn history_filter_from_args() {
        let args = HistoryArgs {
            kind: Some(TransactionKind::Income),
            from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            to: None,
            category: Some("salary".to_owned()),
        };
        let filter = build_history_filter(&args);
        assert_eq!(filter.kind, Some(TransactionKind::Income));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(filter.date_to.is_none());
        assert_eq!(filter.category.as_deref(), Some("salary"));
    }

    #[test]
    fn print_history_renders_days() {
        let mut app = onboarded_app();
        app.append_transaction(Transaction::new(
            TransactionId::from("1"),
            TransactionKind::Income,
            50.0,
            "salary",
            "2024-03-01T10:00:00.000Z",
        ));
        let mut buf = Vec::new();
        print_history(&mut buf, Currency::Usd, &app.history(&HistoryFilter::new())).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("March 1, 2024"));
        assert!(text.contains("salary"));
    }

    // ── command tests ─────────────────────────────────────────────────

    #[test]
    fn gated_commands_require_onboarding() {
        let mut app = FinTrack::new(WriteThrough::detached());
        let code = dispatch(&mut app, Command::Balance).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        let code = dispatch(&mut app, Command::Analytics).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn setup_completes_onboarding() {
        let mut app = FinTrack::new(WriteThrough::detached());
        let args = SetupArgs {
            name: "  Sam ".to_owned(),
            initial_balance: Some(250.0),
            currency: Some(Currency::Usd),
            theme: None,
        };
        assert_eq!(cmd_setup(&mut app, args).unwrap(), ExitCode::SUCCESS);
        assert!(app.onboarding_complete());
        assert_eq!(app.preferences().display_name, "Sam");
        assert_eq!(app.preferences().theme, ThemePreference::System);
        assert_eq!(dispatch(&mut app, Command::Balance).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn setup_rejects_blank_name() {
        let mut app = FinTrack::new(WriteThrough::detached());
        let args = SetupArgs {
            name: "   ".to_owned(),
            initial_balance: None,
            currency: None,
            theme: None,
        };
        assert_eq!(cmd_setup(&mut app, args).unwrap(), ExitCode::FAILURE);
        assert!(!app.onboarding_complete());
    }

    #[test]
    fn add_records_transaction() {
        let mut app = onboarded_app();
        let mut args = add_args(TransactionKind::Expense, 40.0, " food ");
        args.note = Some("lunch".to_owned());
        assert_eq!(cmd_add(&mut app, args, fixed_now()).unwrap(), ExitCode::SUCCESS);
        let tx = app.ledger().transactions().first().unwrap();
        assert_eq!(tx.id.as_inner(), "1700000000000");
        assert_eq!(tx.category, "food");
        assert_eq!(tx.note.as_deref(), Some("lunch"));
        assert_eq!(tx.occurred_at, "2023-11-14T22:13:20.000Z");
        assert!((app.display_balance() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn add_rejects_overdraft_and_bad_amounts() {
        let mut app = onboarded_app();
        for args in [
            add_args(TransactionKind::Expense, 100.01, "food"),
            add_args(TransactionKind::Income, 0.0, "salary"),
            add_args(TransactionKind::Income, 5.0, ""),
        ] {
            assert_eq!(cmd_add(&mut app, args, fixed_now()).unwrap(), ExitCode::FAILURE);
        }
        assert!(app.ledger().is_empty());
    }

    #[test]
    fn prefs_updates_only_given_fields() {
        let mut app = onboarded_app();
        let args = PrefsArgs {
            name: None,
            initial_balance: None,
            currency: None,
            theme: Some(ThemePreference::Dark),
        };
        assert_eq!(cmd_prefs(&mut app, args).unwrap(), ExitCode::SUCCESS);
        assert_eq!(app.preferences().theme, ThemePreference::Dark);
        assert_eq!(app.preferences().display_name, "Alex");
    }

    #[test]
    fn prefs_rejects_non_finite_balance() {
        let mut app = onboarded_app();
        let args = PrefsArgs {
            name: None,
            initial_balance: Some(f64::INFINITY),
            currency: None,
            theme: None,
        };
        assert_eq!(cmd_prefs(&mut app, args).unwrap(), ExitCode::FAILURE);
        assert!((app.preferences().initial_balance - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_keeps_or_clears_preferences() {
        let mut app = onboarded_app();
        app.append_transaction(Transaction::new(
            TransactionId::from("1"),
            TransactionKind::Income,
            1.0,
            "other",
            "2024-01-01T00:00:00Z",
        ));
        assert_eq!(cmd_reset(&mut app, false).unwrap(), ExitCode::SUCCESS);
        assert!(app.ledger().is_empty());
        assert!(app.onboarding_complete());
        assert_eq!(cmd_reset(&mut app, true).unwrap(), ExitCode::SUCCESS);
        assert!(!app.onboarding_complete());
    }

    #[test]
    fn history_and_analytics_succeed_with_data() {
        let mut app = onboarded_app();
        app.append_transaction(Transaction::new(
            TransactionId::from("1"),
            TransactionKind::Expense,
            10.0,
            "transport",
            "2024-02-02T08:00:00Z",
        ));
        let args = HistoryArgs {
            kind: None,
            from: None,
            to: None,
            category: None,
        };
        assert_eq!(cmd_history(&app, &args).unwrap(), ExitCode::SUCCESS);
        assert_eq!(cmd_analytics(&app).unwrap(), ExitCode::SUCCESS);
    }
}

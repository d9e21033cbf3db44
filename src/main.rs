use anyhow::Context;
use browser::TableBrowser;
use catalog::ReportCatalog;
use clap::{Parser, Subcommand};
use configuration::{Logging, Settings};
use database::{DbError, PgSession};
use forms::{EntityKind, FieldValues};
use std::collections::BTreeMap;
use std::path::PathBuf;

mod render;

/// The main entry point for the Courier Desk application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Listing commands work without a usable configuration, so a load failure
    // only surfaces once a command needs the database.
    let settings = configuration::load_config_from(&cli.config);
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_else(|_| Logging::default());
    let _log_guard = configuration::init_tracing(&logging)?;
    if let Err(err) = &settings {
        tracing::debug!(error = %err, "Configuration not loaded.");
    }

    let catalog = ReportCatalog::global();
    match cli.command {
        Commands::Tables => {
            let tables = TableBrowser::default().tables();
            if cli.json {
                render::json(tables)?;
            } else {
                render::list(&tables.iter().map(|t| t.as_str()).collect::<Vec<_>>());
            }
        }
        Commands::Table { name } => {
            let settings = settings?;
            let browser = TableBrowser::new(settings.browser.max_rows);
            browser.statement(&name)?;

            let mut session = open_session(&settings).await?;
            let result = after_close(browser.fetch_table(&mut session, &name).await, session).await;
            output_result(&result?, cli.json)?;
        }
        Commands::Sections => {
            let sections = catalog.list_sections();
            if cli.json {
                render::json(&sections)?;
            } else {
                render::list(&sections);
            }
        }
        Commands::Reports { section } => {
            let titles = catalog.list_reports(&section)?;
            if cli.json {
                render::json(&titles)?;
            } else {
                render::list(&titles);
            }
        }
        Commands::Run(args) => {
            let settings = settings?;
            let params: BTreeMap<String, String> = args.params.into_iter().collect();
            let report = catalog.report(&args.section, &args.title)?;
            let statement = if params.is_empty() { report.describe() } else { report.bind(&params)? };
            if args.show_sql && !cli.json {
                render::report_header(report);
                render::statement(&statement);
            }

            let mut session = open_session(&settings).await?;
            let result = catalog
                .run_report_with(&mut session, &args.section, &args.title, &params)
                .await;
            let result = after_close(result, session).await;
            output_result(&result?, cli.json)?;
        }
        Commands::Charts => {
            if cli.json {
                render::json(catalog.charts())?;
            } else {
                render::charts(catalog.charts());
            }
        }
        Commands::Chart { id } => {
            let settings = settings?;
            catalog.chart(&id)?;

            let mut session = open_session(&settings).await?;
            let data = after_close(catalog.chart_data(&mut session, &id).await, session).await?;
            if cli.json {
                render::json(&data)?;
            } else {
                render::chart(&data);
            }
        }
        Commands::Forms => {
            if cli.json {
                render::json(forms::schemas())?;
            } else {
                render::schemas(forms::schemas());
            }
        }
        Commands::Insert(args) => {
            let settings = settings?;
            let kind: EntityKind = args.entity.parse()?;
            let values: FieldValues = args.fields.into_iter().collect();
            let record = forms::validate(kind, &values)?;
            let transaction = forms::build_transaction(kind, &record)?;

            let mut session = open_session(&settings).await?;
            let rows = after_close(forms::submit(&mut session, &transaction).await, session).await?;
            if cli.json {
                render::json(&serde_json::json!({ "entity": kind, "rows": rows }))?;
            } else {
                println!("Inserted {rows} row(s) for {kind}.");
            }
        }
        Commands::Serve => {
            web_server::run_server(settings?).await?;
        }
    }

    Ok(())
}

async fn open_session(settings: &Settings) -> anyhow::Result<PgSession> {
    database::connect(&settings.database)
        .await
        .with_context(|| format!("could not connect to database '{}'", settings.database.database))
}

/// Closes the action's session and hands back the action's own result. A
/// failed close is only logged so it never hides what the action returned.
async fn after_close<T>(result: T, session: PgSession) -> T {
    keep_result(result, session.close().await)
}

fn keep_result<T>(result: T, closed: Result<(), DbError>) -> T {
    if let Err(err) = closed {
        tracing::warn!(error = %err, "Failed to close database session.");
    }
    result
}

fn output_result(result: &core_types::QueryResult, json: bool) -> anyhow::Result<()> {
    if json {
        render::json(result)
    } else {
        render::result(result);
        Ok(())
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Courier management dashboard: browse tables, run reports and insert records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file. Settings can also come from `COURIER__*` variables.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the browsable tables.
    Tables,
    /// Show the rows of one table.
    Table {
        /// Table name, e.g. "courier".
        name: String,
    },
    /// List the report sections.
    Sections,
    /// List the reports of one section.
    Reports {
        section: String,
    },
    /// Run one report.
    Run(RunArgs),
    /// List the chart definitions.
    Charts,
    /// Show the data points of one chart.
    Chart {
        id: String,
    },
    /// Describe the insert forms.
    Forms,
    /// Insert a record (branch, vehicle, employee or feedback).
    Insert(InsertArgs),
    /// Start the JSON API server.
    Serve,
}

#[derive(Parser)]
struct RunArgs {
    #[arg(long)]
    section: String,

    #[arg(long)]
    title: String,

    /// Override a report parameter, e.g. `--param month=3`. Repeatable.
    #[arg(long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Print the statement and its bound parameters before the result.
    #[arg(long)]
    show_sql: bool,
}

#[derive(Parser)]
struct InsertArgs {
    entity: String,

    /// A field value, e.g. `--field city=Valsad`. Repeatable.
    #[arg(long = "field", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn close_failure_never_replaces_the_action_result() {
        let closed = || Err(DbError::ConnectionError("connection reset".into()));

        let failed: Result<u64, DbError> = Err(DbError::QueryError("relation \"feedback\" does not exist".into()));
        assert_eq!(
            keep_result(failed, closed()),
            Err(DbError::QueryError("relation \"feedback\" does not exist".into()))
        );

        let inserted: Result<u64, DbError> = Ok(2);
        assert_eq!(keep_result(inserted, closed()), Ok(2));
    }

    #[test]
    fn key_value_pairs_split_on_the_first_equals_sign() {
        assert_eq!(
            parse_key_value("comment=late = lost").unwrap(),
            ("comment".to_string(), "late = lost".to_string())
        );
        assert!(parse_key_value("city").is_err());
        assert!(parse_key_value("=Surat").is_err());
    }

    #[test]
    fn run_collects_repeated_params() {
        let cli = Cli::try_parse_from([
            "courier-desk",
            "run",
            "--section",
            "Correlated queries",
            "--title",
            "Some report",
            "--param",
            "month=3",
            "--param",
            "year=2024",
            "--show-sql",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert!(args.show_sql);
        assert_eq!(args.params.len(), 2);
    }
}

//! configdns CLI
//!
//! Command-line access to zones behind the legacy zone API: inspect a zone,
//! edit its records and save the result.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};

use configdns::logging::{init_logging, LogOptions};
use configdns::{
    ClientConfig, DnsRecord, FieldValue, HttpZoneGateway, RecordType, SaveOptions, Zone, ZoneError,
    ZoneGateway,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// configdns - manage Edge DNS zones from the command line
#[derive(Parser)]
#[command(name = "configdns")]
#[command(version)]
#[command(about = "Legacy Edge DNS zone API client", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long, env = "CONFIGDNS_CONFIG")]
    config: Option<PathBuf>,

    /// API host, overrides the configuration file
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Authorization header value, overrides the configuration file
    #[arg(short = 'a', long)]
    auth: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// No color output
    #[arg(long)]
    no_color: bool,

    /// Submit the SOA serial unchanged instead of advancing it
    #[arg(long)]
    keep_serial: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and create zones
    Zone {
        #[command(subcommand)]
        action: ZoneCommands,
    },

    /// Edit records of a zone
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },
}

#[derive(Subcommand)]
enum ZoneCommands {
    /// Show a zone as returned by the API
    Get {
        /// Zone name
        zone: String,
    },

    /// Create a zone with an SOA record and name servers
    New(NewZoneArgs),
}

#[derive(Args)]
struct NewZoneArgs {
    /// Zone name
    zone: String,

    /// Primary name server for the SOA record
    #[arg(long)]
    originserver: String,

    /// Hostmaster mailbox for the SOA record
    #[arg(long)]
    contact: String,

    /// Name servers for the zone apex, may be repeated
    #[arg(long = "ns")]
    nameservers: Vec<String>,

    #[arg(long, default_value = "900")]
    ttl: i64,

    #[arg(long, default_value = "900")]
    refresh: i64,

    #[arg(long, default_value = "300")]
    retry: i64,

    #[arg(long, default_value = "604800")]
    expire: i64,

    #[arg(long, default_value = "180")]
    minimum: i64,
}

#[derive(Subcommand)]
enum RecordCommands {
    /// List records in a zone
    List {
        /// Zone name
        zone: String,

        /// Only records of this type
        #[arg(short = 't', long)]
        record_type: Option<RecordType>,
    },

    /// Find records owned by a name
    Find {
        /// Zone name
        zone: String,

        /// Owner name
        name: String,

        /// Record types to search, all when omitted
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        types: Vec<RecordType>,
    },

    /// Insert or replace a record, taking over its name from CNAMEs
    Set(RecordEditArgs),

    /// Insert a record, failing on CNAME conflicts
    Add(RecordEditArgs),

    /// Remove all records owned by a name
    Remove {
        /// Zone name
        zone: String,

        /// Owner name
        name: String,

        /// Record types to remove, all when omitted
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        types: Vec<RecordType>,
    },
}

#[derive(Args)]
struct RecordEditArgs {
    /// Zone name
    zone: String,

    /// Record type
    #[arg(short = 't', long = "type")]
    record_type: RecordType,

    /// Field assignment such as name=www or ttl=300, may be repeated
    #[arg(short = 'f', long = "field", value_parser = parse_assignment)]
    fields: Vec<(String, String)>,

    /// Start from an empty zone if the API does not know it
    #[arg(long)]
    create: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got {:?}", raw)),
    }
}

/// Output formatter
struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    fn print_records(&self, records: &[&DnsRecord]) -> CliResult<()> {
        match self.format {
            OutputFormat::Table => {
                let mut table = Table::new();
                table.set_header(vec!["Type", "Name", "TTL", "Data"]);
                for record in records {
                    table.add_row(record_row(record));
                }
                println!("{}", table);
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                let values = records
                    .iter()
                    .map(|record| record_value(record))
                    .collect::<Result<Vec<_>, _>>()?;
                self.print_value(&Value::Array(values))?;
            }
        }
        Ok(())
    }

    fn print_zone(&self, zone: &Zone) -> CliResult<()> {
        match self.format {
            OutputFormat::Table => {
                let mut summary = Table::new();
                summary.set_header(vec!["Key", "Value"]);
                summary.add_row(vec!["Zone".to_string(), zone.name().to_string()]);
                summary.add_row(vec!["Token".to_string(), zone.token().to_string()]);
                summary.add_row(vec!["Records".to_string(), zone.record_count().to_string()]);
                if let Some(soa) = zone.soa() {
                    summary.add_row(vec!["Serial".to_string(), soa.serial().to_string()]);
                }
                println!("{}", summary);

                let records: Vec<&DnsRecord> = zone.records().into_iter().map(|found| found.record).collect();
                self.print_records(&records)
            }
            OutputFormat::Json | OutputFormat::Yaml => self.print_value(&serde_json::to_value(zone)?),
        }
    }

    fn print_value(&self, value: &Value) -> CliResult<()> {
        match self.format {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    fn print_success(&self, message: &str) {
        eprintln!("{} {}", "✓".green().bold(), message);
    }

    fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message);
    }
}

fn record_row(record: &DnsRecord) -> Vec<String> {
    let name = match record.name() {
        Some(name) if !name.is_empty() => name.to_string(),
        Some(_) | None => "@".to_string(),
    };
    let ttl = record
        .get_field("ttl")
        .map(|ttl| ttl.to_string())
        .unwrap_or_default();
    let data = record
        .fields()
        .into_iter()
        .filter(|(field, value)| {
            !matches!(*field, "name" | "ttl")
                && !matches!(value, FieldValue::Null | FieldValue::Int(0) | FieldValue::Bool(false))
                && !matches!(value, FieldValue::Text(text) if text.is_empty())
        })
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(" ");

    vec![record.record_type().to_string(), name, ttl, data]
}

fn record_value(record: &DnsRecord) -> Result<Value, serde_json::Error> {
    let mut value = record.to_json()?;
    if let Value::Object(map) = &mut value {
        map.insert("type".to_string(), json!(record.record_type()));
    }
    Ok(value)
}

/// Spinner shown while waiting on the API
fn show_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn build_record(record_type: RecordType, fields: &[(String, String)]) -> CliResult<DnsRecord> {
    let mut record = DnsRecord::new(record_type);
    for (field, raw) in fields {
        let kind = record.kind_of(field).ok_or_else(|| {
            format!(
                "{} records have no field {:?} (allowed: {})",
                record_type,
                field,
                record_type.allowed_fields().join(", ")
            )
        })?;
        let value = kind
            .parse(raw)
            .ok_or_else(|| format!("field {:?} expects a {} value, got {:?}", field, kind.describe(), raw))?;
        record.set_field(field, value)?;
    }
    Ok(record)
}

struct App {
    config: ClientConfig,
    gateway: HttpZoneGateway,
    formatter: OutputFormatter,
    keep_serial: bool,
}

impl App {
    fn fetch(&self, zone: &str, create: bool) -> CliResult<Zone> {
        let pb = show_progress(&format!("Fetching zone {}...", zone));
        let result = self.gateway.fetch_zone(zone);
        pb.finish_and_clear();

        match result {
            Err(ZoneError::ZoneNotFound { .. }) if create => {
                self.formatter
                    .print_warning(&format!("Zone {} not found, starting from an empty zone", zone));
                Ok(Zone::new(zone))
            }
            other => Ok(other?),
        }
    }

    fn save(&self, zone: &mut Zone) -> CliResult<()> {
        let options = SaveOptions {
            poll: self.config.poll_policy(),
            cancel: None,
            bump_serial: !self.keep_serial,
        };

        let pb = show_progress(&format!("Saving zone {}...", zone.name()));
        let result = zone.save(&self.gateway, &options);
        pb.finish_and_clear();

        let report = result?;
        self.formatter.print_success(&format!(
            "Zone {} saved (token {} -> {}, {} poll(s) in {:.1?})",
            zone.name(),
            report.previous_token,
            zone.token(),
            report.polls,
            report.elapsed
        ));
        Ok(())
    }

    fn handle_zone(&self, action: ZoneCommands) -> CliResult<()> {
        match action {
            ZoneCommands::Get { zone } => {
                let zone = self.fetch(&zone, false)?;
                self.formatter.print_zone(&zone)
            }
            ZoneCommands::New(args) => {
                let mut zone = Zone::new(&args.zone);

                let mut soa = DnsRecord::new(RecordType::Soa);
                soa.set_field("originserver", args.originserver.as_str())?;
                soa.set_field("contact", args.contact.as_str())?;
                for (field, value) in [
                    ("ttl", args.ttl),
                    ("refresh", args.refresh),
                    ("retry", args.retry),
                    ("expire", args.expire),
                    ("minimum", args.minimum),
                ] {
                    soa.set_field(field, value)?;
                }
                zone.add_record(soa)?;

                for target in &args.nameservers {
                    let mut ns = DnsRecord::new(RecordType::Ns);
                    ns.set_field("target", target.as_str())?;
                    ns.set_field("ttl", args.ttl)?;
                    ns.set_field("active", true)?;
                    zone.add_record(ns)?;
                }

                self.save(&mut zone)?;
                self.formatter.print_zone(&zone)
            }
        }
    }

    fn handle_record(&self, action: RecordCommands) -> CliResult<()> {
        match action {
            RecordCommands::List { zone, record_type } => {
                let zone = self.fetch(&zone, false)?;
                let records: Vec<&DnsRecord> = zone
                    .records()
                    .into_iter()
                    .map(|found| found.record)
                    .filter(|record| record_type.map_or(true, |t| record.record_type() == t))
                    .collect();
                self.formatter.print_records(&records)
            }
            RecordCommands::Find { zone, name, types } => {
                let zone = self.fetch(&zone, false)?;
                let records: Vec<&DnsRecord> = zone
                    .find_records_by_name(&name, &types)
                    .into_iter()
                    .map(|found| found.record)
                    .collect();
                if records.is_empty() {
                    self.formatter.print_warning(&format!("No records named {:?}", name));
                }
                self.formatter.print_records(&records)
            }
            RecordCommands::Set(args) => {
                let record = build_record(args.record_type, &args.fields)?;
                let mut zone = self.fetch(&args.zone, args.create)?;
                zone.set_record(record);
                self.save(&mut zone)
            }
            RecordCommands::Add(args) => {
                let record = build_record(args.record_type, &args.fields)?;
                let mut zone = self.fetch(&args.zone, args.create)?;
                zone.add_record(record)?;
                self.save(&mut zone)
            }
            RecordCommands::Remove { zone, name, types } => {
                let mut zone = self.fetch(&zone, false)?;
                let removed = zone.remove_records_by_name(&name, &types);
                if removed == 0 {
                    self.formatter.print_warning(&format!("No records named {:?}, nothing to save", name));
                    return Ok(());
                }
                self.formatter
                    .print_success(&format!("Removed {} record(s) named {:?}", removed, name));
                self.save(&mut zone)
            }
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match cli.config.as_deref() {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(auth) = cli.auth {
        config.auth_header = Some(auth);
    }
    config.validate()?;

    let level = if cli.verbose { "debug".to_string() } else { config.log_level.clone() };
    init_logging(&LogOptions {
        level,
        json: config.json_logs,
    });

    let app = App {
        gateway: HttpZoneGateway::new(&config)?,
        formatter: OutputFormatter::new(cli.output, cli.no_color),
        keep_serial: cli.keep_serial,
        config,
    };

    match cli.command {
        Commands::Zone { action } => app.handle_zone(action),
        Commands::Record { action } => app.handle_record(action),
    }
}

fn main() {
    let cli = Cli::parse();
    let no_color = cli.no_color;

    if let Err(e) = run(cli) {
        OutputFormatter::new(OutputFormat::Table, no_color).print_error(&e.to_string());
        std::process::exit(1);
    }
}

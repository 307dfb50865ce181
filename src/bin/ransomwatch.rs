//! ransomwatch CLI
//!
//! Company management, feed checks and alert triage from the command line.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use ransomwatch::keyword;
use ransomwatch::{
    Alert, AlertFilter, AlertId, AlertStatus, CompanyId, RecencyWindow, WatchConfig, WatchSession,
};

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ransomwatch=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = WatchConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" => {
                config.data_dir = PathBuf::from(value_of(&args, i, "--data-dir")?);
                i += 2;
            }
            "--feed-url" => {
                config.feed_url = value_of(&args, i, "--feed-url")?.to_string();
                i += 2;
            }
            "--timeout-secs" => {
                let secs: u64 = value_of(&args, i, "--timeout-secs")?
                    .parse()
                    .map_err(|_| format!("invalid timeout: {}", args[i + 1]))?;
                config.fetch_timeout = Duration::from_secs(secs);
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => break,
        }
    }

    let command = &args[i..];
    let Some(first) = command.first() else {
        print_help();
        return Err("a command is required".into());
    };

    let mut session = WatchSession::open(config)?;
    for warning in session.load_warnings() {
        eprintln!("warning: {warning}");
    }

    match first.as_str() {
        "company" => run_company(&mut session, &command[1..]),
        "fetch" => run_fetch(&mut session, &command[1..]),
        "alerts" => run_alerts(&mut session, &command[1..]),
        other => Err(format!("unknown command: {other} (try --help)").into()),
    }
}

fn print_help() {
    println!("ransomwatch v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    ransomwatch [OPTIONS] <COMMAND>");
    println!();
    println!("OPTIONS:");
    println!("    --data-dir <DIR>         Data directory [default: .]");
    println!("    --feed-url <URL>         Disclosure feed endpoint");
    println!("    --timeout-secs <SECS>    Feed request timeout [default: 60]");
    println!("    -h, --help               Print help information");
    println!();
    println!("COMMANDS:");
    println!("    company add --name <NAME> [--description <TEXT>]");
    println!("                [--keywords <A,B>] [--keywords-file <FILE>]");
    println!("    company list");
    println!("    company rename --id <ID> --name <NAME>");
    println!("    company describe --id <ID> --description <TEXT>");
    println!("    company add-keywords --id <ID> [--keywords <A,B>] [--keywords-file <FILE>]");
    println!("    company remove-keyword --id <ID> --keyword <KEYWORD>");
    println!("    company remove --id <ID>");
    println!("    fetch [--window <DAYS|all>]");
    println!("    alerts [--company <NAME>] [--status <STATUS>] [--window <DAYS|all>]");
    println!("    alerts set-status --id <ID> --status <STATUS>");
    println!("    alerts bulk-status --ids <ID,ID,..> --status <STATUS>");
    println!("    alerts delete --id <ID>");
    println!();
    println!("Statuses: Open, In Progress, Complete, False Positive");
    let presets = RecencyWindow::PRESETS.map(|n| n.to_string()).join(", ");
    println!("Windows:  a day count such as {presets}, or 'all'");
}

// ---- company commands ------------------------------------------------------

fn run_company(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    match args.first().map(String::as_str) {
        Some("add") => company_add(session, &args[1..]),
        Some("list") => {
            company_list(session);
            Ok(())
        }
        Some("rename") => company_rename(session, &args[1..]),
        Some("describe") => company_describe(session, &args[1..]),
        Some("add-keywords") => company_add_keywords(session, &args[1..]),
        Some("remove-keyword") => company_remove_keyword(session, &args[1..]),
        Some("remove") => company_remove(session, &args[1..]),
        _ => Err("usage: company <add|list|rename|describe|add-keywords|remove-keyword|remove>".into()),
    }
}

fn company_add(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut name = None;
    let mut description = String::new();
    let mut inline = Vec::new();
    let mut files = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--name" => {
                name = Some(value_of(args, i, "--name")?.to_string());
                i += 2;
            }
            "--description" => {
                description = value_of(args, i, "--description")?.to_string();
                i += 2;
            }
            "--keywords" => {
                inline.push(value_of(args, i, "--keywords")?.to_string());
                i += 2;
            }
            "--keywords-file" => {
                files.push(PathBuf::from(value_of(args, i, "--keywords-file")?));
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    let name = name.ok_or("--name is required")?;
    let keywords = gather_keywords(&inline, &files)?;
    let id = session.add_company(&name, &description, keywords)?;
    println!("Registered '{name}' [{id}]");
    Ok(())
}

fn company_list(session: &WatchSession) {
    let mut companies: Vec<_> = session.companies().iter().collect();
    companies.sort_by_key(|c| c.name.to_lowercase());

    if companies.is_empty() {
        println!("No companies registered");
        return;
    }

    println!("Monitored companies ({}):", companies.len());
    for company in companies {
        println!("  {}  [{}]", company.name, company.id);
        println!("      keywords: {}", company.keywords.join(", "));
        if !company.description.is_empty() {
            println!("      note: {}", company.description);
        }
    }
}

fn company_rename(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let (id, value) = id_and_value(args, "--name")?;
    session.rename_company(id, &value)?;
    println!("Renamed company to '{value}'");
    Ok(())
}

fn company_describe(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let (id, value) = id_and_value(args, "--description")?;
    session.set_company_description(id, &value)?;
    println!("Description updated");
    Ok(())
}

fn company_add_keywords(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut id = None;
    let mut inline = Vec::new();
    let mut files = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                id = Some(parse_company_id(value_of(args, i, "--id")?)?);
                i += 2;
            }
            "--keywords" => {
                inline.push(value_of(args, i, "--keywords")?.to_string());
                i += 2;
            }
            "--keywords-file" => {
                files.push(PathBuf::from(value_of(args, i, "--keywords-file")?));
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    let id = id.ok_or("--id is required")?;
    let keywords = gather_keywords(&inline, &files)?;
    if keywords.is_empty() {
        return Err("no keywords given".into());
    }
    let total = session.add_company_keywords(id, keywords)?;
    println!("Keyword set now holds {total} keyword(s)");
    Ok(())
}

fn company_remove_keyword(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let (id, value) = id_and_value(args, "--keyword")?;
    if session.remove_company_keyword(id, &value)? {
        println!("Removed keyword '{}'", value.trim().to_lowercase());
    } else {
        println!("Keyword '{value}' was not in the set");
    }
    Ok(())
}

fn company_remove(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let id = lone_id(args)?;
    let removal = session.remove_company(id)?;
    println!(
        "Removed '{}' and {} associated alert(s)",
        removal.company.name, removal.dropped_alerts
    );
    Ok(())
}

// ---- feed command ----------------------------------------------------------

fn run_fetch(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut window = RecencyWindow::AllTime;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--window" => {
                window = parse_window(value_of(args, i, "--window")?)?;
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    if session.companies().is_empty() {
        println!("No companies registered; nothing to match against");
        return Ok(());
    }

    println!("Checking feed ({window})...");
    let report = session.check_feed(window)?;
    println!("Fetched {} feed entries", report.entries_fetched);
    if report.new_alerts > 0 {
        println!("{} new alert(s) created", report.new_alerts);
    } else {
        println!("No new alerts");
    }
    Ok(())
}

// ---- alert commands --------------------------------------------------------

fn run_alerts(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    match args.first().map(String::as_str) {
        Some("set-status") => alerts_set_status(session, &args[1..]),
        Some("bulk-status") => alerts_bulk_status(session, &args[1..]),
        Some("delete") => alerts_delete(session, &args[1..]),
        _ => alerts_list(session, args),
    }
}

fn alerts_list(session: &WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut filter = AlertFilter::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--company" => {
                filter.company_name = Some(value_of(args, i, "--company")?.to_string());
                i += 2;
            }
            "--status" => {
                filter.status = Some(value_of(args, i, "--status")?.parse::<AlertStatus>()?);
                i += 2;
            }
            "--window" => {
                filter.window = parse_window(value_of(args, i, "--window")?)?;
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    let view = session.alerts_view(&filter);
    let open = view.iter().filter(|a| a.is_open()).count();
    println!("{} alert(s) shown, {} open", view.len(), open);
    for alert in view {
        render_alert(alert);
    }
    Ok(())
}

fn render_alert(alert: &Alert) {
    println!();
    println!(
        "[{}] {} - keyword '{}'",
        alert.status, alert.company_name, alert.matched_keyword
    );
    println!("    victim:   {}", alert.snapshot.display_name);
    println!(
        "    group:    {} | reported: {}",
        alert.snapshot.group, alert.snapshot.reported_date
    );
    if alert.snapshot.domain != "N/A" {
        println!("    domain:   {}", alert.snapshot.domain);
    }
    if alert.snapshot.source_url != "N/A" {
        println!("    source:   {}", alert.snapshot.source_url);
    }
    if alert.snapshot.summary != "N/A" {
        println!("    summary:  {}", alert.snapshot.summary);
    }
    println!(
        "    detected: {}",
        alert.detected_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("    id:       {}", alert.id);
}

fn alerts_set_status(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut id = None;
    let mut status = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                id = Some(parse_alert_id(value_of(args, i, "--id")?)?);
                i += 2;
            }
            "--status" => {
                status = Some(value_of(args, i, "--status")?.parse::<AlertStatus>()?);
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    let id = id.ok_or("--id is required")?;
    let status = status.ok_or("--status is required")?;
    session.set_alert_status(id, status.clone())?;
    println!("Alert {id} is now {status}");
    Ok(())
}

fn alerts_bulk_status(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut ids: Vec<AlertId> = Vec::new();
    let mut status = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--ids" => {
                for raw in value_of(args, i, "--ids")?.split(',') {
                    let raw = raw.trim();
                    if !raw.is_empty() {
                        ids.push(parse_alert_id(raw)?);
                    }
                }
                i += 2;
            }
            "--status" => {
                status = Some(value_of(args, i, "--status")?.parse::<AlertStatus>()?);
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    if ids.is_empty() {
        return Err("--ids is required".into());
    }
    let status = status.ok_or("--status is required")?;
    let updated = session.bulk_set_alert_status(&ids, &status)?;
    println!("Updated {updated} of {} alert(s) to {status}", ids.len());
    Ok(())
}

fn alerts_delete(session: &mut WatchSession, args: &[String]) -> Result<(), Box<dyn Error>> {
    let id = lone_alert_id(args)?;
    session.delete_alert(id)?;
    println!("Alert {id} deleted");
    Ok(())
}

// ---- shared helpers --------------------------------------------------------

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, Box<dyn Error>> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_company_id(raw: &str) -> Result<CompanyId, Box<dyn Error>> {
    Uuid::parse_str(raw)
        .map(CompanyId::from_uuid)
        .map_err(|_| format!("invalid company id: {raw}").into())
}

fn parse_alert_id(raw: &str) -> Result<AlertId, Box<dyn Error>> {
    Uuid::parse_str(raw)
        .map(AlertId::from_uuid)
        .map_err(|_| format!("invalid alert id: {raw}").into())
}

fn parse_window(raw: &str) -> Result<RecencyWindow, Box<dyn Error>> {
    raw.parse::<RecencyWindow>().map_err(Into::into)
}

/// Parses the common `--id <ID> <FLAG> <VALUE>` argument pair.
fn id_and_value(args: &[String], flag: &str) -> Result<(CompanyId, String), Box<dyn Error>> {
    let mut id = None;
    let mut value = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                id = Some(parse_company_id(value_of(args, i, "--id")?)?);
                i += 2;
            }
            f if f == flag => {
                value = Some(value_of(args, i, flag)?.to_string());
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    Ok((
        id.ok_or("--id is required")?,
        value.ok_or_else(|| format!("{flag} is required"))?,
    ))
}

fn lone_id(args: &[String]) -> Result<CompanyId, Box<dyn Error>> {
    let mut id = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                id = Some(parse_company_id(value_of(args, i, "--id")?)?);
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    id.ok_or_else(|| "--id is required".into())
}

fn lone_alert_id(args: &[String]) -> Result<AlertId, Box<dyn Error>> {
    let mut id = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--id" => {
                id = Some(parse_alert_id(value_of(args, i, "--id")?)?);
                i += 2;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    id.ok_or_else(|| "--id is required".into())
}

fn gather_keywords(inline: &[String], files: &[PathBuf]) -> Result<Vec<String>, Box<dyn Error>> {
    let mut keywords = Vec::new();
    for chunk in inline {
        keywords.extend(keyword::parse_inline(chunk));
    }
    for path in files {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        keywords.extend(keyword::parse_table(&contents));
    }
    Ok(keywords)
}

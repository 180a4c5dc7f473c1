//! Terminal front end for the roster core.
//!
//! # Responsibility
//! - Map one command line to one roster use-case.
//! - Print results as plain text; exit non-zero with a message on failure.

use log::info;
use rollcall_core::db::open_db;
use rollcall_core::model::normalize::{parse_gpa_text, parse_interests, parse_year_text};
use rollcall_core::query::stats::{
    branch_distribution, dashboard_stats, featured_interests, filter_options, gpa_class,
    gpa_distribution, validation_summary, year_distribution, Bucket,
};
use rollcall_core::{
    core_version, init_logging, logging_status, AddOutcome, CoreConfig, GpaClass, PromoteOutcome,
    Reconciliation, RosterService, Selection, SortKey, SqliteRosterRepository, StudentDraft,
    StudentId, StudentPatch, StudentQuery, StudentRecord,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: rollcall_cli [--config FILE] [--db FILE] <command>

commands:
  import FILE
  list [--search T] [--branch B] [--year N] [--sort KEY[:desc]]
  invalid
  stats
  add NAME BRANCH YEAR EMAIL GPA INTERESTS
  edit ID FIELD=VALUE...
  promote ID
  export [DIR] [--ids 1,2] [--search T] [--branch B] [--year N]
  mailto SUBJECT BODY (--ids 1,2 | --all)
  version";

struct GlobalArgs {
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    command: Vec<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let global = parse_global_args(args)?;
    let Some((command, rest)) = global.command.split_first() else {
        return Err(USAGE.to_string());
    };

    let config = match &global.config_path {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }
    if command == "version" {
        println!("rollcall_core version={}", core_version());
        match logging_status() {
            Some((level, dir)) => println!("logging={level} dir={}", dir.display()),
            None => println!("logging=off"),
        }
        return Ok(());
    }

    let db_path = global.db_path.unwrap_or_else(|| config.db_path.clone());
    let conn = open_db(&db_path).map_err(|err| err.to_string())?;
    let mut service = RosterService::open(SqliteRosterRepository::new(&conn), config.add_policy);
    info!("event=cli_command module=cli status=start command={command}");

    match command.as_str() {
        "import" => cmd_import(&mut service, rest),
        "list" => cmd_list(&service, rest),
        "invalid" => cmd_invalid(&service),
        "stats" => cmd_stats(&service),
        "add" => cmd_add(&mut service, rest),
        "edit" => cmd_edit(&mut service, rest),
        "promote" => cmd_promote(&mut service, rest),
        "export" => cmd_export(&service, rest),
        "mailto" => cmd_mailto(&service, rest),
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

fn parse_global_args(args: Vec<String>) -> Result<GlobalArgs, String> {
    let mut config_path = None;
    let mut db_path = None;
    let mut iter = args.into_iter();
    let mut command = Vec::new();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut iter, "--config")?)),
            "--db" => db_path = Some(PathBuf::from(flag_value(&mut iter, "--db")?)),
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => {
                command.push(arg);
                command.extend(iter);
                break;
            }
        }
    }

    Ok(GlobalArgs {
        config_path,
        db_path,
        command,
    })
}

fn flag_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next()
        .ok_or_else(|| format!("missing value for {flag}"))
}

type Service<'conn> = RosterService<SqliteRosterRepository<'conn>>;

fn cmd_import(service: &mut Service<'_>, args: &[String]) -> Result<(), String> {
    let [file] = args else {
        return Err("usage: import FILE".to_string());
    };
    let bytes = std::fs::read(file).map_err(|err| format!("failed to read `{file}`: {err}"))?;
    let file_name = Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.clone());
    let summary = service
        .import_spreadsheet(&file_name, &bytes)
        .map_err(|err| err.to_string())?;
    println!(
        "imported {} valid and {} invalid records",
        summary.valid, summary.invalid
    );
    Ok(())
}

fn cmd_list(service: &Service<'_>, args: &[String]) -> Result<(), String> {
    let query = parse_query(args)?;
    let rows = query.apply(service.store().valid());
    for record in &rows {
        print_record(record);
    }
    println!("{} of {} records", rows.len(), service.store().valid().len());
    Ok(())
}

fn parse_query(args: &[String]) -> Result<StudentQuery, String> {
    let mut query = StudentQuery::default();
    let mut iter = args.iter().cloned();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--search" => query.search = flag_value(&mut iter, "--search")?,
            "--branch" => query.branch = Some(flag_value(&mut iter, "--branch")?),
            "--year" => {
                let value = flag_value(&mut iter, "--year")?;
                query.year = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --year `{value}`"))?,
                );
            }
            "--sort" => {
                let value = flag_value(&mut iter, "--sort")?;
                let (key, desc) = match value.split_once(':') {
                    Some((key, "desc")) => (key, true),
                    Some((key, "asc")) => (key, false),
                    Some(_) => return Err(format!("invalid --sort `{value}`")),
                    None => (value.as_str(), false),
                };
                let key = SortKey::parse(key).ok_or_else(|| format!("unknown sort key `{key}`"))?;
                query.sort.clear();
                query.sort.toggle(key);
                if desc {
                    query.sort.toggle(key);
                }
            }
            other => return Err(format!("unexpected list argument `{other}`")),
        }
    }
    Ok(query)
}

fn cmd_invalid(service: &Service<'_>) -> Result<(), String> {
    for record in service.store().invalid() {
        print_record(record);
        if let Some(errors) = &record.validation_errors {
            for (field, message) in errors {
                println!("    {field}: {message}");
            }
        }
    }
    println!("{} invalid records", service.store().invalid().len());
    Ok(())
}

fn cmd_stats(service: &Service<'_>) -> Result<(), String> {
    let store = service.store();
    let stats = dashboard_stats(store.valid());
    let options = filter_options(store.valid());
    let summary = validation_summary(store);

    println!("total={}", stats.total);
    println!("average_gpa={:.2}", stats.average_gpa);
    println!("branches={}", stats.branches);
    println!("active={}", stats.active);
    println!("valid={} invalid={}", summary.valid, summary.invalid);
    println!("branch_options={}", options.branches.join(","));
    let years: Vec<String> = options.years.iter().map(i64::to_string).collect();
    println!("year_options={}", years.join(","));

    let valid: Vec<&StudentRecord> = store.valid().iter().collect();
    print_buckets("by_branch", &branch_distribution(&valid));
    print_buckets("by_year", &year_distribution(&valid));
    print_buckets("by_gpa", &gpa_distribution(&valid));
    Ok(())
}

fn print_buckets(name: &str, buckets: &[Bucket]) {
    let parts: Vec<String> = buckets
        .iter()
        .map(|bucket| format!("{}:{}", bucket.label, bucket.count))
        .collect();
    println!("{name}={}", parts.join(","));
}

fn cmd_add(service: &mut Service<'_>, args: &[String]) -> Result<(), String> {
    let [name, branch, year, email, gpa, interests] = args else {
        return Err("usage: add NAME BRANCH YEAR EMAIL GPA INTERESTS".to_string());
    };
    let draft = StudentDraft {
        name: name.clone(),
        branch: branch.clone(),
        year: year.clone(),
        email: email.clone(),
        gpa: gpa.clone(),
        interests: interests.clone(),
    };

    match service.add_new(&draft).map_err(|err| err.to_string())? {
        AddOutcome::Added(id) => println!("added student {id}"),
        AddOutcome::Quarantined { id, errors } => {
            println!("stored student {id} in the invalid list");
            for (field, message) in errors {
                println!("    {field}: {message}");
            }
        }
        AddOutcome::Rejected(errors) => {
            let details: Vec<String> = errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect();
            return Err(format!("student rejected\n  {}", details.join("\n  ")));
        }
    }
    Ok(())
}

fn cmd_edit(service: &mut Service<'_>, args: &[String]) -> Result<(), String> {
    let Some((id, assignments)) = args.split_first() else {
        return Err("usage: edit ID FIELD=VALUE...".to_string());
    };
    if assignments.is_empty() {
        return Err("usage: edit ID FIELD=VALUE...".to_string());
    }
    let id = parse_id(id)?;
    let mut patch = StudentPatch::default();
    for assignment in assignments {
        apply_assignment(&mut patch, assignment)?;
    }

    match service
        .update_by_id(id, &patch)
        .map_err(|err| err.to_string())?
    {
        Reconciliation::Updated => println!("updated student {id}"),
        Reconciliation::Promoted => println!("student {id} is now valid"),
        Reconciliation::StillInvalid(errors) | Reconciliation::Demoted(errors) => {
            println!("student {id} is in the invalid list");
            for (field, message) in errors {
                println!("    {field}: {message}");
            }
        }
    }
    Ok(())
}

fn apply_assignment(patch: &mut StudentPatch, assignment: &str) -> Result<(), String> {
    let Some((field, value)) = assignment.split_once('=') else {
        return Err(format!("expected FIELD=VALUE, got `{assignment}`"));
    };
    let value = value.to_string();
    match field.trim().to_ascii_lowercase().as_str() {
        "name" => patch.name = Some(value),
        "branch" => patch.branch = Some(value),
        "year" => patch.year = Some(parse_year_text(&value)),
        "email" => patch.email = Some(value),
        "phone" => patch.phone = Some(value),
        "skills" => patch.skills = Some(value),
        "status" => patch.status = Some(value),
        "gpa" => patch.gpa = Some(parse_gpa_text(&value)),
        "interests" => patch.interests = Some(parse_interests(&value)),
        "projects" => {
            patch.projects = Some(
                value
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid projects `{value}`"))?,
            )
        }
        other => return Err(format!("unknown field `{other}`")),
    }
    Ok(())
}

fn cmd_promote(service: &mut Service<'_>, args: &[String]) -> Result<(), String> {
    let [id] = args else {
        return Err("usage: promote ID".to_string());
    };
    let id = parse_id(id)?;
    match service
        .promote_if_valid(id)
        .map_err(|err| err.to_string())?
    {
        PromoteOutcome::Promoted => println!("student {id} is now valid"),
        PromoteOutcome::StillInvalid(errors) => {
            println!("student {id} still has errors");
            for (field, message) in errors {
                println!("    {field}: {message}");
            }
        }
    }
    Ok(())
}

fn cmd_export(service: &Service<'_>, args: &[String]) -> Result<(), String> {
    let (dir, query, selection) = parse_export_args(args)?;

    let file = service
        .export(&query, &selection)
        .map_err(|err| err.to_string())?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes)
        .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn parse_export_args(args: &[String]) -> Result<(PathBuf, StudentQuery, Selection), String> {
    let mut dir = PathBuf::from(".");
    let mut selection = Selection::new();
    let mut filter_args = Vec::new();
    let mut iter = args.iter().cloned();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ids" => selection = parse_selection(&flag_value(&mut iter, "--ids")?)?,
            "--search" | "--branch" | "--year" | "--sort" => {
                let value = flag_value(&mut iter, &arg)?;
                filter_args.push(arg);
                filter_args.push(value);
            }
            _ => dir = PathBuf::from(arg),
        }
    }
    Ok((dir, parse_query(&filter_args)?, selection))
}

fn cmd_mailto(service: &Service<'_>, args: &[String]) -> Result<(), String> {
    let mut positional = Vec::new();
    let mut selection = Selection::new();
    let mut iter = args.iter().cloned();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ids" => selection = parse_selection(&flag_value(&mut iter, "--ids")?)?,
            "--all" => {
                let everyone: Vec<&StudentRecord> = service.store().valid().iter().collect();
                selection.clear();
                selection.toggle_all(&everyone);
            }
            _ => positional.push(arg),
        }
    }
    let [subject, body] = positional.as_slice() else {
        return Err("usage: mailto SUBJECT BODY (--ids 1,2 | --all)".to_string());
    };

    let link = service
        .compose_mail(&mut selection, subject, body)
        .map_err(|err| err.to_string())?;
    println!("{link}");
    Ok(())
}

fn parse_selection(value: &str) -> Result<Selection, String> {
    let mut selection = Selection::new();
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let id = parse_id(token)?;
        if !selection.contains(id) {
            selection.toggle(id);
        }
    }
    Ok(selection)
}

fn parse_id(value: &str) -> Result<StudentId, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid student id `{value}`"))
}

fn print_record(record: &StudentRecord) {
    let tier = match record.gpa.map(gpa_class) {
        Some(GpaClass::Excellent) => "excellent",
        Some(GpaClass::Good) => "good",
        Some(GpaClass::NeedsImprovement) => "needs-improvement",
        None => "-",
    };
    println!(
        "{:>4}  {:<24} {:<12} year={:<2} gpa={:<5} ({tier}) {}  [{}]",
        record.id,
        record.name,
        record.branch,
        record.year_text(),
        record.gpa_text(),
        record.email,
        featured_interests(record).join(", ")
    );
}

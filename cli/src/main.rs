use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use common::tasks::{TaskDefinition, Weekday};
use log::LevelFilter;
use simplelog::{Config, SimpleLogger};
use std::path::Path;
use tasksmith_core::filesystem::{read_task_file, write_task_file};
use tasksmith_core::schtasks;
use tasksmith_core::tasks::builder::TaskBuilder;
use tasksmith_core::tasks::decode::decode;
use tasksmith_core::tasks::encode::{EncodePolicy, encode_with};
use tasksmith_core::tasks::error::TaskError;
use tasksmith_core::tasks::validate::validate;

#[derive(Parser)]
#[clap(author, version, about = "Work with Windows Task Scheduler XML", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Log informational messages
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a task XML file and print it as JSON
    Show {
        /// Path to the task XML file
        path: String,
    },
    /// Check a task XML file against the schema
    Validate {
        /// Path to the task XML file
        path: String,
    },
    /// Build a task and write its XML to a file
    Export {
        #[command(flatten)]
        task: TaskArgs,
        /// Destination file, prints to stdout when omitted
        #[arg(long)]
        output: Option<String>,
        /// Fill schtasks-safe default settings
        #[arg(long)]
        defaults: bool,
    },
    /// Build a task and register it with the scheduler
    Create {
        #[command(flatten)]
        task: TaskArgs,
        /// Overwrite an existing task of the same name
        #[arg(long)]
        force: bool,
        /// Register under the SYSTEM account
        #[arg(long)]
        run_as_system: bool,
        /// Account to run the task as
        #[arg(long)]
        user: Option<String>,
        /// Password for the account
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a registered task
    Delete {
        name: String,
        /// Do not prompt for confirmation
        #[arg(long)]
        force: bool,
    },
    /// Start a registered task now
    Run { name: String },
    /// Stop a running task
    End { name: String },
    /// Print the registered XML of a task
    Info { name: String },
    /// List registered tasks
    List {},
}

#[derive(clap::Args)]
struct TaskArgs {
    /// Registration name of the task
    #[arg(long)]
    name: String,
    /// Program to execute
    #[arg(long)]
    command: String,
    /// Arguments for the program
    #[arg(long)]
    arguments: Option<String>,
    /// Working directory for the program
    #[arg(long)]
    workdir: Option<String>,
    /// Author recorded in RegistrationInfo
    #[arg(long)]
    author: Option<String>,
    /// Description recorded in RegistrationInfo
    #[arg(long)]
    description: Option<String>,
    /// Trigger at every logon
    #[arg(long)]
    logon: bool,
    /// Trigger at boot
    #[arg(long)]
    boot: bool,
    /// Trigger daily, every N days
    #[arg(long)]
    daily: Option<u16>,
    /// Trigger weekly, every N weeks
    #[arg(long)]
    weekly: Option<u8>,
    /// Weekdays for the weekly schedule, comma separated
    #[arg(long)]
    days: Option<String>,
    /// Start boundary, format 2024-03-01T06:30:00
    #[arg(long)]
    start: Option<String>,
    /// Hide the task from casual listing
    #[arg(long)]
    hidden: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let _ = SimpleLogger::init(level, Config::default());

    match args.command {
        Commands::Show { path } => show(&path),
        Commands::Validate { path } => validate_file(&path),
        Commands::Export {
            task,
            output,
            defaults,
        } => export(&task, output.as_deref(), defaults),
        Commands::Create {
            task,
            force,
            run_as_system,
            user,
            password,
        } => {
            let options = schtasks::RegisterOptions {
                force,
                run_as_system,
                user,
                password,
            };
            create(&task, &options);
        }
        Commands::Delete { name, force } => report(schtasks::delete(&name, force)),
        Commands::Run { name } => report(schtasks::run(&name)),
        Commands::End { name } => report(schtasks::end(&name)),
        Commands::Info { name } => info(&name),
        Commands::List {} => list(),
    }
}

fn show(path: &str) {
    let Ok(xml) = read_task_file(Path::new(path)) else {
        println!("[tasksmith] Could not read {path}");
        return;
    };
    match decode(&xml) {
        Ok(task) => match serde_json::to_string_pretty(&task) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("[tasksmith] Could not render task: {err:?}"),
        },
        Err(err) => println!("[tasksmith] Could not decode {path}: {err}"),
    }
}

fn validate_file(path: &str) {
    let Ok(xml) = read_task_file(Path::new(path)) else {
        println!("[tasksmith] Could not read {path}");
        return;
    };
    match validate(&xml) {
        Ok(()) => println!("[tasksmith] {path} is schema valid"),
        Err(TaskError::SchemaViolations(violations)) => {
            println!("[tasksmith] {path} has {} violation(s):", violations.len());
            for violation in violations {
                println!("  {violation}");
            }
        }
        Err(err) => println!("[tasksmith] Could not validate {path}: {err}"),
    }
}

fn export(task: &TaskArgs, output: Option<&str>, defaults: bool) {
    let definition = match build_definition(task) {
        Ok(definition) => definition,
        Err(err) => {
            println!("[tasksmith] Could not build task: {err}");
            return;
        }
    };
    let policy = if defaults {
        EncodePolicy::Defaulted
    } else {
        EncodePolicy::Passthrough
    };
    let xml = match encode_with(&definition.task, policy) {
        Ok(xml) => xml,
        Err(err) => {
            println!("[tasksmith] Could not encode task: {err}");
            return;
        }
    };
    match output {
        Some(output) => match write_task_file(Path::new(output), &xml) {
            Ok(()) => println!("[tasksmith] Wrote {} to {output}", definition.name),
            Err(err) => println!("[tasksmith] Could not write {output}: {err}"),
        },
        None => println!("{xml}"),
    }
}

fn create(task: &TaskArgs, options: &schtasks::RegisterOptions) {
    let definition = match build_definition(task) {
        Ok(definition) => definition,
        Err(err) => {
            println!("[tasksmith] Could not build task: {err}");
            return;
        }
    };
    report(schtasks::register(&definition, options));
}

fn info(name: &str) {
    match schtasks::query_task(name) {
        Ok(result) if result.success => println!("{}", result.stdout),
        Ok(result) => println!("[tasksmith] schtasks failed: {}", result.stderr.trim()),
        Err(err) => println!("[tasksmith] {err}"),
    }
}

fn list() {
    match schtasks::list() {
        Ok(entries) => {
            for entry in entries {
                println!("{}\t{}\t{}", entry.name, entry.status, entry.next_run_time);
            }
        }
        Err(err) => println!("[tasksmith] {err}"),
    }
}

fn report(result: Result<schtasks::CommandResult, schtasks::error::SchtasksError>) {
    match result {
        Ok(output) if output.success => println!("[tasksmith] {}", output.stdout.trim()),
        Ok(output) => println!("[tasksmith] schtasks failed: {}", output.stderr.trim()),
        Err(err) => println!("[tasksmith] {err}"),
    }
}

fn build_definition(task: &TaskArgs) -> Result<TaskDefinition, String> {
    let mut builder = TaskBuilder::new().name(&task.name).add_exec(
        &task.command,
        task.arguments.as_deref(),
        task.workdir.as_deref(),
    );

    if let Some(author) = &task.author {
        builder = builder.author(author);
    }
    if let Some(description) = &task.description {
        builder = builder.description(description);
    }

    let start = match &task.start {
        Some(text) => match NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            Ok(start) => Some(start),
            Err(err) => return Err(format!("bad start boundary {text}: {err}")),
        },
        None => None,
    };

    if task.logon {
        builder = builder.add_logon_trigger(None);
    }
    if task.boot {
        builder = builder.add_boot_trigger(None);
    }
    if let (Some(days_interval), Some(start)) = (task.daily, start) {
        builder = builder.add_daily_schedule(start, days_interval);
    }
    if let (Some(weeks_interval), Some(start)) = (task.weekly, start) {
        let days = parse_days(task.days.as_deref());
        builder = builder.add_weekly_schedule(start, weeks_interval, &days);
    }
    // A bare start boundary means a one-shot time trigger
    if task.daily.is_none() && task.weekly.is_none() {
        if let Some(start) = start {
            builder = builder.add_time_trigger(start);
        }
    }

    if task.hidden {
        builder = builder.hidden(true);
    }
    builder.build().map_err(|err| err.to_string())
}

fn parse_days(days: Option<&str>) -> Vec<Weekday> {
    let Some(days) = days else {
        return Vec::new();
    };
    days.split(',')
        .filter_map(|name| Weekday::from_name(name.trim()))
        .collect()
}

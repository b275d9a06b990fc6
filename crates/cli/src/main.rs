use anyhow::{bail, Context, Result};
use attendance_core::calendar::YearMonth;
use attendance_core::config::{Config, ConfigOverrides};
use attendance_core::db::SqliteProfileStore;
use attendance_core::reference::ReferenceLoader;
use attendance_core::schema::{MeetingDraft, MeetingPatch};
use attendance_core::submissions::{AttachmentUpload, SubmissionFilter, SubmissionForm};
use attendance_core::{Command, Dispatcher, Outcome};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reports::ExportFormat;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use time::OffsetDateTime;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Committee attendance and notes tracker", long_about = None)]
struct Cli {
    /// TOML config file (default: ./attendance.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Application root holding the data/ reference files
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Profile database file
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. info, debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, replacing any active session
    Login {
        #[arg(long)]
        pid: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the active session
    Whoami,
    /// Senator view: your committees and their meetings
    Dashboard,
    /// Submit attendance and notes for a meeting
    Submit {
        /// Meeting id, e.g. m3
        #[arg(long)]
        meeting: String,
        /// Confirm you attended
        #[arg(long)]
        attended: bool,
        #[arg(long, default_value = "")]
        notes: String,
        /// File to attach (at most 2 MB)
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Manage the meeting calendar (admin)
    Meetings {
        #[command(subcommand)]
        command: MeetingCommands,
    },
    /// Browse submissions (admin)
    Submissions {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
    /// Committee assignments (admin)
    Assign {
        #[command(subcommand)]
        command: AssignCommands,
    },
    /// List allowed committees (admin)
    Committees,
    /// Month calendar of meetings (admin)
    Calendar {
        /// Month to show as YYYY-MM (default: current month)
        #[arg(long, conflicts_with = "first")]
        month: Option<YearMonth>,
        /// Jump to the month of the earliest meeting
        #[arg(long)]
        first: bool,
    },
    /// Export all submissions (admin)
    Export {
        #[arg(value_enum)]
        format: ExportKind,
        /// Output file (default: submissions.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import submissions from a JSON file (admin)
    Import { file: PathBuf },
    /// Clear the profile: session and all local overrides
    Reset,
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum MeetingCommands {
    List,
    Add {
        #[command(flatten)]
        fields: MeetingFields,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: MeetingFields,
        /// Remove the location
        #[arg(long, conflicts_with = "location")]
        clear_location: bool,
    },
    Remove { id: String },
}

#[derive(Args)]
struct MeetingFields {
    #[arg(long)]
    committee: Option<String>,
    #[arg(long)]
    name: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    location: Option<String>,
}

#[derive(Subcommand)]
enum SubmissionCommands {
    List {
        /// Substring of the PID
        #[arg(long)]
        pid: Option<String>,
        /// Exact committee name
        #[arg(long)]
        committee: Option<String>,
        /// Text in the meeting name or notes
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum AssignCommands {
    List,
    Show { pid: String },
    Set {
        pid: String,
        /// Repeat for each committee; omit to clear
        #[arg(long = "committee")]
        committees: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Json,
    /// Paginated PDF table
    Pdf,
    /// Plain-text preview of the PDF table
    Table,
    Doc,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Json => ExportFormat::Json,
            ExportKind::Pdf => ExportFormat::Pdf,
            ExportKind::Table => ExportFormat::Table,
            ExportKind::Doc => ExportFormat::Word,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::resolve(&ConfigOverrides {
        config_file: cli.config.clone(),
        root: cli.root.clone(),
        profile: cli.profile.clone(),
        log_level: cli.log_level.clone(),
    })?;
    init_tracing(&config.log_level);
    debug!(
        root = %config.root.display(),
        profile = %config.profile.display(),
        "configuration resolved"
    );

    let command = match cli.command {
        Commands::Schema {
            command: SchemaCommands::Export { out_dir },
        } => return schema_export(out_dir).map(|()| ExitCode::SUCCESS),
        command => command,
    };

    let store = SqliteProfileStore::open(&config.profile)
        .with_context(|| format!("opening profile {}", config.profile.display()))?;
    let mut app = Dispatcher::new(Box::new(store), ReferenceLoader::new(&config.root));

    match command {
        Commands::Export { format, out } => export(&mut app, format.into(), out),
        command => {
            let command = to_command(command)?;
            let outcome = app.dispatch(command)?;
            render::print_outcome(&outcome);
            Ok(ExitCode::from(exit_status(&outcome)))
        }
    }
}

/// Non-zero when the command was refused for lack of a session or role.
fn exit_status(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Redirect(_) => 2,
        _ => 0,
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn to_command(command: Commands) -> Result<Command> {
    let command = match command {
        Commands::Login { pid, password } => Command::Login { pid, password },
        Commands::Logout => Command::Logout,
        Commands::Whoami => Command::WhoAmI,
        Commands::Dashboard => Command::Dashboard,
        Commands::Submit {
            meeting,
            attended,
            notes,
            attach,
        } => Command::Submit(SubmissionForm {
            meeting_id: meeting,
            attendance_confirmed: attended,
            notes,
            attachment: attach.as_deref().map(read_attachment).transpose()?,
        }),
        Commands::Meetings { command } => match command {
            MeetingCommands::List => Command::ListMeetings,
            MeetingCommands::Add { fields } => Command::AddMeeting(MeetingDraft {
                committee: fields.committee.unwrap_or_default(),
                name: fields.name.unwrap_or_default(),
                date: fields.date.unwrap_or_default(),
                time: fields.time.unwrap_or_default(),
                location: fields.location,
            }),
            MeetingCommands::Edit {
                id,
                fields,
                clear_location,
            } => Command::UpdateMeeting {
                id,
                patch: MeetingPatch {
                    committee: fields.committee,
                    name: fields.name,
                    date: fields.date,
                    time: fields.time,
                    location: if clear_location {
                        Some(None)
                    } else {
                        fields.location.map(Some)
                    },
                },
            },
            MeetingCommands::Remove { id } => Command::RemoveMeeting { id },
        },
        Commands::Submissions { command } => match command {
            SubmissionCommands::List {
                pid,
                committee,
                search,
            } => Command::ListSubmissions(SubmissionFilter {
                pid,
                committee,
                text: search,
            }),
        },
        Commands::Assign { command } => match command {
            AssignCommands::List => Command::ListAssignments,
            AssignCommands::Show { pid } => Command::ShowAssignment { pid },
            AssignCommands::Set { pid, committees } => Command::SetAssignment { pid, committees },
        },
        Commands::Committees => Command::ListCommittees,
        Commands::Calendar { month, first } => Command::Calendar {
            month,
            jump_to_first: first,
        },
        Commands::Import { file } => Command::Import {
            payload: fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?,
        },
        Commands::Reset => Command::Reset,
        Commands::Export { .. } | Commands::Schema { .. } => {
            bail!("export and schema commands do not go through the dispatcher")
        }
    };
    Ok(command)
}

fn read_attachment(path: &Path) -> Result<AttachmentUpload> {
    let bytes = fs::read(path).with_context(|| format!("reading attachment {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(AttachmentUpload { name, bytes })
}

fn export(app: &mut Dispatcher, format: ExportFormat, out: Option<PathBuf>) -> Result<ExitCode> {
    let outcome = app.dispatch(Command::ListSubmissions(SubmissionFilter::default()))?;
    let Outcome::Submissions(submissions) = outcome else {
        render::print_outcome(&outcome);
        return Ok(ExitCode::from(exit_status(&outcome)));
    };
    let out = out.unwrap_or_else(|| PathBuf::from(format!("submissions.{}", format.extension())));
    let today = OffsetDateTime::now_utc().date();
    reports::write_export(&out, format, &submissions, today)?;
    println!("Exported {} submissions to {}", submissions.len(), out.display());
    Ok(ExitCode::SUCCESS)
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    let schemas = [
        ("Submission", schema_for!(attendance_core::schema::Submission)),
        ("Meeting", schema_for!(attendance_core::schema::Meeting)),
        (
            "CommitteeAssignment",
            schema_for!(attendance_core::schema::CommitteeAssignment),
        ),
        ("User", schema_for!(attendance_core::schema::User)),
    ];
    for (name, schema) in schemas {
        let json = serde_json::to_string_pretty(&schema)?;
        fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    }

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

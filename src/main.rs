use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use photo_jury::config::{expand_home, load_config, load_yaml, Config};
use photo_jury::contest::{contest_status, ContestDraft, ContestPatch, EntrySubmission, Role, User};
use photo_jury::output;
use photo_jury::store::{
    get_data_path, load_snapshot, save_snapshot, ContestRepository, MemoryStore,
};
use photo_jury::{ContestError, ContestService};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_INVALID: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// List contests (default if no subcommand)
    Contests {
        /// Only contests administered by the acting user
        #[arg(long)]
        admin: bool,
        /// Only contests the acting user judges
        #[arg(long, conflicts_with = "admin")]
        jury: bool,
        /// Only contests still accepting entries or ratings
        #[arg(long)]
        active: bool,
        /// Only contests past their rating deadline
        #[arg(long, conflicts_with = "active")]
        finished: bool,
    },
    /// Show the phase of a contest
    Status { contest: String },
    /// Ranked results, grouped by nomination
    Results {
        contest: String,
        /// Only show one nomination
        #[arg(short, long)]
        nomination: Option<String>,
    },
    /// Export ranked results as CSV
    Export {
        contest: String,
        /// Output file (defaults to results-<contest name>.csv in export_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        nomination: Option<String>,
    },
    /// Entries of a contest as the acting juror sees them
    Entries { contest: String },
    /// Entries the acting juror has rated, with the juror's averages
    History { contest: String },
    /// Rate one criterion of an entry (1-10)
    Rate {
        contest: String,
        entry: String,
        criterion: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Show the next entry the acting juror has not fully rated
    Next {
        contest: String,
        /// Only look at entries after this one
        #[arg(long)]
        after: Option<String>,
    },
    /// Submit an entry described in a YAML file
    Submit {
        contest: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Create a contest from a YAML draft
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Update a contest from a YAML patch
    Update {
        contest: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Manage the jury of a contest
    Jury {
        #[command(subcommand)]
        action: JuryAction,
    },
    /// Find or register users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand, Debug)]
enum JuryAction {
    /// Add a user to the jury
    Add { contest: String, user: String },
    /// Remove a user from the jury
    Remove { contest: String, user: String },
}

#[derive(Subcommand, Debug)]
enum UsersAction {
    /// Search users by name or email
    Search { query: String },
    /// Register a new user
    Add {
        id: String,
        name: String,
        email: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Jury)]
        role: RoleArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RoleArg {
    Admin,
    Jury,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Jury => Role::Jury,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "photo-jury")]
#[command(about = "Photo contest jury scoring and ranking CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/photo-jury/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the JSON data file (overrides data_file from config)
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Acting user id (overrides user from config)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Evaluate deadlines at this RFC 3339 instant instead of the current time
    #[arg(long, global = true, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

struct App {
    service: ContestService<MemoryStore>,
    config: Config,
    data_path: PathBuf,
    user: Option<String>,
    now: DateTime<Utc>,
    use_colors: bool,
    verbose: bool,
}

impl App {
    fn acting_user(&self) -> anyhow::Result<&str> {
        self.user.as_deref().context(
            "No acting user. Pass --user or set `user` in ~/.config/photo-jury/config.yaml",
        )
    }

    fn persist(&self) -> anyhow::Result<()> {
        save_snapshot(&self.data_path, &self.service.repository().snapshot())
    }
}

fn main() {
    let cli = Cli::parse();
    photo_jury::logging::init_logging(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Contests {
        admin: false,
        jury: false,
        active: false,
        finished: false,
    });

    // Load config
    let config = match load_config(cli.config.as_deref().map(expand_home)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let data_path = cli
        .data
        .as_deref()
        .or(config.data_file.as_deref())
        .map(expand_home)
        .unwrap_or_else(get_data_path);

    let snapshot = match load_snapshot(&data_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Data file error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let user = cli.user.or_else(|| config.user.clone());
    let app = App {
        service: ContestService::new(MemoryStore::from_snapshot(snapshot)),
        config,
        data_path,
        user,
        now: cli.now.unwrap_or_else(Utc::now),
        use_colors: output::should_use_colors(),
        verbose: cli.verbose,
    };

    if let Err(e) = run(&app, command) {
        report(&e);
        std::process::exit(exit_code(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    let service = &app.service;

    match command {
        Commands::Contests {
            admin,
            jury,
            active,
            finished,
        } => {
            let contests = if admin {
                service.admin_contests(app.acting_user()?)?
            } else if jury {
                service.jury_contests(app.acting_user()?)?
            } else {
                service.repository().list_contests()?
            };

            let summaries: Vec<_> = service
                .contest_summaries(contests, app.now)?
                .into_iter()
                .filter(|s| (!active || s.is_active()) && (!finished || !s.is_active()))
                .collect();

            if summaries.is_empty() {
                println!("No contests.");
            }
            for summary in &summaries {
                println!(
                    "{}",
                    output::format_contest_summary(summary, app.now, app.use_colors)
                );
            }
        }
        Commands::Status { contest } => {
            let contest = service.contest(&contest)?;
            let status = contest_status(&contest, app.now);
            println!("{}", contest.name);
            println!("{}", output::format_status(&contest, &status, app.now));
        }
        Commands::Results {
            contest,
            nomination,
        } => {
            let results = service.results(&contest)?;
            let ranked = results.ranked(nomination.as_deref());

            if app.verbose && !ranked.is_empty() {
                // Verbose mode: per-juror totals behind each score
                for row in &ranked {
                    println!("{}", output::format_ranked_detail(row, app.use_colors));
                    println!();
                }
            } else {
                println!("{}", output::format_results_table(&ranked, app.use_colors));
            }
        }
        Commands::Export {
            contest,
            output: path,
            nomination,
        } => {
            let results = service.results(&contest)?;
            let ranked = results.ranked(nomination.as_deref());
            let path = path.unwrap_or_else(|| {
                export_dir(&app.config).join(output::export_file_name(&results.contest))
            });
            output::write_csv(&path, &ranked)?;
            println!("Exported {} entries to {}", ranked.len(), path.display());
        }
        Commands::Entries { contest } => {
            let juror = app.acting_user()?;
            let details = service.contest(&contest)?;
            let entries = service.jury_entries(&contest, juror)?;
            println!(
                "{}",
                output::format_jury_entries(&entries, &details.criteria, app.use_colors)
            );
            if !entries.is_empty() {
                println!();
                println!(
                    "{}",
                    output::format_progress(&service.jury_progress(&contest, juror)?)
                );
            }
        }
        Commands::History { contest } => {
            let juror = app.acting_user()?;
            let details = service.contest(&contest)?;
            let history = service.jury_history(&contest, juror)?;
            println!(
                "{}",
                output::format_history(&history, &details.criteria, app.use_colors)
            );
        }
        Commands::Rate {
            contest,
            entry,
            criterion,
            value,
        } => {
            let juror = app.acting_user()?;
            let ratings = service.record_rating(juror, &contest, &entry, &criterion, value)?;
            app.persist()?;

            let details = service.contest(&contest)?;
            println!("{}", output::format_rating_set(&details.criteria, &ratings));
            if ratings.is_complete(&details.criteria) {
                match service.next_for_juror(&contest, juror, Some(&entry))? {
                    Some(next) => println!("Next: {} {}", next.id, next.title),
                    None => println!("No more entries to rate after this one."),
                }
            }
        }
        Commands::Next { contest, after } => {
            let juror = app.acting_user()?;
            match service.next_for_juror(&contest, juror, after.as_deref())? {
                Some(entry) => {
                    println!("{} {} ({})", entry.id, entry.title, entry.nomination);
                    println!("  {}", entry.url);
                }
                None => println!("Nothing left to rate."),
            }
        }
        Commands::Submit { contest, file } => {
            let submission: EntrySubmission = load_yaml(&file)?;
            let entry = service.submit_entry(&contest, submission, app.now)?;
            app.persist()?;
            println!("Submitted entry {}", entry.id);
        }
        Commands::Create { file } => {
            let draft: ContestDraft = load_yaml(&file)?;
            let contest = service.create_contest(app.acting_user()?, draft)?;
            app.persist()?;
            println!("Created contest {} ({})", contest.id, contest.name);
        }
        Commands::Update { contest, file } => {
            let patch: ContestPatch = load_yaml(&file)?;
            let contest = service.update_contest(app.acting_user()?, &contest, patch)?;
            app.persist()?;
            println!("Updated contest {} ({})", contest.id, contest.name);
        }
        Commands::Jury { action } => {
            let acting = app.acting_user()?;
            let contest = match action {
                JuryAction::Add { contest, user } => {
                    service.add_jury_member(acting, &contest, &user)?
                }
                JuryAction::Remove { contest, user } => {
                    service.remove_jury_member(acting, &contest, &user)?
                }
            };
            app.persist()?;
            if contest.jury.is_empty() {
                println!("Jury of {}: (empty)", contest.name);
            } else {
                println!("Jury of {}: {}", contest.name, contest.jury.join(", "));
            }
        }
        Commands::Users { action } => match action {
            UsersAction::Search { query } => {
                let users = service.search_users(&query)?;
                if users.is_empty() {
                    println!("No users match '{}'.", query);
                }
                for user in &users {
                    println!("{}", format_user(user));
                }
            }
            UsersAction::Add {
                id,
                name,
                email,
                role,
            } => {
                let user = service.add_user(User {
                    id,
                    name,
                    email,
                    role: role.into(),
                })?;
                app.persist()?;
                println!("Added {}", format_user(&user));
            }
        },
    }

    Ok(())
}

fn format_user(user: &User) -> String {
    let role = match user.role {
        Role::Admin => "admin",
        Role::Jury => "jury",
    };
    format!("{} | {} | {} | {}", user.id, user.name, user.email, role)
}

fn export_dir(config: &Config) -> PathBuf {
    config
        .export_dir
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ContestError>() {
        Some(e) if e.is_not_found() => EXIT_NOT_FOUND,
        Some(_) => EXIT_INVALID,
        None => EXIT_CONFIG,
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ContestError>() {
        Some(ContestError::ValidationFailed(problems)) => {
            eprintln!("Validation errors:");
            for problem in problems {
                eprintln!("  - {}", problem);
            }
        }
        Some(e) => eprintln!("Error: {}", e),
        None => eprintln!("Error: {:#}", err),
    }
}

//! Command-line surface over a JSON snapshot store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use availability_engine::{
    parse_local_time, sorted_by_time, AvailabilityService, JsonStore, OffsetMinutes, Profile,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "availability", version, about = "Tutor availability scheduling")]
struct Cli {
    /// Snapshot file holding users, availability and lessons
    #[arg(long, global = true, env = "AVAILABILITY_STORE", default_value = "availability.json")]
    store: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// How the viewer's local times relate to storage instants.
#[derive(Args, Debug, Clone)]
struct ViewerOffset {
    /// Minutes to add to local time to reach UTC (New York winter: 300)
    #[arg(
        long,
        env = "AVAILABILITY_OFFSET",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    offset: i32,

    /// IANA timezone; when given, its offset at the local time replaces --offset
    #[arg(long)]
    tz: Option<String>,
}

impl ViewerOffset {
    fn resolve(&self, local_time: &str) -> Result<OffsetMinutes> {
        match &self.tz {
            Some(tz) => {
                let at = parse_local_time(local_time)?;
                let offset = OffsetMinutes::for_timezone(tz, at)?;
                debug!(tz = %tz, offset = offset.minutes(), "resolved timezone offset");
                Ok(offset)
            }
            None => Ok(OffsetMinutes(self.offset)),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a user to the directory
    Register {
        /// User id (email)
        id: String,
        /// Full name
        #[arg(long)]
        name: String,
        /// Register as a tutor
        #[arg(long)]
        tutor: bool,
        #[arg(long)]
        bio: Option<String>,
    },

    /// Publish a slot for a tutor at a local time
    AddSlot {
        tutor: String,
        /// Local wall-clock time, e.g. 2024-01-03T18:30
        time: String,
        #[command(flatten)]
        viewer: ViewerOffset,
    },

    /// Withdraw a tutor's slot at a local time
    RemoveSlot {
        tutor: String,
        time: String,
        #[command(flatten)]
        viewer: ViewerOffset,
    },

    /// Show a tutor's weekly grid for the week containing a local date
    Week {
        tutor: String,
        /// Any local date or time inside the wanted week
        anchor: String,
        #[command(flatten)]
        viewer: ViewerOffset,
        /// Sort rows by time of day instead of first-seen order
        #[arg(long)]
        sorted: bool,
    },

    /// List tutors free at an RFC 3339 instant
    Available {
        /// e.g. 2024-01-03T18:00:00Z
        instant: String,
    },

    /// Book a lesson between a tutor and a student at an RFC 3339 instant
    Book {
        tutor: String,
        student: String,
        instant: String,
        /// Lesson type code (defaults to "eng")
        #[arg(long)]
        lesson_code: Option<String>,
    },

    /// List a user's lessons in time order
    Lessons { user: String },
}

impl Command {
    fn writes(&self) -> bool {
        matches!(
            self,
            Command::Register { .. }
                | Command::AddSlot { .. }
                | Command::RemoveSlot { .. }
                | Command::Book { .. }
        )
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let mut snapshot = JsonStore::open(&cli.store)
        .with_context(|| format!("Failed to open store {}", cli.store.display()))?;

    let output = execute(&cli.command, &mut snapshot)?;

    if cli.command.writes() {
        snapshot
            .save()
            .with_context(|| format!("Failed to save store {}", cli.store.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute(command: &Command, snapshot: &mut JsonStore) -> Result<serde_json::Value> {
    let store = snapshot.store_mut();

    let value = match command {
        Command::Register {
            id,
            name,
            tutor,
            bio,
        } => {
            let user = store.register(Profile {
                id: id.clone(),
                full_name: name.clone(),
                is_tutor: *tutor,
                bio: bio.clone(),
            })?;
            json!({ "user": user })
        }
        Command::AddSlot {
            tutor,
            time,
            viewer,
        } => {
            let offset = viewer.resolve(time)?;
            let slot = AvailabilityService::new(store).add_slot(tutor, time, offset)?;
            json!({ "availability": slot })
        }
        Command::RemoveSlot {
            tutor,
            time,
            viewer,
        } => {
            let offset = viewer.resolve(time)?;
            AvailabilityService::new(store).remove_slot(tutor, time, offset)?;
            json!({ "deleted": { "tutor": tutor, "time": time } })
        }
        Command::Week {
            tutor,
            anchor,
            viewer,
            sorted,
        } => {
            let offset = viewer.resolve(anchor)?;
            let mut grid = AvailabilityService::new(store).get_week_grid(tutor, anchor, offset)?;
            if *sorted {
                grid.rows = sorted_by_time(grid.rows);
            }
            json!({
                "availability": grid.rows,
                "weekStart": grid.week_start,
                "weekEnd": grid.week_end,
            })
        }
        Command::Available { instant } => {
            let tutors = AvailabilityService::new(store).get_available_tutors(instant)?;
            json!({ "availabilities": tutors })
        }
        Command::Book {
            tutor,
            student,
            instant,
            lesson_code,
        } => {
            let lesson = AvailabilityService::new(store).book_lesson(
                tutor,
                student,
                instant,
                lesson_code.as_deref(),
            )?;
            json!({ "lesson": lesson })
        }
        Command::Lessons { user } => {
            let lessons = AvailabilityService::new(store).lessons_for(user)?;
            json!({ "lessons": lessons })
        }
    };

    Ok(value)
}

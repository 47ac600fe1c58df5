use std::fmt;

use nihongo_core::model::{AttemptId, JlptLevel, LessonId, TestId};

pub const DEFAULT_DB_URL: &str = "sqlite://nihongo.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    Show,
    Advance { total_items: u32 },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tests { level: JlptLevel },
    Exam { test_id: TestId },
    Review { attempt_id: AttemptId },
    Progress { lesson_id: LessonId, action: ProgressAction },
}

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub api_base_url: Option<String>,
    pub verbose: bool,
    pub command: Command,
}

/// Flags seen on the command line before they are checked against the
/// command that needs them.
#[derive(Default)]
struct Flags {
    level: Option<JlptLevel>,
    test_id: Option<TestId>,
    attempt_id: Option<AttemptId>,
    lesson_id: Option<LessonId>,
    total: Option<u32>,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app tests    [--level N5]");
    eprintln!("  app exam     --test-id <id>");
    eprintln!("  app review   --attempt-id <id>");
    eprintln!("  app progress show|advance|reset --lesson-id <id> [--total <n>]");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>   default {DEFAULT_DB_URL}");
    eprintln!("  --api <base_url>    default {}", services::api::DEFAULT_API_BASE_URL);
    eprintln!("  -v, --verbose       debug logging");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NIHONGO_DB_URL, NIHONGO_API_BASE_URL, NIHONGO_API_TOKEN,");
    eprintln!("  NIHONGO_SUBMIT_TIMEOUT_SECS, NIHONGO_LOW_TIME_SECS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidValue { flag, raw })
}

impl Args {
    /// Parse everything after the program name. `env_db_url` is the
    /// `NIHONGO_DB_URL` value, if set; `--db` overrides it.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let command = args.next().ok_or(ArgsError::MissingCommand)?;
        let progress_action = if command == "progress" {
            Some(args.next().ok_or(ArgsError::MissingValue { flag: "progress" })?)
        } else {
            None
        };

        let mut db_url = env_db_url.map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut api_base_url = None;
        let mut verbose = false;
        let mut flags = Flags::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => api_base_url = Some(require_value(&mut args, "--api")?),
                "--level" => flags.level = Some(parse_value(&mut args, "--level")?),
                "--test-id" => flags.test_id = Some(parse_value(&mut args, "--test-id")?),
                "--attempt-id" => flags.attempt_id = Some(parse_value(&mut args, "--attempt-id")?),
                "--lesson-id" => flags.lesson_id = Some(parse_value(&mut args, "--lesson-id")?),
                "--total" => flags.total = Some(parse_value(&mut args, "--total")?),
                "-v" | "--verbose" => verbose = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match command.as_str() {
            "tests" => Command::Tests {
                level: flags.level.unwrap_or_default(),
            },
            "exam" => Command::Exam {
                test_id: flags.test_id.ok_or(ArgsError::MissingFlag { flag: "--test-id" })?,
            },
            "review" => Command::Review {
                attempt_id: flags
                    .attempt_id
                    .ok_or(ArgsError::MissingFlag { flag: "--attempt-id" })?,
            },
            "progress" => {
                let lesson_id = flags
                    .lesson_id
                    .ok_or(ArgsError::MissingFlag { flag: "--lesson-id" })?;
                let action = match progress_action.as_deref() {
                    Some("show") => ProgressAction::Show,
                    Some("reset") => ProgressAction::Reset,
                    Some("advance") => ProgressAction::Advance {
                        total_items: flags.total.ok_or(ArgsError::MissingFlag { flag: "--total" })?,
                    },
                    other => {
                        return Err(ArgsError::UnknownCommand(format!(
                            "progress {}",
                            other.unwrap_or_default()
                        )));
                    }
                };
                Command::Progress { lesson_id, action }
            }
            _ => return Err(ArgsError::UnknownCommand(command)),
        };

        Ok(Self {
            db_url,
            api_base_url,
            verbose,
            command,
        })
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

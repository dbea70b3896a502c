use std::fmt;
use std::path::{Path, PathBuf};

use trainer_core::model::TrainerSettings;

pub const DEFAULT_DB_URL: &str = "sqlite://trainer.sqlite3";
pub const DEFAULT_QUESTIONS: &str = "questions.json";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidExamSize { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidExamSize { raw } => write!(f, "invalid --exam-size value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Runtime configuration: environment first, then command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub questions: PathBuf,
    pub seed: Option<u64>,
    pub exam_size: Option<usize>,
    pub in_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            questions: PathBuf::from(DEFAULT_QUESTIONS),
            seed: None,
            exam_size: None,
            in_memory: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an environment-like lookup. Unparseable numbers are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            db_url: lookup("TRAINER_DB_URL").map_or(default.db_url, normalize_sqlite_url),
            questions: lookup("TRAINER_QUESTIONS").map_or(default.questions, PathBuf::from),
            seed: lookup("TRAINER_SEED").and_then(|v| v.trim().parse().ok()),
            exam_size: lookup("TRAINER_EXAM_SIZE").and_then(|v| v.trim().parse().ok()),
            in_memory: default.in_memory,
        }
    }

    /// Apply command-line flags on top of `self`.
    pub fn with_args(
        mut self,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--questions" => {
                    self.questions = PathBuf::from(require_value(&mut args, "--questions")?);
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    let seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    self.seed = Some(seed);
                }
                "--exam-size" => {
                    let value = require_value(&mut args, "--exam-size")?;
                    let size = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidExamSize { raw: value.clone() })?;
                    self.exam_size = Some(size);
                }
                "--memory" => self.in_memory = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(self)
    }

    /// Session tunables, with the exam size overridden if configured.
    pub fn settings(&self) -> Result<TrainerSettings, trainer_core::Error> {
        let defaults = TrainerSettings::default();
        let Some(exam_size) = self.exam_size else {
            return Ok(defaults);
        };
        let settings = TrainerSettings::new(
            exam_size,
            defaults.default_practice_count(),
            defaults.practice_range().clone(),
            defaults.weak_threshold(),
            defaults.max_weak_topics(),
        )?;
        Ok(settings)
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--questions <file.json>] [--db <sqlite_url>] [--memory] [--seed <n>] [--exam-size <n>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions {DEFAULT_QUESTIONS}");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINER_DB_URL, TRAINER_QUESTIONS, TRAINER_SEED, TRAINER_EXAM_SIZE, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn environment_fills_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TRAINER_DB_URL", "sqlite::memory:"),
            ("TRAINER_QUESTIONS", "data/bees.json"),
            ("TRAINER_SEED", "42"),
            ("TRAINER_EXAM_SIZE", "many"),
        ]);
        let config = Config::from_lookup(|key| env.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.questions, PathBuf::from("data/bees.json"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.exam_size, None);
        assert!(!config.in_memory);
    }

    #[test]
    fn flags_override_environment() {
        let base = Config::from_lookup(|key| (key == "TRAINER_SEED").then(|| "1".to_owned()));
        let config = base
            .with_args(args(&["--seed", "7", "--questions", "q.json", "--memory"]))
            .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.questions, PathBuf::from("q.json"));
        assert!(config.in_memory);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
    }

    #[test]
    fn bad_flags_are_reported() {
        assert_eq!(
            Config::default().with_args(args(&["--seed"])),
            Err(ArgsError::MissingValue { flag: "--seed" })
        );
        assert_eq!(
            Config::default().with_args(args(&["--seed", "x"])),
            Err(ArgsError::InvalidSeed { raw: "x".into() })
        );
        assert_eq!(
            Config::default().with_args(args(&["--db", " "])),
            Err(ArgsError::InvalidDbUrl { raw: " ".into() })
        );
        assert_eq!(
            Config::default().with_args(args(&["--verbose"])),
            Err(ArgsError::UnknownArg("--verbose".into()))
        );
    }

    #[test]
    fn relative_db_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/trainer.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/trainer.db"));
    }

    #[test]
    fn exam_size_feeds_settings() {
        let config = Config {
            exam_size: Some(12),
            ..Config::default()
        };
        assert_eq!(config.settings().unwrap().exam_size(), 12);

        let config = Config {
            exam_size: Some(0),
            ..Config::default()
        };
        assert!(config.settings().is_err());
    }
}

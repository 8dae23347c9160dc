use argosync_core::config::DriverConfig;
use argosync_core::context::{ClassPeriodContext, Period, SchoolClass};
use argosync_core::debug::{self, DebugLevel};
use argosync_core::error::DomainError;
use argosync_core::markers::MonthMarkers;
use argosync_core::records::{ClassAbsences, ClassAdmissions, ClassMarks};
use argosync_core::secret::{self, PASSPHRASE_ENV};
use argosync_core::session::Session;
use argosync_core::workflows;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::thread;

#[derive(Parser)]
#[command(name = "argosync", about = "Scripted data entry and verification for Argo school management")]
struct Cli {
    /// JSON configuration file (every field optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug level: NONE, NORMAL or SCREEN
    #[arg(long, global = true)]
    debug: Option<DebugLevel>,

    /// Re-run a failed workflow this many times
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a credential for the configuration file
    Encrypt {
        plaintext: String,

        /// Passphrase (default: $ARGOSYNC_PASSPHRASE)
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Decrypt a stored credential
    Decrypt {
        blob: String,

        /// Passphrase (default: $ARGOSYNC_PASSPHRASE)
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Enter marks, averages and outcomes of a class
    ImportMarks {
        /// ClassMarks JSON file
        data: PathBuf,
    },
    /// Check the summary grid of a class, then print and transfer it
    VerifyMarks {
        /// ClassMarks JSON file
        data: PathBuf,
    },
    /// Lock the marks of a class
    LockMarks {
        /// Class as printed, e.g. 3A
        #[arg(long, value_parser = parse_class)]
        class: SchoolClass,

        #[arg(long, value_enum)]
        period: PeriodArg,
    },
    /// Enter monthly absences, resuming after the last committed month
    ImportAbsences {
        /// ClassAbsences JSON file
        data: PathBuf,
    },
    /// Check monthly absences
    VerifyAbsences {
        /// ClassAbsences JSON file
        data: PathBuf,
    },
    /// Save the absence register of every month as PDF
    DownloadAbsences {
        #[arg(long, value_parser = parse_class)]
        class: SchoolClass,

        /// Starting year of the school year, e.g. 2019 for 2019/20
        #[arg(long)]
        school_year: i32,
    },
    /// Write admission comments of a class
    ImportAdmissions {
        /// ClassAdmissions JSON file
        data: PathBuf,
    },
    /// Check admission comments of a class
    VerifyAdmissions {
        /// ClassAdmissions JSON file
        data: PathBuf,
    },
    /// Delete the screenshots of previous runs
    RemoveImages,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    FirstTerm,
    FinalSession,
    SuspendedResumption,
}

impl From<PeriodArg> for Period {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::FirstTerm => Period::FirstTerm,
            PeriodArg::FinalSession => Period::FinalSession,
            PeriodArg::SuspendedResumption => Period::SuspendedResumption,
        }
    }
}

/// Split "3A" into year "3" and section "A".
fn parse_class(s: &str) -> Result<SchoolClass, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (year, section) = s.split_at(split);
    if year.is_empty() || section.is_empty() {
        return Err(format!("expected a class like 3A, got \"{}\"", s));
    }
    Ok(SchoolClass::new(year, section.to_uppercase()))
}

fn passphrase(given: Option<String>) -> Result<String, String> {
    given
        .or_else(|| std::env::var(PASSPHRASE_ENV).ok())
        .ok_or_else(|| format!("no passphrase: pass --passphrase or set {}", PASSPHRASE_ENV))
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e).into())
}

/// Run `attempt` in a fresh browser session, retrying after the configured
/// delay while retries are left.
fn with_retries<T, F>(config: &DriverConfig, retries: u32, mut attempt: F) -> Result<T, Box<dyn Error>>
where
    F: FnMut(&mut Session) -> Result<T, DomainError>,
{
    let mut left = retries;
    loop {
        let mut session = argosync_core::open_session(config)?;
        let result = attempt(&mut session);
        if let Err(e) = session.close() {
            log::warn!("closing the browser: {}", e);
        }
        match result {
            Ok(value) => return Ok(value),
            Err(e) if left > 0 => {
                left -= 1;
                log::warn!("{}; retrying in {}s ({} left)", e, config.retry_delay_secs, left);
                thread::sleep(config.retry_delay());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(level) = cli.debug {
        config.debug = level;
    }
    let retries = cli.retries;

    match cli.command {
        Commands::Encrypt { plaintext, passphrase: p } => {
            println!("{}", secret::encrypt(&passphrase(p)?, &plaintext));
        }
        Commands::Decrypt { blob, passphrase: p } => {
            println!("{}", secret::decrypt(&passphrase(p)?, &blob)?);
        }
        Commands::ImportMarks { data } => {
            let data: ClassMarks = load(&data)?;
            let context = ClassPeriodContext::new(data.class.clone(), data.period);
            with_retries(&config, retries, |s| workflows::import_marks(s, &context, &data))?;
            println!("Marks of {} entered", context);
        }
        Commands::VerifyMarks { data } => {
            let data: ClassMarks = load(&data)?;
            let context = ClassPeriodContext::new(data.class.clone(), data.period);
            with_retries(&config, retries, |s| workflows::verify_marks(s, &context, &data))?;
            println!("Marks of {} verified", context);
        }
        Commands::LockMarks { class, period } => {
            let context = ClassPeriodContext::new(class, period.into());
            with_retries(&config, retries, |s| workflows::lock_marks(s, &context))?;
            println!("Marks of {} locked", context);
        }
        Commands::ImportAbsences { data } => {
            let data: ClassAbsences = load(&data)?;
            let mut markers = MonthMarkers::load(&config.log_dir, &data.class)?;
            with_retries(&config, retries, |s| workflows::import_absences(s, &data, &mut markers))?;
            println!("Absences of {} entered ({})", data.class, markers.path().display());
        }
        Commands::VerifyAbsences { data } => {
            let data: ClassAbsences = load(&data)?;
            with_retries(&config, retries, |s| workflows::verify_absences(s, &data))?;
            println!("Absences of {} verified", data.class);
        }
        Commands::DownloadAbsences { class, school_year } => {
            let saved = with_retries(&config, retries, |s| {
                workflows::download_absence_reports(s, &class, school_year)
            })?;
            for path in saved {
                println!("{}", path.display());
            }
        }
        Commands::ImportAdmissions { data } => {
            let data: ClassAdmissions = load(&data)?;
            with_retries(&config, retries, |s| workflows::import_admission_comments(s, &data))?;
            println!("Admission comments of {} entered", data.class);
        }
        Commands::VerifyAdmissions { data } => {
            let data: ClassAdmissions = load(&data)?;
            with_retries(&config, retries, |s| workflows::verify_admission_comments(s, &data))?;
            println!("Admission comments of {} verified", data.class);
        }
        Commands::RemoveImages => {
            let removed = debug::remove_images(&config.log_dir, &config.log_file)?;
            println!("{} screenshots removed", removed);
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

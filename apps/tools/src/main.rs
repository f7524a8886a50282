use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    codes::{generate_nonambiguous_code, CodeMode},
    config::load_settings,
    SessionContext, StudyClient, StudyService,
};
use editor::{
    apply_with, check_invariants, violations, GroupAction, IdSource, RandomIds, SequentialIds,
};
use shared::{
    domain::{Study, StudyId},
    session::UserSessionData,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "study-tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON array of group actions to a study file.
    Apply {
        #[arg(long)]
        study: PathBuf,
        #[arg(long)]
        actions: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Generate `<prefix>1`, `<prefix>2`, ... instead of random ids.
        #[arg(long)]
        id_prefix: Option<String>,
    },
    /// Report group/session invariant violations in a study file.
    Check {
        #[arg(long)]
        study: PathBuf,
    },
    Fetch {
        #[arg(long)]
        id: String,
        #[arg(long)]
        token: String,
    },
    Push {
        #[arg(long)]
        study: PathBuf,
        #[arg(long)]
        token: String,
    },
    /// Print a participant code.
    Code {
        #[arg(long, default_value_t = 6)]
        length: usize,
        #[arg(long, value_enum, default_value_t = CodeArg::Numeric)]
        mode: CodeArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodeArg {
    Numeric,
    Alphanumeric,
    Consonants,
}

impl From<CodeArg> for CodeMode {
    fn from(value: CodeArg) -> Self {
        match value {
            CodeArg::Numeric => CodeMode::Numeric,
            CodeArg::Alphanumeric => CodeMode::Alphanumeric,
            CodeArg::Consonants => CodeMode::Consonants,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply {
            study,
            actions,
            out,
            id_prefix,
        } => {
            let current = read_study(&study)?;
            let raw = fs::read_to_string(&actions)
                .with_context(|| format!("failed to read actions file '{}'", actions.display()))?;
            let script: Vec<GroupAction> = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse actions file '{}'", actions.display()))?;

            let mut ids: Box<dyn IdSource> = match id_prefix {
                Some(prefix) => Box::new(SequentialIds::new(prefix)),
                None => Box::new(RandomIds),
            };
            let edited = apply_script(current, script, ids.as_mut())?;
            write_study(&edited, out.as_deref())?;
        }
        Command::Check { study } => {
            let study = read_study(&study)?;
            let found = violations(&study.groups);
            if found.is_empty() {
                println!("study {} is consistent", study.id);
            } else {
                for violation in &found {
                    println!("{violation}");
                }
                bail!("study {} has {} violation(s)", study.id, found.len());
            }
        }
        Command::Fetch { id, token } => {
            let client = StudyClient::new(load_settings()?)?;
            let session = token_session(token);
            let study = client
                .get_study(&session, &StudyId::new(id.clone()))
                .await?
                .with_context(|| format!("study {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&study)?);
        }
        Command::Push { study, token } => {
            let study = read_study(&study)?;
            check_invariants(&study.groups)?;
            let client = StudyClient::new(load_settings()?)?;
            let saved = client.save_study(&token_session(token), &study).await?;
            println!("saved study {} at version {:?}", saved.id, saved.version);
        }
        Command::Code { length, mode } => {
            println!("{}", generate_nonambiguous_code(length, mode.into()));
        }
    }

    Ok(())
}

fn apply_script(
    mut study: Study,
    script: Vec<GroupAction>,
    ids: &mut dyn IdSource,
) -> Result<Study> {
    check_invariants(&study.groups).context("input study is inconsistent")?;

    let mut groups = std::mem::take(&mut study.groups);
    for (step, action) in script.into_iter().enumerate() {
        let kind = action.kind();
        groups = apply_with(&groups, action, ids)
            .with_context(|| format!("action #{step} ({kind}) failed"))?;
    }
    check_invariants(&groups).context("edited study is inconsistent")?;

    info!(study_id = %study.id, groups = groups.len(), "actions applied");
    study.groups = groups;
    Ok(study)
}

fn token_session(token: String) -> SessionContext {
    SessionContext::start(UserSessionData {
        id: "cli".to_string(),
        token,
        first_name: None,
        org_membership: None,
        roles: Vec::new(),
        app_id: None,
    })
}

fn read_study(path: &Path) -> Result<Study> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read study file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse study file '{}'", path.display()))
}

fn write_study(study: &Study, out: Option<&Path>) -> Result<()> {
    let encoded = serde_json::to_string_pretty(study)?;
    match out {
        Some(path) => fs::write(path, encoded)
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{encoded}"),
    }
    Ok(())
}

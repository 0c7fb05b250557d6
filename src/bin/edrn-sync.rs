// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use edrn_sync::{
    directory::with_session,
    path::default_config_path,
    rdf::{open_groups, open_persons, open_sites},
    CredentialFlags, Credentials, LdapDirectory, SyncConfig, SyncReport, Synchronizer,
};

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  edrn-sync [options] users <user_rdf>...\n  edrn-sync [options] sites <user_rdf> <site_rdf>\n  edrn-sync [options] committees <user_rdf> <committee_rdf>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Work verbosely rather than silently.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// DN of the user allowed to add entries, e.g., uid=admin,ou=system.
    #[arg(short, long, global = true, value_name = "ldap_dn")]
    pub user: Option<String>,

    /// Password of the user allowed to add entries.
    #[arg(
        short,
        long,
        global = true,
        env = "EDRN_SYNC_PASSWORD",
        hide_env_values = true,
        value_name = "password"
    )]
    pub password: Option<String>,

    /// LDAP URL of the server to synchronize with.
    #[arg(short = 'l', long, alias = "ldapUrl", global = true, value_name = "ldap_url")]
    pub ldap_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Add people from user exports to the directory.
    #[command(override_usage = "edrn-sync users [options] <user_rdf>...")]
    Users(UsersOptions),

    /// Build a group for every research site.
    #[command(override_usage = "edrn-sync sites [options] <user_rdf> <site_rdf>")]
    Sites(GroupOptions),

    /// Build a group for every collaborative group.
    #[command(override_usage = "edrn-sync committees [options] <user_rdf> <committee_rdf>")]
    Committees(GroupOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct UsersOptions {
    /// User exports to read people from.
    #[arg(required = true, value_name = "user_rdf")]
    pub user_rdf: Vec<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GroupOptions {
    /// User export to resolve staff and members against.
    #[arg(required = true, value_name = "user_rdf")]
    pub user_rdf: PathBuf,

    /// Site or committee export to build groups from.
    #[arg(required = true, value_name = "group_rdf")]
    pub group_rdf: PathBuf,

    /// Add missing members to groups that already exist.
    #[arg(short, long)]
    pub merge_members: bool,
}

impl Cli {
    fn credential_flags(&self) -> CredentialFlags {
        CredentialFlags {
            url: self.ldap_url.clone(),
            bind_dn: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    };

    let credentials = match config.credentials(cli.credential_flags()) {
        Ok(credentials) => credentials,
        Err(usage) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, usage)
            .exit(),
    };

    if let Err(error) = run(cli.command, &config, &credentials) {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn load_config(cli: &Cli) -> Result<SyncConfig> {
    match &cli.config {
        Some(path) => Ok(SyncConfig::load(path)?),
        None => Ok(SyncConfig::load_or_default(default_config_path()?)?),
    }
}

fn run(command: Command, config: &SyncConfig, credentials: &Credentials) -> Result<()> {
    match command {
        Command::Users(opts) => run_users(opts, config, credentials),
        Command::Sites(opts) => run_sites(opts, config, credentials),
        Command::Committees(opts) => run_committees(opts, config, credentials),
    }
}

fn run_users(opts: UsersOptions, config: &SyncConfig, credentials: &Credentials) -> Result<()> {
    let defaults = config.person_defaults();
    let catalogs = opts
        .user_rdf
        .iter()
        .map(|path| open_persons(path, &defaults))
        .collect::<Result<Vec<_>, _>>()?;

    let report = with_directory(credentials, |directory| {
        let mut synchronizer = Synchronizer::new(directory, config.directory_settings());
        let mut report = SyncReport::default();
        for catalog in &catalogs {
            report += synchronizer.sync_persons(catalog);
        }
        report
    })?;

    println!(
        "Added {} entries to the LDAP server at: [{}]",
        report.added, credentials.url
    );
    info!("{report}");

    Ok(())
}

fn run_sites(opts: GroupOptions, config: &SyncConfig, credentials: &Credentials) -> Result<()> {
    let persons = open_persons(&opts.user_rdf, &config.person_defaults())?;
    let sites = open_sites(&opts.group_rdf, &persons)?;

    let report = with_directory(credentials, |directory| {
        Synchronizer::new(directory, config.directory_settings())
            .merge_members(opts.merge_members)
            .sync_sites(&sites)
    })?;

    println!(
        "Added {} groups to the LDAP server at: [{}]",
        report.added, credentials.url
    );
    info!("{report}");

    Ok(())
}

fn run_committees(
    opts: GroupOptions,
    config: &SyncConfig,
    credentials: &Credentials,
) -> Result<()> {
    let persons = open_persons(&opts.user_rdf, &config.person_defaults())?;
    let groups = open_groups(&opts.group_rdf, &persons)?;

    let report = with_directory(credentials, |directory| {
        Synchronizer::new(directory, config.directory_settings())
            .merge_members(opts.merge_members)
            .sync_groups(&groups)
    })?;

    println!(
        "Added {} groups to the LDAP server at: [{}]",
        report.added, credentials.url
    );
    info!("{report}");

    Ok(())
}

// INVARIANT: One bound connection serves the whole run.
fn with_directory<T>(
    credentials: &Credentials,
    work: impl FnOnce(&mut LdapDirectory) -> T,
) -> Result<T> {
    let mut directory = LdapDirectory::connect(&credentials.url)?;
    let value = with_session(
        &mut directory,
        &credentials.bind_dn,
        &credentials.password,
        work,
    )?;

    Ok(value)
}

//! attribute-access CLI — `aac` command.
//!
//! Registers identities in a file-backed ledger, delegates and revokes
//! attributes, and checks whether an identity holds an attribute.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use attribute_access::{AccessControlService, FileLedger, LedgerBackend, TransactionContext};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_ledger_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set; pass --ledger explicitly")?;
    Ok(PathBuf::from(home)
        .join(".agentic")
        .join("access")
        .join("ledger.json"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// attribute-access CLI — manage identities and their attributes in a
/// local ledger file.
#[derive(Parser, Debug)]
#[command(
    name = "aac",
    about = "attribute-access CLI",
    version,
    long_about = "aac — attribute-access CLI\n\nRegister identities, delegate and revoke attributes,\nand authenticate identities against a ledger file."
)]
struct Cli {
    /// Ledger file (default: ~/.agentic/access/ledger.json)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new identity
    Register {
        /// Identity id
        id: String,
    },

    /// Delegate attributes to an identity
    Delegate {
        /// Identity id
        id: String,
        /// Attributes, separated by ';'
        attrs: String,
    },

    /// Revoke attributes from an identity
    Revoke {
        /// Identity id
        id: String,
        /// Attributes, separated by ';'
        attrs: String,
    },

    /// Check that an identity holds an attribute
    Authenticate {
        /// Identity id
        id: String,
        /// Required attribute
        attr: String,
    },

    /// Display an identity and its attributes
    Show {
        /// Identity id
        id: String,
        /// Print the stored record bytes as hex
        #[arg(long)]
        raw: bool,
    },

    /// List registered identity ids
    List,
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = open_ledger(cli.ledger).and_then(|ledger| match cli.command {
        Commands::Register { id } => cmd_register(&ledger, &id, verbose),
        Commands::Delegate { id, attrs } => cmd_delegate(&ledger, &id, &attrs, verbose),
        Commands::Revoke { id, attrs } => cmd_revoke(&ledger, &id, &attrs, verbose),
        Commands::Authenticate { id, attr } => cmd_authenticate(&ledger, &id, &attr, verbose),
        Commands::Show { id, raw } => cmd_show(&ledger, &id, raw),
        Commands::List => cmd_list(&ledger),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn open_ledger(path: Option<PathBuf>) -> Result<FileLedger> {
    let path = match path {
        Some(path) => path,
        None => default_ledger_path()?,
    };
    log::debug!("using ledger {}", path.display());
    Ok(FileLedger::open(path))
}

// ── Command implementations ───────────────────────────────────────────────────

fn service() -> AccessControlService {
    AccessControlService::default()
}

/// `aac register ID`
fn cmd_register(ledger: &FileLedger, id: &str, verbose: bool) -> Result<()> {
    let service = service();
    let mut tx = ledger.begin();
    service.register_user(&mut tx, id)?;
    let summary = tx
        .commit()
        .map_err(|e| anyhow!("failed to commit registration: {e}"))?;

    println!("Registered identity: {id}");
    if verbose {
        println!("  Ledger:   {}", ledger.path().display());
        println!("  Revision: {}", summary.revision);
    }
    Ok(())
}

/// `aac delegate ID ATTRS`
fn cmd_delegate(ledger: &FileLedger, id: &str, attrs: &str, verbose: bool) -> Result<()> {
    let service = service();
    let mut tx = ledger.begin();
    service.delegate_attributes(&mut tx, id, attrs)?;
    let summary = tx
        .commit()
        .map_err(|e| anyhow!("failed to commit delegation: {e}"))?;

    println!("Delegated to {id}: {attrs}");
    if verbose {
        println!("  Revision: {}", summary.revision);
    }
    Ok(())
}

/// `aac revoke ID ATTRS`
fn cmd_revoke(ledger: &FileLedger, id: &str, attrs: &str, verbose: bool) -> Result<()> {
    let service = service();
    let mut tx = ledger.begin();
    service.revoke_attributes(&mut tx, id, attrs)?;
    let summary = tx
        .commit()
        .map_err(|e| anyhow!("failed to commit revocation: {e}"))?;

    println!("Revoked from {id}: {attrs}");
    if verbose {
        println!("  Revision: {}", summary.revision);
    }
    Ok(())
}

/// `aac authenticate ID ATTR`
fn cmd_authenticate(ledger: &FileLedger, id: &str, attr: &str, verbose: bool) -> Result<()> {
    let service = service();
    service.authenticate(&mut ledger.begin(), id, attr)?;

    println!("Access granted: {id} holds [{attr}]");
    if verbose {
        println!("  Ledger: {}", ledger.path().display());
    }
    Ok(())
}

/// `aac show ID [--raw]`
fn cmd_show(ledger: &FileLedger, id: &str, raw: bool) -> Result<()> {
    let service = service();
    let identity = service.inspect(&mut ledger.begin(), id)?;
    let attributes = identity.attributes();

    println!("Identity:   {}", identity.id());
    println!("Attributes: {}", attributes.len());
    for attr in &attributes {
        println!("  - {attr}");
    }

    if raw {
        let bytes = ledger
            .begin()
            .get_state(id)?
            .ok_or_else(|| anyhow!("identity '{id}' disappeared from the ledger"))?;
        println!("Record:     {}", hex::encode(bytes));
    }
    Ok(())
}

/// `aac list`
fn cmd_list(ledger: &FileLedger) -> Result<()> {
    let keys = ledger.keys()?;
    if keys.is_empty() {
        println!("No identities registered.");
        return Ok(());
    }

    println!("Identities ({}):", keys.len());
    for key in keys {
        println!("  {key}");
    }
    Ok(())
}

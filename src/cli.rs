//! Command-line interface: `open | write | read | wipe | create`
//! subcommands over a vault file.
//!
//! Shaped after the teacher's `cli.rs`, but the subcommands are vault
//! operations instead of encrypt/decrypt.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytesize::ByteSize;
use clap::{Parser, Subcommand};
use console::style;
use inquire::Text;

use crate::collab::prompt::Prompt;
use crate::collab::random::{OsRandomSource, RandomSource};
use crate::collab::salt::hash_salt_file;
use crate::config::{APP_NAME, MAX_PAYLOAD};
use crate::secret::SecretBytes;
use crate::types::VaultAction;
use crate::vault::{Layout, Vault};

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a file's derived layout without touching any slot.
    Open { file: PathBuf },

    /// Lock a secret into the vault under a password.
    Write {
        file: PathBuf,

        /// Secret text to store. Prompted for interactively if omitted.
        #[arg(short, long)]
        secret: Option<String>,

        /// Extra file whose contents are mixed into the salt.
        #[arg(long)]
        salt_file: Option<PathBuf>,

        /// Use Shamir's Secret Sharing instead of plain replication.
        #[arg(long)]
        shamir: bool,
    },

    /// Unlock the secret stored under a password.
    Read {
        file: PathBuf,

        #[arg(long)]
        salt_file: Option<PathBuf>,
    },

    /// Overwrite every slot with fresh random data.
    Wipe {
        file: PathBuf,

        #[arg(long)]
        salt_file: Option<PathBuf>,
    },

    /// Fill a new file with random bytes so it can become a vault.
    Create {
        file: PathBuf,

        /// Size of the new file in bytes.
        #[arg(short, long, default_value_t = 1024 * 1024)]
        size: u64,
    },
}

#[derive(Parser)]
#[command(
    name = "hushvault",
    version,
    about = "A password-locked secret vault whose file contents are indistinguishable from noise."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Installs the global tracing subscriber and parses arguments from
    /// the process environment.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Self::parse())
    }

    pub fn execute(self) -> Result<()> {
        let prompt = Prompt::default();
        match self.command {
            Commands::Open { file } => Self::run_open(&file),
            Commands::Write { file, secret, salt_file, shamir } => {
                Self::run_write(&file, secret, salt_file.as_deref(), shamir, &prompt)
            }
            Commands::Read { file, salt_file } => Self::run_read(&file, salt_file.as_deref(), &prompt),
            Commands::Wipe { file, salt_file } => Self::run_wipe(&file, salt_file.as_deref(), &prompt),
            Commands::Create { file, size } => Self::run_create(&file, size),
        }
    }

    fn run_open(path: &Path) -> Result<()> {
        let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let filesize = file.metadata()?.len();
        let layout = Layout::derive(filesize, true)?;
        println!("{} {}", style("✔").green().bright(), style(format!("{APP_NAME} layout for {}", path.display())).white().bright());
        println!("  size:       {}", ByteSize(filesize));
        println!("  salt_len:   {}", layout.salt_len);
        println!("  area:       {}", ByteSize(layout.area as u64));
        println!("  num_slots:  {}", layout.num_slots);
        println!("  slot_max:   {}", layout.slot_max);
        println!("  shamir_ok:  {}", layout.shamir_mode);
        Ok(())
    }

    fn external_salt(salt_file: Option<&Path>) -> Result<Vec<u8>> {
        match salt_file {
            Some(path) => Ok(hash_salt_file(path)?.to_vec()),
            None => Ok(Vec::new()),
        }
    }

    fn open_vault(path: &Path, salt_file: Option<&Path>, password: &SecretBytes, shamir: bool) -> Result<Vault<std::fs::File>> {
        let file = OpenOptions::new().read(true).write(true).open(path).with_context(|| format!("opening {}", path.display()))?;
        let external = Self::external_salt(salt_file)?;
        Ok(Vault::open(file, password, &external, shamir, Box::new(OsRandomSource))?)
    }

    fn run_write(path: &Path, secret: Option<String>, salt_file: Option<&Path>, shamir: bool, prompt: &Prompt) -> Result<()> {
        let password = prompt.prompt_new_password()?;
        let secret_text = match secret {
            Some(s) => s,
            None => Text::new("Secret to store").prompt()?,
        };
        if secret_text.len() > MAX_PAYLOAD {
            anyhow::bail!("secret is {} bytes, but a vault slot can only hold {MAX_PAYLOAD}", secret_text.len());
        }

        let mut vault = Self::open_vault(path, salt_file, &password, shamir)?;
        vault.write_slot(secret_text.as_bytes())?;
        vault.close()?;
        Self::show_success(VaultAction::Write, path);
        Ok(())
    }

    fn run_read(path: &Path, salt_file: Option<&Path>, prompt: &Prompt) -> Result<()> {
        let password = prompt.prompt_existing_password()?;
        let mut vault = Self::open_vault(path, salt_file, &password, true)?;
        match vault.read_slot()? {
            Some(data) => println!("{}", String::from_utf8_lossy(&data)),
            None => println!("{} {}", style("✘").red().bright(), style("no secret found under this password").white().bright()),
        }
        Ok(())
    }

    fn run_wipe(path: &Path, salt_file: Option<&Path>, prompt: &Prompt) -> Result<()> {
        if !prompt.confirm("This will permanently destroy the secret stored at this password. Continue?")? {
            return Ok(());
        }
        let password = prompt.prompt_existing_password()?;
        let mut vault = Self::open_vault(path, salt_file, &password, true)?;
        vault.wipe()?;
        vault.close()?;
        Self::show_success(VaultAction::Wipe, path);
        Ok(())
    }

    fn run_create(path: &Path, size: u64) -> Result<()> {
        let mut file =
            OpenOptions::new().write(true).create_new(true).open(path).with_context(|| format!("creating {}", path.display()))?;
        let random = OsRandomSource;
        let mut remaining = size;
        const CHUNK: u64 = 1024 * 1024;
        while remaining > 0 {
            let take = remaining.min(CHUNK) as usize;
            file.write_all(&random.bytes(take))?;
            remaining -= take as u64;
        }
        file.flush()?;
        Self::show_success(VaultAction::Create, path);
        Ok(())
    }

    fn show_success(action: VaultAction, path: &Path) {
        println!("{} {}", style("✔").green().bright(), style(format!("{action} succeeded: {}", path.display())).white().bright());
    }
}

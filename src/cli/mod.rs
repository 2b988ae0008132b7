mod config;
mod error;
mod util;

use clap::{Args, Parser, Subcommand};
use config::{Config, TomlConfig};
pub use error::Context;
use error::{Error, ResultExt};
use keystretch::{Algorithm, Dispatcher, Params};
use std::{
    io::BufRead,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

#[derive(Debug, Parser)]
#[clap(about, author, version = crate::EXPANDED_VERSION)]
#[clap(help_template = r"{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}")]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Command,
    /// path to a TOML configuration file
    #[clap(short, long, env = "KEYSTRETCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// maximum number of derivations running at once (default=number of CPUs)
    #[clap(long, global = true)]
    pub max_jobs: Option<NonZeroUsize>,
    /// mix scrypt lanes on all cores instead of one after another
    #[clap(long, global = true)]
    pub parallel_lanes: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// derive a key with scrypt
    Scrypt(ScryptArgs),
    /// derive a key with PBKDF2
    Pbkdf2(Pbkdf2Args),
    /// check a password against a hex-encoded scrypt key
    Verify(VerifyArgs),
    /// print random bytes from the operating system
    Random(RandomArgs),
    /// show version information
    Version,
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// salt as text
    #[clap(short, long, conflicts_with = "salt_hex")]
    salt: Option<String>,
    /// salt as hex
    #[clap(long)]
    salt_hex: Option<String>,
    /// read the password from the first line of stdin instead of prompting
    #[clap(long)]
    stdin: bool,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct CostArgs {
    /// CPU/memory cost N, a power of two (default=16384)
    #[clap(short = 'N', long)]
    pub cost: Option<u64>,
    /// block size factor r (default=8)
    #[clap(short = 'r', long)]
    pub block_size: Option<u64>,
    /// parallelism factor p (default=1)
    #[clap(short = 'p', long)]
    pub parallelism: Option<u64>,
}

#[derive(Debug, Clone, Args)]
pub struct ScryptArgs {
    #[clap(flatten)]
    input: InputArgs,
    #[clap(flatten)]
    cost: CostArgs,
    /// key length in bytes (default=32)
    #[clap(short, long)]
    length: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct Pbkdf2Args {
    #[clap(flatten)]
    input: InputArgs,
    /// digest: sha1, sha224, sha256, sha384, sha512, md5 or ripemd160 (default=sha256)
    #[clap(short, long)]
    pub digest: Option<Algorithm>,
    /// iteration count (default=600000)
    #[clap(short, long)]
    pub iterations: Option<u32>,
    /// key length in bytes (default=32)
    #[clap(short, long)]
    length: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[clap(flatten)]
    input: InputArgs,
    #[clap(flatten)]
    cost: CostArgs,
    /// the expected key, hex-encoded; its length sets the key length
    expected: String,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct RandomArgs {
    /// number of bytes (default=32)
    #[clap(short, long)]
    length: Option<usize>,
}

impl Command {
    pub const fn cost_args(&self) -> Option<&CostArgs> {
        match self {
            Self::Scrypt(ScryptArgs { cost, .. }) | Self::Verify(VerifyArgs { cost, .. }) => {
                Some(cost)
            }
            _ => None,
        }
    }

    pub const fn pbkdf2_args(&self) -> Option<&Pbkdf2Args> {
        match self {
            Self::Pbkdf2(args) => Some(args),
            _ => None,
        }
    }

    pub const fn length(&self) -> Option<usize> {
        match self {
            Self::Scrypt(ScryptArgs { length, .. })
            | Self::Pbkdf2(Pbkdf2Args { length, .. })
            | Self::Random(RandomArgs { length }) => *length,
            Self::Verify(_) | Self::Version => None,
        }
    }
}

impl InputArgs {
    fn salt(&self) -> Result<Vec<u8>, Error> {
        match (&self.salt, &self.salt_hex) {
            (_, Some(hex)) => util::from_hex(hex).map_err(|()| Error::InvalidHex("salt")),
            (Some(text), None) => Ok(text.as_bytes().to_vec()),
            (None, None) => {
                warn!("no salt given, deriving with an empty salt");
                Ok(Vec::new())
            }
        }
    }

    fn password(&self) -> Result<Vec<u8>, Context> {
        if !self.stdin {
            return Ok(rpassword::prompt_password("password: ")
                .context("failed to read password interactively")?
                .into_bytes());
        }
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        let len = line.trim_end_matches(['\r', '\n']).len();
        let mut password = line.into_bytes();
        // the line ending stays in spare capacity after truncation
        keystretch::cleanse(&mut password[len..]);
        password.truncate(len);
        Ok(password)
    }
}

impl Cli {
    pub async fn run() -> Result<(), Context> {
        let cli = Self::parse();
        let toml_config = TomlConfig::new(Self::load_table(cli.config.as_deref())?);
        let config = Config::new(&toml_config, &cli).context("while reading configuration")?;
        init_logging(config.log_level());
        debug!(?config, "resolved configuration");
        let dispatcher =
            Dispatcher::new(config.max_jobs()).with_parallel_lanes(config.parallel_lanes());
        match cli.subcommand {
            Command::Scrypt(args) => {
                let salt = args.input.salt()?;
                let password = args.input.password()?;
                let key = dispatcher
                    .scrypt(
                        password,
                        salt,
                        config.cost(),
                        config.block_size(),
                        config.parallelism(),
                        config.key_length(),
                    )
                    .await
                    .context("scrypt failed")?;
                println!("{}", util::hex(&key));
            }
            Command::Pbkdf2(args) => {
                let salt = args.input.salt()?;
                let password = args.input.password()?;
                let key = dispatcher
                    .pbkdf2(
                        config.digest(),
                        password,
                        salt,
                        config.iterations(),
                        config.key_length(),
                    )
                    .await
                    .context("PBKDF2 failed")?;
                println!("{}", util::hex(&key));
            }
            Command::Verify(args) => {
                let expected =
                    util::from_hex(&args.expected).map_err(|()| Error::InvalidHex("expected key"))?;
                let params = Params::new(config.cost(), config.block_size(), config.parallelism())
                    .map_err(keystretch::Error::from)
                    .context("invalid scrypt parameters")?;
                let salt = args.input.salt()?;
                let password = args.input.password()?;
                let matches = dispatcher
                    .verify_scrypt(password, salt, params, expected)
                    .await
                    .context("verification failed")?;
                if !matches {
                    return Err(Error::Mismatch.into());
                }
                println!("ok");
            }
            Command::Random(_) => {
                let bytes =
                    keystretch::random_bytes(config.key_length()).context("random fill failed")?;
                println!("{}", util::hex(&bytes));
            }
            Command::Version => println!("{}", crate::EXPANDED_VERSION),
        }
        Ok(())
    }

    fn load_table(path: Option<&Path>) -> Result<toml::value::Table, Context> {
        let Some(path) = path else {
            return Ok(toml::value::Table::new());
        };
        let contents = std::fs::read_to_string(path).context(format!(
            "while reading config file at '{}'",
            path.display()
        ))?;
        toml::from_str::<toml::value::Table>(&contents).context("while parsing config file")
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

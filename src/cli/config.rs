use super::{error::Error, Cli};
use keystretch::Algorithm;
use std::num::NonZeroUsize;

const DEFAULT_COST: u64 = 1 << 14;
const DEFAULT_BLOCK_SIZE: u64 = 8;
const DEFAULT_PARALLELISM: u64 = 1;
const DEFAULT_KEY_LENGTH: usize = 32;
const DEFAULT_ITERATIONS: u32 = 600_000;
const DEFAULT_LOG_LEVEL: &str = "warn";

#[allow(clippy::module_name_repetitions)]
pub struct TomlConfig {
    table: toml::value::Table,
}

impl TomlConfig {
    pub const fn new(table: toml::value::Table) -> Self {
        Self { table }
    }

    /// A non-negative integer field that also fits in `T`. Missing fields are
    /// `None`; present fields of the wrong type or range are errors.
    fn unsigned<T: TryFrom<i64>>(&self, field: &'static str) -> Result<Option<T>, Error> {
        match self.table.get(field) {
            None => Ok(None),
            Some(toml::Value::Integer(v)) => T::try_from(*v)
                .map(Some)
                .map_err(|_| Error::InvalidField(field)),
            Some(_) => Err(Error::InvalidField(field)),
        }
    }

    fn string(&self, field: &'static str) -> Result<Option<&str>, Error> {
        match self.table.get(field) {
            None => Ok(None),
            Some(toml::Value::String(v)) => Ok(Some(v)),
            Some(_) => Err(Error::InvalidField(field)),
        }
    }

    pub fn cost(&self) -> Result<u64, Error> {
        Ok(self.unsigned("cost")?.unwrap_or(DEFAULT_COST))
    }

    pub fn block_size(&self) -> Result<u64, Error> {
        Ok(self.unsigned("block_size")?.unwrap_or(DEFAULT_BLOCK_SIZE))
    }

    pub fn parallelism(&self) -> Result<u64, Error> {
        Ok(self.unsigned("parallelism")?.unwrap_or(DEFAULT_PARALLELISM))
    }

    pub fn key_length(&self) -> Result<usize, Error> {
        Ok(self.unsigned("key_length")?.unwrap_or(DEFAULT_KEY_LENGTH))
    }

    pub fn iterations(&self) -> Result<u32, Error> {
        Ok(self.unsigned("iterations")?.unwrap_or(DEFAULT_ITERATIONS))
    }

    pub fn digest(&self) -> Result<Algorithm, Error> {
        self.string("digest")?.map_or(Ok(Algorithm::default()), |v| {
            v.parse().map_err(|_| Error::InvalidField("digest"))
        })
    }

    pub fn max_jobs(&self) -> Result<Option<NonZeroUsize>, Error> {
        self.unsigned::<usize>("max_jobs")?
            .map(|v| NonZeroUsize::new(v).ok_or(Error::InvalidField("max_jobs")))
            .transpose()
    }

    pub fn parallel_lanes(&self) -> Result<bool, Error> {
        match self.table.get("parallel_lanes") {
            None => Ok(false),
            Some(toml::Value::Boolean(v)) => Ok(*v),
            Some(_) => Err(Error::InvalidField("parallel_lanes")),
        }
    }

    pub fn log_level(&self) -> Result<String, Error> {
        Ok(self
            .string("log_level")?
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string())
    }
}

/// Settings after command-line flags have been applied over the file.
#[derive(Debug)]
pub struct Config {
    cost: u64,
    block_size: u64,
    parallelism: u64,
    key_length: usize,
    digest: Algorithm,
    iterations: u32,
    max_jobs: NonZeroUsize,
    parallel_lanes: bool,
    log_level: String,
}

impl Config {
    pub fn new(t: &TomlConfig, c: &Cli) -> Result<Self, Error> {
        let cost_args = c.subcommand.cost_args();
        let pbkdf2_args = c.subcommand.pbkdf2_args();
        Ok(Self {
            cost: match cost_args.and_then(|a| a.cost) {
                Some(v) => v,
                None => t.cost()?,
            },
            block_size: match cost_args.and_then(|a| a.block_size) {
                Some(v) => v,
                None => t.block_size()?,
            },
            parallelism: match cost_args.and_then(|a| a.parallelism) {
                Some(v) => v,
                None => t.parallelism()?,
            },
            key_length: match c.subcommand.length() {
                Some(v) => v,
                None => t.key_length()?,
            },
            digest: match pbkdf2_args.and_then(|a| a.digest) {
                Some(v) => v,
                None => t.digest()?,
            },
            iterations: match pbkdf2_args.and_then(|a| a.iterations) {
                Some(v) => v,
                None => t.iterations()?,
            },
            max_jobs: match c.max_jobs {
                Some(v) => v,
                None => t.max_jobs()?.unwrap_or_else(|| {
                    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
                }),
            },
            parallel_lanes: c.parallel_lanes || t.parallel_lanes()?,
            log_level: t.log_level()?,
        })
    }

    pub const fn cost(&self) -> u64 {
        self.cost
    }

    pub const fn block_size(&self) -> u64 {
        self.block_size
    }

    pub const fn parallelism(&self) -> u64 {
        self.parallelism
    }

    pub const fn key_length(&self) -> usize {
        self.key_length
    }

    pub const fn digest(&self) -> Algorithm {
        self.digest
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    pub const fn max_jobs(&self) -> NonZeroUsize {
        self.max_jobs
    }

    pub const fn parallel_lanes(&self) -> bool {
        self.parallel_lanes
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn toml(s: &str) -> TomlConfig {
        TomlConfig::new(toml::from_str(s).unwrap())
    }

    #[test]
    fn defaults_apply_to_an_empty_file() {
        let t = toml("");
        assert_eq!(t.cost().unwrap(), DEFAULT_COST);
        assert_eq!(t.block_size().unwrap(), DEFAULT_BLOCK_SIZE);
        assert_eq!(t.parallelism().unwrap(), DEFAULT_PARALLELISM);
        assert_eq!(t.key_length().unwrap(), DEFAULT_KEY_LENGTH);
        assert_eq!(t.iterations().unwrap(), DEFAULT_ITERATIONS);
        assert_eq!(t.digest().unwrap(), Algorithm::Sha256);
        assert_eq!(t.max_jobs().unwrap(), None);
        assert!(!t.parallel_lanes().unwrap());
        assert_eq!(t.log_level().unwrap(), "warn");
    }

    #[test]
    fn reads_typed_fields() {
        let t = toml(
            r#"
            cost = 1024
            block_size = 4
            parallelism = 2
            key_length = 48
            iterations = 10
            digest = "SHA-512"
            max_jobs = 3
            parallel_lanes = true
            log_level = "debug"
            "#,
        );
        assert_eq!(t.cost().unwrap(), 1024);
        assert_eq!(t.block_size().unwrap(), 4);
        assert_eq!(t.parallelism().unwrap(), 2);
        assert_eq!(t.key_length().unwrap(), 48);
        assert_eq!(t.iterations().unwrap(), 10);
        assert_eq!(t.digest().unwrap(), Algorithm::Sha512);
        assert_eq!(t.max_jobs().unwrap(), NonZeroUsize::new(3));
        assert!(t.parallel_lanes().unwrap());
        assert_eq!(t.log_level().unwrap(), "debug");
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(matches!(toml("cost = -1").cost(), Err(Error::InvalidField("cost"))));
        assert!(matches!(
            toml("cost = \"big\"").cost(),
            Err(Error::InvalidField("cost"))
        ));
        assert!(matches!(
            toml("iterations = 5000000000").iterations(),
            Err(Error::InvalidField("iterations"))
        ));
        assert!(matches!(
            toml("digest = \"md5\"").digest(),
            Err(Error::InvalidField("digest"))
        ));
        assert!(matches!(
            toml("max_jobs = 0").max_jobs(),
            Err(Error::InvalidField("max_jobs"))
        ));
        assert!(matches!(
            toml("parallel_lanes = 1").parallel_lanes(),
            Err(Error::InvalidField("parallel_lanes"))
        ));
    }

    #[test]
    fn flags_override_the_file() {
        let t = toml("cost = 1024\nblock_size = 4\nkey_length = 48\nmax_jobs = 3");
        let cli = Cli::parse_from([
            "keystretch",
            "--max-jobs",
            "5",
            "scrypt",
            "-N",
            "16",
            "--length",
            "12",
        ]);
        let config = Config::new(&t, &cli).unwrap();
        assert_eq!(config.cost(), 16);
        assert_eq!(config.block_size(), 4);
        assert_eq!(config.parallelism(), DEFAULT_PARALLELISM);
        assert_eq!(config.key_length(), 12);
        assert_eq!(config.max_jobs().get(), 5);
        assert!(!config.parallel_lanes());
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn pbkdf2_flags_override_the_file() {
        let t = toml("digest = \"sha384\"\niterations = 7");
        let cli = Cli::parse_from(["keystretch", "pbkdf2", "--digest", "sha224"]);
        let config = Config::new(&t, &cli).unwrap();
        assert_eq!(config.digest(), Algorithm::Sha224);
        assert_eq!(config.iterations(), 7);

        let cli = Cli::parse_from(["keystretch", "--parallel-lanes", "random", "-l", "4"]);
        let config = Config::new(&t, &cli).unwrap();
        assert_eq!(config.digest(), Algorithm::Sha384);
        assert_eq!(config.key_length(), 4);
        assert!(config.parallel_lanes());
    }
}

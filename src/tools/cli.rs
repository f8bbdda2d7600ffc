use std::path::PathBuf;
use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, warn};

use crate::error::{BwhError, Result};

/// Default block width: one wrapped line of input per block.
pub const DEFAULT_WIDTH: usize = 1024;
/// Widest block accepted. The rotation sort is quadratic, so anything wider is impractical.
pub const MAX_WIDTH: usize = 1 << 20;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}
impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A block-sorting file compressor: rotation BWT, move-to-front and huffman coding",
    long_about = None
)]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    filename: PathBuf,

    /// Compress the input file (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Decompress the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity without writing anything
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Force overwriting the output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Maximum block width in bytes. Blocks end at the last newline that fits.
    #[clap(short = 'w', long = "width", default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Skip the BWT and move-to-front stages, huffman code the raw bytes
    #[clap(long = "no-transform")]
    no_transform: bool,

    /// Be verbose (a 2nd -v gives more)
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u64,

    /// Suppress all messages
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

/// All user settable options that control program behavior
#[derive(Debug, Clone)]
pub struct BwhOpts {
    /// Name of the file to read for input
    pub file: PathBuf,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Maximum input block width processed by one pass of the pipeline
    pub block_width: usize,
    /// Run BWT and move-to-front before huffman coding
    pub transform: bool,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl BwhOpts {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            op_mode: Mode::Zip,
            output: Output::File,
            force_overwrite: false,
            block_width: DEFAULT_WIDTH,
            transform: true,
            verbose: Verbosity::Warnings,
        }
    }

    /// Put command line information from CLAP into our internal structure.
    pub fn from_args(args: Args) -> Result<Self> {
        if !(1..=MAX_WIDTH).contains(&args.width) {
            return Err(BwhError::Config(format!(
                "block width must be between 1 and {}, got {}",
                MAX_WIDTH, args.width
            )));
        }
        let mut opts = BwhOpts::new(args.filename);
        opts.op_mode = if args.test {
            Mode::Test
        } else if args.decompress {
            Mode::Unzip
        } else {
            Mode::Zip
        };
        if args.compress && opts.op_mode != Mode::Zip {
            warn!("Both compress and {} requested, using {}.", opts.op_mode, opts.op_mode);
        }
        if args.stdout {
            opts.output = Output::Stdout
        };
        opts.force_overwrite = args.force;
        opts.block_width = args.width;
        opts.transform = !args.no_transform;
        opts.verbose = if args.quiet {
            Verbosity::Quiet
        } else {
            match args.verbose {
                0 => Verbosity::Warnings,
                1 => Verbosity::Info,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        };
        Ok(opts)
    }

    /// Log level filter matching our verbosity.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.verbose {
            Verbosity::Quiet => log::LevelFilter::Off,
            Verbosity::Errors => log::LevelFilter::Error,
            Verbosity::Warnings => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }

    /// Report the settings we are running with.
    pub fn report(&self) {
        info!("---- bwhuff initialization start ----");
        info!("Verbosity set to {}", self.verbose);
        info!("Operational mode set to {}", self.op_mode);
        info!("Getting input from the file {}", self.file.display());
        info!("Sending output to {}", self.output);
        info!("Block width set to {}", self.block_width);
        if !self.transform {
            info!("BWT and move-to-front disabled")
        };
        if self.force_overwrite {
            info!("Forcing file overwriting")
        };
        info!("---- bwhuff initialization end ----");
    }
}

/// Parse the process arguments and set the log level.
pub fn bwhopts_init() -> Result<BwhOpts> {
    let opts = BwhOpts::from_args(Args::parse())?;
    log::set_max_level(opts.level_filter());
    opts.report();
    Ok(opts)
}

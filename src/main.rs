//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::ExitCode;

use bwhuff::compression::{compress::compress, decompress::decompress};
use bwhuff::tools::cli::{bwhopts_init, Mode};

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> ExitCode {
    // Log to stderr so --stdout output stays clean. The real level is set from the options.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("bwhuff: cannot start logging: {}", e);
    }

    let result = bwhopts_init().and_then(|options| match options.op_mode {
        Mode::Zip => compress(&options),
        Mode::Unzip | Mode::Test => decompress(&options),
    });

    match result {
        Ok(()) => {
            info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("bwhuff: {}", e);
            ExitCode::FAILURE
        }
    }
}

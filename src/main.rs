use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

mod cipher;
mod search;

use cipher::{padding, CipherOracle, DesEcb};
use search::{MatchPredicate, SearchConfig, SearchSession, SessionResult};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "keysweep")]
#[command(about = "keysweep - parallel DES key-space sweeper")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// CLI predicate selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliPredicate {
    /// Decrypted text must equal the pattern exactly
    Exact,
    /// Decrypted bytes must contain the pattern
    Substring,
    /// Lossy-UTF-8 decoding must contain the keyword
    Keyword,
}

impl CliPredicate {
    fn into_predicate(self, pattern: &str) -> MatchPredicate {
        match self {
            CliPredicate::Exact => MatchPredicate::Exact(pattern.as_bytes().to_vec()),
            CliPredicate::Substring => MatchPredicate::Substring(pattern.as_bytes().to_vec()),
            CliPredicate::Keyword => MatchPredicate::Keyword(pattern.to_string()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a plaintext file under a known key
    Encrypt {
        /// Path to the plaintext file
        input: PathBuf,
        /// Encryption key as an unsigned integer
        #[arg(long)]
        key: u64,
        /// Output path for the ciphertext (default: input with .enc appended)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Skip padding; the input must already be block-aligned
        #[arg(long)]
        raw: bool,
    },
    /// Brute-force the key of a ciphertext file
    Crack {
        /// Path to the ciphertext file
        input: PathBuf,
        /// Verification predicate for decrypted candidates
        #[arg(long, value_enum, default_value = "keyword")]
        predicate: CliPredicate,
        /// Pattern the predicate matches against
        #[arg(long)]
        pattern: String,
        /// Size of the key window to sweep
        #[arg(long, default_value = "65536")]
        total_keys: u64,
        /// First key of the window
        #[arg(long, default_value = "0")]
        start_key: u64,
        /// Number of worker threads (default: all cores)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Candidate tests between termination-signal polls
        #[arg(long, default_value = "1024")]
        poll_interval: u64,
        /// The ciphertext was encrypted without padding
        #[arg(long)]
        raw: bool,
        /// Print per-worker ranges and progress
        #[arg(long, short)]
        verbose: bool,
    },
}

// --- Subcommand Runners ---

fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn run_encrypt(
    input: &PathBuf,
    key: u64,
    output: Option<PathBuf>,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plaintext = fs::read(input)?;
    if plaintext.is_empty() {
        return Err(format!("input file is empty: {}", input.display()).into());
    }

    let cipher = DesEcb;
    if raw && plaintext.len() % cipher.block_size() != 0 {
        return Err(format!(
            "--raw requires input length to be a multiple of {} bytes (got {})",
            cipher.block_size(),
            plaintext.len()
        )
        .into());
    }

    let start_time = Instant::now();
    let message = if raw {
        plaintext
    } else {
        padding::pad(&plaintext, cipher.block_size())
    };
    let ciphertext = cipher.encrypt_blocks(key, &message);
    let elapsed = start_time.elapsed();

    let output_path = output.unwrap_or_else(|| {
        let mut name = input.clone().into_os_string();
        name.push(".enc");
        PathBuf::from(name)
    });
    fs::write(&output_path, &ciphertext)?;

    println!("Ciphertext ({} bytes): {}", ciphertext.len(), format_hex(&ciphertext));
    println!("Written to: {}", output_path.display());
    println!("Encryption time: {:.2?}", elapsed);
    Ok(())
}

struct CrackOptions {
    predicate: CliPredicate,
    pattern: String,
    total_keys: u64,
    start_key: u64,
    workers: Option<usize>,
    poll_interval: u64,
    raw: bool,
    verbose: bool,
}

fn run_crack(input: &PathBuf, options: &CrackOptions) -> Result<SessionResult, Box<dyn std::error::Error>> {
    if options.pattern.is_empty() {
        return Err("--pattern must not be empty".into());
    }
    let ciphertext = fs::read(input)?;

    let mut config = SearchConfig::new(
        options.total_keys,
        options.predicate.into_predicate(&options.pattern),
    )
    .with_start_key(options.start_key)
    .with_poll_interval(options.poll_interval)
    .with_padding(!options.raw);
    if let Some(workers) = options.workers {
        config = config.with_workers(workers);
    }

    if options.verbose {
        println!(
            "Sweeping keys [{:#x}, {:#x}) with {} workers, {} predicate",
            config.start_key,
            config.start_key.saturating_add(config.total_keys),
            config.workers,
            config.predicate
        );
    }

    let session = SearchSession::new(Arc::new(DesEcb), ciphertext, config)?;
    let result = session.run(options.verbose);

    if let (Some(key), Some(plaintext)) = (result.key, result.plaintext.as_deref()) {
        println!("Key found: {:#018x} ({})", key, key);
        println!("Decrypted text: {}", String::from_utf8_lossy(plaintext));
    } else if result.statistics.coverage_complete {
        println!("No key found: the full window was searched without a match.");
    } else {
        println!("No key found, and at least one partition was not fully searched.");
    }
    println!("Search time: {:.2?}", result.elapsed);
    print!("{}", result.statistics.format_summary(result.elapsed));

    Ok(result)
}

// --- Main Function ---

fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Encrypt {
            input,
            key,
            output,
            raw,
        } => match run_encrypt(&input, key, output, raw) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("Error encrypting: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Crack {
            input,
            predicate,
            pattern,
            total_keys,
            start_key,
            workers,
            poll_interval,
            raw,
            verbose,
        } => {
            let options = CrackOptions {
                predicate,
                pattern,
                total_keys,
                start_key,
                workers,
                poll_interval,
                raw,
                verbose,
            };
            match run_crack(&input, &options) {
                Ok(result) if result.resolved => {}
                Ok(_) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

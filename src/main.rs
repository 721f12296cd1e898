// Copyright 2025 LocalSSL Contributors
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use localssl::{
    get_trust_store, parse_cert_file, Ca, CaOptions, Cert, Error, Paths, ProjectConfig, Result,
    DEFAULT_CERT_DAYS, DEFAULT_OUTPUT_DIR,
};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "localssl")]
#[command(about = "Local development SSL certificate setup tool")]
#[command(version)]
#[command(after_help = "\
EXAMPLES:
    localssl                                  # Interactive mode
    localssl -d localhost,127.0.0.1           # Cert for localhost
    localssl -d myapp.local -o ./certs        # Custom domain and output dir
    localssl --uninstall                      # Remove the CA from the trust store

Project defaults can be set in localssl.toml or under
[package.metadata.localssl] in Cargo.toml.")]
struct Cli {
    /// Comma separated list of domains
    #[arg(short, long)]
    domains: Option<String>,

    /// Output directory for certificates
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validity of the certificate in days
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    validity: Option<u32>,

    /// Install CA to system trust store
    #[arg(long)]
    install_ca: bool,

    /// Uninstall the CA from system trust store
    #[arg(long, conflicts_with_all = ["domains", "install_ca"])]
    uninstall: bool,

    /// Never touch the system trust store (CI/Docker mode)
    #[arg(long, conflicts_with = "install_ca")]
    skip_install: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Show detailed output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

/// Output helper that respects --quiet and --verbose flags.
#[derive(Clone, Copy)]
struct Output {
    quiet: bool,
    verbose: bool,
}

impl Output {
    fn new(quiet: bool, verbose: bool) -> Self {
        Self { quiet, verbose }
    }

    /// Print a standard message (suppressed with --quiet)
    fn print(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a verbose message (only shown with --verbose)
    fn verbose(&self, msg: &str) {
        if self.verbose {
            println!("{}", msg);
        }
    }
}

fn main() {
    // Reset SIGPIPE to default behavior (exit) instead of panic
    // This prevents "broken pipe" panics when output is piped to tools like grep/head
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new()?;
    let out = Output::new(cli.quiet, cli.verbose);

    if cli.uninstall {
        return cmd_uninstall(out);
    }

    let cwd = std::env::current_dir()
        .map_err(|e| Error::Config(format!("Cannot determine working directory: {}", e)))?;
    let config = ProjectConfig::discover(&cwd)?;

    let mut domains: Vec<String> = match &cli.domains {
        Some(list) => split_domains(list),
        None => {
            let from_config = config.domains.clone().unwrap_or_default();
            if !from_config.is_empty() {
                out.print(&format!(
                    "Loaded domains from config: {}",
                    from_config.join(", ")
                ));
            }
            from_config
        }
    };
    let mut output_dir = cli.output.clone().or_else(|| config.output.clone());
    let mut validity = cli.validity.or(config.validity);
    let mut install_ca = cli.install_ca;

    // Interactive mode if no domains from flags or config
    if domains.is_empty() {
        let answer = prompt_line("Enter domains (comma separated)", "localhost,127.0.0.1")?;
        domains = split_domains(&answer);

        if output_dir.is_none() {
            let dir = prompt_line("Output directory", DEFAULT_OUTPUT_DIR)?;
            output_dir = Some(PathBuf::from(dir));
        }
        if validity.is_none() {
            let days = prompt_line("Validity in days", "365")?;
            validity = Some(days.parse().map_err(|_| {
                Error::InvalidDays(format!("'{}' is not a number", days))
            })?);
        }
        if !cli.skip_install && !install_ca {
            install_ca = confirm_prompt("Install the CA to the system trust store?", true)?;
        }
    }

    if domains.is_empty() {
        return Err(Error::NoDomains);
    }
    let validity = validity.unwrap_or(DEFAULT_CERT_DAYS);
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    // Load the persisted CA, or create and save a new one
    let (ca, fresh_ca) = match Ca::load(&paths)? {
        Some(ca) => {
            out.verbose(&format!(
                "Loaded existing CA from {}",
                paths.ca_cert.display()
            ));
            (ca, false)
        }
        None => {
            out.print("Creating new Certificate Authority...");
            let ca = Ca::generate(&CaOptions::default())?;
            ca.save(&paths)?;
            out.verbose(&format!("CA saved to {}", paths.ca_cert.display()));
            (ca, true)
        }
    };

    // A newly created CA is installed unless the caller opted out. Trust
    // store failures are warnings: the generated certificate stays valid
    // even when system-wide installation fails.
    if (install_ca || fresh_ca) && !cli.skip_install {
        out.print("Installing CA to system trust store...");
        match get_trust_store() {
            Ok(store) => match store.install_ca(&paths.ca_cert) {
                Ok(()) => out.print(&format!("\x1b[32m✓\x1b[0m CA installed to {}", store.name())),
                Err(e) => {
                    eprintln!("\x1b[33m⚠ Could not install CA to {}: {}\x1b[0m", store.name(), e);
                    eprintln!(
                        "  You may need to install {} manually.",
                        paths.ca_cert.display()
                    );
                }
            },
            Err(e) => eprintln!("\x1b[33m⚠ {}\x1b[0m", e),
        }
    } else if fresh_ca {
        out.verbose("Skipping trust store installation");
    }

    out.print(&format!(
        "Generating certificates for {}...",
        domains.join(", ")
    ));
    let cert = Cert::generate(&ca, &domains, validity)?;
    let saved = cert.save(&output_dir)?;

    out.print("\x1b[32m✓\x1b[0m Certificates generated successfully!");
    println!();
    println!("Files created:");
    println!("  Key:  {}", saved.key_path.display());
    println!("  Cert: {}", saved.cert_path.display());
    if let Ok(info) = parse_cert_file(&saved.cert_path) {
        out.verbose(&format!(
            "  Expires: {} ({} days)",
            info.expiry_string(),
            info.days_remaining()
        ));
    }

    Ok(())
}

fn cmd_uninstall(out: Output) -> Result<()> {
    out.print("Uninstalling Certificate Authority...");
    let store = get_trust_store()?;
    store.uninstall_ca()?;
    out.print(&format!(
        "\x1b[32m✓\x1b[0m CA removed from {}",
        store.name()
    ));
    Ok(())
}

fn split_domains(list: &str) -> Vec<String> {
    list.split(',')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

/// Prompt for a line of input, falling back to `default` on an empty answer.
fn prompt_line(message: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", message, default);
    io::stdout().flush().ok();

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| Error::Config(format!("Failed to read input: {}", e)))?;

    let input = input.trim();
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input.to_string())
    }
}

/// Display a yes/no prompt and return the chosen answer.
fn confirm_prompt(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", message, hint);
    io::stdout().flush().ok();

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| Error::Config(format!("Failed to read input: {}", e)))?;

    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Ok(default_yes);
    }
    Ok(input == "y" || input == "yes")
}

use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use portage_meta::{
    Categories, Error, Meta, PackageQuery, RenderConfig, Repositories, Result, ERROR_PREFIX,
};

/// Display metadata about a given package.
#[derive(Parser, Debug)]
#[command(name = "portage-meta", version, about)]
struct Cli {
    /// Parse metadata.xml in the current directory
    #[arg(short, long)]
    current: bool,

    /// Show an extended package description
    #[arg(short, long)]
    description: bool,

    /// Show the herd(s) for the package
    #[arg(short = 'H', long)]
    herd: bool,

    /// Show the maintainer(s) for the package
    #[arg(short, long)]
    maintainer: bool,

    /// Show per-package USE flag descriptions
    #[arg(short, long)]
    useflags: bool,

    /// Show package's upstream information
    #[arg(short = 'U', long)]
    upstream: bool,

    /// Show the plain XML file
    #[arg(short, long)]
    xml: bool,

    /// Only print the requested information, without headers or placeholders
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(short = 'C', long = "no-color")]
    no_color: bool,

    /// Wrap output at this many columns (defaults to $COLUMNS, then the terminal width)
    #[arg(long)]
    width: Option<usize>,

    /// Package names or atoms, e.g. `portage` or `>=sys-apps/portage-3.0`
    queries: Vec<String>,
}

impl Cli {
    fn categories(&self) -> Categories {
        Categories {
            herd: self.herd,
            maintainer: self.maintainer,
            upstream: self.upstream,
            description: self.description,
            useflags: self.useflags,
            xml: self.xml,
        }
    }

    fn render_config(&self) -> RenderConfig {
        let color = !self.no_color
            && env::var_os("NO_COLOR").is_none()
            && io::stdout().is_terminal();
        let width = self
            .width
            .or_else(|| columns(env::var("COLUMNS").ok().as_deref()));
        RenderConfig::new(RenderConfig::detect_width(width), !self.quiet).with_color(color)
    }
}

/// Width from a `COLUMNS` value; anything but a positive number is ignored.
fn columns(raw: Option<&str>) -> Option<usize> {
    let width = raw?.trim().parse::<usize>().ok().filter(|w| *w > 0);
    if width.is_none() {
        log::debug!("ignoring COLUMNS={raw:?}");
    }
    width
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Usage(msg)) => {
            log::debug!("usage error: {msg}");
            let _ = Cli::command().print_help();
            println!();
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("{ERROR_PREFIX}{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.queries.is_empty() && !cli.current {
        return Err(Error::Usage("no package query given".to_string()));
    }

    let render = cli.render_config();
    log::debug!("render settings: {render:?}");

    let repos = Repositories::from_env()?;
    let herds = repos.herd_registry();
    let meta = Meta::new(cli.categories(), render, &repos, &herds);

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    if cli.current {
        let dir = env::current_dir()?;
        meta.run_current(&dir, &mut out, &mut err)
    } else {
        let queries = cli
            .queries
            .iter()
            .map(|q| q.parse())
            .collect::<Result<Vec<PackageQuery>>>()?;
        meta.run(&queries, &mut out, &mut err)
    }
}

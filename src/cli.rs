//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::backends::lister::{CommandLister, DEFAULT_LISTER, DEFAULT_TIMEOUT_SECS};
use crate::cache::store::{check_freshness, refresh, Freshness};
use crate::core::logger::Progress;
use crate::core::model::{MatchLevel, MatchResult, SearchError};
use crate::core::paths::{default_cache_dir, resolve_cache_path, tool_path};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::core::util::current_user;
use crate::search::matcher::Matcher;
use crate::search::search_file;

/// nixsearch - search Nix packages by name or description, with caching.
#[derive(Parser, Debug)]
#[command(name = "nixsearch")]
#[command(
    author,
    version,
    about,
    long_about = r#"nixsearch keeps a local snapshot of `nix-env -qaP * --description` and
searches it line by line.

The snapshot is refreshed when it is missing, older than 24 hours, or when --force
is given. The search term is always taken literally.

Strictness (the most restrictive flag wins):
- (none): case-insensitive substring anywhere in the line
- -c: case-sensitive substring
- -w: whole word
- -e: package name ends with the term
- -x: term is an exact dotted component at the end of the package name

Examples:
    nixsearch ripgrep
    nixsearch -x python3
    nixsearch -w --no-color git | less
    nixsearch --force --format jsonl hello
"#
)]
pub struct Cli {
    /// Term to search for in package names and descriptions.
    #[arg(value_name = "TERM", value_parser = NonEmptyStringValueParser::new())]
    pub term: String,

    /// Force refresh of the package cache.
    #[arg(
        short,
        long,
        long_help = "Refresh the package cache before searching, regardless of its age."
    )]
    pub force: bool,

    /// Match case-sensitively.
    #[arg(short = 'c', long)]
    pub case_sensitive: bool,

    /// Match whole words only.
    #[arg(
        short,
        long,
        long_help = "Only match the term where it is delimited by non-word characters\n\
(anything but letters, digits and '_') or the ends of the line. Case-sensitive."
    )]
    pub word: bool,

    /// Match only where the package name ends with the term.
    #[arg(
        short,
        long,
        long_help = "Only match when the package name (the first column) ends with the term,\n\
and the term starts at a word boundary. `bar` matches pkgs.foo.bar and pkgs.foo-bar\n\
but not pkgs.foobar. Case-sensitive."
    )]
    pub end: bool,

    /// Match an exact dotted component at the end of the package name.
    #[arg(
        short = 'x',
        long,
        long_help = "Only match when the term is the whole package name or its last dotted\n\
component(s). `foo` matches pkgs.foo but not pkgs.foo.bar or pkgs.foobar. Case-sensitive."
    )]
    pub exact: bool,

    /// Disable colored output.
    #[arg(
        long,
        long_help = "Disable highlighting. Highlighting is also off whenever stdout is not a\n\
terminal, so piped output is always plain text."
    )]
    pub no_color: bool,

    /// Output format (text/jsonl).
    #[arg(
        long,
        env = "NIXSEARCH_FORMAT",
        default_value = "text",
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- text (default): status line, separator, one package per line\n\
- jsonl: one JSON object per match with name, description, line and spans"
    )]
    pub format: String,

    /// Directory holding the cache file.
    #[arg(
        long,
        env = "NIXSEARCH_CACHE_DIR",
        value_name = "DIR",
        long_help = "Directory holding the cache file (defaults to the system temp directory).\n\n\
The file name is derived from the current user and the path of this executable."
    )]
    pub cache_dir: Option<PathBuf>,

    /// Command that produces the package listing.
    #[arg(
        long,
        env = "NIXSEARCH_LISTER",
        default_value = DEFAULT_LISTER,
        value_name = "COMMAND",
        long_help = "Command that prints the package listing, one `<name> <description>` per line.\n\n\
The command line is split on whitespace and run without a shell."
    )]
    pub lister: String,

    /// Lister timeout in seconds.
    #[arg(
        long,
        env = "NIXSEARCH_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_name = "SECS"
    )]
    pub timeout: u64,

    /// Quiet mode (no progress messages).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging on stderr).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The strictest level among the selected flags
    pub fn level(&self) -> MatchLevel {
        let selected = [
            (self.case_sensitive, MatchLevel::CaseSensitive),
            (self.word, MatchLevel::WordBoundary),
            (self.end, MatchLevel::EndBoundary),
            (self.exact, MatchLevel::ExactComponent),
        ];
        MatchLevel::strictest(
            selected
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, level)| level),
        )
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let color = !cli.no_color && io::stdout().is_terminal();
    let progress = Progress::new(cli.quiet, !cli.no_color && io::stderr().is_terminal());

    let matcher = Matcher::new(&cli.term, cli.level())?;

    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let cache_path = resolve_cache_path(&cache_dir, &current_user(), &tool_path());
    debug!(path = %cache_path.display(), level = ?matcher.level(), "resolved cache");

    let freshness = check_freshness(&cache_path, cli.force);
    if freshness.needs_refresh() {
        if freshness == Freshness::Stale {
            progress.status("Cache is older than 24 hours. Updating...");
        }
        progress.status("Updating package cache...");

        let lister =
            CommandLister::from_command_line(&cli.lister, Duration::from_secs(cli.timeout))?;
        refresh(&cache_path, &lister)?;

        progress.status("Cache updated successfully.");
    }

    let results = search_file(&cache_path, &matcher)?;

    let stdout = BufWriter::new(io::stdout().lock());
    let renderer = Renderer::new(RenderConfig::new(format, color), stdout);

    match render_results(renderer, &matcher, results) {
        Ok(count) => debug!(count, "search finished"),
        // `nixsearch foo | head` closes the pipe early; that's not a failure.
        Err(e) if is_broken_pipe(&e) => debug!("stdout closed early"),
        Err(e) => return Err(e),
    }

    Ok(())
}

fn render_results<W: Write>(
    mut renderer: Renderer<W>,
    matcher: &Matcher,
    results: impl Iterator<Item = Result<MatchResult, SearchError>>,
) -> Result<usize> {
    renderer
        .header(matcher.term(), matcher.level())
        .context("Failed to write search results")?;

    let mut count = 0;
    for result in results {
        renderer
            .result(&result?)
            .context("Failed to write search results")?;
        count += 1;
    }

    renderer.finish().context("Failed to write search results")?;
    Ok(count)
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

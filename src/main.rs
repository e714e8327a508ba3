//! build-docs — generate documentation from JSDoc-style comment blocks.
//!
//! Two modes:
//!
//! - **path mode**: `build-docs src lib/**/*.ts -f json -o dist`
//! - **stdin mode**: `build-docs --stdin -f markdown < file.ts`

mod config;
mod elements;
mod error;
mod link;
mod logging;
mod model;
mod parser;
mod render;
mod slug;
mod walk;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Overrides, Settings};
use link::Linked;
use model::{ElementGroup, SourceFile};
use parser::Extractor;
use render::Site;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "build-docs",
    version,
    about = "Generate documentation from JSDoc-style comments in JavaScript and TypeScript sources"
)]
struct Cli {
    /// Files, directories or glob patterns to scan (default: config target_paths).
    paths: Vec<String>,

    /// Output directory
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: html (default), json, markdown
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Page title
    #[arg(short = 't', long)]
    title: Option<String>,

    /// Output file name without extension
    #[arg(long = "name")]
    output_name: Option<String>,

    /// File extension to pick up when walking directories. Repeatable.
    #[arg(long = "file-type")]
    file_types: Vec<String>,

    /// Skip paths containing this text. Repeatable.
    #[arg(long = "ignore")]
    ignore_paths: Vec<String>,

    /// Config file (default: ./build-docs.toml when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Read one source from stdin and print the result to stdout
    #[arg(long, conflicts_with = "paths")]
    stdin: bool,

    /// Debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            title: self.title.clone(),
            target_paths: self.paths.clone(),
            output_path: self.output.clone(),
            output_name: self.output_name.clone(),
            format: self.format.clone(),
            file_types: self
                .file_types
                .iter()
                .map(|t| t.trim_start_matches('.').to_string())
                .collect(),
            ignore_paths: self.ignore_paths.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(cli.overrides())?;
    logging::init(cli.verbose, cli.quiet, &settings.log_level);

    let extractor = match settings.comment_pattern {
        Some(ref pattern) => Extractor::with_pattern(pattern)
            .with_context(|| format!("invalid comment_pattern: {}", pattern))?,
        None => Extractor::default(),
    };
    debug!(pattern = extractor.pattern(), "comment block pattern");
    // Fail on a bad format before touching any files.
    let renderer = render::create_renderer(&settings.format)?;

    if cli.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        let sources = vec![SourceFile::new("<stdin>", input)];
        let (linked, groups) = document(&extractor, &sources)?;
        let site = site(&settings, &linked, &groups);
        print!("{}", renderer.render(&site)?);
        return Ok(());
    }

    let filter = walk::FileFilter {
        file_types: &settings.file_types,
        ignore_paths: &settings.ignore_paths,
    };
    let paths = walk::collect_paths(&settings.target_paths, filter)?;
    info!(files = paths.len(), "collected source files");
    let sources = walk::read_sources(&paths);

    let (linked, groups) = document(&extractor, &sources)?;
    let site = site(&settings, &linked, &groups);
    let output = renderer.render(&site)?;

    let out_path = output_file(
        &settings.output_path,
        &settings.output_name,
        renderer.file_extension(),
    );
    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }
    fs::write(&out_path, output)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!(path = %out_path.display(), "wrote documentation");

    Ok(())
}

/// Extract, link and lay out every comment in `sources`.
fn document(extractor: &Extractor, sources: &[SourceFile]) -> Result<(Linked, Vec<ElementGroup>)> {
    let raw: Vec<_> = sources
        .iter()
        .flat_map(|source| {
            let found = extractor.extract(source);
            debug!(file = %source.path.display(), comments = found.len(), "extracted");
            found
        })
        .collect();
    info!(comments = raw.len(), "extracted comment blocks");

    let linked = link::link(raw)?;
    info!(
        namespaces = linked.registries.namespaces.len(),
        modules = linked.registries.modules.len(),
        files = linked.registries.files.len(),
        "linked comments"
    );

    let groups = elements::build(&linked.processed, &linked.registries)?;
    Ok((linked, groups))
}

fn site<'a>(settings: &'a Settings, linked: &'a Linked, groups: &'a [ElementGroup]) -> Site<'a> {
    Site {
        title: &settings.title,
        linked,
        elements: groups,
        html: &settings.html,
    }
}

/// `<dir>/<name>.<ext>`
fn output_file(dir: &Path, name: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_file_joins_name_and_extension() {
        assert_eq!(
            output_file(Path::new("./.dist"), "docs", "html"),
            PathBuf::from("./.dist/docs.html")
        );
        assert_eq!(
            output_file(Path::new("out"), "reference", "md"),
            PathBuf::from("out/reference.md")
        );
    }

    #[test]
    fn cli_maps_to_overrides() {
        let cli = Cli::parse_from([
            "build-docs",
            "src",
            "lib",
            "-f",
            "json",
            "--file-type",
            ".tsx",
            "--ignore",
            "vendor",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.target_paths, vec!["src", "lib"]);
        assert_eq!(overrides.format.as_deref(), Some("json"));
        assert_eq!(overrides.file_types, vec!["tsx"]);
        assert_eq!(overrides.ignore_paths, vec!["vendor"]);
        assert!(overrides.title.is_none());
    }

    #[test]
    fn stdin_conflicts_with_paths() {
        assert!(Cli::try_parse_from(["build-docs", "--stdin", "src"]).is_err());
        assert!(Cli::try_parse_from(["build-docs", "-v", "-q"]).is_err());
    }

    #[test]
    fn document_links_sources() {
        let sources = vec![
            SourceFile::new("a.ts", "/**\n * @namespace App\n * @module App.Core\n */"),
            SourceFile::new("b.ts", "/**\n * @type {function} run\n * @memberof module:App.Core\n */"),
        ];
        let (linked, groups) = document(&Extractor::default(), &sources).unwrap();
        assert_eq!(linked.processed.len(), 2);
        assert_eq!(linked.processed[0].children.len(), 1);
        assert_eq!(groups.len(), 1);
    }
}

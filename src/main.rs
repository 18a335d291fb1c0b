// Command-line entry point for Callscape.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use callscape::application::AnalyzeUsecase;
use callscape::domain::language::SourceKind;
use callscape::infrastructure::{collect_rs_files, read_sources, JsonGraphSource, RustGraphSource};
use callscape::ports::{
    DotExporter, GraphSource, JsonExporter, RenderOptions, SourceFile, TextExporter, TreeExporter,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file(s): .rs source or .json call graph (can specify multiple)
    #[arg(short, long, required = false)]
    input: Vec<String>,

    /// Input source folder(s), collected recursively for .rs files
    #[arg(short = 'd', long, required = false)]
    folder: Vec<String>,

    /// Output file path
    #[arg(short, long)]
    output: String,

    /// Output format (text, dot, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Render only the given function(s)
    #[arg(short = 'F', long = "function")]
    functions: Vec<String>,

    /// Ignore (do not render) the given function(s) and their subtrees
    #[arg(long = "ignore")]
    ignores: Vec<String>,

    /// Drop functions with no known definition before rendering
    #[arg(long)]
    filter: bool,

    /// Start from the function with the deepest call chain
    #[arg(long)]
    deepest: bool,
}

fn gather_sources(cli: &Cli) -> anyhow::Result<Vec<SourceFile>> {
    let inputs: Vec<PathBuf> = cli.input.iter().map(PathBuf::from).collect();
    let mut sources = read_sources(&inputs).context("failed to read input files")?;

    for folder in &cli.folder {
        let found = collect_rs_files(Path::new(folder))
            .with_context(|| format!("failed to scan folder {}", folder))?;
        sources.extend(found);
    }
    Ok(sources)
}

fn pick_source_kind(sources: &[SourceFile]) -> anyhow::Result<SourceKind> {
    let mut kind = None;
    for src in sources {
        let Some(this) = SourceKind::from_path(&src.path) else {
            bail!("cannot infer input kind of {}", src.path.display());
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => {
                bail!("mixed input kinds: {} is {}, expected {}", src.path.display(), this, k)
            }
            Some(_) => {}
        }
    }
    kind.ok_or_else(|| anyhow::anyhow!("no inputs"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let sources = gather_sources(&cli)?;
    if sources.is_empty() {
        bail!("provide at least one --input <file> or --folder <dir>");
    }
    println!("[callscape] analyzing {} file(s)", sources.len());

    let kind = pick_source_kind(&sources)?;
    let source: Box<dyn GraphSource> = match kind {
        SourceKind::RustSource => Box::new(RustGraphSource),
        SourceKind::CallGraphJson => Box::new(JsonGraphSource),
    };

    let exporter: Box<dyn TreeExporter> = match cli.format.as_str() {
        "text" => Box::new(TextExporter),
        "dot" => Box::new(DotExporter),
        "json" => Box::new(JsonExporter),
        other => bail!("unknown format: {} (expected text, dot, or json)", other),
    };

    let opts = RenderOptions {
        functions: cli.functions.clone(),
        ignores: cli.ignores.clone(),
        filter_undefined: cli.filter,
        deepest: cli.deepest,
    };

    let usecase = AnalyzeUsecase {
        source: source.as_ref(),
        exporter: exporter.as_ref(),
    };
    usecase
        .run(&sources, &opts, Path::new(&cli.output))
        .context("analysis failed")?;

    println!(
        "Analysis completed! Output written to {} (format: {})",
        cli.output, cli.format
    );
    Ok(())
}

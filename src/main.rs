use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docx2md::{
    Config, DocumentSource, DocumentUrl, Snapshot, SnapshotDir, SnapshotResolver, load_snapshot,
};

#[derive(Parser)]
#[command(name = "docx2md")]
#[command(version, about = "Convert Feishu/Lark docx snapshots to Markdown")]
struct Cli {
    /// Document URL (looked up in the snapshot directory) or snapshot JSON file
    input: String,

    /// Output Markdown file (defaults to <token>.md, or <title>.md with title_as_filename)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file
    #[arg(short, long, default_value = "docx2md.toml")]
    config: PathBuf,

    /// Directory of <token>.json snapshots, overriding the config
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Inline documents referenced by chapter-link headings
    #[arg(long)]
    one_page: bool,

    /// Use HTML tags for bold, italic and strikethrough
    #[arg(long)]
    html_tags: bool,

    /// Write the collected image tokens to this file as a JSON array
    #[arg(long)]
    image_manifest: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log.level);

    if let Err(e) = run(cli, config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli, mut config: Config) -> docx2md::Result<()> {
    config.output.one_page |= cli.one_page;
    config.output.use_html_tags |= cli.html_tags;
    if let Some(dir) = cli.snapshot_dir {
        config.source.snapshot_dir = dir;
    }

    let resolver = SnapshotResolver::new(SnapshotDir::new(&config.source.snapshot_dir));
    let (snapshot, token) = match cli.input.parse::<DocumentUrl>() {
        Ok(url) => {
            let snapshot = SnapshotDir::new(&config.source.snapshot_dir).fetch(&url)?;
            (snapshot, Some(url.token().to_string()))
        }
        Err(_) => (load_snapshot(Path::new(&cli.input))?, None),
    };

    let rendered = resolver.render_root(&snapshot, config.render_context())?;
    info!(
        document = %snapshot.document.document_id,
        images = rendered.image_tokens.len(),
        "rendered document"
    );

    let output = cli
        .output
        .unwrap_or_else(|| {
            default_output(&snapshot, token.as_deref(), config.output.title_as_filename)
        });
    fs::write(&output, &rendered.markdown)?;

    if let Some(manifest) = cli.image_manifest {
        fs::write(&manifest, serde_json::to_string_pretty(&rendered.image_tokens)?)?;
    }

    println!("Created {}", output.display());
    Ok(())
}

/// `<title>.md` when asked for, else the token of the input URL, falling back
/// to the document id for snapshot files.
fn default_output(snapshot: &Snapshot, token: Option<&str>, title_as_filename: bool) -> PathBuf {
    let title = sanitize_file_name(&snapshot.document.title);
    let stem = if title_as_filename && !title.is_empty() {
        title
    } else {
        token.unwrap_or(&snapshot.document.document_id).to_string()
    };
    PathBuf::from(format!("{stem}.md"))
}

fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

//! # pickslip CLI
//!
//! Command-line interface for picking slip PDFs and jsPDF code generation.
//!
//! ## Usage
//!
//! ```bash
//! # Parse slip text into a JSON record
//! pickslip parse slip.txt
//!
//! # Generate a jsPDF function from slip text on stdin
//! cat slip.txt | pickslip code --template arrow --function-name makeSlip
//!
//! # Render a slip PDF
//! pickslip pdf slip.txt --output slip.pdf
//!
//! # Generate code (and optionally a PDF) from canvas elements
//! pickslip visual elements.json --pdf template.pdf
//!
//! # Start the HTTP API
//! pickslip serve --listen 0.0.0.0:8080
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pickslip::{
    PickslipError,
    canvas::{self, CanvasElement},
    generate::{self, CodegenOptions},
    ir::{DeclStyle, ExportStyle},
    render::{self, image_source::ImageResolver},
    server::{self, DEFAULT_SESSION_TTL_SECS, ServerConfig},
    slip,
};

/// pickslip - Picking slip PDF designer and jsPDF code generator
#[derive(Parser, Debug)]
#[command(name = "pickslip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse slip text and print the record as JSON
    Parse {
        /// Slip text file (stdin when omitted)
        input: Option<PathBuf>,
    },

    /// Generate a jsPDF function from slip text
    Code {
        /// Slip text file (stdin when omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        codegen: CodegenArgs,

        /// Write the code to a file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render slip text as a PDF
    Pdf {
        /// Slip text file (stdin when omitted)
        input: Option<PathBuf>,

        /// Output PDF path
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },

    /// Generate code from a JSON array of canvas elements
    Visual {
        /// Elements JSON file (stdin when omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        codegen: CodegenArgs,

        /// Also render the elements as a PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to listen on
        #[arg(long, env = "PICKSLIP_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,

        /// Seconds before idle canvases and previews expire
        #[arg(long, env = "PICKSLIP_SESSION_TTL", default_value_t = DEFAULT_SESSION_TTL_SECS)]
        session_ttl: u64,
    },
}

#[derive(Args, Debug)]
struct CodegenArgs {
    /// Function declaration form
    #[arg(long, value_enum, default_value_t = DeclStyle::Function)]
    template: DeclStyle,

    /// Export style
    #[arg(long, value_enum, default_value_t = ExportStyle::Export)]
    export_type: ExportStyle,

    /// Name of the generated function
    #[arg(long)]
    function_name: Option<String>,

    /// Omit import statements
    #[arg(long)]
    no_imports: bool,
}

impl From<CodegenArgs> for CodegenOptions {
    fn from(args: CodegenArgs) -> Self {
        Self {
            template: args.template,
            export_type: args.export_type,
            function_name: args.function_name,
            include_imports: !args.no_imports,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pickslip=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PickslipError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input } => {
            let record = slip::parse(&read_input(input.as_deref())?);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Code {
            input,
            codegen,
            output,
        } => {
            let record = slip::parse(&read_input(input.as_deref())?);
            let code = generate::slip_code(&record, &codegen.into());
            write_text(output.as_deref(), &code)?;
        }

        Commands::Pdf { input, output } => {
            let record = slip::parse(&read_input(input.as_deref())?);
            let bytes = render::slip::render_slip(&record)?;
            std::fs::write(&output, &bytes)?;
            tracing::info!(path = %output.display(), bytes = bytes.len(), "Wrote slip PDF");
        }

        Commands::Visual {
            input,
            codegen,
            pdf,
        } => {
            let elements: Vec<CanvasElement> =
                serde_json::from_str(&read_input(input.as_deref())?)?;
            canvas::check_unique_ids(&elements)?;
            println!("{}", generate::visual_code(&elements, &codegen.into()));

            if let Some(path) = pdf {
                let images = ImageResolver::new()?
                    .with_local_files(true)
                    .with_private_hosts(true)
                    .resolve_all(&elements)
                    .await;
                let bytes = render::visual::render_elements(&elements, &images)?;
                std::fs::write(&path, &bytes)?;
                tracing::info!(path = %path.display(), elements = elements.len(), "Wrote template PDF");
            }
        }

        Commands::Serve {
            listen,
            session_ttl,
        } => {
            server::serve(ServerConfig {
                listen_addr: listen,
                session_ttl_secs: session_ttl,
            })
            .await?;
        }
    }

    Ok(())
}

/// Read a file, or all of stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, PickslipError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn write_text(path: Option<&Path>, text: &str) -> Result<(), PickslipError> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "Wrote generated code");
        }
        None => println!("{}", text),
    }
    Ok(())
}

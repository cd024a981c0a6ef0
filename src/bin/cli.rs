use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use qrstamp_lib::config::{self, Offset, Overrides, Size};

#[derive(Parser)]
#[command(
    name = "qrstamp",
    about = "Cola cada QR code de uma pasta sobre o template e salva os tokens finais"
)]
struct Cli {
    /// Imagem do template (default: template.png)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Pasta com os QR codes (default: qr_codes)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pasta de saída (default: output_tokens2)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tamanho do QR code no token, LARGURAxALTURA (default: 150x150)
    #[arg(short, long, value_parser = parse_size_arg)]
    size: Option<Size>,

    /// Canto superior esquerdo do QR code no template, X,Y (default: 73,123)
    #[arg(short, long, value_parser = parse_offset_arg)]
    position: Option<Offset>,

    /// Arquivo TOML com as configurações
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mostra logs de diagnóstico
    #[arg(short, long)]
    verbose: bool,
}

fn parse_size_arg(s: &str) -> Result<Size, String> {
    config::parse_size(s).map_err(|e| format!("{e:#}"))
}

fn parse_offset_arg(s: &str) -> Result<Offset, String> {
    config::parse_offset(s).map_err(|e| format!("{e:#}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let settings = config::resolve_settings(
        cli.config.as_deref(),
        Overrides {
            template: cli.template,
            input: cli.input,
            output: cli.output,
            size: cli.size,
            offset: cli.position,
        },
    )?;

    match qrstamp_lib::run(&settings) {
        Ok(report) => {
            if report.has_failures() {
                tracing::warn!(failed = report.failed.len(), "some QR codes were not processed");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.report());
            std::process::exit(1);
        }
    }
}

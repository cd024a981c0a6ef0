use anyhow::Result;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::composite;
use crate::config::Settings;
use crate::error::CompositorError;
use crate::scan;

/// Resultado de um lote. `found` conta todas as entradas do diretório,
/// não apenas as processadas.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub found: usize,
    pub created: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Executa o lote completo: template → lista → redimensiona/cola/salva.
///
/// Erros de template, diretório de entrada ou configuração abortam.
/// Erros de um arquivo são impressos e o lote segue.
#[tracing::instrument(skip_all, fields(input = %settings.input_dir.display()))]
pub fn run(settings: &Settings) -> Result<BatchReport, CompositorError> {
    settings.validate()?;

    // 1. Diretório de saída
    std::fs::create_dir_all(&settings.output_dir).map_err(|e| {
        CompositorError::OutputDirError(settings.output_dir.clone(), e.to_string())
    })?;

    // 2. Template
    let template = composite::load_template(&settings.template)?;
    tracing::debug!(
        width = template.width(),
        height = template.height(),
        "template loaded"
    );

    // 3. Entradas
    let entries = scan::list_entries(&settings.input_dir)?;
    if entries.is_empty() {
        return Err(CompositorError::NoInputFiles(settings.input_dir.clone()));
    }

    let mut report = BatchReport {
        found: entries.len(),
        ..Default::default()
    };
    println!("Found {} QR codes. Starting process...", report.found);

    // 4. Um token por QR code
    for entry in &entries {
        let filename = entry.to_string_lossy();
        if !scan::is_qr_file(entry) {
            tracing::debug!(entry = %filename, "skipping non-image entry");
            report.skipped.push(filename.into_owned());
            continue;
        }

        let output_filename = scan::output_name(entry);
        let output_path = settings.output_dir.join(&output_filename);
        let qr_path = settings.input_dir.join(entry);

        match process_file(&template, &qr_path, &output_path, settings) {
            Ok(()) => {
                println!(
                    "Successfully created: {}",
                    output_filename.to_string_lossy()
                );
                report.created.push(output_path);
            }
            Err(e) => {
                println!("Error processing {filename}: {e}");
                report.failed.push((filename.into_owned(), e.to_string()));
            }
        }
    }

    // 5. Resumo
    println!("{}", "-".repeat(30));
    println!("Batch process complete!");
    println!(
        "All {} tokens have been saved to the '{}' folder.",
        report.found,
        settings.output_dir.display()
    );
    tracing::debug!(
        created = report.created.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );

    Ok(report)
}

fn process_file(
    template: &RgbaImage,
    qr_path: &Path,
    output_path: &Path,
    settings: &Settings,
) -> Result<()> {
    let qr = composite::prepare_qr(qr_path, settings.size)?;
    let token = composite::compose_token(template, &qr, settings.offset);
    composite::save_token(token, output_path)
}

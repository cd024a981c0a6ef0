use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::error::CompositorError;

/// Extensões aceitas (sufixo exato, sensível a maiúsculas).
pub const QR_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

pub const OUTPUT_PREFIX: &str = "final_";

/// Lista todas as entradas do diretório, ordenadas pelo nome.
/// Não filtra por extensão: a contagem de "encontrados" inclui tudo.
pub fn list_entries(dir: &Path) -> Result<Vec<OsString>, CompositorError> {
    let read_dir =
        std::fs::read_dir(dir).map_err(|_| CompositorError::InputDirNotFound(dir.to_path_buf()))?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|_| CompositorError::InputDirNotFound(dir.to_path_buf()))?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Compara os bytes do nome, então nomes fora de UTF-8 também passam.
pub fn is_qr_file(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    QR_EXTENSIONS
        .iter()
        .any(|ext| bytes.ends_with(ext.as_bytes()))
}

/// Ex: "qr_017.png" → "final_qr_017.png"
pub fn output_name(name: &OsStr) -> OsString {
    let mut out = OsString::from(OUTPUT_PREFIX);
    out.push(name);
    out
}

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::CompositorError;

pub const DEFAULT_TEMPLATE: &str = "template.png";
pub const DEFAULT_INPUT_DIR: &str = "qr_codes";
pub const DEFAULT_OUTPUT_DIR: &str = "output_tokens2";

/// Tamanho final do QR code no token (largura, altura) em pixels.
pub const DEFAULT_SIZE: Size = Size {
    width: 150,
    height: 150,
};

/// Canto superior esquerdo do quadro branco no template (calibrado à mão).
pub const DEFAULT_OFFSET: Offset = Offset { x: 73, y: 123 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub template: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub size: Size,
    pub offset: Offset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            size: DEFAULT_SIZE,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> std::result::Result<(), CompositorError> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(CompositorError::ConfigError(format!(
                "QR size must be non-zero, got {}x{}",
                self.size.width, self.size.height
            )));
        }
        Ok(())
    }

    /// Sobrescreve apenas os campos presentes no arquivo.
    pub fn merge(&mut self, file: SettingsFile) {
        if let Some(template) = file.template {
            self.template = template;
        }
        if let Some(input) = file.input {
            self.input_dir = input;
        }
        if let Some(output) = file.output {
            self.output_dir = output;
        }
        if let Some([width, height]) = file.size {
            self.size = Size { width, height };
        }
        if let Some([x, y]) = file.position {
            self.offset = Offset { x, y };
        }
    }
}

/// Valores vindos da linha de comando; vencem o arquivo e os defaults.
#[derive(Debug, Default)]
pub struct Overrides {
    pub template: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub size: Option<Size>,
    pub offset: Option<Offset>,
}

/// Defaults → arquivo de configuração → flags da linha de comando.
pub fn resolve_settings(config_file: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = config_file {
        settings.merge(load_settings_file(path)?);
    }
    if let Some(template) = overrides.template {
        settings.template = template;
    }
    if let Some(input) = overrides.input {
        settings.input_dir = input;
    }
    if let Some(output) = overrides.output {
        settings.output_dir = output;
    }
    if let Some(size) = overrides.size {
        settings.size = size;
    }
    if let Some(offset) = overrides.offset {
        settings.offset = offset;
    }

    Ok(settings)
}

/// Forma em disco das configurações; todos os campos são opcionais.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub template: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub size: Option<[u32; 2]>,
    pub position: Option<[u32; 2]>,
}

pub fn load_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let file: SettingsFile =
        toml::from_str(&content).with_context(|| format!("Could not parse {}", path.display()))?;
    Ok(file)
}

/// Ex: "150x150" → Size { 150, 150 }
pub fn parse_size(s: &str) -> Result<Size> {
    let Some((w, h)) = s.split_once(|c: char| c == 'x' || c == 'X') else {
        bail!("expected WIDTHxHEIGHT, got \"{s}\"");
    };
    let width = w.trim().parse::<u32>().context("invalid width")?;
    let height = h.trim().parse::<u32>().context("invalid height")?;
    Ok(Size { width, height })
}

/// Ex: "73,123" → Offset { 73, 123 }
pub fn parse_offset(s: &str) -> Result<Offset> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected X,Y, got \"{s}\"");
    };
    let x = x.trim().parse::<u32>().context("invalid x")?;
    let y = y.trim().parse::<u32>().context("invalid y")?;
    Ok(Offset { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(
            parse_size("150x150").unwrap(),
            Size {
                width: 150,
                height: 150
            }
        );
        assert_eq!(
            parse_size("200X80").unwrap(),
            Size {
                width: 200,
                height: 80
            }
        );
        assert!(parse_size("150").is_err());
        assert!(parse_size("-1x10").is_err());
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("73,123").unwrap(), Offset { x: 73, y: 123 });
        assert_eq!(parse_offset(" 0 , 4 ").unwrap(), Offset { x: 0, y: 4 });
        assert!(parse_offset("73x123").is_err());
    }

    #[test]
    fn test_merge_keeps_missing_fields() {
        let file: SettingsFile = toml::from_str(
            r#"
            input = "codes"
            size = [200, 100]
            "#,
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.merge(file);

        assert_eq!(settings.input_dir, PathBuf::from("codes"));
        assert_eq!(
            settings.size,
            Size {
                width: 200,
                height: 100
            }
        );
        assert_eq!(settings.template, PathBuf::from(DEFAULT_TEMPLATE));
        assert_eq!(settings.offset, DEFAULT_OFFSET);
    }

    #[test]
    fn test_resolve_precedence() {
        let dir = std::env::temp_dir().join(format!("qrstamp_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("qrstamp.toml");
        std::fs::write(
            &path,
            r#"
            template = "from_file.png"
            output = "file_out"
            position = [1, 2]
            "#,
        )
        .unwrap();

        let settings = resolve_settings(
            Some(&path),
            Overrides {
                output: Some(PathBuf::from("cli_out")),
                size: Some(Size {
                    width: 90,
                    height: 60,
                }),
                ..Default::default()
            },
        )
        .unwrap();

        // Flag vence o arquivo, arquivo vence o default
        assert_eq!(settings.output_dir, PathBuf::from("cli_out"));
        assert_eq!(settings.template, PathBuf::from("from_file.png"));
        assert_eq!(settings.offset, Offset { x: 1, y: 2 });
        assert_eq!(
            settings.size,
            Size {
                width: 90,
                height: 60
            }
        );
        assert_eq!(settings.input_dir, PathBuf::from(DEFAULT_INPUT_DIR));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let settings = resolve_settings(None, Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_resolve_missing_config_file() {
        let path = std::env::temp_dir().join("qrstamp_no_such_config.toml");
        assert!(resolve_settings(Some(&path), Overrides::default()).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<SettingsFile>("qr_size = [1, 1]").is_err());
    }

    #[test]
    fn test_validate_zero_size() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());
        settings.size.width = 0;
        assert!(matches!(
            settings.validate(),
            Err(CompositorError::ConfigError(_))
        ));
    }
}

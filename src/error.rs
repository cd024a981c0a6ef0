use std::fmt;
use std::path::PathBuf;

/// Erros que abortam o lote inteiro. Falhas por arquivo não passam por aqui.
#[derive(Debug)]
pub enum CompositorError {
    TemplateNotFound(PathBuf),
    TemplateUnreadable(PathBuf, String),
    InputDirNotFound(PathBuf),
    NoInputFiles(PathBuf),
    OutputDirError(PathBuf, String),
    ConfigError(String),
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateNotFound(path) => {
                write!(f, "Template file not found at '{}'", path.display())
            }
            Self::TemplateUnreadable(path, msg) => {
                write!(f, "Template file '{}' could not be read: {msg}", path.display())
            }
            Self::InputDirNotFound(path) => write!(f, "'{}' folder not found", path.display()),
            Self::NoInputFiles(path) => {
                write!(f, "No QR codes found in '{}' folder", path.display())
            }
            Self::OutputDirError(path, msg) => {
                write!(f, "Could not create output folder '{}': {msg}", path.display())
            }
            Self::ConfigError(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for CompositorError {}

impl CompositorError {
    /// Dica extra para o usuário, impressa pelo binário junto com o erro.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TemplateNotFound(_) => {
                Some("Please make sure the template image is in the expected location.")
            }
            Self::InputDirNotFound(_) => Some("Please create it and add your QR code images."),
            _ => None,
        }
    }

    /// Texto final mostrado no terminal quando o lote aborta.
    pub fn report(&self) -> String {
        match self.hint() {
            Some(hint) => format!("Error: {self}\n{hint}"),
            None => format!("Error: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = CompositorError::TemplateNotFound(PathBuf::from("template.png"));
        assert_eq!(err.to_string(), "Template file not found at 'template.png'");

        let err = CompositorError::NoInputFiles(PathBuf::from("qr_codes"));
        assert!(err.to_string().contains("'qr_codes'"));
    }

    #[test]
    fn test_hint_only_for_missing_paths() {
        assert!(CompositorError::InputDirNotFound(PathBuf::from("x")).hint().is_some());
        assert!(CompositorError::ConfigError("x".into()).hint().is_none());
    }

    #[test]
    fn test_report_has_a_single_error_line() {
        let report = CompositorError::TemplateNotFound(PathBuf::from("t.png")).report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Error: Template file not found at 't.png'");
        assert_eq!(report.matches("Error:").count(), 1);

        let report = CompositorError::NoInputFiles(PathBuf::from("qr")).report();
        assert_eq!(report, "Error: No QR codes found in 'qr' folder");
    }
}

use assignment_grader::config::AppConfig;
use assignment_grader::error::AppError;
use assignment_grader::grading::intake::document_format;
use assignment_grader::grading::{DocumentFormat, GradingError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Environment configuration with optional host/port overrides from the command line.
pub(crate) fn load_config(host: Option<String>, port: Option<u16>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    Ok(config)
}

/// Declared format from the file name; an upload without an extension falls
/// back to its content type.
pub(crate) fn resolve_format(
    name: &str,
    content_type: Option<&str>,
) -> Result<DocumentFormat, GradingError> {
    if Path::new(name).extension().is_none() {
        if let Some(format) = content_type.and_then(format_from_mime) {
            return Ok(format);
        }
    }
    document_format(name)
}

fn format_from_mime(content_type: &str) -> Option<DocumentFormat> {
    let essence = content_type.split(';').next()?.trim();
    mime_guess::get_mime_extensions_str(essence)?
        .iter()
        .find_map(|extension| DocumentFormat::from_extension(extension))
}

//! Jinja template evaluation.
//!
//! Templates are evaluated with `minijinja` in strict mode: an undefined
//! reference is an error wherever it appears, including `if` tests and
//! loop sources. The template's trailing newline is kept and nothing is
//! auto-escaped.

use std::path::Path;

use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior};

use crate::error::RenderError;
use crate::settings::Settings;

/// Shared Jinja environment.
#[derive(Debug)]
pub(crate) struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub(crate) fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }

    /// Renders template source against a settings object. Errors are
    /// reported against `path`.
    pub(crate) fn render(
        &self,
        source: &str,
        path: &Path,
        settings: &Settings,
    ) -> Result<String, RenderError> {
        let name = path.display().to_string();
        self.env
            .render_named_str(&name, source, settings)
            .map_err(|e| located(&e, source, path))
    }
}

fn located(error: &Error, source: &str, path: &Path) -> RenderError {
    let path = path.to_path_buf();
    let line = error.line().unwrap_or_default();

    match error.kind() {
        ErrorKind::SyntaxError => RenderError::TemplateSyntax {
            path,
            line,
            message: describe(error),
        },
        ErrorKind::UndefinedError => RenderError::UnresolvedReference {
            path,
            name: error
                .range()
                .and_then(|range| source.get(range))
                .map_or_else(|| describe(error), |text| text.trim().to_string()),
            line,
        },
        _ => RenderError::TemplateEvaluation {
            path,
            line,
            message: describe(error),
        },
    }
}

fn describe(error: &Error) -> String {
    error
        .detail()
        .map_or_else(|| error.kind().to_string(), str::to_string)
}

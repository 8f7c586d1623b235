//! Rendering a settings block through a template into the run directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::RenderError;
use crate::settings::parse_block;

use super::digest::ContentHasher;
use super::template::TemplateEngine;

/// Result of a successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    /// Number of bytes in the rendered content.
    pub bytes_written: usize,
    /// SHA-256 digest of the rendered content.
    pub digest: String,
    /// The target already held this exact content and was left untouched.
    pub unchanged: bool,
}

/// Renders templates against serialized settings blocks.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    hasher: ContentHasher,
    engine: TemplateEngine,
}

impl TemplateRenderer {
    /// Creates a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hasher: ContentHasher::new(),
            engine: TemplateEngine::new(),
        }
    }

    /// Renders a template against a settings block, in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be parsed, the template cannot be
    /// read or compiled, or a reference in the template is unresolved.
    pub fn render(&self, block: &str, template_path: &Path) -> Result<String, RenderError> {
        let settings = parse_block(block)?;

        let source =
            fs::read_to_string(template_path).map_err(|e| RenderError::TemplateUnreadable {
                path: template_path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!("Rendering template {}", template_path.display());
        self.engine.render(&source, template_path, &settings)
    }

    /// Renders a template and writes the result to `output_path`.
    ///
    /// The content goes to a temporary sibling file first and is renamed
    /// over the target only once complete, so a failed render leaves the
    /// target absent or with its previous content. A target whose digest
    /// already matches the rendered content is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the output cannot be written.
    pub fn render_to_file(
        &self,
        block: &str,
        template_path: &Path,
        output_path: &Path,
    ) -> Result<RenderOutcome, RenderError> {
        let content = self.render(block, template_path)?;
        let digest = self.hasher.hash_content(content.as_bytes());

        let unchanged = self.existing_digest(output_path).is_some_and(|existing| {
            ContentHasher::hashes_match(&existing, &digest)
        });

        if unchanged {
            info!(
                "{} is up to date ({})",
                output_path.display(),
                self.hasher.short_hash(&digest)
            );
        } else {
            write_atomic(output_path, content.as_bytes())?;
            info!(
                "Wrote {} ({} bytes, {})",
                output_path.display(),
                content.len(),
                self.hasher.short_hash(&digest)
            );
        }

        Ok(RenderOutcome {
            bytes_written: content.len(),
            digest,
            unchanged,
        })
    }

    fn existing_digest(&self, output_path: &Path) -> Option<String> {
        let existing = fs::read(output_path).ok()?;
        Some(self.hasher.hash_content(&existing))
    }
}

fn temp_path_for(output_path: &Path) -> Result<PathBuf, RenderError> {
    let file_name = output_path
        .file_name()
        .ok_or_else(|| RenderError::output_unwritable(output_path, "path has no file name"))?;

    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    Ok(output_path.with_file_name(temp_name))
}

fn write_atomic(output_path: &Path, content: &[u8]) -> Result<(), RenderError> {
    let temp_path = temp_path_for(output_path)?;

    let result = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(content)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, output_path));

    if let Err(e) = result {
        if temp_path.exists() {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(
                    "Failed to remove temporary file {}: {cleanup}",
                    temp_path.display()
                );
            }
        }
        return Err(RenderError::output_unwritable(output_path, e.to_string()));
    }

    Ok(())
}

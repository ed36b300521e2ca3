use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};

use crate::{
    pool::{BufferPool, DEFAULT_MAX_CAPACITY, DEFAULT_MAX_IDLE},
    Error, Pages, TemplateSet,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PagesConfig {
    /// A directory of templates. Each file becomes a template named by its file stem, so
    /// `404.html` is used for 404 responses and `error.html` is the generic template.
    pub template_dir: Option<PathBuf>,
    /// The most output buffers to keep around between renders.
    pub max_idle_buffers: Option<usize>,
    /// Output buffers larger than this many bytes are freed instead of reused.
    pub max_buffer_capacity: Option<usize>,
}

pub struct PagesBuilder {
    config: PagesConfig,
    templates: Option<tera::Tera>,
    template_set: Option<Arc<dyn TemplateSet + Send + Sync>>,
}

impl PagesBuilder {
    pub fn new() -> Self {
        Self {
            config: PagesConfig::default(),
            templates: None,
            template_set: None,
        }
    }

    /// Merge this configuration into the current one.
    pub fn with_config(mut self, config: PagesConfig) -> Self {
        self.config.template_dir = config.template_dir.or(self.config.template_dir);
        self.config.max_idle_buffers = config.max_idle_buffers.or(self.config.max_idle_buffers);
        self.config.max_buffer_capacity = config
            .max_buffer_capacity
            .or(self.config.max_buffer_capacity);
        self
    }

    /// Read a configuration file from this path and merge it into the current configuration.
    /// A relative `template_dir` is resolved against the directory containing the file.
    pub fn with_config_from_path(self, path: &Path) -> Result<Self, Report<Error>> {
        let data = std::fs::read_to_string(path)
            .change_context(Error::ReadingConfig)
            .attach_printable_lazy(|| format!("Reading {}", path.display()))?;
        let mut config: PagesConfig = toml::from_str(&data)
            .change_context(Error::ReadingConfig)
            .attach_printable_lazy(|| format!("Error in config file {}", path.display()))?;

        if let (Some(dir), Some(parent)) = (&config.template_dir, path.parent()) {
            config.template_dir = Some(parent.join(dir));
        }

        Ok(self.with_config(config))
    }

    /// Use these templates. Templates loaded from `template_dir` are added to this set, but do
    /// not replace templates with the same name.
    pub fn with_templates(mut self, templates: tera::Tera) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    /// Use a custom template registry instead of [tera::Tera]. This overrides
    /// [with_templates](Self::with_templates) and `template_dir`.
    pub fn with_template_set(mut self, templates: Arc<dyn TemplateSet + Send + Sync>) -> Self {
        self.template_set = Some(templates);
        self
    }

    pub fn build(self) -> Result<Pages, Report<Error>> {
        let pool = BufferPool::new(
            self.config.max_idle_buffers.unwrap_or(DEFAULT_MAX_IDLE),
            self.config
                .max_buffer_capacity
                .unwrap_or(DEFAULT_MAX_CAPACITY),
        );

        if let Some(template_set) = self.template_set {
            return Ok(Pages::from_parts(Some(template_set), pool));
        }

        let mut templates = self.templates;
        if let Some(dir) = &self.config.template_dir {
            let loaded = load_template_dir(dir)?;
            let merged = match templates {
                Some(mut t) => {
                    t.extend(&loaded)
                        .change_context(Error::LoadTemplates)
                        .attach_printable_lazy(|| {
                            format!("Merging templates from {}", dir.display())
                        })?;
                    t
                }
                None => loaded,
            };
            templates = Some(merged);
        }

        let templates = templates.map(|mut t| {
            t.autoescape_on(vec![""]);
            Arc::new(t) as Arc<dyn TemplateSet + Send + Sync>
        });
        Ok(Pages::from_parts(templates, pool))
    }
}

impl Default for PagesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const TEMPLATE_EXTENSIONS: &[&str] = &["html", "htm", "tera"];

/// Load every template file directly inside `dir`, named by file stem.
pub fn load_template_dir(dir: &Path) -> Result<tera::Tera, Report<Error>> {
    let entries = std::fs::read_dir(dir)
        .change_context(Error::LoadTemplates)
        .attach_printable_lazy(|| format!("Reading template directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.change_context(Error::LoadTemplates)?.path();
        let is_template = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| TEMPLATE_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        if !path.is_file() || !is_template {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string())
        else {
            continue;
        };

        files.push((path, Some(name)));
    }

    files.sort();
    tracing::debug!(count = files.len(), dir = %dir.display(), "Loading error page templates");

    let mut tera = tera::Tera::default();
    tera.add_template_files(files)
        .change_context(Error::LoadTemplates)
        .attach_printable_lazy(|| format!("Parsing templates in {}", dir.display()))?;
    Ok(tera)
}

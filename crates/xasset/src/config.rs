use std::path::{Path, PathBuf};

/// Configuration for an extraction session
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Root directory exported files are written below
    pub output_dir: PathBuf,
    /// Worker threads for enumeration and export; `None` uses rayon's default
    pub jobs: Option<usize>,
    /// Asset type names to process; empty means every type with a handler
    pub types: Vec<String>,
    /// Only keep assets whose name contains this substring
    pub name_filter: Option<String>,
    /// Write `DBAssetPools.json` after the catalog is validated
    pub pool_report: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exported_files"),
            jobs: None,
            types: Vec::new(),
            name_filter: None,
            pool_report: true,
        }
    }
}

impl ExtractorConfig {
    /// Create a new configuration builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::default()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether assets of `type_name` are selected
    pub fn wants_type(&self, type_name: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }

    /// Whether an asset called `name` passes the name filter
    pub fn wants_name(&self, name: &str) -> bool {
        self.name_filter
            .as_deref()
            .is_none_or(|filter| name.contains(filter))
    }
}

/// Builder for ExtractorConfig
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfigBuilder {
    output_dir: Option<PathBuf>,
    jobs: Option<usize>,
    types: Vec<String>,
    name_filter: Option<String>,
    pool_report: Option<bool>,
}

impl ExtractorConfigBuilder {
    pub fn output_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the number of worker threads. Zero keeps the default.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = (jobs > 0).then_some(jobs);
        self
    }

    /// Restrict processing to one asset type; may be called repeatedly
    pub fn asset_type<S: Into<String>>(mut self, type_name: S) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn asset_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn name_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    /// Enable or disable the pool report
    pub fn pool_report(mut self, enabled: bool) -> Self {
        self.pool_report = Some(enabled);
        self
    }

    pub fn build(self) -> ExtractorConfig {
        let default = ExtractorConfig::default();
        ExtractorConfig {
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            jobs: self.jobs,
            types: self.types,
            name_filter: self.name_filter.filter(|f| !f.is_empty()),
            pool_report: self.pool_report.unwrap_or(default.pool_report),
        }
    }
}

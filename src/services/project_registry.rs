use std::{fs, path::PathBuf, sync::Arc};
use crate::errors::RegistryError;
use crate::models::{NewProject, ProjectRecord};
use crate::services::json_store::{decode_record, encode_record, Store};

/// Project creation and retrieval over the project collection. Each
/// project also owns an artifact directory under `projects_dir`.
#[derive(Clone)]
pub struct ProjectRegistry {
    store: Arc<dyn Store>,
    projects_dir: PathBuf,
}

impl ProjectRegistry {
    pub fn new(store: Arc<dyn Store>, projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            projects_dir: projects_dir.into(),
        }
    }

    pub fn artifact_dir(&self, name: &str) -> PathBuf {
        self.projects_dir.join(name)
    }

    /// Saves a new project record, then ensures its artifact directory.
    ///
    /// A directory failure after the save is returned as `Storage`; the
    /// saved record is kept.
    pub fn create(&self, project: NewProject) -> Result<(), RegistryError> {
        validate_name(&project.name)?;
        if !project.contract_value.is_finite() || project.contract_value < 0.0 {
            return Err(RegistryError::InvalidProject(format!(
                "Contract value must be a non-negative amount, got {}",
                project.contract_value
            )));
        }
        if project.end_date < project.start_date {
            tracing::warn!(
                "Project {} ends ({}) before it starts ({})",
                project.name,
                project.end_date,
                project.start_date
            );
        }

        let name = project.name.clone();
        {
            let _guard = self.store.write_guard()?;
            let mut projects = self.store.load()?;

            if projects.contains_key(&name) {
                tracing::info!("Project already exists: {}", name);
                return Err(RegistryError::AlreadyExists(name));
            }

            let record = ProjectRecord::new(project);
            let value = encode_record(self.store.as_ref(), &name, &record)?;
            projects.insert(name.clone(), value);
            self.store.save(&projects)?;
        }
        tracing::info!("Created project: {}", name);

        let dir = self.artifact_dir(&name);
        fs::create_dir_all(&dir).map_err(|e| {
            tracing::error!("Failed to create project directory {}: {}", dir.display(), e);
            RegistryError::Storage {
                name: name.clone(),
                path: dir.clone(),
                source: e,
            }
        })?;

        tracing::debug!("Project directory ready: {}", dir.display());
        Ok(())
    }

    /// Snapshot of one project, or `None` if it was never created.
    pub fn get(&self, name: &str) -> Result<Option<ProjectRecord>, RegistryError> {
        let mut projects = self.store.load()?;
        match projects.remove(name) {
            Some(value) => Ok(Some(decode_record(self.store.as_ref(), name, value)?)),
            None => Ok(None),
        }
    }

    /// Names in collection order.
    pub fn list_names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.store.load()?.keys().cloned().collect())
    }

    /// Records (or overwrites) the completion percentage of one element.
    /// Percentages are stored as given, without clamping.
    pub fn record_progress(&self, name: &str, element: &str, percent: f64) -> Result<ProjectRecord, RegistryError> {
        let element = element.trim();
        if element.is_empty() {
            return Err(RegistryError::InvalidProject("Element name must not be empty".into()));
        }
        if !percent.is_finite() {
            return Err(RegistryError::InvalidProject(format!("Invalid percentage: {}", percent)));
        }

        let _guard = self.store.write_guard()?;
        let mut projects = self.store.load()?;

        let slot = projects
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let mut record: ProjectRecord = decode_record(self.store.as_ref(), name, slot.take())?;
        record.progress.set(element.to_string(), percent);
        // Replaced in place, so the collection order is unchanged
        *slot = encode_record(self.store.as_ref(), name, &record)?;
        self.store.save(&projects)?;

        tracing::info!("Recorded progress for {}: {} = {}%", name, element, percent);
        Ok(record)
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let invalid = |reason: &str| Err(RegistryError::InvalidProject(format!("Project name {}", reason)));

    if name.trim().is_empty() {
        return invalid("must not be empty");
    }
    if name == "." || name == ".." {
        return invalid("must not be a relative path");
    }
    if name.contains(['/', '\\', '\0']) {
        return invalid("must not contain path separators");
    }
    Ok(())
}

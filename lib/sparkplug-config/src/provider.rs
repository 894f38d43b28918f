use std::path::Path;

use figment::{
    providers::{Format, Json, Yaml},
    value::{Dict, Map},
    Error, Metadata, Profile, Provider,
};

/// A settings file, parsed when it is opened.
pub struct SettingsFile {
    data: Map<Profile, Dict>,
    metadata: Metadata,
}

impl SettingsFile {
    pub fn yaml<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        Self::open::<Yaml>(path.as_ref(), "YAML settings file")
    }

    pub fn json<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        Self::open::<Json>(path.as_ref(), "JSON settings file")
    }

    fn open<F: Format>(path: &Path, kind: &'static str) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(Self {
            data: F::string(&contents).data()?,
            metadata: Metadata::from(kind, path),
        })
    }
}

impl Provider for SettingsFile {
    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Ok(self.data.clone())
    }
}

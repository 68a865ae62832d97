//! Customizable default files.
//!
//! A customizable file has a template default shipped with the tool. While
//! the user has no copy in `src/`, the default lives in the generated tree
//! (`.elm-land/src/`). Once the user has their own copy, it shadows the
//! default and the generated copy is removed.

mod files;

pub use files::{CUSTOMIZABLE_FILES, find_customizable};

use thiserror::Error;

use crate::core::ProjectPaths;
use crate::logger;
use crate::store::{FileStore, StoreError};

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("`{0}` is not a customizable file")]
    Unknown(String),
}

/// What `apply_customization` did to the user tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Customization {
    /// The default was copied into `src/`
    Created,
    /// `src/` already had the file; left untouched
    AlreadyCustomized,
}

pub struct ScaffoldSync<S> {
    store: S,
    paths: ProjectPaths,
}

impl<S: FileStore> ScaffoldSync<S> {
    pub fn new(store: S, paths: ProjectPaths) -> Self {
        Self { store, paths }
    }

    /// Bring the generated tree in line with the user tree: defaults for
    /// every file the user has not customized, no generated copy for every
    /// file they have. Returns the number of files written or removed.
    pub async fn sync_customizables(&self) -> Result<usize, StoreError> {
        let mut changed = 0;

        for file in CUSTOMIZABLE_FILES {
            let generated = self.paths.generated_file(file.filepath);

            if self.store.exists(&self.paths.user_file(file.filepath)).await {
                if self.store.remove(&generated).await? {
                    crate::debug!("scaffold"; "removed shadowed {}", file.filepath);
                    changed += 1;
                }
                continue;
            }

            let template = self.paths.customizable_template(file.filepath);
            if self.store.copy_if_changed(&template, &generated).await? {
                crate::debug!("scaffold"; "restored default {}", file.filepath);
                changed += 1;
            }
        }

        Ok(changed)
    }

    /// Watch-handler form of [`Self::sync_customizables`]: reports to the
    /// watch status line instead of returning the error.
    pub async fn sync_logged(&self) -> Option<usize> {
        match self.sync_customizables().await {
            Ok(changed) => {
                if changed > 0 {
                    logger::status_success(&format!("synced {changed} customizable file(s)"));
                }
                Some(changed)
            }
            Err(e) => {
                logger::status_error("customizable sync failed", &e.to_string());
                None
            }
        }
    }

    /// Move the default for `filepath` into the user tree (if missing) and
    /// drop the generated copy so it cannot shadow the user's file.
    pub async fn apply_customization(&self, filepath: &str) -> Result<Customization, ScaffoldError> {
        let file = find_customizable(filepath).ok_or_else(|| ScaffoldError::Unknown(filepath.into()))?;

        let user = self.paths.user_file(file.filepath);
        let outcome = if self.store.exists(&user).await {
            Customization::AlreadyCustomized
        } else {
            let template = self.paths.customizable_template(file.filepath);
            self.store.copy_file(&template, &user).await?;
            Customization::Created
        };

        self.store
            .remove(&self.paths.generated_file(file.filepath))
            .await?;

        Ok(outcome)
    }

    /// Install everything the bundler needs before the first build:
    /// customizable defaults, then the server and source templates.
    pub async fn install_defaults(&self) -> Result<(), StoreError> {
        self.sync_customizables().await?;

        let server = self
            .store
            .copy_folder(&self.paths.server_templates_dir(), &self.paths.server_dir())
            .await?;
        let src = self
            .store
            .copy_folder(&self.paths.src_templates_dir(), &self.paths.generated_src_dir())
            .await?;

        crate::debug!("scaffold"; "installed {} server and {} source template(s)", server, src);
        Ok(())
    }
}

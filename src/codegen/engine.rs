use std::path::PathBuf;

use super::{GeneratedFile, GenerationError, Generator, GeneratorInput, PageSource};
use crate::core::ProjectPaths;
use crate::core::paths::SOURCE_EXTENSION;
use crate::logger;
use crate::store::FileStore;
use crate::utils::path::{is_plain_segment, route_segments};

/// Outcome of one successful regeneration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegenReport {
    /// Files the generator produced
    pub generated: usize,
    /// Files whose contents actually changed on disk
    pub written: usize,
}

/// Reads page/layout trees, runs the generator, writes `.elm-land/src`.
///
/// A pass only writes files whose contents differ, so rerunning with
/// unchanged sources leaves the generated tree untouched. Output is
/// validated before the first write: a pass either writes a full valid
/// output set or nothing.
pub struct RegenerationEngine<S, G> {
    store: S,
    generator: G,
    paths: ProjectPaths,
}

impl<S: FileStore, G: Generator> RegenerationEngine<S, G> {
    pub fn new(store: S, generator: G, paths: ProjectPaths) -> Self {
        Self {
            store,
            generator,
            paths,
        }
    }

    /// Read every page and layout source into generator input.
    pub async fn collect_input(&self) -> Result<GeneratorInput, GenerationError> {
        let pages_dir = self.paths.pages_dir();
        let page_files = self.store.list_files(&pages_dir, SOURCE_EXTENSION).await?;

        let mut pages = Vec::with_capacity(page_files.len());
        for relative in page_files {
            let contents = self.store.read(&pages_dir.join(&relative)).await?;
            pages.push(PageSource {
                filepath: route_segments(&relative),
                contents,
            });
        }

        let layouts = self
            .store
            .list_files(&self.paths.layouts_dir(), SOURCE_EXTENSION)
            .await?
            .iter()
            .map(|relative| route_segments(relative))
            .collect();

        Ok(GeneratorInput { pages, layouts })
    }

    /// Run one full regeneration pass.
    pub async fn regenerate(&self) -> Result<RegenReport, GenerationError> {
        let input = self.collect_input().await?;
        let files = self.generator.generate(&input).await?;
        let targets = self.resolve_targets(&files)?;

        let mut written = 0;
        for (target, file) in targets.iter().zip(&files) {
            if self.store.write_if_changed(target, &file.contents).await? {
                crate::debug!("codegen"; "wrote {}", file.relative_path());
                written += 1;
            }
        }

        Ok(RegenReport {
            generated: files.len(),
            written,
        })
    }

    /// Watch-handler form: failures are logged and the previous generated
    /// tree stays in place until the next successful pass.
    pub async fn regenerate_logged(&self) -> Option<RegenReport> {
        match self.regenerate().await {
            Ok(report) => {
                if report.written > 0 {
                    logger::status_success(&format!(
                        "regenerated {} of {} file(s)",
                        report.written, report.generated
                    ));
                }
                Some(report)
            }
            Err(e) => {
                logger::status_error("regeneration failed", &e.to_string());
                None
            }
        }
    }

    fn resolve_targets(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, GenerationError> {
        let root = self.paths.generated_src_dir();
        files
            .iter()
            .map(|file| {
                if file.filepath.is_empty() || !file.filepath.iter().all(|s| is_plain_segment(s)) {
                    return Err(GenerationError::UnsafePath(file.relative_path()));
                }
                Ok(file.filepath.iter().fold(root.clone(), |path, s| path.join(s)))
            })
            .collect()
    }
}

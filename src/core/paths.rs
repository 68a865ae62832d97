//! Fixed project layout.
//!
//! ```text
//! <root>/
//! ├── elm-land.json          config
//! ├── static/                static assets (served as-is)
//! ├── src/
//! │   ├── Pages/             page sources
//! │   ├── Layouts/           layout sources
//! │   └── interop.js
//! ├── .elm-land/             generated tree (never hand-edited)
//! │   ├── server/            index.html, main.js, bundler root
//! │   └── src/               generated Elm sources
//! └── dist/                  production build output
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "elm-land.json";
pub const SOURCE_EXTENSION: &str = "elm";

/// Every path the orchestrator reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    root: PathBuf,
    templates: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, templates: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            templates: templates.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join("static")
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.src_dir().join("Pages")
    }

    pub fn layouts_dir(&self) -> PathBuf {
        self.src_dir().join("Layouts")
    }

    pub fn interop_file(&self) -> PathBuf {
        self.src_dir().join("interop.js")
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join(".elm-land")
    }

    pub fn generated_src_dir(&self) -> PathBuf {
        self.generated_dir().join("src")
    }

    pub fn server_dir(&self) -> PathBuf {
        self.generated_dir().join("server")
    }

    pub fn index_html(&self) -> PathBuf {
        self.server_dir().join("index.html")
    }

    pub fn main_js(&self) -> PathBuf {
        self.server_dir().join("main.js")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join("dist")
    }

    // -------------------------------------------------------------------------
    // Templates shipped with the tool
    // -------------------------------------------------------------------------

    pub fn customizable_templates_dir(&self) -> PathBuf {
        self.templates.join("customizable")
    }

    pub fn server_templates_dir(&self) -> PathBuf {
        self.templates.join("server")
    }

    pub fn src_templates_dir(&self) -> PathBuf {
        self.templates.join("src")
    }

    // -------------------------------------------------------------------------
    // Mirrored locations of a `/`-separated relative path
    // -------------------------------------------------------------------------

    /// `src/<relative>` in the user's tree.
    pub fn user_file(&self, relative: &str) -> PathBuf {
        join_relative(&self.src_dir(), relative)
    }

    /// `.elm-land/src/<relative>` in the generated tree.
    pub fn generated_file(&self, relative: &str) -> PathBuf {
        join_relative(&self.generated_src_dir(), relative)
    }

    /// `<templates>/customizable/<relative>`.
    pub fn customizable_template(&self, relative: &str) -> PathBuf {
        join_relative(&self.customizable_templates_dir(), relative)
    }
}

/// Join a `/`-separated relative path segment by segment.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ProjectPaths {
        ProjectPaths::new("/project", "/opt/devloop/templates")
    }

    #[test]
    fn test_generated_layout() {
        let paths = paths();
        assert_eq!(paths.index_html(), PathBuf::from("/project/.elm-land/server/index.html"));
        assert_eq!(paths.main_js(), PathBuf::from("/project/.elm-land/server/main.js"));
        assert_eq!(paths.generated_src_dir(), PathBuf::from("/project/.elm-land/src"));
    }

    #[test]
    fn test_mirrored_paths() {
        let paths = paths();
        assert_eq!(paths.user_file("Shared/Model.elm"), PathBuf::from("/project/src/Shared/Model.elm"));
        assert_eq!(
            paths.generated_file("Shared/Model.elm"),
            PathBuf::from("/project/.elm-land/src/Shared/Model.elm")
        );
        assert_eq!(
            paths.customizable_template("View.elm"),
            PathBuf::from("/opt/devloop/templates/customizable/View.elm")
        );
    }

    #[test]
    fn test_join_relative_skips_empty_segments() {
        assert_eq!(join_relative(Path::new("/a"), "b//c/"), PathBuf::from("/a/b/c"));
    }
}

/// A file the user may override in `src/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomizableFile {
    /// Name used on the command line, e.g. `shared/model`
    pub name: &'static str,
    /// Path relative to `src/` and `.elm-land/src/`
    pub filepath: &'static str,
    pub description: &'static str,
}

pub const CUSTOMIZABLE_FILES: &[CustomizableFile] = &[
    CustomizableFile {
        name: "shared",
        filepath: "Shared.elm",
        description: "Data shared across every page",
    },
    CustomizableFile {
        name: "shared/model",
        filepath: "Shared/Model.elm",
        description: "The shared model type",
    },
    CustomizableFile {
        name: "shared/msg",
        filepath: "Shared/Msg.elm",
        description: "The shared message type",
    },
    CustomizableFile {
        name: "effect",
        filepath: "Effect.elm",
        description: "Side effects pages can request",
    },
    CustomizableFile {
        name: "view",
        filepath: "View.elm",
        description: "The view type pages return",
    },
    CustomizableFile {
        name: "auth",
        filepath: "Auth.elm",
        description: "User authentication for protected pages",
    },
    CustomizableFile {
        name: "not-found",
        filepath: "Pages/NotFound_.elm",
        description: "The 404 page",
    },
];

/// Look up by command-line name or by relative path.
pub fn find_customizable(name_or_path: &str) -> Option<&'static CustomizableFile> {
    CUSTOMIZABLE_FILES
        .iter()
        .find(|f| f.name == name_or_path || f.filepath == name_or_path)
}

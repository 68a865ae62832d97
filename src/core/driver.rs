/// Build mode flags for the bundler and the Elm compiler plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Compile Elm with `--optimize`.
    pub optimize: bool,

    /// Read the `production` section of `app.elm` instead of `development`.
    pub production: bool,
}

impl BuildMode {
    /// Production mode: optimized output, debugger forced off.
    pub const PRODUCTION: Self = Self {
        optimize: true,
        production: true,
    };

    /// Development mode: unoptimized, debugger as configured.
    pub const DEVELOPMENT: Self = Self {
        optimize: false,
        production: false,
    };

    /// Mode for the dev server. `NODE_ENV=production` selects the
    /// production config section; the dev server never optimizes.
    pub fn from_node_env() -> Self {
        Self::for_node_env(std::env::var("NODE_ENV").ok().as_deref())
    }

    fn for_node_env(node_env: Option<&str>) -> Self {
        Self {
            optimize: false,
            production: node_env == Some("production"),
        }
    }
}

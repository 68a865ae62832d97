use std::path::PathBuf;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// The fixed set of things a session watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubscriptionId {
    /// `static/`
    StaticAssets,
    /// `elm-land.json`
    ProjectConfig,
    /// `src/interop.js`
    Interop,
    /// `src/Pages` and `src/Layouts`
    Sources,
    /// Customizable files under `src/`
    Customizables,
}

/// Which change kinds a subscription reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    Any,
    /// Removal is ignored
    ModifyOrCreate,
}

impl EventFilter {
    pub fn accepts(self, kind: ChangeKind) -> bool {
        match self {
            Self::Any => true,
            Self::ModifyOrCreate => kind != ChangeKind::Removed,
        }
    }
}

/// A debounced change, routed to the subscription that covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub subscription: SubscriptionId,
    pub path: PathBuf,
    pub kind: ChangeKind,
}

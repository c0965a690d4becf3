use serde::Serialize;
use std::fmt;

/// Progress of the join protocol.
///
/// Purely diagnostic: the labels end up in error notices so a failed join
/// says how far it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Idle,
    CreatingRoom,
    Subscribing,
    FetchingRoom,
    Joining,
    Joined,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "uninitiated",
            Stage::CreatingRoom => "1: create room in backend",
            Stage::Subscribing => "2: on-page, setting up sockets",
            Stage::FetchingRoom => "3: getting room",
            Stage::Joining => "4: joining room",
            Stage::Joined => "5: joined room",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Page lifecycle events that end a joined session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    /// The page is being unloaded (tab closed, navigated away).
    BeforeUnload,
    /// History back/forward navigation.
    PopState,
}

impl PageEvent {
    pub const ALL: [PageEvent; 2] = [PageEvent::BeforeUnload, PageEvent::PopState];
}

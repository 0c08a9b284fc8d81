//! Filesystem event filter for the deadlines file watcher.

use std::path::Path;

use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind};
use tracing::debug;

/// Whether a watcher event means the deadlines file was (re)written.
pub(super) fn handle_fs_event(event: &Event, target: &Path) -> bool {
    let touches_target = event
        .paths
        .iter()
        .any(|path| path.file_name().is_some() && path.file_name() == target.file_name());
    if !touches_target {
        return false;
    }

    match &event.kind {
        EventKind::Create(CreateKind::File)
        | EventKind::Create(CreateKind::Any)
        | EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Name(_))
        | EventKind::Modify(ModifyKind::Any) => {
            debug!(path = %target.display(), kind = ?event.kind, "deadlines file changed");
            true
        }
        _ => false,
    }
}

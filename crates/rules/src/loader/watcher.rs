//! Filesystem event filter for the custom rules watcher (hot-reload).

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};

use super::custom::{is_dotfile, is_yaml};

/// Whether a watcher event touches a rule file and warrants a reload.
///
/// Only YAML files count; dotfiles (editor swap files, atomic-write temps)
/// are ignored.
pub(crate) fn is_rule_change(event: &Event) -> bool {
    let relevant_kind = matches!(
        event.kind,
        EventKind::Create(CreateKind::File | CreateKind::Any)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
            | EventKind::Remove(RemoveKind::File | RemoveKind::Any)
    );
    relevant_kind && event.paths.iter().any(|p| is_yaml(p) && !is_dotfile(p))
}

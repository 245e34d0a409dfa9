/// Dialogs answered later by the host
///
/// The picker only records the request. The host reads the queue through a
/// `DeferredHandle`, shows whatever picker it has, and calls `resolve` when
/// the answer arrives. The completion runs on the resolving thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DialogKind, DialogSpec, FilePicker, PickCallback};
use crate::backend::notify::RequestId;

struct Pending {
    request: RequestId,
    kind: DialogKind,
    dialog: DialogSpec,
    done: PickCallback,
}

/// A dialog waiting for the host
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDialog {
    pub request: RequestId,
    pub kind: DialogKind,
    pub dialog: DialogSpec,
}

type Queue = Arc<Mutex<Vec<Pending>>>;

fn lock(queue: &Queue) -> MutexGuard<'_, Vec<Pending>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct DeferredPicker {
    queue: Queue,
}

impl DeferredPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> DeferredHandle {
        DeferredHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    fn park(&self, request: RequestId, kind: DialogKind, dialog: DialogSpec, done: PickCallback) {
        log::debug!("[{}] {:?} dialog deferred: {}", request.short(), kind, dialog.title);
        lock(&self.queue).push(Pending {
            request,
            kind,
            dialog,
            done,
        });
    }
}

impl FilePicker for DeferredPicker {
    fn pick_open(&self, request: RequestId, dialog: DialogSpec, done: PickCallback) {
        self.park(request, DialogKind::Open, dialog, done);
    }

    fn pick_save(&self, request: RequestId, dialog: DialogSpec, done: PickCallback) {
        self.park(request, DialogKind::Save, dialog, done);
    }
}

/// Host side of a `DeferredPicker`
#[derive(Clone)]
pub struct DeferredHandle {
    queue: Queue,
}

impl DeferredHandle {
    /// Outstanding dialogs in the order they were requested
    pub fn pending(&self) -> Vec<PendingDialog> {
        lock(&self.queue)
            .iter()
            .map(|p| PendingDialog {
                request: p.request,
                kind: p.kind,
                dialog: p.dialog.clone(),
            })
            .collect()
    }

    /// Complete a dialog. Returns false when no such request is waiting.
    pub fn resolve(&self, request: RequestId, choice: Option<PathBuf>) -> bool {
        let pending = {
            let mut queue = lock(&self.queue);
            match queue.iter().position(|p| p.request == request) {
                Some(i) => queue.remove(i),
                None => return false,
            }
        };
        (pending.done)(choice);
        true
    }

    /// Dismiss every outstanding dialog
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<Pending> = lock(&self.queue).drain(..).collect();
        let n = drained.len();
        for p in drained {
            (p.done)(None);
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_nothing_happens_until_resolved() {
        let picker = DeferredPicker::new();
        let handle = picker.handle();
        let (tx, rx) = mpsc::channel();
        let id = RequestId::new();
        picker.pick_open(
            id,
            DialogSpec::new("Open", "JSON", &["json"]),
            Box::new(move |p| tx.send(p).unwrap()),
        );

        assert!(rx.try_recv().is_err());
        let pending = handle.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request, id);
        assert_eq!(pending[0].kind, DialogKind::Open);

        assert!(handle.resolve(id, Some(PathBuf::from("/tmp/a.json"))));
        assert_eq!(rx.try_recv().unwrap(), Some(PathBuf::from("/tmp/a.json")));
        assert!(handle.pending().is_empty());
    }

    #[test]
    fn test_resolve_unknown_request() {
        let picker = DeferredPicker::new();
        assert!(!picker.handle().resolve(RequestId::new(), None));
    }

    #[test]
    fn test_cancel_all_completes_with_none() {
        let picker = DeferredPicker::new();
        let (tx, rx) = mpsc::channel();
        for _ in 0..2 {
            let tx = tx.clone();
            picker.pick_save(
                RequestId::new(),
                DialogSpec::new("Save", "JSON", &["json"]),
                Box::new(move |p| tx.send(p).unwrap()),
            );
        }
        assert_eq!(picker.handle().cancel_all(), 2);
        assert_eq!(rx.try_recv().unwrap(), None);
        assert_eq!(rx.try_recv().unwrap(), None);
    }
}

use std::sync::mpsc::Sender;
use std::thread;

use crate::dataset::fetch_dataset;
use crate::page::PageKind;
use crate::state::{Delta, FetchRequest};

/// Runs the page's single dataset read off the UI thread and posts the
/// outcome back as a delta tagged with the visit that asked for it.
pub fn spawn_dataset_fetch(request: FetchRequest, tx: Sender<Delta>) {
    thread::spawn(move || {
        // The UI may already be gone; nothing to report to.
        let _ = tx.send(run_dataset_fetch(request));
    });
}

pub fn run_dataset_fetch(request: FetchRequest) -> Delta {
    let result = fetch_dataset(&request.source);
    match request.kind {
        PageKind::List => Delta::ListLoaded {
            visit: request.visit,
            result,
        },
        PageKind::Detail => Delta::DetailLoaded {
            visit: request.visit,
            result,
        },
    }
}

use std::io::BufRead;
use std::thread::JoinHandle;

use kanal::Sender;
use tokio_util::sync::CancellationToken;

use crate::events::AppEvent;

/// Forward parsed lines until EOF, a send failure or cancellation.
/// Always ends with `Quit` so the event loop winds down on EOF.
pub fn read_events<R: BufRead>(reader: R, tx: &Sender<AppEvent>, cancel: &CancellationToken) {
    for line in reader.lines() {
        if cancel.is_cancelled() {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };

        match AppEvent::parse(&line) {
            Ok(Some(event)) => {
                if tx.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }

    let _ = tx.send(AppEvent::Quit);
}

/// Blocking stdin on its own thread; it is left behind on exit
pub fn spawn_stdin_reader(tx: Sender<AppEvent>, cancel: CancellationToken) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        read_events(stdin.lock(), &tx, &cancel);
        tracing::debug!("Input reader stopping");
    })
}

use log::info;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

pub type ShutdownReceiver = watch::Receiver<bool>;

pub fn shutdown_channel() -> (watch::Sender<bool>, ShutdownReceiver) {
    watch::channel(false)
}

/// Waits for SIGTERM or SIGINT and then flips the shared shutdown signal so
/// both loops exit their sleeps early.
pub async fn wait_for_signal(sender: watch::Sender<bool>) {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
    }

    let _ = sender.send(true);
}

pub fn is_shutting_down(receiver: &ShutdownReceiver) -> bool {
    *receiver.borrow()
}

//! Fire-and-forget event dispatch
//!
//! Producers hand events to a bounded channel without waiting. A single handler task drains the channel and runs the
//! hook for each event in its own task. Hooks report failure through their return value; failures are written to the
//! log and go nowhere else, so a broken hook can never fail the request that produced the event.
use std::{
    future::Future,
    pin::Pin,
    sync::{atomic::AtomicI64, Arc},
};

use log::*;
use tokio::sync::{mpsc, mpsc::error::TrySendError};

pub type HandlerResult = Result<(), String>;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // drop the internal sender so that the handler shuts down once the last producer is dropped
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let job = jobs.clone();
            tokio::spawn(async move {
                match (handler)(ev).await {
                    Ok(()) => trace!("📬️ Event handled"),
                    Err(e) => warn!("📬️ Event handler failed. {e}"),
                }
                job.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            });
        }
        while jobs.load(std::sync::atomic::Ordering::SeqCst) > 0 {
            debug!("📬️ Waiting for jobs to complete");
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event and returns immediately. If the queue is full or the handler has gone away, the event is
    /// dropped and a warning is logged.
    pub fn publish_event(&self, event: E) {
        match self.sender.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => warn!("📬️ Event queue is full. The event has been dropped."),
            Err(TrySendError::Closed(_)) => warn!("📬️ Event handler is not running. The event has been dropped."),
        }
    }
}

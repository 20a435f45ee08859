use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use genflow_core::{Effect, Msg};
use genflow_logging::genflow_error;

use crate::runner::{is_presentation, EffectRunner, MsgSink};
use crate::service::RemoteService;

enum EngineCommand {
    Run(Vec<Effect>),
}

/// Runs effects on a background tokio runtime and hands results back to a
/// synchronous caller.
pub struct EngineHandle {
    cmd_tx: tokio::sync::mpsc::UnboundedSender<EngineCommand>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl EngineHandle {
    pub fn new(service: Arc<dyn RemoteService>) -> Self {
        let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    genflow_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                let sink: Arc<dyn MsgSink> = Arc::new(msg_tx);
                let mut runner = EffectRunner::new(service, sink);
                while let Some(command) = cmd_rx.recv().await {
                    match command {
                        EngineCommand::Run(effects) => {
                            runner.run(effects);
                        }
                    }
                }
            });
        });

        Self { cmd_tx, msg_rx }
    }

    /// Queues the remote and timer effects; presentation effects are
    /// returned for the caller to render right away.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Effect> {
        let (presentation, work): (Vec<_>, Vec<_>) =
            effects.into_iter().partition(is_presentation);
        if !work.is_empty() && self.cmd_tx.send(EngineCommand::Run(work)).is_err() {
            genflow_error!("Engine thread is gone; effects dropped");
        }
        presentation
    }

    pub fn try_recv(&self) -> Option<Msg> {
        self.msg_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Msg> {
        self.msg_rx.recv_timeout(timeout).ok()
    }
}

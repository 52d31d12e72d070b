use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use log::{error, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

const ACTOR_CHANNEL_SIZE: usize = 8;

/// A unit of single-threaded message-driven execution.
/// All state mutation happens inside `receive`, one message at a time,
/// so an actor needs no locks around its own state.
pub trait Actor: Sized + Send + 'static {
    type Message: Send + 'static;
    type Options;
    type Error: std::error::Error + From<mpsc::error::SendError<Self::Message>> + Send;

    fn new(options: Self::Options) -> Self;
    /// Called once before any message is delivered.
    /// An error here aborts the actor before it accepts any work.
    fn start(&mut self, ctx: &mut ActorContext<Self>) -> Result<(), Self::Error>;
    fn receive(&mut self, ctx: &mut ActorContext<Self>, message: Self::Message) -> ActorAction;
    fn stop(self) -> Result<(), Self::Error>;
}

pub enum ActorAction {
    Continue,
    /// Log a warning and continue processing messages.
    Warn(String),
    /// Log an error and stop the actor.
    /// This is the escalation path for unrecoverable failures; the process
    /// that owns the actor is expected to observe the stop and terminate.
    Fail(String),
    Stop,
}

impl ActorAction {
    pub fn warn<T: ToString>(message: T) -> Self {
        Self::Warn(message.to_string())
    }

    pub fn fail<T: ToString>(error: T) -> Self {
        Self::Fail(error.to_string())
    }
}

pub struct ActorContext<T>
where
    T: Actor,
{
    handle: ActorHandle<T>,
    /// Messages the actor sent to itself while handling a message.
    /// They are processed before anything else in the mailbox.
    queue: VecDeque<T::Message>,
    tasks: JoinSet<()>,
}

impl<T: Actor> ActorContext<T> {
    fn new(handle: ActorHandle<T>) -> Self {
        Self {
            handle,
            queue: VecDeque::new(),
            tasks: JoinSet::new(),
        }
    }

    pub fn handle(&self) -> &ActorHandle<T> {
        &self.handle
    }

    pub fn send(&mut self, message: T::Message) {
        self.queue.push_back(message);
    }

    pub fn send_with_delay(&mut self, message: T::Message, delay: Duration) {
        let handle = self.handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The send fails if the actor has stopped, which is fine.
            let _ = handle.send(message).await;
        });
    }

    /// Run a fire-and-forget task outside the actor loop.
    /// The actor waits for all spawned tasks before it reports stopped.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(future);
    }
}

pub struct ActorHandle<T>
where
    T: Actor,
{
    sender: mpsc::Sender<T::Message>,
    stopped: watch::Receiver<bool>,
}

impl<T> Clone for ActorHandle<T>
where
    T: Actor,
{
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stopped: self.stopped.clone(),
        }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub fn new(options: T::Options) -> Self {
        let (tx, rx) = mpsc::channel(ACTOR_CHANNEL_SIZE);
        let (stopped_tx, stopped_rx) = watch::channel::<bool>(false);
        let actor = T::new(options);
        let out = Self {
            sender: tx,
            stopped: stopped_rx,
        };
        let handle = out.clone();
        tokio::spawn(async move {
            let mut ctx = ActorContext::new(handle);
            run(actor, &mut ctx, rx).await;
            while ctx.tasks.join_next().await.is_some() {}
            let _ = stopped_tx.send(true);
        });
        out
    }

    pub async fn send(&self, message: T::Message) -> Result<(), T::Error> {
        self.sender.send(message).await.map_err(T::Error::from)
    }

    pub async fn wait_for_stop(mut self) {
        // We ignore the receiver error since the sender must have been dropped in this case,
        // which means the actor has stopped.
        let _ = self.stopped.wait_for(|x| *x).await;
    }
}

async fn run<T: Actor>(mut actor: T, ctx: &mut ActorContext<T>, mut rx: mpsc::Receiver<T::Message>) {
    if let Err(e) = actor.start(ctx) {
        error!("failed to start actor: {e}");
        return;
    }
    loop {
        let message = match ctx.queue.pop_front() {
            Some(x) => x,
            None => match rx.recv().await {
                Some(x) => x,
                None => break,
            },
        };
        match actor.receive(ctx, message) {
            ActorAction::Continue => {}
            ActorAction::Warn(message) => {
                warn!("{message}");
            }
            ActorAction::Fail(message) => {
                error!("{message}");
                break;
            }
            ActorAction::Stop => break,
        }
    }
    if let Err(e) = actor.stop() {
        error!("failed to stop actor: {e}");
    }
}

//! Countdown driver task
//!
//! Owns the [`TimerEngine`] so every transition happens on one task. Frames
//! come from an interval that is only polled while the engine is running;
//! the backstop is a `sleep_until` rebuilt from the engine's armed deadline
//! on each pass, so disarming it in the engine cancels it here.

use std::{future::pending, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{interval, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    error::ControlError,
    state::{FieldId, TimerSnapshot},
    timer::{Backstop, TimerEngine},
};

/// Inputs from the toggle, stop control and duration fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit { field: FieldId, text: String },
    Toggle,
    Start,
    Pause,
    Resume,
    Stop,
}

/// A command plus the channel its outcome goes back on
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    pub reply: oneshot::Sender<Result<TimerSnapshot, ControlError>>,
}

/// Runs the countdown until every command sender is dropped
pub async fn countdown_task(
    mut engine: TimerEngine,
    mut requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<TimerSnapshot>,
    frame_interval: Duration,
) {
    info!("Starting countdown task, frame interval {:?}", frame_interval);

    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    snapshots.send_replace(engine.snapshot(Instant::now()));

    loop {
        let running = engine.wants_frames();
        let backstop = engine.backstop();

        tokio::select! {
            request = requests.recv() => {
                let Some(Request { command, reply }) = request else {
                    info!("Command channel closed, stopping countdown task");
                    engine.stop();
                    snapshots.send_replace(engine.snapshot(Instant::now()));
                    break;
                };

                let now = Instant::now();
                let result = apply(&mut engine, command, now);
                if !running && engine.wants_frames() {
                    // the engine drew this instant already
                    frames.reset();
                }

                let snapshot = engine.snapshot(now);
                if reply.send(result.map(|()| snapshot.clone())).is_err() {
                    debug!("Command sender went away before the reply");
                }
                snapshots.send_replace(snapshot);
                continue;
            }

            _ = frames.tick(), if running => {
                engine.tick(Instant::now());
            }

            generation = wait_for(backstop), if backstop.is_some() => {
                engine.fire_backstop(generation, Instant::now());
            }
        }

        snapshots.send_replace(engine.snapshot(Instant::now()));
    }
}

fn apply(engine: &mut TimerEngine, command: Command, now: Instant) -> Result<(), ControlError> {
    match command {
        Command::Edit { field, text } => {
            let outcome = engine.edit_field(field, &text)?;
            debug!("Edit of {} -> {:?}", field, outcome);
        }
        Command::Toggle => engine.toggle(now)?,
        Command::Start => engine.start(now)?,
        Command::Pause => engine.pause(now),
        Command::Resume => engine.resume(now),
        Command::Stop => engine.stop(),
    }
    Ok(())
}

/// Resolves to the backstop's generation once its deadline passes
async fn wait_for(backstop: Option<Backstop>) -> u64 {
    match backstop {
        Some(backstop) => {
            sleep_until(backstop.deadline).await;
            backstop.generation
        }
        None => {
            warn!("Waiting on a backstop that was never armed");
            pending().await
        }
    }
}

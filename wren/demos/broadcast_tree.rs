//! A root actor that grows children on demand and fans numbers out to them.
//!
//! The root understands three things: `"spawn"` adds a child, a positive
//! integer is broadcast to every child, and `"shutdown"` stops the tree.
//! Each child multiplies what it receives by ten and reports the result.

use std::thread;

use anyhow::Result;
use tracing::info;
use wren::{BoxedMessage, ThreadActor, ThreadActorConfig, coerce, log_message, logging};

const SPAWN: &str = "spawn";
const SHUTDOWN: &str = "shutdown";

fn command(msg: &BoxedMessage) -> Option<&'static str> {
    coerce::downcast::<&'static str>(msg).copied()
}

fn main() -> Result<()> {
    logging::init_development();

    let (results_tx, results_rx) = flume::bounded::<i64>(2);

    let root = ThreadActor::with_config(ThreadActorConfig::bounded(2), move |ctx, msg| {
        let span = wren::actor_span!("root", ctx.id(), children = ctx.children().len());
        let _guard = span.enter();

        match command(&msg) {
            Some(SPAWN) => {
                let results = results_tx.clone();
                let spawned = ctx.spawn(move |child, msg| {
                    if command(&msg) == Some(SHUTDOWN) {
                        log_message!("shutdown", "received", actor_id = %child.id());
                        child.close();
                        return;
                    }
                    let value = coerce::to_int_or(&msg, 0);
                    let _ = results.send(value * 10);
                });
                match spawned {
                    Ok(child) => log_message!("spawn", "handled", child = %child.id()),
                    Err(err) => tracing::error!(%err, "could not spawn child"),
                }
            }
            Some(SHUTDOWN) => {
                log_message!("shutdown", "broadcasting");
                ctx.broadcast(SHUTDOWN);
                ctx.close();
            }
            Some(other) => log_message!(other, "ignored"),
            None => match coerce::to_int(&msg) {
                Ok(value) if value > 0 => ctx.broadcast(value),
                Ok(value) => log_message!("int", "ignored", value),
                Err(err) => log_message!("unknown", "ignored", %err),
            },
        }
    })?;

    let feeder = root.clone();
    thread::spawn(move || {
        feeder.send(SPAWN);
        feeder.send(10);
        feeder.send(SPAWN);
        feeder.send(20);
        feeder.send(SPAWN);
        feeder.send(30);
    });

    let mut sum = 0;
    let mut received = 0;
    for value in results_rx.iter() {
        sum += value;
        received += 1;
        info!(value, sum, received, "result");
        if received == 5 {
            let root = root.clone();
            thread::spawn(move || root.send(SHUTDOWN));
        }
    }

    info!(sum, received, "tree stopped");
    println!("{received} results, sum {sum}");
    Ok(())
}

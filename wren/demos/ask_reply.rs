//! Request/reply between actors, blocking and non-blocking.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use wren::{Ask, AskEnvelope, ThreadActor, log_message, logging};

fn main() -> Result<()> {
    logging::init_default();

    // Answers non-negative requests with ten times the input; stays silent
    // otherwise.
    let multiplier = ThreadActor::new(|_ctx, msg| {
        let Ok(ask) = msg.downcast::<AskEnvelope<i64, i64>>() else {
            log_message!("unknown", "ignored");
            return;
        };
        let n = *ask.message();
        if n >= 0 {
            ask.reply(n * 10);
        } else {
            log_message!("ask", "unanswered", n);
        }
    })?;

    let reply = Ask::<i64, i64>::new(1).once(&multiplier).context("no reply without timeout")?;
    info!(reply, "ask without timeout");

    let reply = Ask::<i64, i64>::new(2)
        .timeout(Duration::from_millis(100))
        .once(&multiplier)
        .context("no reply before the deadline")?;
    info!(reply, "ask with timeout");

    let (receiver, timer) = Ask::<i64, i64>::new(3)
        .timeout(Duration::from_millis(100))
        .channel(&multiplier);
    let reply = receiver.recv().context("channel ask timed out")?;
    if let Some(timer) = timer {
        timer.stop();
    }
    info!(reply, "channel ask");

    let missing = Ask::<i64, i64>::new(-1)
        .timeout(Duration::from_millis(50))
        .once(&multiplier)
        .unwrap_or_default();
    info!(missing, "unanswered ask falls back to the default");

    multiplier.close();
    Ok(())
}

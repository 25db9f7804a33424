use crate::context::Context;
use std::io;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns a watchdog that terminates `ctx` once `max_duration` has elapsed.
/// The thread exits early if the context gets terminated by someone else.
pub fn spawn_timeout(ctx: Arc<Context>, max_duration: Duration) -> io::Result<JoinHandle<()>> {
    let start_time = Instant::now();
    thread::Builder::new()
        .name("timeout".into())
        .spawn(move || {
            while !ctx.is_terminated() {
                if start_time.elapsed() >= max_duration {
                    ctx.terminate();
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
        })
}

//! The control loop: read, decide, actuate, wait.

use std::time::Duration;

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::{
    app_context::DaemonContext,
    error::Result,
    hysteresis::FanState,
    temperature::Temperature,
};

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollRecord {
    pub temperature: Temperature,
    /// Fan state after the cycle.
    pub state: FanState,
    /// Whether the actuator was driven this cycle.
    pub switched: bool,
}

/// Polls until the exit signal is set or a sensor/actuator call fails.
///
/// Failures are returned as-is, without retry. Cancellation interrupts the
/// interval wait, so shutdown latency does not depend on the interval.
pub async fn run_poll_loop(ctx: &mut DaemonContext) -> Result<()> {
    let token = ctx.shutdown.token();
    let interval = ctx.config.interval();

    while !token.is_cancelled() {
        poll_once(ctx).await?;

        if wait_for_next_poll(&token, interval).await {
            break;
        }
    }

    info!("Poll loop stopped");
    Ok(())
}

/// One read-decide-actuate cycle.
///
/// The controller's state is committed only after the actuator accepted it.
pub async fn poll_once(ctx: &mut DaemonContext) -> Result<PollRecord> {
    let temperature = ctx.sensor.read().await?;

    let switched = match ctx.controller.decide(temperature) {
        Some(next) => {
            info!("fan {next}, temperature '{temperature}'");
            ctx.fan.set(next).await?;
            ctx.controller.commit(next);
            true
        }
        None => false,
    };

    let state = ctx.controller.state();
    debug!("temperature '{temperature}', fan status '{state}'");

    Ok(PollRecord {
        temperature,
        state,
        switched,
    })
}

/// Sleeps for `interval` unless `token` fires first. Returns `true` when
/// cancelled.
pub async fn wait_for_next_poll(token: &CancellationToken, interval: Duration) -> bool {
    tokio::select! {
        () = token.cancelled() => true,
        () = tokio::time::sleep(interval) => false,
    }
}

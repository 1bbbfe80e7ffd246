/// Zone save protocol
///
/// The zone API applies a submitted zone asynchronously. A save therefore
/// submits once and then polls the zone until its token differs from the
/// token the zone carried before submission. The first zone seen with a new
/// token replaces the local copy entirely.
///
/// Polling is bounded by a [`PollPolicy`] and can be interrupted from another
/// thread through a [`CancelSignal`]. Unless disabled, the submitted copy
/// carries a fresh SOA serial.

use std::time::{Duration, Instant};

use crate::dns::cancel::CancelSignal;
use crate::dns::errors::{ZoneError, ZoneResult};
use crate::dns::gateway::ZoneGateway;
use crate::dns::zone::Zone;

/// How often and for how long a save polls for the updated zone
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Wait before the second poll
    pub interval: Duration,
    /// Growth factor applied to the wait after each poll (1.0 keeps it fixed)
    pub backoff_multiplier: f32,
    /// Upper bound for the wait between polls
    pub max_interval: Duration,
    /// Give up after this many polls
    pub max_polls: Option<u32>,
    /// Give up once this much time has passed since submission
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff_multiplier: 1.0,
            max_interval: Duration::from_secs(30),
            max_polls: None,
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl PollPolicy {
    /// Wait that follows a wait of `current`
    pub fn next_interval(&self, current: Duration) -> Duration {
        let next = Duration::from_millis((current.as_millis() as f32 * self.backoff_multiplier) as u64);
        next.max(current).min(self.max_interval)
    }
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub poll: PollPolicy,
    pub cancel: Option<CancelSignal>,
    /// Submit the SOA serial advanced to the current Unix time (or one past
    /// its current value if that is later). The local zone keeps its serial.
    pub bump_serial: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            cancel: None,
            bump_serial: true,
        }
    }
}

impl SaveOptions {
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Outcome of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// Number of fetches made after submission
    pub polls: u32,
    pub elapsed: Duration,
    /// Token the zone carried when it was submitted
    pub previous_token: String,
}

/// Submit `zone` and wait for the API to report the new version, which then
/// replaces `zone`. On any error the local zone is left as it was.
pub fn save<G>(zone: &mut Zone, gateway: &G, options: &SaveOptions) -> ZoneResult<SaveReport>
where
    G: ZoneGateway + ?Sized,
{
    let span = tracing::info_span!("save_zone", zone = %zone.name());
    let _enter = span.enter();

    let policy = &options.poll;
    let cancel = options.cancel.as_ref();
    let zone_name = zone.name().to_string();

    if cancel.map_or(false, CancelSignal::is_cancelled) {
        return Err(ZoneError::SaveCancelled { zone_name, polls: 0 });
    }

    let start = Instant::now();
    let previous_token = zone.token().to_string();

    let bumped = if options.bump_serial {
        let mut copy = zone.clone();
        copy.advance_serial(chrono::Utc::now().timestamp()).map(|serial| {
            log::debug!("Submitting zone {} with serial {}", zone_name, serial);
            copy
        })
    } else {
        None
    };
    gateway.submit_zone(bumped.as_ref().unwrap_or(&*zone))?;
    log::info!("Submitted zone {} with token {}", zone_name, previous_token);

    let mut polls = 0;
    let mut interval = policy.interval;
    loop {
        polls += 1;
        let fetched = gateway.fetch_zone(&zone_name)?;

        if fetched.token() != previous_token {
            log::info!(
                "Zone {} updated to token {} after {} poll(s)",
                zone_name,
                fetched.token(),
                polls
            );
            *zone = fetched;
            return Ok(SaveReport {
                polls,
                elapsed: start.elapsed(),
                previous_token,
            });
        }

        log::debug!("Token for zone {} not updated yet, retrying", zone_name);

        let elapsed = start.elapsed();
        let out_of_polls = policy.max_polls.map_or(false, |max| polls >= max);
        let out_of_time = policy.timeout.map_or(false, |timeout| elapsed >= timeout);
        if out_of_polls || out_of_time {
            log::warn!(
                "Gave up waiting for zone {} after {} poll(s) ({:?})",
                zone_name,
                polls,
                elapsed
            );
            return Err(ZoneError::SaveTimedOut {
                zone_name,
                polls,
                elapsed,
            });
        }

        let wait = match policy.timeout {
            Some(timeout) => interval.min(timeout - elapsed),
            None => interval,
        };
        if pause(wait, cancel) {
            log::info!("Save of zone {} cancelled after {} poll(s)", zone_name, polls);
            return Err(ZoneError::SaveCancelled { zone_name, polls });
        }

        interval = policy.next_interval(interval);
    }
}

/// Sleep between polls; returns `true` when cancelled
fn pause(wait: Duration, cancel: Option<&CancelSignal>) -> bool {
    match cancel {
        Some(signal) => signal.wait(wait),
        None => {
            std::thread::sleep(wait);
            false
        }
    }
}

impl Zone {
    /// See [`save`]
    pub fn save<G>(&mut self, gateway: &G, options: &SaveOptions) -> ZoneResult<SaveReport>
    where
        G: ZoneGateway + ?Sized,
    {
        save(self, gateway, options)
    }
}

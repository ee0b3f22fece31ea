// src/polling.rs
//! Focus-scoped polling of a fetched value into a watch channel
//!
//! A `Poller` refreshes while focused and stops when unfocused or dropped.
//! At most one fetch is in flight; a fetch that outlives its timeout is a
//! recoverable failure. Subscribers only see a new value when it differs
//! structurally from the displayed one, so the display is never older than
//! one interval plus one timeout.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};

use crate::api::LabApi;
use crate::error::{Alert, ClientError, ClientResult};
use crate::reports::{Dashboard, PersonalLabReport};
use crate::session::Session;

const MIN_INTERVAL: Duration = Duration::from_millis(100);

type FetchFuture<T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send>>;
type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The fetched value differed and is now displayed.
    Replaced,
    /// Equal to the displayed value; nothing was published.
    Unchanged,
    /// Another fetch was still in flight.
    Skipped,
    Failed(Alert),
}

struct Shared<T> {
    name: &'static str,
    fetch: FetchFn<T>,
    timeout: Duration,
    in_flight: AtomicBool,
    display: watch::Sender<Option<Arc<T>>>,
    alerts: watch::Sender<Option<Alert>>,
}

/// Clears the in-flight flag even when the fetch is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T> Shared<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    async fn poll_once(&self) -> PollOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!(poller = self.name, "fetch still in flight; skipping");
            return PollOutcome::Skipped;
        }
        let result = {
            let _guard = InFlight(&self.in_flight);
            timeout(self.timeout, (self.fetch)()).await
        };

        let value = match result {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => return self.fail(err),
            Err(_) => return self.fail(ClientError::Timeout(self.name.to_string())),
        };

        self.alerts.send_if_modified(|alert| alert.take().is_some());
        let replaced = self.display.send_if_modified(|current| match current {
            Some(existing) if **existing == value => false,
            _ => {
                *current = Some(Arc::new(value));
                true
            }
        });

        if replaced {
            tracing::debug!(poller = self.name, "displayed value replaced");
            PollOutcome::Replaced
        } else {
            PollOutcome::Unchanged
        }
    }

    fn fail(&self, err: ClientError) -> PollOutcome {
        tracing::warn!(poller = self.name, error = %err, transient = err.is_transient(), "poll failed");
        let alert = err.to_alert(&format!("refresh the {}", self.name));
        self.alerts.send_replace(Some(alert.clone()));
        PollOutcome::Failed(alert)
    }
}

pub struct Poller<T> {
    shared: Arc<Shared<T>>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl<T> Poller<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, interval: Duration, fetch_timeout: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let fetch: FetchFn<T> = Arc::new(move || -> FetchFuture<T> { Box::pin(fetch()) });
        let (display, _) = watch::channel(None);
        let (alerts, _) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                name,
                fetch,
                timeout: fetch_timeout,
                in_flight: AtomicBool::new(false),
                display,
                alerts,
            }),
            interval: interval.max(MIN_INTERVAL),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.shared.display.subscribe()
    }

    pub fn subscribe_alerts(&self) -> watch::Receiver<Option<Alert>> {
        self.shared.alerts.subscribe()
    }

    /// The displayed value, `None` until the first successful fetch.
    pub fn current(&self) -> Option<Arc<T>> {
        self.shared.display.borrow().clone()
    }

    pub fn is_focused(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts polling; the first fetch runs immediately. No-op when already focused.
    pub fn focus(&mut self) {
        if self.is_focused() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                shared.poll_once().await;
            }
        }));
        tracing::debug!(poller = self.shared.name, interval = ?period, "polling started");
    }

    /// Stops polling. A fetch in progress is cancelled; the displayed value is kept.
    pub fn unfocus(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(poller = self.shared.name, "polling stopped");
        }
    }

    /// Fetches once outside the schedule, respecting the in-flight guard.
    pub async fn refresh_now(&self) -> PollOutcome {
        self.shared.poll_once().await
    }

    /// Waits until a value is displayed, at most `deadline` from the call.
    /// Alerts published meanwhile are logged and do not extend the deadline.
    pub async fn first_value(&self, deadline: Duration) -> ClientResult<Arc<T>> {
        let mut updates = self.subscribe();
        let mut alerts = self.subscribe_alerts();
        let expiry = sleep(deadline);
        tokio::pin!(expiry);

        loop {
            if let Some(value) = updates.borrow_and_update().clone() {
                return Ok(value);
            }
            tokio::select! {
                Ok(()) = updates.changed() => {}
                Ok(()) = alerts.changed() => {
                    if let Some(alert) = alerts.borrow_and_update().clone() {
                        tracing::warn!(poller = self.shared.name, alert = %alert.message, "still waiting for data");
                    }
                }
                _ = &mut expiry => {
                    return Err(ClientError::Timeout(format!("first {} after {:?}", self.shared.name, deadline)));
                }
            }
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Poller<Dashboard> {
    /// Polls the admin dashboard through `api`.
    pub fn dashboard<A>(api: Arc<A>, interval: Duration, fetch_timeout: Duration) -> Self
    where
        A: LabApi + ?Sized + 'static,
    {
        Self::new("dashboard", interval, fetch_timeout, move || {
            let api = Arc::clone(&api);
            async move { Dashboard::load(api.as_ref()).await }
        })
    }
}

impl Poller<PersonalLabReport> {
    /// Polls the lab report of the signed-in user. The user id is resolved
    /// once, so a session without one fails here before any request.
    pub fn personal_lab_report<A>(
        session: &Session,
        api: Arc<A>,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> ClientResult<Self>
    where
        A: LabApi + ?Sized + 'static,
    {
        let user_id = session.current_user_id()?;
        Ok(Self::new("lab report", interval, fetch_timeout, move || {
            let api = Arc::clone(&api);
            async move { PersonalLabReport::fetch(api.as_ref(), user_id).await }
        }))
    }
}

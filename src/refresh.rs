use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::session::Session;

/// Renders the session, then reloads and re-renders it every `period` until
/// `shutdown` resolves. A slow reload delays the next tick instead of
/// stacking ticks up behind it.
pub async fn run<F, S>(
    session: &mut Session,
    client: &reqwest::Client,
    period: Duration,
    mut render: F,
    shutdown: S,
) -> anyhow::Result<()>
where
    F: FnMut(&Session) -> anyhow::Result<()>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately; the session is already loaded
    ticker.tick().await;

    loop {
        render(session)?;

        tokio::select! {
            _ = ticker.tick() => {
                info!(source = %session.source(), "refreshing data");
                session.reload(client).await;
            }
            _ = &mut shutdown => {
                info!("stopping refresh loop");
                return Ok(());
            }
        }
    }
}

use stickynotes_protocol::{Analytics, AnalyticsEvent};
use stickynotes_store::StoreExt;
use tracing::{debug, info, warn};

use crate::ControllerError;
use crate::controller::{ANALYTICS_KEY, AppController, ControllerState};

impl AppController {
    /// Analytics with the `today` counters brought up to date.
    pub async fn analytics(&self) -> Analytics {
        let st = self.state.lock().await;
        let mut analytics = st.analytics.clone();
        analytics.refresh_today(self.clock.now().date_naive());
        analytics
    }

    /// Applies one event and persists the result. Ignored while analytics
    /// are disabled.
    pub async fn record_event(&self, event: AnalyticsEvent) -> Result<Analytics, ControllerError> {
        let mut st = self.state.lock().await;
        self.record_locked(&mut st, event)?;
        Ok(st.analytics.clone())
    }

    pub(crate) fn record_locked(
        &self,
        st: &mut ControllerState,
        event: AnalyticsEvent,
    ) -> Result<(), ControllerError> {
        if !st.settings.enable_analytics {
            return Ok(());
        }
        let mut next = st.analytics.clone();
        next.record(event, self.clock.now().date_naive());
        self.store.set_typed(ANALYTICS_KEY, &next)?;
        st.analytics = next;
        debug!(?event, "analytics recorded");
        Ok(())
    }

    /// Clears every counter.
    pub async fn reset_analytics(&self) -> Result<Analytics, ControllerError> {
        let mut st = self.state.lock().await;
        let fresh = Analytics::default();
        self.store.set_typed(ANALYTICS_KEY, &fresh)?;
        st.analytics = fresh.clone();
        info!("analytics reset");
        Ok(fresh)
    }

    pub(crate) async fn begin_session(&self) {
        let mut st = self.state.lock().await;
        if !st.settings.enable_analytics {
            return;
        }
        let mut next = st.analytics.clone();
        next.start_session(self.session_started);
        match self.store.set_typed(ANALYTICS_KEY, &next) {
            Ok(()) => st.analytics = next,
            Err(e) => warn!(error = %e, "failed to record session start"),
        }
    }

    pub(crate) fn end_session_locked(&self, st: &mut ControllerState) {
        if !st.settings.enable_analytics {
            return;
        }
        let mut next = st.analytics.clone();
        next.end_session(self.session_started, self.clock.now());
        match self.store.set_typed(ANALYTICS_KEY, &next) {
            Ok(()) => st.analytics = next,
            Err(e) => warn!(error = %e, "failed to record session end"),
        }
    }
}

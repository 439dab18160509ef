use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_stream::{wrappers::IntervalStream, StreamExt};
use tracing::debug;

use crate::constants::VOICE_TICK_INTERVAL_SECS;

/// Voice capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Simulated voice capture: counts seconds while recording, records no audio
///
/// The seconds come from a background ticker task. Ticks are queued on a
/// channel and folded into the counter by [`VoiceRecorder::poll_ticks`], so the
/// counter is only ever touched by the owner. The ticker is aborted on stop,
/// on cancel and on drop.
pub struct VoiceRecorder {
    state: RecorderState,
    elapsed_secs: u64,
    ticks: Option<mpsc::UnboundedReceiver<()>>,
    ticker: Option<JoinHandle<()>>,
    period: Duration,
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceRecorder {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(VOICE_TICK_INTERVAL_SECS))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            state: RecorderState::Idle,
            elapsed_secs: 0,
            ticks: None,
            ticker: None,
            period,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// IDLE -> RECORDING. Spawns the ticker, so it must run inside a tokio runtime.
    /// Starting while already recording changes nothing.
    pub fn start(&mut self) {
        if self.is_recording() {
            return;
        }

        self.begin();

        let (tx, rx) = mpsc::unbounded_channel();
        let period = self.period;
        self.ticks = Some(rx);
        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = IntervalStream::new(interval_at(Instant::now() + period, period));
            while ticks.next().await.is_some() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        }));

        debug!("Voice recording started");
    }

    /// Enter RECORDING without a ticker. Seconds are then fed with [`VoiceRecorder::tick`].
    pub fn begin(&mut self) {
        self.stop_ticker();
        self.state = RecorderState::Recording;
        self.elapsed_secs = 0;
    }

    /// Count one second, if recording
    pub fn tick(&mut self) {
        if self.is_recording() {
            self.elapsed_secs += 1;
        }
    }

    /// Fold every tick delivered so far into the counter; returns the elapsed seconds
    pub fn poll_ticks(&mut self) -> u64 {
        let mut delivered = 0;
        if let Some(rx) = self.ticks.as_mut() {
            while rx.try_recv().is_ok() {
                delivered += 1;
            }
        }
        for _ in 0..delivered {
            self.tick();
        }
        self.elapsed_secs
    }

    /// RECORDING -> IDLE, producing the synthetic message text
    pub fn stop(&mut self) -> Option<String> {
        if !self.is_recording() {
            return None;
        }

        let seconds = self.poll_ticks();
        self.reset();
        debug!(seconds, "Voice recording stopped");
        Some(format!("Voice message recorded ({}s)", seconds))
    }

    /// Abandon the recording without producing a message
    pub fn cancel(&mut self) {
        if self.is_recording() {
            debug!("Voice recording cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.stop_ticker();
        self.state = RecorderState::Idle;
        self.elapsed_secs = 0;
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.ticks = None;
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

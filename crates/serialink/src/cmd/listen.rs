use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serialink_channel::{Channel, ChannelError};
use serialink_frame::{Frame, FrameConfig, FrameError, Session, DEFAULT_TIMEOUT};

use crate::cmd::ListenArgs;
use crate::exit::{channel_error, frame_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};
use crate::target::{self, Inbound};

/// What a serve loop should do after a failed receive.
pub(crate) enum RecvDisposition {
    /// Nothing arrived in time; check the stop flag and wait again.
    Idle,
    /// A bad frame was discarded; keep serving.
    Skip,
    /// The peer went away; accept the next one.
    Disconnected,
    Fatal(CliError),
}

pub(crate) fn classify_recv_error(err: FrameError) -> RecvDisposition {
    match err {
        FrameError::Idle(_) => RecvDisposition::Idle,
        FrameError::Channel(ChannelError::Closed) => RecvDisposition::Disconnected,
        // Already logged and drained by the reader.
        err if err.drains_channel() => RecvDisposition::Skip,
        err => RecvDisposition::Fatal(frame_error("receive failed", err)),
    }
}

/// Receive timeout used by serve loops, so the stop flag is checked regularly.
pub(crate) fn serve_config(config: FrameConfig) -> FrameConfig {
    let wakeup = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
    config.with_timeout(wakeup)
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

pub fn run(args: ListenArgs, format: OutputFormat, config: FrameConfig) -> CliResult<i32> {
    let inbound = target::listen(&args.target)?;
    let source = target::describe(&args.target);
    let config = serve_config(config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printer = Printer {
        source: &source,
        format,
        printed: 0,
        limit: args.count,
    };

    match inbound {
        Inbound::Socket(listener) => {
            tracing::info!(link = %source, "listening");
            while running.load(Ordering::SeqCst) {
                let mut channel = listener
                    .accept()
                    .map_err(|err| channel_error("accept failed", err))?;
                let mut session = Session::attach(&mut channel, config.clone());
                if printer.serve(&mut session, &running)? {
                    return Ok(SUCCESS);
                }
            }
        }
        Inbound::Serial(mut channel) => {
            tracing::info!(link = %source, "listening");
            let mut session = Session::open_with_config(channel.as_mut(), config);
            printer.serve(&mut session, &running)?;
            session
                .close()
                .map_err(|err| frame_error("close failed", err))?;
        }
    }

    Ok(SUCCESS)
}

struct Printer<'a> {
    source: &'a str,
    format: OutputFormat,
    printed: usize,
    limit: Option<usize>,
}

impl Printer<'_> {
    /// Print frames until the peer disconnects or the stop flag clears.
    /// Returns `true` once the frame limit is reached.
    fn serve<C: Channel + ?Sized>(
        &mut self,
        session: &mut Session<'_, C>,
        running: &AtomicBool,
    ) -> CliResult<bool> {
        let mut payload = Vec::new();
        while running.load(Ordering::SeqCst) {
            let code = match session.receive(&mut payload) {
                Ok(code) => code,
                Err(err) => match classify_recv_error(err) {
                    RecvDisposition::Idle | RecvDisposition::Skip => continue,
                    RecvDisposition::Disconnected => {
                        tracing::debug!("peer disconnected");
                        return Ok(false);
                    }
                    RecvDisposition::Fatal(err) => return Err(err),
                },
            };

            let frame = Frame::new(code, std::mem::take(&mut payload));
            print_frame(&frame, self.source, self.format);
            self.printed = self.printed.saturating_add(1);

            if self.limit.is_some_and(|limit| self.printed >= limit) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn idle_tick_keeps_waiting() {
        let disposition = classify_recv_error(FrameError::Idle(Duration::from_millis(500)));
        assert!(matches!(disposition, RecvDisposition::Idle));
    }

    #[test]
    fn stalled_frame_is_skipped() {
        let disposition = classify_recv_error(FrameError::Timeout(Duration::from_millis(500)));
        assert!(matches!(disposition, RecvDisposition::Skip));
    }

    #[test]
    fn closed_channel_ends_connection() {
        let disposition = classify_recv_error(FrameError::Channel(ChannelError::Closed));
        assert!(matches!(disposition, RecvDisposition::Disconnected));
    }

    #[test]
    fn malformed_frames_are_skipped() {
        let disposition = classify_recv_error(FrameError::ChecksumMismatch {
            expected: 0xA9,
            actual: 0xA8,
        });
        assert!(matches!(disposition, RecvDisposition::Skip));

        let disposition = classify_recv_error(FrameError::InvalidLength { length: 0 });
        assert!(matches!(disposition, RecvDisposition::Skip));
    }

    #[test]
    fn io_failure_is_fatal() {
        let err = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        let disposition = classify_recv_error(FrameError::Channel(ChannelError::Io(err)));
        assert!(matches!(disposition, RecvDisposition::Fatal(_)));
    }

    #[test]
    fn serve_config_always_has_a_wakeup() {
        let config = serve_config(FrameConfig::default());
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));

        let config = serve_config(FrameConfig::default().with_timeout(Duration::from_secs(2)));
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
    }
}

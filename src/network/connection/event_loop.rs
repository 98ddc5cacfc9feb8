//! Read side of a connection: decode, dispatch, keepalive.

use super::error_handling::{Flow, decode_error_reply, handle_handler_error};
use crate::config::LimitsConfig;
use crate::handlers::{Context, Registry};
use crate::state::{Delivery, Matrix, Session, closing_link};
use anonirc_proto::{Command, IrcCodec, Message};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::OwnedReadHalf;
use tokio::time::{Instant, sleep_until};
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

type Reader = FramedRead<OwnedReadHalf, IrcCodec>;

/// Which deadline the loop is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    /// NICK/USER not complete yet.
    Registration,
    /// Silence long enough to warrant a PING.
    Idle,
    /// PING sent, waiting for any traffic.
    PingReply,
}

struct Keepalive {
    registration_deadline: Instant,
    ping_after: Duration,
    timeout: Duration,
    last_activity: Instant,
    ping_sent: Option<Instant>,
}

impl Keepalive {
    fn new(limits: &LimitsConfig) -> Self {
        let now = Instant::now();
        let idle = &limits.idle_timeouts;
        Self {
            registration_deadline: now + Duration::from_secs(idle.registration),
            ping_after: Duration::from_secs(idle.ping),
            timeout: Duration::from_secs(idle.timeout),
            last_activity: now,
            ping_sent: None,
        }
    }

    fn next(&self, registered: bool) -> (Timer, Instant) {
        if !registered {
            return (Timer::Registration, self.registration_deadline);
        }
        match self.ping_sent {
            Some(sent) => (Timer::PingReply, sent + self.timeout),
            None => (Timer::Idle, self.last_activity + self.ping_after),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
        self.ping_sent = None;
    }
}

/// Read and dispatch until the session is cancelled or the peer leaves.
///
/// Every exit path records a close reason on the session first.
pub(super) async fn run(
    reader: &mut Reader,
    matrix: &Arc<Matrix>,
    registry: &Registry,
    session: &Arc<Session>,
    limits: &LimitsConfig,
) {
    let cancel = session.cancel_token().clone();
    let mut keepalive = Keepalive::new(limits);

    loop {
        let (timer, deadline) = keepalive.next(session.is_active());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,

            frame = reader.next() => match frame {
                None => {
                    debug!("Client closed connection");
                    session.request_close("Connection closed");
                    break;
                }
                Some(Err(e)) => {
                    debug!(error = %e, "Read error");
                    session.request_close(&format!("Read error: {e}"));
                    break;
                }
                Some(Ok(Err(e))) => {
                    keepalive.touch();
                    debug!(error = %e, "Undecodable line");
                    let server = matrix.server_name();
                    let reply = decode_error_reply(&server, &session.nick_or_star(), &e);
                    if session.send(reply).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Ok(msg))) => {
                    keepalive.touch();
                    if dispatch(matrix, registry, session, msg).await == Flow::Disconnect {
                        break;
                    }
                }
            },

            _ = sleep_until(deadline) => {
                if on_timer(matrix, session, timer, &mut keepalive) == Flow::Disconnect {
                    break;
                }
            }
        }
    }
}

async fn dispatch(matrix: &Arc<Matrix>, registry: &Registry, session: &Arc<Session>, msg: Message) -> Flow {
    let mut ctx = Context::new(matrix, session);
    let cmd_name = msg.command.name();

    match registry.dispatch(&mut ctx, &msg).await {
        Ok(()) => Flow::Continue,
        Err(e) => {
            let server = ctx.server_name().to_string();
            handle_handler_error(&server, session, &cmd_name, e).await
        }
    }
}

fn on_timer(matrix: &Matrix, session: &Arc<Session>, timer: Timer, keepalive: &mut Keepalive) -> Flow {
    let reason = match timer {
        Timer::Idle => {
            let server = matrix.server_name();
            let ping = Message::new(
                Some(matrix.server_prefix()),
                Command::PING(server, None),
            );
            keepalive.ping_sent = Some(Instant::now());
            return match session.try_deliver(Arc::new(ping)) {
                Delivery::Queued => Flow::Continue,
                Delivery::Full => {
                    warn!(session = %session.id, "SendQ exceeded");
                    session.request_close("SendQ exceeded");
                    Flow::Disconnect
                }
                Delivery::Closed => Flow::Disconnect,
            };
        }
        Timer::Registration => "Registration timeout",
        Timer::PingReply => "Ping timeout",
    };

    info!(reason, "Closing idle session");
    session.try_deliver(Arc::new(closing_link(session.addr, reason)));
    session.request_close(reason);
    Flow::Disconnect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdleTimeoutsConfig;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            idle_timeouts: IdleTimeoutsConfig {
                ping: 10,
                timeout: 20,
                registration: 5,
            },
            ..LimitsConfig::default()
        }
    }

    fn matrix() -> Matrix {
        use crate::config::{AnonymityConfig, Config, ConfigHandle};
        use crate::security::MemoryBanStore;
        use crate::state::Anonymizer;

        Matrix::new(
            ConfigHandle::new(Config::default()),
            Arc::new(MemoryBanStore::new()),
            Anonymizer::new(3, &AnonymityConfig::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn idle_ping_into_a_full_queue_closes_the_session() {
        let matrix = matrix();
        let (session, _rx) = matrix.attach_session("127.0.0.1:7000".parse().unwrap());
        let capacity = matrix.config.current().limits.send_queue;
        for _ in 0..capacity {
            let filler = Message::new(None, Command::PING("x".into(), None));
            assert_eq!(session.try_deliver(Arc::new(filler)), Delivery::Queued);
        }

        let mut keepalive = Keepalive::new(&limits());
        let flow = on_timer(&matrix, &session, Timer::Idle, &mut keepalive);

        assert_eq!(flow, Flow::Disconnect);
        assert_eq!(session.close_reason().as_deref(), Some("SendQ exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_ping_is_queued_and_arms_the_reply_timer() {
        let matrix = matrix();
        let (session, mut rx) = matrix.attach_session("127.0.0.1:7000".parse().unwrap());

        let mut keepalive = Keepalive::new(&limits());
        let flow = on_timer(&matrix, &session, Timer::Idle, &mut keepalive);

        assert_eq!(flow, Flow::Continue);
        assert_eq!(keepalive.next(true).0, Timer::PingReply);
        assert!(matches!(rx.try_recv().unwrap().command, Command::PING(..)));
    }

    #[tokio::test(start_paused = true)]
    async fn keepalive_walks_through_its_timers() {
        let mut keepalive = Keepalive::new(&limits());
        let start = Instant::now();

        let (timer, at) = keepalive.next(false);
        assert_eq!(timer, Timer::Registration);
        assert_eq!(at, start + Duration::from_secs(5));

        let (timer, at) = keepalive.next(true);
        assert_eq!(timer, Timer::Idle);
        assert_eq!(at, start + Duration::from_secs(10));

        keepalive.ping_sent = Some(start);
        let (timer, at) = keepalive.next(true);
        assert_eq!(timer, Timer::PingReply);
        assert_eq!(at, start + Duration::from_secs(20));

        tokio::time::advance(Duration::from_secs(3)).await;
        keepalive.touch();
        let (timer, at) = keepalive.next(true);
        assert_eq!(timer, Timer::Idle);
        assert_eq!(at, start + Duration::from_secs(13));
    }
}

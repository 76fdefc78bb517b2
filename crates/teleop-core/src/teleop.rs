use crate::{Result, TeleopConfig};
use core::fmt;
use link_transport::{BroadcastReport, Broadcaster, UdpSink, WsSink};
use rover_command::{
    encode_arm, encode_drive, ChangeTracker, Channel, Command, CommandPacket, InputSnapshot,
    InputSource,
};
use std::future::Future;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TeleopState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for TeleopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TeleopState::Starting => "starting",
            TeleopState::Running => "running",
            TeleopState::Stopping => "stopping",
            TeleopState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// One packet emitted during a tick and how each sink took it.
#[derive(Clone, Debug)]
pub struct Emission {
    pub packet: CommandPacket,
    pub report: BroadcastReport,
}

#[derive(Clone, Debug, Default)]
pub struct TickOutcome {
    pub emitted: Vec<Emission>,
}

impl TickOutcome {
    pub fn packets(&self) -> Vec<&str> {
        self.emitted.iter().map(|e| e.packet.as_str()).collect()
    }

    pub fn emitted_on(&self, channel: Channel) -> bool {
        self.emitted.iter().any(|e| e.packet.channel() == channel)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TeleopSummary {
    pub ticks: u64,
    pub drive_packets: u64,
    pub arm_packets: u64,
}

/// The polling loop: snapshot, encode, dedup, fan out.
///
/// Owns the input source, the change tracker and both sinks. Lifecycle is
/// `Starting -> Running -> Stopping -> Stopped`.
pub struct Teleop<I: InputSource> {
    config: TeleopConfig,
    input: I,
    tracker: ChangeTracker,
    broadcaster: Broadcaster,
    state: TeleopState,
    summary: TeleopSummary,
}

impl<I: InputSource> Teleop<I> {
    /// Validate config, open the UDP socket and start the WebSocket server.
    pub async fn start(config: TeleopConfig, input: I) -> Result<Self> {
        config.validate()?;
        let datagram = UdpSink::open(config.resolve_destination().await?).await?;
        let streaming = WsSink::bind(config.bind_addr()?, config.stream_send_timeout()).await?;
        tracing::info!(
            destination = %datagram.destination(),
            websocket = %streaming.local_addr(),
            poll_ms = config.poll_period_ms,
            "teleop starting"
        );
        Self::with_broadcaster(config, input, Broadcaster::new(streaming, datagram))
    }

    /// Build around caller-supplied sinks.
    pub fn with_broadcaster(
        config: TeleopConfig,
        input: I,
        broadcaster: Broadcaster,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            input,
            tracker: ChangeTracker::new(),
            broadcaster,
            state: TeleopState::Starting,
            summary: TeleopSummary::default(),
        })
    }

    pub fn state(&self) -> TeleopState {
        self.state
    }

    pub fn config(&self) -> &TeleopConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn summary(&self) -> TeleopSummary {
        self.summary
    }

    /// Process one snapshot: emit each channel whose command changed.
    ///
    /// The tracker is committed after every emit attempt, whatever the sinks
    /// reported, so an unreachable rover does not cause resends.
    pub async fn tick(&mut self, snapshot: &InputSnapshot) -> TickOutcome {
        let pwm = &self.config.pwm;
        let commands = [
            Command::Drive(encode_drive(snapshot, pwm)),
            Command::Arm(encode_arm(snapshot, pwm)),
        ];

        let mut outcome = TickOutcome::default();
        for cmd in commands {
            if !self.tracker.should_emit(&cmd) {
                tracing::trace!(channel = %cmd.channel(), "unchanged, suppressed");
                continue;
            }
            let packet = CommandPacket::from(&cmd);
            tracing::debug!(
                channel = %cmd.channel(),
                held = ?snapshot.held_keys().collect::<Vec<_>>(),
                "command changed"
            );
            let report = self.broadcaster.broadcast(packet.as_str()).await;
            self.tracker.commit(&cmd);
            match cmd.channel() {
                Channel::Drive => self.summary.drive_packets += 1,
                Channel::Arm => self.summary.arm_packets += 1,
            }
            outcome.emitted.push(Emission { packet, report });
        }
        self.summary.ticks += 1;
        outcome
    }

    /// Run until the input source asks to quit.
    pub async fn run(&mut self) -> TeleopSummary {
        self.run_until(std::future::pending()).await
    }

    /// Run until the input source asks to quit or `shutdown` completes.
    pub async fn run_until<F>(&mut self, shutdown: F) -> TeleopSummary
    where
        F: Future<Output = ()>,
    {
        if self.state != TeleopState::Starting {
            tracing::warn!(state = %self.state, "teleop already ran");
            return self.summary;
        }
        self.state = TeleopState::Running;
        tracing::info!("teleop running");

        let mut poll = interval(self.config.poll_period());
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut idle = interval(self.config.idle_period());
        idle.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = idle.tick() => {
                    if self.input.quit_requested() {
                        tracing::info!("quit signal from input source");
                        break;
                    }
                }
                _ = poll.tick() => {
                    let snapshot = self.input.snapshot();
                    self.tick(&snapshot).await;
                }
            }
        }

        self.stop().await;
        self.summary
    }

    /// Release the input source and shut the sinks down. Idempotent.
    pub async fn stop(&mut self) {
        if self.state == TeleopState::Stopped {
            return;
        }
        self.state = TeleopState::Stopping;
        self.input.release();
        self.broadcaster.close().await;
        self.state = TeleopState::Stopped;
        tracing::info!(
            ticks = self.summary.ticks,
            drive_packets = self.summary.drive_packets,
            arm_packets = self.summary.arm_packets,
            "teleop stopped"
        );
    }
}

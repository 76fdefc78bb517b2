use futures_util::StreamExt;
use link_transport::{Broadcaster, Delivery, FailingSink, MockSink, UdpSink, WsSink};
use rover_command::{ArmCommand, DriveCommand, InputSnapshot, Key, PwmProfile, ScriptedInput};
use std::time::Duration;
use teleop_core::{Teleop, TeleopConfig, TeleopState};
use tokio::net::UdpSocket;

fn snap(keys: &[Key]) -> InputSnapshot {
    InputSnapshot::from_keys(keys.iter().copied())
}

fn fast_config() -> TeleopConfig {
    TeleopConfig {
        poll_period_ms: 5,
        idle_period_ms: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_same_snapshot_emits_once_per_channel() {
    let dgram = MockSink::new("dgram");
    let log = dgram.log();
    let mut teleop = Teleop::with_broadcaster(
        TeleopConfig::default(),
        ScriptedInput::new([]),
        Broadcaster::new(MockSink::new("stream"), dgram),
    )
    .unwrap();

    let held = snap(&[Key::W, Key::Q]);
    let first = teleop.tick(&held).await;
    assert_eq!(first.emitted.len(), 2);
    for _ in 0..5 {
        assert!(teleop.tick(&held).await.emitted.is_empty());
    }
    assert_eq!(log.lock().len(), 2);
    assert_eq!(teleop.summary().ticks, 6);
}

#[tokio::test]
async fn test_forward_turn_release_scenario() {
    let stream = MockSink::new("stream");
    let dgram = MockSink::new("dgram");
    let (stream_log, dgram_log) = (stream.log(), dgram.log());
    let mut teleop = Teleop::with_broadcaster(
        TeleopConfig::default(),
        ScriptedInput::new([]),
        Broadcaster::new(stream, dgram),
    )
    .unwrap();

    // Nothing has been sent yet, so the first neutral tick establishes the baseline.
    let baseline = teleop.tick(&InputSnapshot::empty()).await;
    assert_eq!(baseline.emitted.len(), 2);
    stream_log.lock().clear();
    dgram_log.lock().clear();

    let mut emitted = Vec::new();
    for keys in [&[][..], &[Key::W], &[Key::W, Key::A], &[]] {
        let outcome = teleop.tick(&snap(keys)).await;
        emitted.extend(outcome.packets().into_iter().map(str::to_string));
    }

    let expected = vec![
        "D_148_148_148_148_148_148",
        "D_148_148_148_108_108_108",
        "D_128_128_128_128_128_128",
    ];
    assert_eq!(emitted, expected);
    assert_eq!(*stream_log.lock(), expected);
    assert_eq!(*dgram_log.lock(), expected);
    assert_eq!(teleop.summary().arm_packets, 1);
}

#[tokio::test]
async fn test_arm_change_does_not_resend_drive() {
    let mut teleop = Teleop::with_broadcaster(
        TeleopConfig::default(),
        ScriptedInput::new([]),
        Broadcaster::new(MockSink::new("stream"), MockSink::new("dgram")),
    )
    .unwrap();

    teleop.tick(&snap(&[Key::W])).await;
    for keys in [&[Key::W, Key::Q][..], &[Key::W, Key::X], &[Key::W]] {
        let outcome = teleop.tick(&snap(keys)).await;
        assert_eq!(outcome.emitted.len(), 1);
        assert!(outcome.packets()[0].starts_with("A_"));
    }
    assert_eq!(teleop.summary().drive_packets, 1);
    assert_eq!(teleop.summary().arm_packets, 4);
}

#[tokio::test]
async fn test_stream_failure_still_sends_datagram_and_commits() {
    let failing = FailingSink::no_client();
    let attempts = failing.attempts();
    let dgram = MockSink::new("dgram");
    let dgram_log = dgram.log();
    let mut teleop = Teleop::with_broadcaster(
        TeleopConfig::default(),
        ScriptedInput::new([]),
        Broadcaster::new(failing, dgram),
    )
    .unwrap();

    let outcome = teleop.tick(&snap(&[Key::S])).await;
    let drive = &outcome.emitted[0];
    assert_eq!(drive.packet.as_str(), "D_108_108_108_108_108_108");
    assert_eq!(drive.report.streaming, Delivery::NoClient);
    assert_eq!(drive.report.datagram, Delivery::Sent);
    assert_eq!(dgram_log.lock()[0], "D_108_108_108_108_108_108");
    assert_eq!(
        teleop.tracker().last_drive(),
        Some(&DriveCommand::uniform(108, 108))
    );
    assert_eq!(
        teleop.tracker().last_arm(),
        Some(&ArmCommand::neutral(&PwmProfile::default()))
    );

    assert!(teleop.tick(&snap(&[Key::S])).await.emitted.is_empty());
    assert_eq!(*attempts.lock(), 2);
}

#[tokio::test]
async fn test_run_stops_when_input_quits() {
    let dgram = MockSink::new("dgram");
    let log = dgram.log();
    let closed = dgram.closed_flag();
    let script = ScriptedInput::new([
        snap(&[]),
        snap(&[Key::W]),
        snap(&[Key::W]),
        snap(&[Key::W, Key::Up]),
    ]);
    let mut teleop = Teleop::with_broadcaster(
        fast_config(),
        script,
        Broadcaster::new(MockSink::new("stream"), dgram),
    )
    .unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), teleop.run())
        .await
        .unwrap();

    assert_eq!(teleop.state(), TeleopState::Stopped);
    assert!(teleop.input().is_released());
    assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    assert!(summary.ticks >= 4);
    assert_eq!(summary.drive_packets, 2);
    assert_eq!(summary.arm_packets, 2);
    assert_eq!(
        *log.lock(),
        vec![
            "D_128_128_128_128_128_128",
            "A_128_128_128_128_128_128",
            "D_148_148_148_148_148_148",
            "A_128_148_108_128_128_128",
        ]
    );
}

#[tokio::test]
async fn test_run_until_external_shutdown() {
    let script = ScriptedInput::new([snap(&[Key::D])]).looping();
    let mut teleop = Teleop::with_broadcaster(
        fast_config(),
        script,
        Broadcaster::new(MockSink::new("stream"), MockSink::new("dgram")),
    )
    .unwrap();

    let summary = teleop
        .run_until(tokio::time::sleep(Duration::from_millis(60)))
        .await;
    assert_eq!(teleop.state(), TeleopState::Stopped);
    assert!(summary.ticks >= 2);
    assert_eq!(summary.drive_packets, 1);

    // A stopped loop does not run again.
    let again = teleop.run().await;
    assert_eq!(again, summary);
}

#[tokio::test]
async fn test_real_sockets_deliver_identical_packets() -> anyhow::Result<()> {
    let rover = UdpSocket::bind("127.0.0.1:0").await?;
    let datagram = UdpSink::open(rover.local_addr()?).await?;
    let streaming = WsSink::bind("127.0.0.1:0".parse()?, Duration::from_millis(200)).await?;
    let url = format!("ws://{}", streaming.local_addr());

    let mut teleop = Teleop::with_broadcaster(
        TeleopConfig::default(),
        ScriptedInput::new([]),
        Broadcaster::new(streaming, datagram),
    )?;

    // Before any viewer connects only the rover gets the packet.
    let early = teleop.tick(&snap(&[Key::A])).await;
    assert_eq!(early.emitted[0].report.streaming, Delivery::NoClient);
    let mut buf = [0u8; 64];
    let (n, _) = rover.recv_from(&mut buf).await?;
    assert_eq!(&buf[..n], b"D_148_148_148_108_108_108");
    rover.recv_from(&mut buf).await?;

    // Registration happens on the acceptor task; keep changing the arm command
    // until a packet lands on the viewer. Earlier packets are never replayed.
    let (mut viewer, _) = tokio_tungstenite::connect_async(url).await?;
    let mut delivered = None;
    for i in 0..100 {
        let key = if i % 2 == 0 { Key::E } else { Key::Q };
        let outcome = teleop.tick(&snap(&[key])).await;
        if let Some(e) = outcome
            .emitted
            .iter()
            .find(|e| e.report.streaming == Delivery::Sent)
        {
            delivered = Some(e.packet.as_str().to_string());
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let expected = delivered.ok_or_else(|| anyhow::anyhow!("viewer never registered"))?;

    let msg = viewer
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("viewer stream ended"))??;
    assert_eq!(msg.into_text()?, expected);

    teleop.stop().await;
    Ok(())
}

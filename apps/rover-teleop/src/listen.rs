use anyhow::{Context, Result};
use rover_command::{Command, CommandPacket};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{info, warn};

/// Receive command datagrams the way the rover would and log them decoded.
pub async fn run(bind: SocketAddr) -> Result<()> {
    let socket = UdpSocket::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %socket.local_addr()?, "listening for command packets (Ctrl-C to stop)");

    let mut buf = [0u8; 512];
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            recv = socket.recv_from(&mut buf) => {
                let (n, from) = match recv {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(error = %e, "recv failed");
                        continue;
                    }
                };
                log_packet(from, &buf[..n]);
            }
        }
    }
    info!("listener stopped");
    Ok(())
}

fn log_packet(from: SocketAddr, bytes: &[u8]) {
    let Ok(text) = std::str::from_utf8(bytes) else {
        warn!(%from, len = bytes.len(), "non-UTF-8 datagram");
        return;
    };
    let cmd = Command::parse(text);
    if let Ok(c) = &cmd {
        // Same values, different spelling (e.g. zero padding); firmware may not accept it.
        if CommandPacket::from(c).as_str() != text.trim() {
            warn!(%from, packet = text, "non-canonical packet");
        }
    }
    match cmd {
        Ok(Command::Drive(d)) => info!(%from, right = ?d.right, left = ?d.left, "drive"),
        Ok(Command::Arm(a)) => info!(
            %from,
            shoulder = a.shoulder,
            wrist_right = a.wrist_right,
            wrist_left = a.wrist_left,
            claw = a.claw,
            gantry = a.gantry,
            elbow = a.elbow,
            "arm"
        ),
        Err(e) => warn!(%from, packet = text, error = %e, "undecodable packet"),
    }
}

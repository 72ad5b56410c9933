//! Live telemetry: decode, align and report lap progress.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use openracing_telemetry_f1::{
    PacketBody, ReceiverConfig, TelemetryPacket, TelemetryState, UdpTelemetryReceiver,
    track_name_from_id,
};
use openracing_track::{GeometryCache, LapProgressTracker, OutlineProvider, Point2};
use tracing::{debug, info, warn};

use crate::outlines::DirectoryOutlines;

/// Frames between progress log lines.
const REPORT_EVERY: u64 = 60;

#[derive(Debug, Clone)]
pub struct ListenOptions {
    pub port: Option<u16>,
    pub tracks: Option<PathBuf>,
    pub player_only: bool,
}

pub async fn execute(options: &ListenOptions) -> Result<()> {
    let mut config = ReceiverConfig::from_env();
    if let Some(port) = options.port {
        config = config.with_port(port);
    }
    let receiver = UdpTelemetryReceiver::new(config);
    let mut packets = receiver.start().await?;

    let mut session = options.tracks.as_ref().map(|dir| {
        let provider: Arc<dyn OutlineProvider> = Arc::new(DirectoryOutlines::new(dir));
        LiveSession::new(Arc::new(GeometryCache::new()), provider, options.player_only)
    });
    let mut state = TelemetryState::new();
    if session.is_none() {
        info!("no --tracks directory given, decoding only");
    }

    loop {
        tokio::select! {
            packet = packets.recv() => {
                let Some(packet) = packet else { break };
                match session.as_mut() {
                    Some(session) => {
                        session.handle(packet);
                    }
                    None => {
                        state.apply(packet);
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for ctrl-c");
                }
                break;
            }
        }
    }

    receiver.stop();
    if let Some(session) = &session {
        let tracker = session.tracker();
        info!(
            track = ?tracker.track(),
            aligned = tracker.aligner().is_solved(),
            samples = tracker.aligner().sample_count(),
            "lap tracking finished"
        );
    }
    let stats = receiver.stats();
    info!(
        received = stats.received,
        decoded = stats.decoded,
        dropped = stats.dropped(),
        socket_errors = stats.socket_errors,
        "receiver stopped"
    );
    Ok(())
}

/// Consumer-side state for one listen run.
pub struct LiveSession {
    state: TelemetryState,
    tracker: LapProgressTracker,
    player_only: bool,
    unavailable_track: Option<i32>,
    motion_frames: u64,
}

impl LiveSession {
    pub fn new(
        cache: Arc<GeometryCache>,
        provider: Arc<dyn OutlineProvider>,
        player_only: bool,
    ) -> Self {
        Self {
            state: TelemetryState::new(),
            tracker: LapProgressTracker::new(cache, provider),
            player_only,
            unavailable_track: None,
            motion_frames: 0,
        }
    }

    pub fn tracker(&self) -> &LapProgressTracker {
        &self.tracker
    }

    /// Fold in one packet. Motion frames return per-slot progress once the
    /// track geometry is loaded.
    pub fn handle(&mut self, packet: TelemetryPacket) -> Option<Vec<(usize, f64)>> {
        let is_motion = matches!(packet.body, PacketBody::Motion(_));
        let is_session = matches!(packet.body, PacketBody::Session(_));
        self.state.apply(packet);

        if is_session {
            self.sync_track();
        }
        if !is_motion {
            return None;
        }
        let progress = self.tracker.update(car_positions(&self.state, self.player_only));
        if progress.is_empty() {
            return None;
        }
        self.motion_frames = self.motion_frames.saturating_add(1);
        if self.motion_frames % REPORT_EVERY == 1 {
            self.report(&progress);
        }
        Some(progress)
    }

    fn sync_track(&mut self) {
        let Some(track_id) = self.state.track_id() else {
            return;
        };
        let track = i32::from(track_id);
        if self.unavailable_track == Some(track) {
            return;
        }
        match self.tracker.set_track(track) {
            Ok(()) => self.unavailable_track = None,
            Err(err) => {
                warn!(
                    track,
                    name = track_name_from_id(track_id),
                    error = %err,
                    "no usable outline, lap progress disabled for this track"
                );
                self.unavailable_track = Some(track);
            }
        }
    }

    fn report(&self, progress: &[(usize, f64)]) {
        let aligned = self.tracker.aligner().is_solved();
        let player = self.state.player_index();
        for &(slot, value) in progress {
            let name = self.state.driver_name(slot).unwrap_or("?");
            if Some(slot) == player {
                info!(slot, name, progress = value, aligned, "player lap progress");
            } else {
                debug!(slot, name, progress = value, aligned, "lap progress");
            }
        }
    }
}

/// Ground-plane positions of the cars to track: the player alone, or every
/// slot within the active roster (all slots before participants arrive).
pub fn car_positions(state: &TelemetryState, player_only: bool) -> Vec<(usize, Point2)> {
    let Some(motion) = state.motion.as_ref() else {
        return Vec::new();
    };
    let active = state
        .participants
        .as_ref()
        .map_or(usize::MAX, |p| usize::from(p.num_active_cars));
    let player = state.player_index();
    motion
        .cars
        .iter()
        .filter(|(slot, _)| *slot < active)
        .filter(|(slot, _)| !player_only || Some(*slot) == player)
        .map(|(slot, car)| {
            let (x, z) = car.ground_position();
            (slot, Point2::new(f64::from(x), f64::from(z)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use openracing_telemetry_f1::decode_packet;
    use openracing_telemetry_f1::testing::{
        ParticipantSpec, SessionSpec, build_participants_packet, build_positions_packet,
        build_session_packet,
    };
    use openracing_track::StaticOutlines;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const SQUARE: &str = r#"<svg><path d="M0 0 H100 V100 H0 Z"/></svg>"#;

    fn live(player_only: bool) -> LiveSession {
        let provider: Arc<dyn OutlineProvider> = Arc::new(StaticOutlines::new().with(7, SQUARE));
        LiveSession::new(Arc::new(GeometryCache::new()), provider, player_only)
    }

    fn session_packet(track_id: i8) -> Result<TelemetryPacket, Box<dyn std::error::Error>> {
        let raw = build_session_packet(&SessionSpec {
            track_id,
            ..SessionSpec::default()
        });
        Ok(decode_packet(&raw)?)
    }

    #[test]
    fn motion_before_session_yields_nothing() -> TestResult {
        let mut live = live(false);
        let raw = build_positions_packet(0, &[(0, [50.0, 0.0, 0.0])]);
        assert!(live.handle(decode_packet(&raw)?).is_none());
        Ok(())
    }

    #[test]
    fn session_then_motion_reports_progress() -> TestResult {
        let mut live = live(false);
        assert!(live.handle(session_packet(7)?).is_none());
        assert_eq!(live.tracker().track(), Some(7));

        // world x = 100, z = 50 lies on the right-hand edge
        let raw = build_positions_packet(0, &[(0, [100.0, 3.0, 50.0]), (4, [0.0, 0.0, 0.0])]);
        let progress = live.handle(decode_packet(&raw)?).unwrap_or_default();
        assert_eq!(progress.len(), 1);
        let (slot, value) = progress.first().copied().unwrap_or((99, -1.0));
        assert_eq!(slot, 0);
        assert!((value - 0.375).abs() < 1e-3);
        Ok(())
    }

    #[test]
    fn unknown_outline_disables_progress() -> TestResult {
        let mut live = live(false);
        live.handle(session_packet(3)?);
        assert!(live.tracker().geometry().is_none());
        let raw = build_positions_packet(0, &[(0, [10.0, 0.0, 10.0])]);
        assert!(live.handle(decode_packet(&raw)?).is_none());
        Ok(())
    }

    #[test]
    fn positions_respect_roster_and_player_filter() -> TestResult {
        let mut state = TelemetryState::new();
        let motion = build_positions_packet(
            1,
            &[(0, [1.0, 0.0, 2.0]), (1, [3.0, 0.0, 4.0]), (2, [5.0, 0.0, 6.0])],
        );
        state.apply(decode_packet(&motion)?);
        // before participants every slot counts, zeroed ones included
        assert_eq!(car_positions(&state, false).len(), 22);

        let participants = build_participants_packet(
            2,
            &[
                (0, ParticipantSpec::named("Alpha", 1, 0)),
                (1, ParticipantSpec::named("Bravo", 2, 0)),
            ],
        );
        state.apply(decode_packet(&participants)?);
        // the player index follows the newest header
        state.apply(decode_packet(&motion)?);
        let all = car_positions(&state, false);
        assert_eq!(all.len(), 2);
        let player = car_positions(&state, true);
        assert_eq!(player, vec![(1, Point2::new(3.0, 4.0))]);
        Ok(())
    }
}

//! Ball flight, court collisions and racket strikes
//!
//! The ball flies a gravity arc in court space: x along the court, y across
//! it, z above the ground. Each shot is launched at a landing target in the
//! receiver's half, so direction is deterministic and only the aim carries
//! variance. `project_to_screen` maps court space onto the court panel.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::Serialize;

use super::state::{Ball, GameState, PointReason, Racket, Side};
use crate::consts::*;
use crate::tuning::Tuning;

/// Speed gained per return, capped at `MAX_RALLY_SPEEDUP`
const RALLY_SPEEDUP: f32 = 0.03;
const MAX_RALLY_SPEEDUP: f32 = 1.5;
/// Lowest point a struck ball leaves the racket from
const MIN_STRIKE_HEIGHT: f32 = 20.0;

/// Something that happened during a ball update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RallyEvent {
    /// Ball still flying
    InFlight,
    /// Good bounce in the receiver's court
    Bounced,
    /// Ball reached the receiver's racket; caller decides the return
    Contact { by: Side },
    /// Rally over
    PointOver { winner: Side, reason: PointReason },
}

/// A court position mapped to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projected {
    pub point: Vec2,
    /// Perspective size multiplier at this depth
    pub scale: f32,
}

/// Map a court-space point to canvas pixels with a fixed perspective: the far
/// sideline is drawn higher and smaller than the near one.
pub fn project_to_screen(pos: Vec3) -> Projected {
    let depth = pos.y / COURT_WIDTH;
    let scale = (1.0 - (1.0 - FAR_SCALE) * depth).max(0.1);
    let center_x = COURT_PANEL_WIDTH / 2.0;
    let x = center_x + (pos.x - NET_X) * scale;
    let y = SCREEN_NEAR_Y - depth * (SCREEN_NEAR_Y - SCREEN_FAR_Y) - pos.z * scale;
    Projected {
        point: Vec2::new(x, y),
        scale,
    }
}

/// Whether (x, y) lies in `side`'s half of the court, lines included
pub fn in_court(side: Side, x: f32, y: f32) -> bool {
    let lateral = (0.0..=COURT_WIDTH).contains(&y);
    let depth = match side {
        Side::Player => (0.0..=NET_X).contains(&x),
        Side::Cpu => (NET_X..=COURT_LENGTH).contains(&x),
    };
    lateral && depth
}

/// Launch from `from` so the ball lands at `target` with horizontal speed `speed`
pub fn launch_toward(ball: &mut Ball, from: Vec3, target: Vec2, speed: f32) {
    let run = target - from.truncate();
    let distance = run.length().max(1.0);
    let flight = distance / speed.max(1.0);
    let horizontal = run / flight;
    // Solve z(t) = z0 + vz*t - g*t^2/2 = 0 at t = flight
    let vz = (0.5 * GRAVITY * flight * flight - from.z) / flight;
    ball.pos = from;
    ball.vel = Vec3::new(horizontal.x, horizontal.y, vz);
    ball.bounces = 0;
}

fn rally_speed(tuning: &Tuning, returns: u32) -> f32 {
    let speedup = (1.0 + RALLY_SPEEDUP * returns as f32).min(MAX_RALLY_SPEEDUP);
    tuning.ball_base_speed * speedup
}

/// Put the ball in play from the server's racket. Returns the rally state.
pub fn serve_ball<R: Rng>(
    ball: &mut Ball,
    server: Side,
    server_racket: &Racket,
    tuning: &Tuning,
    rng: &mut R,
) -> GameState {
    let receiver = server.other();
    ball.reset_for_serve(server, server_racket.y);

    let depth = match receiver {
        Side::Cpu => NET_X + (COURT_LENGTH - NET_X) * 0.6,
        Side::Player => NET_X * 0.4,
    };
    let lateral = COURT_WIDTH / 2.0 + rng.random_range(-60.0..=60.0);
    let from = ball.pos;
    launch_toward(ball, from, Vec2::new(depth, lateral), tuning.ball_base_speed * 0.9);

    log::debug!("{:?} serves toward ({:.0}, {:.0})", server, depth, lateral);
    GameState::toward(receiver)
}

/// Strike the ball back from `racket`. The player's aim follows where the ball
/// met the racket; the CPU aims at a random spot blurred by its skill.
pub fn return_ball<R: Rng>(ball: &mut Ball, racket: &Racket, tuning: &Tuning, rng: &mut R) {
    let hitter = racket.side;
    let half = (COURT_LENGTH - NET_X).max(1.0);

    let target = match hitter {
        Side::Player => {
            // -1 at one edge of the racket, +1 at the other
            let offset = ((ball.pos.y - racket.y) / RACKET_REACH).clamp(-1.0, 1.0);
            let lateral = COURT_WIDTH / 2.0 + offset * COURT_WIDTH * 0.7;
            let depth = NET_X + half * rng.random_range(0.45..=0.9);
            Vec2::new(depth, lateral)
        }
        Side::Cpu => {
            let miss = (1.0 - tuning.cpu_skill) * CPU_MAX_ERROR;
            let lateral = rng.random_range(25.0..=COURT_WIDTH - 25.0)
                + rng.random_range(-1.0..=1.0) * miss * 2.0;
            let depth = NET_X * rng.random_range(0.15..=0.7) + rng.random_range(-1.0..=1.0) * miss;
            Vec2::new(depth, lateral)
        }
    };

    ball.returns += 1;
    let speed = rally_speed(tuning, ball.returns);
    let from = Vec3::new(racket.x(), ball.pos.y, ball.pos.z.max(MIN_STRIKE_HEIGHT));
    launch_toward(ball, from, target, speed);
    ball.hitter = hitter;

    log::debug!(
        "{:?} returns toward ({:.0}, {:.0}), rally {}",
        hitter,
        target.x,
        target.y,
        ball.returns
    );
}

/// Advance the ball by `dt` seconds of frame time scaled by `time_scale`.
///
/// Long frames are split into substeps of at most `SIM_DT` (up to a fixed
/// cap). Non-finite or negative durations leave the ball untouched. The update
/// stops at the first contact or point-ending event.
pub fn update_ball(
    ball: &mut Ball,
    player: &Racket,
    cpu: &Racket,
    dt: f32,
    time_scale: f32,
) -> RallyEvent {
    let scaled = dt * time_scale;
    if !scaled.is_finite() || scaled <= 0.0 {
        return RallyEvent::InFlight;
    }

    let steps = (scaled / SIM_DT).ceil().clamp(1.0, 64.0) as u32;
    let step = scaled / steps as f32;
    let mut result = RallyEvent::InFlight;

    for _ in 0..steps {
        match step_ball(ball, player, cpu, step) {
            RallyEvent::InFlight => {}
            RallyEvent::Bounced => result = RallyEvent::Bounced,
            event => return event,
        }
    }
    result
}

fn step_ball(ball: &mut Ball, player: &Racket, cpu: &Racket, dt: f32) -> RallyEvent {
    let hitter = ball.hitter;
    let receiver = hitter.other();
    let prev = ball.pos;

    ball.vel.z -= GRAVITY * dt;
    ball.pos += ball.vel * dt;

    // Net: crossing the net plane below the tape
    let mut net_fault = false;
    if ball.bounces == 0 && crossed(prev.x, ball.pos.x, NET_X) {
        let t = (NET_X - prev.x) / (ball.pos.x - prev.x);
        let z_at_net = prev.z + (ball.pos.z - prev.z) * t;
        net_fault = z_at_net < NET_HEIGHT;
    }

    // Ground contact
    let mut bounced = false;
    if ball.pos.z <= 0.0 && ball.vel.z < 0.0 {
        if ball.bounces > 0 {
            return RallyEvent::PointOver {
                winner: hitter,
                reason: PointReason::DoubleBounce,
            };
        }
        if !in_court(receiver, ball.pos.x, ball.pos.y) {
            // Out beats a net fault on the same frame
            return RallyEvent::PointOver {
                winner: receiver,
                reason: PointReason::Out,
            };
        }
        if !net_fault {
            ball.pos.z = 0.0;
            ball.vel.z = -ball.vel.z * RESTITUTION;
            ball.bounces = 1;
            bounced = true;
        }
    }

    if net_fault {
        return RallyEvent::PointOver {
            winner: receiver,
            reason: PointReason::Net,
        };
    }

    // Receiver's racket plane
    let racket = match receiver {
        Side::Player => player,
        Side::Cpu => cpu,
    };
    if crossed(prev.x, ball.pos.x, racket.x()) && racket.reaches(ball.pos.y, ball.pos.z) {
        return RallyEvent::Contact { by: receiver };
    }

    // Dead ball behind the receiver
    let beyond = (ball.pos.x - racket.x()) * receiver.incoming_sign();
    if beyond > RUNOFF {
        let (winner, reason) = if ball.bounces > 0 {
            (hitter, PointReason::Missed)
        } else {
            (receiver, PointReason::Out)
        };
        return RallyEvent::PointOver { winner, reason };
    }

    if bounced {
        RallyEvent::Bounced
    } else {
        RallyEvent::InFlight
    }
}

/// Whether a move from `a` to `b` crosses (or touches) `plane`
fn crossed(a: f32, b: f32, plane: f32) -> bool {
    (a < plane && b >= plane) || (a > plane && b <= plane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rackets() -> (Racket, Racket) {
        (Racket::new(Side::Player), Racket::new(Side::Cpu))
    }

    fn fly(ball: &mut Ball, player: &Racket, cpu: &Racket) -> RallyEvent {
        for _ in 0..2000 {
            match update_ball(ball, player, cpu, SIM_DT, 1.0) {
                RallyEvent::InFlight | RallyEvent::Bounced => {}
                event => return event,
            }
        }
        panic!("ball never came to rest: {:?}", ball);
    }

    #[test]
    fn test_projection_near_and_far() {
        let near = project_to_screen(Vec3::new(NET_X, 0.0, 0.0));
        assert!((near.point.x - COURT_PANEL_WIDTH / 2.0).abs() < 1e-3);
        assert!((near.point.y - SCREEN_NEAR_Y).abs() < 1e-3);
        assert!((near.scale - 1.0).abs() < 1e-6);

        let far = project_to_screen(Vec3::new(NET_X, COURT_WIDTH, 0.0));
        assert!((far.point.y - SCREEN_FAR_Y).abs() < 1e-3);
        assert!((far.scale - FAR_SCALE).abs() < 1e-6);

        // Height lifts the ball on screen
        let lifted = project_to_screen(Vec3::new(NET_X, 0.0, 50.0));
        assert!(lifted.point.y < near.point.y);
    }

    #[test]
    fn test_projection_fits_court_panel() {
        for corner in [
            Vec3::new(PLAYER_RACKET_X, 0.0, 0.0),
            Vec3::new(CPU_RACKET_X, 0.0, 0.0),
            Vec3::new(PLAYER_RACKET_X, COURT_WIDTH, 0.0),
            Vec3::new(CPU_RACKET_X, COURT_WIDTH, 0.0),
        ] {
            let p = project_to_screen(corner).point;
            assert!(p.x >= 0.0 && p.x <= COURT_PANEL_WIDTH, "{corner:?} -> {p:?}");
            assert!(p.y >= 0.0 && p.y <= CANVAS_HEIGHT as f32, "{corner:?} -> {p:?}");
        }
    }

    #[test]
    fn test_serve_lands_in_and_reaches_centered_racket() {
        let (player, cpu) = rackets();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ball = Ball::new();
        let state = serve_ball(&mut ball, Side::Player, &player, &Tuning::default(), &mut rng);
        assert_eq!(state, GameState::BallToCpu);
        // Stand where the ball will cross the CPU's hit plane
        let mut cpu = cpu;
        cpu.y = ball.pos.y + ball.vel.y / ball.vel.x * (CPU_RACKET_X - ball.pos.x);

        let mut bounced = false;
        let event = loop {
            match update_ball(&mut ball, &player, &cpu, SIM_DT, 1.0) {
                RallyEvent::Bounced => bounced = true,
                RallyEvent::InFlight => {}
                event => break event,
            }
        };
        assert!(bounced);
        assert_eq!(event, RallyEvent::Contact { by: Side::Cpu });
    }

    #[test]
    fn test_unreached_ball_is_missed() {
        let (player, mut cpu) = rackets();
        cpu.y = -RACKET_MARGIN;
        let mut ball = Ball::new();
        ball.reset_for_serve(Side::Player, COURT_WIDTH - 20.0);
        let from = ball.pos;
        launch_toward(&mut ball, from, Vec2::new(500.0, COURT_WIDTH - 20.0), 400.0);
        assert_eq!(
            fly(&mut ball, &player, &cpu),
            RallyEvent::PointOver {
                winner: Side::Player,
                reason: PointReason::Missed,
            }
        );
    }

    #[test]
    fn test_long_ball_is_out() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        ball.reset_for_serve(Side::Player, COURT_WIDTH / 2.0);
        let from = ball.pos;
        launch_toward(&mut ball, from, Vec2::new(COURT_LENGTH + 20.0, COURT_WIDTH / 2.0), 400.0);
        assert_eq!(
            fly(&mut ball, &player, &cpu),
            RallyEvent::PointOver {
                winner: Side::Cpu,
                reason: PointReason::Out,
            }
        );
    }

    #[test]
    fn test_wide_ball_is_out() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        ball.reset_for_serve(Side::Cpu, COURT_WIDTH / 2.0);
        let from = ball.pos;
        launch_toward(&mut ball, from, Vec2::new(NET_X / 2.0, -30.0), 400.0);
        assert_eq!(
            fly(&mut ball, &player, &cpu),
            RallyEvent::PointOver {
                winner: Side::Player,
                reason: PointReason::Out,
            }
        );
    }

    #[test]
    fn test_flat_shot_hits_net() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        ball.reset_for_serve(Side::Player, COURT_WIDTH / 2.0);
        // Skimming along the ground
        ball.pos = Vec3::new(NET_X - 40.0, COURT_WIDTH / 2.0, 5.0);
        ball.vel = Vec3::new(400.0, 0.0, 0.0);
        assert_eq!(
            fly(&mut ball, &player, &cpu),
            RallyEvent::PointOver {
                winner: Side::Cpu,
                reason: PointReason::Net,
            }
        );
    }

    #[test]
    fn test_out_takes_precedence_over_net() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        ball.hitter = Side::Player;
        // One frame crosses the net low and lands wide
        ball.pos = Vec3::new(NET_X - 1.0, -50.0, 0.2);
        ball.vel = Vec3::new(400.0, 0.0, -100.0);
        let event = update_ball(&mut ball, &player, &cpu, SIM_DT, 1.0);
        assert_eq!(
            event,
            RallyEvent::PointOver {
                winner: Side::Cpu,
                reason: PointReason::Out,
            }
        );
    }

    #[test]
    fn test_double_bounce_loses_for_receiver() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        ball.hitter = Side::Cpu;
        ball.bounces = 1;
        ball.pos = Vec3::new(NET_X / 2.0, COURT_WIDTH / 2.0, 0.1);
        ball.vel = Vec3::new(-10.0, 0.0, -50.0);
        assert_eq!(
            update_ball(&mut ball, &player, &cpu, SIM_DT, 1.0),
            RallyEvent::PointOver {
                winner: Side::Cpu,
                reason: PointReason::DoubleBounce,
            }
        );
    }

    #[test]
    fn test_player_return_aim_follows_racket_offset() {
        let (player, _) = rackets();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ball = Ball::new();
        ball.hitter = Side::Cpu;
        ball.pos = Vec3::new(PLAYER_RACKET_X, player.y + RACKET_REACH * 0.5, 30.0);
        return_ball(&mut ball, &player, &Tuning::default(), &mut rng);
        assert_eq!(ball.hitter, Side::Player);
        assert_eq!(ball.returns, 1);
        assert!(ball.vel.x > 0.0);
        assert!(ball.vel.y > 0.0, "offset above center should angle up-court");
    }

    #[test]
    fn test_slow_motion_covers_less_ground() {
        let (player, cpu) = rackets();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut normal = Ball::new();
        serve_ball(&mut normal, Side::Player, &player, &Tuning::default(), &mut rng);
        let mut slow = normal.clone();
        update_ball(&mut normal, &player, &cpu, 0.1, 1.0);
        update_ball(&mut slow, &player, &cpu, 0.1, SLOW_MOTION_FACTOR);
        let start = PLAYER_RACKET_X;
        assert!(slow.pos.x - start < normal.pos.x - start);
    }

    #[test]
    fn test_large_and_invalid_dt_are_safe() {
        let (player, cpu) = rackets();
        let mut ball = Ball::new();
        let mut rng = Pcg32::seed_from_u64(5);
        serve_ball(&mut ball, Side::Player, &player, &Tuning::default(), &mut rng);
        let before = ball.pos;
        assert_eq!(update_ball(&mut ball, &player, &cpu, f32::NAN, 1.0), RallyEvent::InFlight);
        assert_eq!(update_ball(&mut ball, &player, &cpu, -1.0, 1.0), RallyEvent::InFlight);
        assert_eq!(ball.pos, before);

        // A huge frame still reports the first event instead of tunnelling
        let event = update_ball(&mut ball, &player, &cpu, 5.0, 1.0);
        assert!(matches!(
            event,
            RallyEvent::Contact { .. } | RallyEvent::PointOver { .. }
        ));
    }
}

//! CPU opponent
//!
//! Memoryless: each tick the CPU looks at the ball, predicts where it will
//! cross its hit plane and slides toward that spot. Skill scales how early it
//! reacts, how fast it moves and how precisely it predicts.

use rand::Rng;

use super::state::{Ball, GameState, Racket, Side};
use crate::consts::*;

/// Lateral position where the ball's current line crosses `plane_x`
pub fn predict_crossing(ball: &Ball, plane_x: f32) -> f32 {
    if ball.vel.x.abs() < f32::EPSILON {
        return ball.pos.y;
    }
    let t = (plane_x - ball.pos.x) / ball.vel.x;
    ball.pos.y + ball.vel.y * t.max(0.0)
}

/// Lateral speed of the CPU racket at `skill`
pub fn cpu_speed(skill: f32) -> f32 {
    CPU_MAX_SPEED * (0.35 + 0.65 * skill.clamp(0.0, 1.0))
}

/// Move the CPU racket for one tick.
///
/// Once an incoming ball passes the reaction line the CPU tracks its
/// predicted crossing plus a random error that shrinks with skill. Otherwise
/// it drifts back to the center.
pub fn update_cpu<R: Rng>(
    racket: &mut Racket,
    ball: &Ball,
    state: GameState,
    skill: f32,
    dt: f32,
    rng: &mut R,
) {
    let skill = skill.clamp(0.0, 1.0);
    let reaction_x = NET_X * (1.0 - skill);
    let incoming = state == GameState::BallToCpu && ball.receiver() == Side::Cpu;

    let target = if incoming && ball.pos.x >= reaction_x {
        let wobble = rng.random_range(-1.0..=1.0) * CPU_MAX_ERROR * (1.0 - skill);
        predict_crossing(ball, racket.x()) + wobble
    } else {
        COURT_WIDTH / 2.0
    };

    let target = crate::clamp_lateral(target);
    racket.y = crate::approach(racket.y, target, cpu_speed(skill) * dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn incoming_ball(y_at_plane: f32) -> Ball {
        let mut ball = Ball::new();
        ball.hitter = Side::Player;
        ball.pos = Vec3::new(NET_X + 10.0, COURT_WIDTH / 2.0, 40.0);
        let t = (CPU_RACKET_X - ball.pos.x) / 400.0;
        ball.vel = Vec3::new(400.0, (y_at_plane - ball.pos.y) / t, 0.0);
        ball
    }

    #[test]
    fn test_predict_crossing() {
        let ball = incoming_ball(60.0);
        assert!((predict_crossing(&ball, CPU_RACKET_X) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_perfect_cpu_reaches_prediction() {
        let mut rng = Pcg32::seed_from_u64(1);
        let ball = incoming_ball(40.0);
        let mut racket = Racket::new(Side::Cpu);
        for _ in 0..240 {
            update_cpu(&mut racket, &ball, GameState::BallToCpu, 1.0, SIM_DT, &mut rng);
        }
        assert!((racket.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_never_exceeds_cap() {
        let mut rng = Pcg32::seed_from_u64(2);
        let ball = incoming_ball(0.0);
        let mut racket = Racket::new(Side::Cpu);
        let before = racket.y;
        update_cpu(&mut racket, &ball, GameState::BallToCpu, 1.0, SIM_DT, &mut rng);
        assert!((before - racket.y).abs() <= CPU_MAX_SPEED * SIM_DT + 1e-4);
    }

    #[test]
    fn test_drifts_to_center_when_ball_outgoing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ball = incoming_ball(40.0);
        ball.hitter = Side::Cpu;
        let mut racket = Racket::new(Side::Cpu);
        racket.y = 0.0;
        for _ in 0..480 {
            update_cpu(&mut racket, &ball, GameState::BallToPlayer, 0.5, SIM_DT, &mut rng);
        }
        assert!((racket.y - COURT_WIDTH / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_skill_reacts_later() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ball = incoming_ball(0.0);
        // Still on the player's side of the net
        ball.pos.x = NET_X * 0.5;
        let mut sharp = Racket::new(Side::Cpu);
        let mut slow = Racket::new(Side::Cpu);
        update_cpu(&mut sharp, &ball, GameState::BallToCpu, 0.9, SIM_DT, &mut rng);
        update_cpu(&mut slow, &ball, GameState::BallToCpu, 0.1, SIM_DT, &mut rng);
        assert!(sharp.y < COURT_WIDTH / 2.0);
        assert_eq!(slow.y, COURT_WIDTH / 2.0);
    }
}

//! Gameplay events reported by `GameState::update` for the host to react to
//! (sounds, messages, logging).

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The drone latched onto the package.
    TargetAcquired { reward: u32 },
    /// The package reached its drop zone.
    TargetDelivered { reward: u32, score: u32 },
    /// A move was rejected by an obstacle and the drone bounced back.
    Collision { position: Vec3 },
    /// The world was regenerated and the score reset.
    Restarted,
}

impl GameEvent {
    /// Log the event at a level matching its importance.
    pub fn log(&self) {
        match self {
            GameEvent::TargetAcquired { reward } => {
                log::info!("Package picked up, worth {} on delivery", reward)
            }
            GameEvent::TargetDelivered { reward, score } => {
                log::info!("Package delivered (+{}), score {}", reward, score)
            }
            GameEvent::Collision { position } => log::debug!(
                "Bounced off an obstacle at ({:.2}, {:.2}, {:.2})",
                position.x,
                position.y,
                position.z
            ),
            GameEvent::Restarted => log::info!("Restarted"),
        }
    }
}

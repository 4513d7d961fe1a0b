use glam::Vec2;
use gridcaster_core::{ActorId, ActorSnapshot, ActorSpawn, ActorView, DamageError};

#[derive(Clone, Debug)]
struct Actor {
    id: ActorId,
    position: Vec2,
    half_width: f32,
    health: u32,
    max_health: u32,
    damaged_this_frame: bool,
}

impl Actor {
    fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            position: self.position,
            half_width: self.half_width,
            health: self.health,
            max_health: self.max_health,
        }
    }
}

/// Mutable actor state; health only changes through [`ActorRegistry::apply_damage`].
#[derive(Clone, Debug, Default)]
pub(crate) struct ActorRegistry {
    actors: Vec<Actor>,
}

impl ActorRegistry {
    pub(crate) fn from_spawns(spawns: &[ActorSpawn], health: u32, half_width: f32) -> Self {
        let actors = spawns
            .iter()
            .enumerate()
            .map(|(index, spawn)| Actor {
                id: ActorId::new(index as u32),
                position: Vec2::new(spawn.x, spawn.y),
                half_width,
                health,
                max_health: health,
                damaged_this_frame: false,
            })
            .collect();
        Self { actors }
    }

    /// Clears the per-frame damage latch on every actor.
    pub(crate) fn begin_frame(&mut self) {
        for actor in &mut self.actors {
            actor.damaged_this_frame = false;
        }
    }

    /// Removes one unit of health, at most once per actor per frame.
    pub(crate) fn apply_damage(&mut self, id: ActorId) -> Result<u32, DamageError> {
        let actor = self
            .actors
            .iter_mut()
            .find(|actor| actor.id == id)
            .ok_or(DamageError::Missing)?;

        if actor.health == 0 {
            return Err(DamageError::Dead);
        }
        if actor.damaged_this_frame {
            return Err(DamageError::AlreadyDamaged);
        }

        actor.damaged_this_frame = true;
        actor.health = actor.health.saturating_sub(1);
        Ok(actor.health)
    }

    pub(crate) fn iter_live(&self) -> impl Iterator<Item = ActorSnapshot> + '_ {
        self.actors
            .iter()
            .filter(|actor| actor.health > 0)
            .map(Actor::snapshot)
    }

    pub(crate) fn view(&self) -> ActorView {
        ActorView::from_snapshots(self.actors.iter().map(Actor::snapshot).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(health: u32) -> ActorRegistry {
        ActorRegistry::from_spawns(
            &[
                ActorSpawn { x: 10.0, y: 10.0 },
                ActorSpawn { x: 30.0, y: 10.0 },
            ],
            health,
            4.0,
        )
    }

    #[test]
    fn damage_applies_once_per_frame() {
        let mut actors = registry(3);

        assert_eq!(actors.apply_damage(ActorId::new(0)), Ok(2));
        assert_eq!(
            actors.apply_damage(ActorId::new(0)),
            Err(DamageError::AlreadyDamaged)
        );
        assert_eq!(actors.apply_damage(ActorId::new(1)), Ok(2));

        actors.begin_frame();
        assert_eq!(actors.apply_damage(ActorId::new(0)), Ok(1));
    }

    #[test]
    fn dead_actors_reject_damage_and_leave_live_iteration() {
        let mut actors = registry(1);

        assert_eq!(actors.apply_damage(ActorId::new(1)), Ok(0));
        actors.begin_frame();
        assert_eq!(actors.apply_damage(ActorId::new(1)), Err(DamageError::Dead));

        let live: Vec<_> = actors.iter_live().map(|actor| actor.id).collect();
        assert_eq!(live, vec![ActorId::new(0)]);
        assert_eq!(actors.view().len(), 2, "dead actors stay registered");
    }

    #[test]
    fn unknown_actor_is_reported_missing() {
        let mut actors = registry(1);
        assert_eq!(
            actors.apply_damage(ActorId::new(9)),
            Err(DamageError::Missing)
        );
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a held trigger into fire commands.

use gridcaster_core::{Command, WeaponSnapshot};

/// Weapon system that queues a fire command when the trigger is held and the cooldown elapsed.
#[derive(Debug, Default)]
pub struct Weapon;

impl Weapon {
    /// Creates a new weapon system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits `Command::FireWeapon` when `trigger_held` and the weapon is ready.
    pub fn handle(&mut self, trigger_held: bool, weapon: WeaponSnapshot, out: &mut Vec<Command>) {
        if !trigger_held {
            return;
        }

        if !weapon.is_ready() {
            return;
        }

        out.push(Command::FireWeapon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot(ready_in: Duration) -> WeaponSnapshot {
        WeaponSnapshot {
            ready_in,
            recoil_remaining: Duration::ZERO,
            recoil_duration: Duration::from_millis(100),
        }
    }

    #[test]
    fn released_trigger_is_silent() {
        let mut system = Weapon::new();
        let mut out = Vec::new();

        system.handle(false, snapshot(Duration::ZERO), &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = Weapon::new();
        let mut out = Vec::new();

        system.handle(true, snapshot(Duration::from_millis(40)), &mut out);
        assert!(out.is_empty());

        system.handle(true, snapshot(Duration::ZERO), &mut out);
        assert_eq!(out, vec![Command::FireWeapon]);
    }
}

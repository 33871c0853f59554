use crate::math::Vec2;
use rand::Rng;

/// Center of a melee swing: half the attack range ahead of the attacker,
/// along its current facing direction.
pub fn attack_center(origin: Vec2, facing: Vec2, attack_range: f32) -> Vec2 {
    origin.add(facing.scale(attack_range / 2.0))
}

/// Overlap test between a swing centered at `center` and a circular target.
/// The effective reach is 80% of the nominal range, widened by the target's
/// own radius so grazing hits still connect.
pub fn attack_connects(center: Vec2, attack_range: f32, target: Vec2, target_radius: f32) -> bool {
    let reach_sq = (attack_range * 0.8) * (attack_range * 0.8);
    center.distance_squared(target) < reach_sq + target_radius * target_radius
}

/// Rolls a dodge for the defender. Dodging skips damage entirely, so callers
/// must roll before applying any damage.
pub fn roll_dodge<R: Rng>(rng: &mut R, agility: f32) -> bool {
    rng.gen::<f32>() < agility
}

/// Damage after defense, rounded to the nearest whole point. A positive raw
/// hit that is reduced by defense always deals at least 1 point.
pub fn effective_damage(raw: f32, defense: f32, defense_cap: f32) -> i32 {
    let multiplier = (1.0 - defense.clamp(0.0, defense_cap)).max(0.0);
    let mut dealt = (raw * multiplier).round() as i32;
    if raw > 0.0 && multiplier < 1.0 && dealt < 1 {
        dealt = 1;
    }
    dealt
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_attack_center_offset() {
        let center = attack_center(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 45.0);
        assert_approx_eq!(center.x, 122.5);
        assert_approx_eq!(center.y, 100.0);

        let left = attack_center(Vec2::new(100.0, 100.0), Vec2::new(-1.0, 0.0), 45.0);
        assert_approx_eq!(left.x, 77.5);
    }

    #[test]
    fn test_attack_connects_within_reach() {
        // Swing from (100,100) facing right with range 45 -> center (122.5,100),
        // reach 36. A radius-10 target at (130,100) is well inside.
        let center = attack_center(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 45.0);
        assert!(attack_connects(center, 45.0, Vec2::new(130.0, 100.0), 10.0));
    }

    #[test]
    fn test_attack_misses_behind() {
        let center = attack_center(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 45.0);
        assert!(!attack_connects(center, 45.0, Vec2::new(40.0, 100.0), 10.0));
    }

    #[test]
    fn test_effective_damage_applies_defense() {
        // 15 raw into 10% defense -> 13.5 -> 14.
        assert_eq!(effective_damage(15.0, 0.10, 0.90), 14);
        // 22 raw into 5% defense -> 20.9 -> 21.
        assert_eq!(effective_damage(22.0, 0.05, 0.90), 21);
    }

    #[test]
    fn test_effective_damage_monotonic_in_raw() {
        let mut previous = 0;
        for raw in 1..100 {
            let dealt = effective_damage(raw as f32, 0.25, 0.90);
            assert!(dealt >= previous, "damage decreased at raw={}", raw);
            assert!(dealt >= 1);
            previous = dealt;
        }
    }

    #[test]
    fn test_chip_damage_floor() {
        // 1 raw into heavy defense rounds to 0 but must still land 1.
        assert_eq!(effective_damage(1.0, 0.90, 0.90), 1);
        // Zero raw deals nothing; the floor only applies to real hits.
        assert_eq!(effective_damage(0.0, 0.90, 0.90), 0);
    }

    #[test]
    fn test_defense_clamped_to_cap() {
        // Defense past the cap is treated as the cap.
        assert_eq!(effective_damage(100.0, 5.0, 0.90), 10);
        // Negative defense is treated as zero, never amplifying damage.
        assert_eq!(effective_damage(10.0, -1.0, 0.90), 10);
    }

    #[test]
    fn test_dodge_boundaries() {
        // StepRng pinned at zero makes every roll 0.0: any positive agility
        // dodges, zero agility never does.
        let mut always_low = StepRng::new(0, 0);
        assert!(roll_dodge(&mut always_low, 0.05));
        assert!(roll_dodge(&mut always_low, 1.0));
        assert!(!roll_dodge(&mut always_low, 0.0));

        let mut always_high = StepRng::new(u64::MAX, 0);
        assert!(!roll_dodge(&mut always_high, 0.05));
    }
}

//! Property tests over the public simulation API

use blast_arena::sim::{
    Arena, Cell, Coord, Direction, GameEvent, Powerup, PowerupKind, blast_footprint, spawn_zone,
};
use blast_arena::{ArenaConfig, grid_to_world, world_to_grid};
use proptest::prelude::*;

fn arb_tile_size() -> impl Strategy<Value = f32> {
    prop::sample::select(vec![8.0f32, 16.0, 24.0, 32.0, 48.0, 64.0])
}

fn quiet_config() -> ArenaConfig {
    ArenaConfig {
        powerup_drop_chance: 0.0,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn prop_tile_center_maps_back_to_tile(
        x in -200i32..200,
        y in -200i32..200,
        tile_size in arb_tile_size(),
    ) {
        let pos = Coord::new(x, y);
        prop_assert_eq!(world_to_grid(grid_to_world(pos, tile_size), tile_size), pos);
    }
}

proptest! {
    #[test]
    fn prop_generation_is_seed_deterministic(seed in any::<u64>()) {
        let a = Arena::new(ArenaConfig::default(), seed).expect("valid config");
        let b = Arena::new(ArenaConfig::default(), seed).expect("valid config");
        let (w, h) = (a.grid().width(), a.grid().height());
        for y in 0..h {
            for x in 0..w {
                let pos = Coord::new(x, y);
                prop_assert_eq!(a.grid().get_cell(pos), b.grid().get_cell(pos));
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_generated_arena_keeps_border_and_spawns(seed in any::<u64>()) {
        let config = ArenaConfig::default();
        let arena = Arena::new(config.clone(), seed).expect("valid config");
        let grid = arena.grid();
        let (w, h) = (config.width, config.height);
        for x in 0..w {
            prop_assert_eq!(grid.get_cell(Coord::new(x, 0)), Cell::HardBlock);
            prop_assert_eq!(grid.get_cell(Coord::new(x, h - 1)), Cell::HardBlock);
        }
        for y in 0..h {
            prop_assert_eq!(grid.get_cell(Coord::new(0, y)), Cell::HardBlock);
            prop_assert_eq!(grid.get_cell(Coord::new(w - 1, y)), Cell::HardBlock);
        }
        for i in 0..config.player_count {
            for pos in spawn_zone(i, w, h) {
                prop_assert_eq!(grid.get_cell(pos), Cell::Empty);
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_footprint_never_passes_hard_block(
        seed in any::<u64>(),
        cx in 1i32..14,
        cy in 1i32..12,
        range in 1u32..8,
    ) {
        let arena = Arena::new(ArenaConfig::default(), seed).expect("valid config");
        let grid = arena.grid();
        let center = Coord::new(cx, cy);
        let footprint = blast_footprint(grid, center, range);

        for dir in Direction::ALL {
            let first_hard = (1..=range as i32)
                .find(|&i| grid.get_cell(center.offset(dir, i)) == Cell::HardBlock);
            if let Some(stop) = first_hard {
                for i in stop..=range as i32 {
                    prop_assert!(!footprint.contains(&center.offset(dir, i)));
                }
            }
        }
        for pos in &footprint[1..] {
            prop_assert_ne!(grid.get_cell(*pos), Cell::HardBlock);
        }
    }
}

proptest! {
    #[test]
    fn prop_explosion_fires_once(seed in any::<u64>(), repeats in 1usize..5) {
        let mut arena = Arena::new(quiet_config(), seed).expect("valid config");
        let pos = arena.players()[0].position;
        let id = arena.place_bomb(pos, 2, 0).expect("spawn cell is free");
        arena.drain_events();

        prop_assert!(arena.trigger_explosion(id));
        let first = arena.drain_events();
        let exploded = first
            .iter()
            .filter(|e| matches!(e, GameEvent::BombExploded { .. }))
            .count();
        prop_assert_eq!(exploded, 1);

        for _ in 0..repeats {
            prop_assert!(!arena.trigger_explosion(id));
            prop_assert!(arena.drain_events().is_empty());
        }
        prop_assert!(arena.bomb(id).is_none());
        prop_assert_ne!(arena.grid().get_cell(pos), Cell::Bomb);
    }
}

proptest! {
    #[test]
    fn prop_powerup_leaves_play_exactly_once(ops in prop::collection::vec(0u8..3, 1..12)) {
        let mut powerup = Powerup::new(1, Coord::new(3, 3), PowerupKind::Kick, 0.0);
        let mut wins = 0;
        for op in ops {
            let won = match op {
                0 => powerup.collect(),
                1 => powerup.destroy(),
                _ => powerup.force_destroy(),
            };
            if won {
                wins += 1;
            }
        }
        prop_assert_eq!(wins, 1);
        prop_assert!(!(powerup.collected && powerup.destroyed));
    }
}

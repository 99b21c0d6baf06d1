//! Axis-separated collision resolution shared by every agent.

use forbidden_rules_core::{PixelDelta, PixelRect};

use crate::TileMap;

/// Moves the rectangle by `delta`, resolving each axis against the walls independently.
///
/// The horizontal component is applied first and dropped if it would overlap
/// a wall, then the vertical component gets the same treatment. A blocked axis
/// therefore never cancels movement along the other one, which lets agents
/// slide along walls.
pub fn slide(rect: &mut PixelRect, delta: PixelDelta, map: &TileMap) {
    if delta.is_zero() {
        return;
    }

    if delta.dx != 0 {
        let moved = rect.translated(PixelDelta::new(delta.dx, 0));
        if !map.is_wall_rect(&moved) {
            *rect = moved;
        }
    }

    if delta.dy != 0 {
        let moved = rect.translated(PixelDelta::new(0, delta.dy));
        if !map.is_wall_rect(&moved) {
            *rect = moved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn room() -> TileMap {
        TileMap::parse(
            32,
            &[
                "######", //
                "#S...#", //
                "#.#..#", //
                "#...E#", //
                "######",
            ],
        )
        .expect("valid layout")
    }

    #[test]
    fn free_move_applies_both_axes() {
        let map = room();
        let mut rect = PixelRect::new(100, 40, 30, 30);
        slide(&mut rect, PixelDelta::new(2, 2), &map);
        assert_eq!(rect, PixelRect::new(102, 42, 30, 30));
    }

    #[test]
    fn blocked_axis_still_slides_along_free_axis() {
        let map = room();
        let mut rect = PixelRect::new(33, 40, 30, 30);
        slide(&mut rect, PixelDelta::new(-2, 2), &map);
        assert_eq!(rect, PixelRect::new(33, 42, 30, 30));

        let mut rect = PixelRect::new(100, 33, 30, 30);
        slide(&mut rect, PixelDelta::new(3, -2), &map);
        assert_eq!(rect, PixelRect::new(103, 33, 30, 30));
    }

    #[test]
    fn move_into_wall_reverts_completely() {
        let map = room();
        let mut rect = PixelRect::new(33, 33, 30, 30);
        slide(&mut rect, PixelDelta::new(-2, -2), &map);
        assert_eq!(rect, PixelRect::new(33, 33, 30, 30));
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let map = room();
        let mut rect = PixelRect::new(100, 40, 30, 30);
        slide(&mut rect, PixelDelta::ZERO, &map);
        assert_eq!(rect, PixelRect::new(100, 40, 30, 30));
    }

    #[test]
    fn random_walks_never_enter_walls() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for seed in 0..8 {
            let mut level_rng = ChaCha8Rng::seed_from_u64(seed);
            let map = TileMap::generate(&crate::LevelConfig::default(), &mut level_rng)
                .expect("default level is valid");
            let start = map.tile_rect(map.start());
            let mut rect = PixelRect::new(start.x + 1, start.y + 1, 30, 30);
            assert!(!map.is_wall_rect(&rect));

            for _ in 0..2_000 {
                let delta = PixelDelta::new(rng.gen_range(-40..=40), rng.gen_range(-40..=40));
                slide(&mut rect, delta, &map);
                assert!(
                    !map.is_wall_rect(&rect),
                    "rect {rect:?} entered a wall after {delta:?}"
                );
            }
        }
    }
}

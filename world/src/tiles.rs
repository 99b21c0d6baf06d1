//! Tile matrix, level generation, and the static queries agents collide against.

use forbidden_rules_core::{
    PixelPoint, PixelRect, TileCoord, TileKind, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_TILE_SIZE,
    ITEM_COLLISION_INSET,
};
use rand::Rng;
use thiserror::Error;

/// Largest supported edge of a level, in tiles.
const MAX_EDGE: u32 = 4096;

/// Parameters controlling procedural level generation.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    /// Number of tile columns, including the wall border.
    pub columns: u32,
    /// Number of tile rows, including the wall border.
    pub rows: u32,
    /// Edge length of a tile in pixels.
    pub tile_size: i32,
    /// Tile the player spawns on.
    pub start: TileCoord,
    /// Tile that wins the run.
    pub exit: TileCoord,
    /// Probability that an interior tile becomes a hazard.
    pub hazard_chance: f64,
    /// Upper bound of the roll band that places an item; rolls in
    /// `hazard_chance..item_chance` produce an item.
    pub item_chance: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            tile_size: DEFAULT_TILE_SIZE,
            start: TileCoord::new(2, 2),
            exit: TileCoord::new(DEFAULT_COLUMNS as i32 - 2, 2),
            hazard_chance: 0.08,
            item_chance: 0.13,
        }
    }
}

/// Reasons a level could not be built.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The level cannot hold a wall border around a walkable interior.
    #[error("level must be at least 3x3 tiles, got {columns}x{rows}")]
    TooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The level exceeds the supported dimensions.
    #[error("level of {columns}x{rows} tiles exceeds the supported size")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Tiles must span at least one pixel.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
    /// A designated tile lies on the border or outside the grid.
    #[error("tile ({}, {}) is not inside the walled interior", .0.column(), .0.row())]
    OutsideInterior(TileCoord),
    /// Start and exit were placed on the same tile.
    #[error("start and exit must be distinct tiles")]
    StartIsExit,
    /// An ASCII layout contained no rows.
    #[error("level layout is empty")]
    Empty,
    /// An ASCII layout row differs in width from the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// An ASCII layout contained a character with no tile meaning.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column index.
        column: usize,
        /// Zero-based row index.
        row: usize,
    },
    /// The outer ring of an ASCII layout contains a non-wall tile.
    #[error("border tile ({}, {}) is not a wall", .0.column(), .0.row())]
    OpenBorder(TileCoord),
    /// An ASCII layout must mark exactly one start and one exit.
    #[error("level needs exactly one {glyph:?} tile, found {count}")]
    MarkerCount {
        /// Marker glyph.
        glyph: char,
        /// Number of occurrences found.
        count: usize,
    },
}

/// Closed arena of typed tiles plus the collectibles still lying on it.
///
/// The outer ring is always [`TileKind::Wall`], the start and exit tiles are
/// never walls or hazards, and the tile matrix is immutable once built. Only
/// the item list changes during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: i32,
    tiles: Vec<TileKind>,
    start: TileCoord,
    exit: TileCoord,
    items: Vec<TileCoord>,
    initial_items: Vec<TileCoord>,
}

impl TileMap {
    /// Generates a level by rolling every interior tile against the configured bands.
    ///
    /// Rolls are drawn in row-major order, so the same generator state always
    /// yields the same level.
    pub fn generate<R>(config: &LevelConfig, rng: &mut R) -> Result<Self, MapError>
    where
        R: Rng + ?Sized,
    {
        let mut map = Self::walled(config.columns, config.rows, config.tile_size)?;
        map.designate(config.start, config.exit)?;

        for row in 1..map.row_count() - 1 {
            for column in 1..map.column_count() - 1 {
                let tile = TileCoord::new(column, row);
                if tile == config.start || tile == config.exit {
                    continue;
                }

                let roll: f64 = rng.gen();
                if roll < config.hazard_chance {
                    map.set(tile, TileKind::Hazard);
                } else if roll < config.item_chance {
                    map.set(tile, TileKind::Item);
                }
            }
        }

        map.set(config.exit, TileKind::Exit);
        map.clear_hazards_around(config.start);
        map.clear_hazards_around(config.exit);
        map.capture_items();
        Ok(map)
    }

    /// Builds a level from an ASCII layout.
    ///
    /// `#` is a wall, `.` floor, `o` an item, `~` a hazard, `E` the exit and
    /// `S` the floor tile the player starts on.
    pub fn parse(tile_size: i32, layout: &[&str]) -> Result<Self, MapError> {
        let Some(first) = layout.first() else {
            return Err(MapError::Empty);
        };
        let width = first.chars().count();
        let columns = u32::try_from(width).unwrap_or(u32::MAX);
        let rows = u32::try_from(layout.len()).unwrap_or(u32::MAX);
        let mut map = Self::walled(columns, rows, tile_size)?;

        let mut starts = Vec::new();
        let mut exits = Vec::new();
        for (row_index, line) in layout.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found,
                });
            }

            for (column_index, glyph) in line.chars().enumerate() {
                let tile = TileCoord::new(column_index as i32, row_index as i32);
                let kind = match glyph {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Floor,
                    'o' => TileKind::Item,
                    '~' => TileKind::Hazard,
                    'E' => {
                        exits.push(tile);
                        TileKind::Exit
                    }
                    'S' => {
                        starts.push(tile);
                        TileKind::Floor
                    }
                    _ => {
                        return Err(MapError::UnknownGlyph {
                            glyph,
                            column: column_index,
                            row: row_index,
                        })
                    }
                };
                map.set(tile, kind);
            }
        }

        if let Some(open) = map.border().find(|tile| map.kind_at(*tile) != Some(TileKind::Wall)) {
            return Err(MapError::OpenBorder(open));
        }

        let start = single_marker('S', &starts)?;
        let exit = single_marker('E', &exits)?;
        map.designate(start, exit)?;
        map.capture_items();
        Ok(map)
    }

    fn walled(columns: u32, rows: u32, tile_size: i32) -> Result<Self, MapError> {
        if columns < 3 || rows < 3 {
            return Err(MapError::TooSmall { columns, rows });
        }
        if columns > MAX_EDGE || rows > MAX_EDGE {
            return Err(MapError::TooLarge { columns, rows });
        }
        if tile_size <= 0 {
            return Err(MapError::InvalidTileSize(tile_size));
        }

        let cell_count = columns as usize * rows as usize;
        let mut map = Self {
            columns,
            rows,
            tile_size,
            tiles: vec![TileKind::Floor; cell_count],
            start: TileCoord::new(1, 1),
            exit: TileCoord::new(1, 1),
            items: Vec::new(),
            initial_items: Vec::new(),
        };
        let border: Vec<TileCoord> = map.border().collect();
        for tile in border {
            map.set(tile, TileKind::Wall);
        }
        Ok(map)
    }

    fn designate(&mut self, start: TileCoord, exit: TileCoord) -> Result<(), MapError> {
        for tile in [start, exit] {
            if !self.is_interior(tile) {
                return Err(MapError::OutsideInterior(tile));
            }
        }
        if start == exit {
            return Err(MapError::StartIsExit);
        }

        self.start = start;
        self.exit = exit;
        Ok(())
    }

    fn clear_hazards_around(&mut self, center: TileCoord) {
        for row in center.row() - 1..=center.row() + 1 {
            for column in center.column() - 1..=center.column() + 1 {
                let tile = TileCoord::new(column, row);
                if self.kind_at(tile) == Some(TileKind::Hazard) {
                    self.set(tile, TileKind::Floor);
                }
            }
        }
    }

    fn capture_items(&mut self) {
        self.initial_items = self
            .iter()
            .filter(|(_, kind)| *kind == TileKind::Item)
            .map(|(tile, _)| tile)
            .collect();
        self.items.clone_from(&self.initial_items);
    }

    fn set(&mut self, tile: TileCoord, kind: TileKind) {
        if let Some(slot) = self.index_of(tile).and_then(|index| self.tiles.get_mut(index)) {
            *slot = kind;
        }
    }

    fn border(&self) -> impl Iterator<Item = TileCoord> {
        let last_column = self.column_count() - 1;
        let last_row = self.row_count() - 1;
        (0..self.row_count()).flat_map(move |row| {
            (0..=last_column)
                .filter(move |column| {
                    row == 0 || row == last_row || *column == 0 || *column == last_column
                })
                .map(move |column| TileCoord::new(column, row))
        })
    }

    fn is_interior(&self, tile: TileCoord) -> bool {
        tile.column() > 0
            && tile.row() > 0
            && tile.column() < self.column_count() - 1
            && tile.row() < self.row_count() - 1
    }

    fn column_count(&self) -> i32 {
        self.columns as i32
    }

    fn row_count(&self) -> i32 {
        self.rows as i32
    }

    /// Dense row-major offset of the tile, if it lies within the matrix.
    pub(crate) fn index_of(&self, tile: TileCoord) -> Option<usize> {
        let column = u32::try_from(tile.column()).ok()?;
        let row = u32::try_from(tile.row()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Number of tiles stored in the matrix.
    pub(crate) fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of tile columns, border included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows, border included.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Tile the player spawns on.
    #[must_use]
    pub const fn start(&self) -> TileCoord {
        self.start
    }

    /// Tile that wins the run.
    #[must_use]
    pub const fn exit(&self) -> TileCoord {
        self.exit
    }

    /// Items still waiting to be collected, in generation (row-major) order.
    #[must_use]
    pub fn items(&self) -> &[TileCoord] {
        &self.items
    }

    /// Items present when the level was built.
    #[must_use]
    pub fn initial_items(&self) -> &[TileCoord] {
        &self.initial_items
    }

    /// Type of the tile at the provided coordinate, if it lies within the matrix.
    #[must_use]
    pub fn kind_at(&self, tile: TileCoord) -> Option<TileKind> {
        self.index_of(tile).and_then(|index| self.tiles.get(index).copied())
    }

    /// Iterates over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileKind)> + '_ {
        let width = self.columns as usize;
        self.tiles.iter().enumerate().map(move |(index, kind)| {
            let tile = TileCoord::new((index % width) as i32, (index / width) as i32);
            (tile, *kind)
        })
    }

    /// Tile containing the pixel. Performs no bounds check.
    #[must_use]
    pub const fn tile_of(&self, point: PixelPoint) -> TileCoord {
        TileCoord::new(
            point.x.div_euclid(self.tile_size),
            point.y.div_euclid(self.tile_size),
        )
    }

    /// Pixel center of the tile.
    #[must_use]
    pub const fn center_of(&self, tile: TileCoord) -> PixelPoint {
        PixelPoint::new(
            tile.column() * self.tile_size + self.tile_size / 2,
            tile.row() * self.tile_size + self.tile_size / 2,
        )
    }

    /// Pixel bounding box of the tile.
    #[must_use]
    pub const fn tile_rect(&self, tile: TileCoord) -> PixelRect {
        PixelRect::new(
            tile.column() * self.tile_size,
            tile.row() * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Reports whether the rectangle overlaps any wall tile.
    ///
    /// Only the tiles covered by the rectangle are inspected; tiles outside
    /// the matrix never count as walls.
    #[must_use]
    pub fn is_wall_rect(&self, rect: &PixelRect) -> bool {
        if rect.is_empty() {
            return false;
        }

        let first = self.tile_of(rect.origin());
        let last = self.tile_of(PixelPoint::new(
            rect.x + rect.width - 1,
            rect.y + rect.height - 1,
        ));
        let columns = first.column().max(0)..=last.column().min(self.column_count() - 1);
        let rows = first.row().max(0)..=last.row().min(self.row_count() - 1);

        rows.into_iter().any(|row| {
            columns
                .clone()
                .any(|column| self.kind_at(TileCoord::new(column, row)) == Some(TileKind::Wall))
        })
    }

    /// Type of the tile under the rectangle's center; outside the matrix reads as a wall.
    #[must_use]
    pub fn tile_kind_at_center(&self, rect: &PixelRect) -> TileKind {
        self.kind_at(self.tile_of(rect.center())).unwrap_or(TileKind::Wall)
    }

    /// Reports whether the rectangle's center stands on a hazard.
    #[must_use]
    pub fn is_hazard(&self, rect: &PixelRect) -> bool {
        self.tile_kind_at_center(rect) == TileKind::Hazard
    }

    /// Reports whether the rectangle overlaps the exit tile.
    #[must_use]
    pub fn touches_exit(&self, rect: &PixelRect) -> bool {
        rect.intersects(&self.tile_rect(self.exit))
    }

    /// Removes the first remaining item whose inset box the rectangle overlaps.
    ///
    /// At most one item is collected per call.
    pub fn try_pickup(&mut self, rect: &PixelRect) -> Option<TileCoord> {
        let position = self
            .items
            .iter()
            .position(|item| rect.intersects(&self.item_rect(*item)))?;
        Some(self.items.remove(position))
    }

    /// Restores every item present when the level was built.
    pub fn reset_items(&mut self) {
        self.items.clone_from(&self.initial_items);
    }

    /// Reports whether the pursuer may path through the tile.
    ///
    /// Only walls and out-of-bounds coordinates are impassable.
    #[must_use]
    pub fn is_passable(&self, tile: TileCoord) -> bool {
        self.kind_at(tile).is_some_and(|kind| kind != TileKind::Wall)
    }

    fn item_rect(&self, item: TileCoord) -> PixelRect {
        let tile = self.tile_rect(item);
        PixelRect::new(
            tile.x + ITEM_COLLISION_INSET,
            tile.y + ITEM_COLLISION_INSET,
            tile.width - 2 * ITEM_COLLISION_INSET,
            tile.height - 2 * ITEM_COLLISION_INSET,
        )
    }
}

fn single_marker(glyph: char, found: &[TileCoord]) -> Result<TileCoord, MapError> {
    match found {
        [tile] => Ok(*tile),
        _ => Err(MapError::MarkerCount {
            glyph,
            count: found.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forbidden_rules_core::PixelDelta;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generated(seed: u64) -> TileMap {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        TileMap::generate(&LevelConfig::default(), &mut rng).expect("default level is valid")
    }

    fn corridor() -> TileMap {
        TileMap::parse(
            32,
            &[
                "#######", //
                "#S.o.E#", //
                "#.~...#", //
                "#######",
            ],
        )
        .expect("valid layout")
    }

    #[test]
    fn generation_keeps_border_walled() {
        for seed in 0..16 {
            let map = generated(seed);
            assert!(map
                .border()
                .all(|tile| map.kind_at(tile) == Some(TileKind::Wall)));
            let walls = map
                .iter()
                .filter(|(_, kind)| *kind == TileKind::Wall)
                .count();
            assert_eq!(walls, 2 * 20 + 2 * 13);
        }
    }

    #[test]
    fn generation_clears_hazards_around_start_and_exit() {
        for seed in 0..32 {
            let map = generated(seed);
            assert_eq!(map.kind_at(map.start()), Some(TileKind::Floor));
            assert_eq!(map.kind_at(map.exit()), Some(TileKind::Exit));
            for center in [map.start(), map.exit()] {
                for row in center.row() - 1..=center.row() + 1 {
                    for column in center.column() - 1..=center.column() + 1 {
                        assert_ne!(
                            map.kind_at(TileCoord::new(column, row)),
                            Some(TileKind::Hazard),
                            "seed {seed} left a hazard next to {center:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        assert_eq!(generated(7), generated(7));
    }

    #[test]
    fn generation_records_items_in_row_major_order() {
        let map = generated(3);
        let expected: Vec<TileCoord> = map
            .iter()
            .filter(|(_, kind)| *kind == TileKind::Item)
            .map(|(tile, _)| tile)
            .collect();
        assert_eq!(map.initial_items(), expected.as_slice());
        assert_eq!(map.items(), map.initial_items());
        let mut sorted = expected.clone();
        sorted.sort_by_key(|tile| (tile.row(), tile.column()));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn generation_rejects_start_on_border() {
        let config = LevelConfig {
            start: TileCoord::new(0, 2),
            ..LevelConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            TileMap::generate(&config, &mut rng),
            Err(MapError::OutsideInterior(TileCoord::new(0, 2)))
        );
    }

    #[test]
    fn tile_of_floors_negative_pixels() {
        let map = corridor();
        assert_eq!(map.tile_of(PixelPoint::new(31, 32)), TileCoord::new(0, 1));
        assert_eq!(map.tile_of(PixelPoint::new(-1, -33)), TileCoord::new(-1, -2));
    }

    #[test]
    fn center_of_is_mid_tile() {
        let map = corridor();
        assert_eq!(map.center_of(TileCoord::new(2, 1)), PixelPoint::new(80, 48));
    }

    #[test]
    fn wall_rect_detects_overlap_only() {
        let map = corridor();
        let inside = PixelRect::new(33, 33, 30, 30);
        assert!(!map.is_wall_rect(&inside));
        assert!(map.is_wall_rect(&inside.translated(PixelDelta::new(0, -2))));
        let flush = PixelRect::new(32, 32, 32, 32);
        assert!(!map.is_wall_rect(&flush));
        let far_outside = PixelRect::new(-500, -500, 10, 10);
        assert!(!map.is_wall_rect(&far_outside));
    }

    #[test]
    fn center_lookup_outside_matrix_reads_as_wall() {
        let map = corridor();
        assert_eq!(
            map.tile_kind_at_center(&PixelRect::new(-100, 40, 30, 30)),
            TileKind::Wall
        );
        assert!(map.is_hazard(&PixelRect::new(66, 66, 30, 30)));
        assert!(!map.is_hazard(&PixelRect::new(40, 66, 30, 30)));
    }

    #[test]
    fn touches_exit_uses_rectangle_overlap() {
        let map = corridor();
        assert!(map.touches_exit(&PixelRect::new(131, 33, 30, 30)));
        assert!(!map.touches_exit(&PixelRect::new(130, 33, 30, 30)));
    }

    #[test]
    fn pickup_removes_item_once() {
        let mut map = corridor();
        let hitbox = PixelRect::new(97, 33, 30, 30);
        assert_eq!(map.try_pickup(&hitbox), Some(TileCoord::new(3, 1)));
        assert_eq!(map.try_pickup(&hitbox), None);
        assert!(map.items().is_empty());
        assert_eq!(map.kind_at(TileCoord::new(3, 1)), Some(TileKind::Item));
    }

    #[test]
    fn pickup_ignores_inset_margin() {
        let mut map = corridor();
        let grazing = PixelRect::new(96 - 30 + 2, 33, 30, 30);
        assert_eq!(map.try_pickup(&grazing), None);
        let overlapping = grazing.translated(PixelDelta::new(1, 0));
        assert_eq!(map.try_pickup(&overlapping), Some(TileCoord::new(3, 1)));
    }

    #[test]
    fn reset_items_restores_snapshot() {
        let mut map = generated(11);
        let before: Vec<TileCoord> = map.items().to_vec();
        for item in before.iter().take(3) {
            let rect = map.tile_rect(*item);
            assert!(map.try_pickup(&rect).is_some());
        }
        map.reset_items();
        let mut restored = map.items().to_vec();
        let mut expected = before;
        restored.sort();
        expected.sort();
        assert_eq!(restored, expected);
    }

    #[test]
    fn passability_blocks_walls_and_bounds_only() {
        let map = corridor();
        assert!(!map.is_passable(TileCoord::new(0, 0)));
        assert!(!map.is_passable(TileCoord::new(-1, 1)));
        assert!(!map.is_passable(TileCoord::new(7, 1)));
        assert!(map.is_passable(TileCoord::new(2, 2)));
        assert!(map.is_passable(TileCoord::new(3, 1)));
        assert!(map.is_passable(TileCoord::new(5, 1)));
    }

    #[test]
    fn parse_rejects_malformed_layouts() {
        assert_eq!(TileMap::parse(32, &[]), Err(MapError::Empty));
        assert_eq!(
            TileMap::parse(32, &["####", "#SE", "####"]),
            Err(MapError::RaggedRow {
                row: 1,
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            TileMap::parse(32, &["#####", "#S?E#", "#####"]),
            Err(MapError::UnknownGlyph {
                glyph: '?',
                column: 2,
                row: 1
            })
        );
        assert_eq!(
            TileMap::parse(32, &["#####", "#S.E.", "#####"]),
            Err(MapError::OpenBorder(TileCoord::new(4, 1)))
        );
        assert_eq!(
            TileMap::parse(32, &["#####", "#S..#", "#####"]),
            Err(MapError::MarkerCount { glyph: 'E', count: 0 })
        );
    }
}

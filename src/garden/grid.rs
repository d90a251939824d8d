//! Tile permission/occupancy grid.
//!
//! Tiles live in one row-major `Vec` (`index = y * width + x`). World space is
//! centred on the grid: world `(0, 0)` is the middle tile, and a world
//! coordinate maps to a column/row via `round(coord + dim / 2)`.

use bevy::prelude::*;

use super::unit::GrowthUnit;
use crate::shared::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    pub croppable: bool,
    pub animals: bool,
    pub occupant: Option<GrowthUnit>,
}

impl Tile {
    fn from_permission(permission: TilePermission) -> Self {
        Self {
            croppable: permission.croppable,
            animals: permission.animals,
            occupant: None,
        }
    }

    pub fn permission(&self) -> TilePermission {
        TilePermission {
            croppable: self.croppable,
            animals: self.animals,
        }
    }

    pub fn allows(&self, category: UnitCategory) -> bool {
        match category {
            UnitCategory::Crop => self.croppable,
            UnitCategory::Animal => self.animals,
        }
    }
}

/// "No tile here". Returned by `permission_at` outside the grid and told
/// apart from real tiles by address, never by value.
static NO_TILE: Tile = Tile {
    croppable: false,
    animals: false,
    occupant: None,
};

#[derive(Resource, Debug, Default)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Self::default();
        grid.configure(width, height);
        grid
    }

    /// Build a grid from a layout, carving its regions in order.
    pub fn from_layout(layout: &GardenLayout) -> Result<Self, GardenError> {
        let mut grid = Self::new(layout.width, layout.height);
        for region in &layout.regions {
            grid.fill_region(region.permission, region.x, region.y, region.width, region.height)?;
        }
        Ok(grid)
    }

    /// Reallocate as `width x height` tiles with no permissions and no occupants.
    pub fn configure(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.tiles = vec![Tile::default(); width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> GardenError {
        GardenError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GardenError> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Result<&Tile, GardenError> {
        let index = self.index(x, y)?;
        Ok(&self.tiles[index])
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Result<&mut Tile, GardenError> {
        let index = self.index(x, y)?;
        Ok(&mut self.tiles[index])
    }

    /// Overwrite the `w x h` rectangle at `(x, y)` with `permission`, clearing
    /// occupants. The rectangle is checked as a whole before anything is written.
    pub fn fill_region(
        &mut self,
        permission: TilePermission,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Result<(), GardenError> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        // Both corners inside means every cell is.
        self.index(x, y)?;
        self.index(x + w - 1, y + h - 1)?;

        for row in y..y + h {
            for col in x..x + w {
                let index = self.index(col, row)?;
                self.tiles[index] = Tile::from_permission(permission);
            }
        }
        Ok(())
    }

    /// Column/row for a world position, or `None` when it falls off the grid.
    /// Halfway cases round away from zero (`f32::round`).
    pub fn resolve_world_position(&self, world_x: f32, world_z: f32) -> Option<(i32, i32)> {
        if !world_x.is_finite() || !world_z.is_finite() {
            return None;
        }
        let x = (world_x + self.width as f32 / 2.0).round();
        let y = (world_z + self.height as f32 / 2.0).round();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as i32, y as i32))
    }

    /// The tile under a world position, or the shared sentinel off-grid.
    pub fn permission_at(&self, world_x: f32, world_z: f32) -> &Tile {
        match self.resolve_world_position(world_x, world_z) {
            Some((x, y)) => self.tile_at(x, y).unwrap_or(&NO_TILE),
            None => &NO_TILE,
        }
    }

    pub fn sentinel() -> &'static Tile {
        &NO_TILE
    }

    pub fn is_sentinel(tile: &Tile) -> bool {
        std::ptr::eq(tile, &NO_TILE)
    }

    pub fn is_placeable(&self, item: ItemType, world_pos: Vec3) -> bool {
        let tile = self.permission_at(world_pos.x, world_pos.z);
        !Self::is_sentinel(tile) && tile.occupant.is_none() && tile.allows(item.category())
    }

    /// True if the tile under `world_pos` accepts either category.
    pub fn is_any_placeable(&self, world_pos: Vec3) -> bool {
        let tile = self.permission_at(world_pos.x, world_pos.z);
        tile.croppable || tile.animals
    }

    /// Put a new unit on the tile under `world_pos`.
    ///
    /// Consumes the tile's flag for the unit's category, so a crop tile that
    /// also allows animals stays open for one animal. The category flag itself
    /// is not checked here; gate with `is_placeable` first.
    pub fn place_unit(
        &mut self,
        item: ItemType,
        world_pos: Vec3,
        facing: f32,
    ) -> Result<&mut GrowthUnit, GardenError> {
        let Some((x, y)) = self.resolve_world_position(world_pos.x, world_pos.z) else {
            return Err(self.out_of_bounds(
                (world_pos.x + self.width as f32 / 2.0).round() as i32,
                (world_pos.z + self.height as f32 / 2.0).round() as i32,
            ));
        };
        let tile = self.tile_at_mut(x, y)?;
        if tile.occupant.is_some() {
            return Err(GardenError::TileOccupied { x, y });
        }
        match item.category() {
            UnitCategory::Animal => tile.animals = false,
            UnitCategory::Crop => tile.croppable = false,
        }
        Ok(tile.occupant.insert(GrowthUnit::new(item, world_pos, facing)))
    }

    /// Vacate a tile. Permission flags stay as they are.
    pub fn remove_unit(&mut self, x: i32, y: i32) -> Result<Option<GrowthUnit>, GardenError> {
        Ok(self.tile_at_mut(x, y)?.occupant.take())
    }

    /// Day tick: advance every occupant. Returns how many changed stage.
    pub fn advance_day(&mut self) -> usize {
        self.tiles
            .iter_mut()
            .filter_map(|tile| tile.occupant.as_mut())
            .map(GrowthUnit::advance)
            .filter(|changed| *changed)
            .count()
    }

    /// Frame tick for continuous occupant state (idle animations).
    pub fn update(&mut self, dt: f32) {
        for unit in self.tiles.iter_mut().filter_map(|tile| tile.occupant.as_mut()) {
            unit.update(dt);
        }
    }

    /// Occupied tiles as `(x, y, unit)`.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, &GrowthUnit)> {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().filter_map(move |(i, tile)| {
            tile.occupant
                .as_ref()
                .map(|unit| ((i % width) as i32, (i / width) as i32, unit))
        })
    }

    pub fn occupied_mut(&mut self) -> impl Iterator<Item = (i32, i32, &mut GrowthUnit)> {
        let width = self.width.max(1);
        self.tiles.iter_mut().enumerate().filter_map(move |(i, tile)| {
            tile.occupant
                .as_mut()
                .map(|unit| ((i % width) as i32, (i / width) as i32, unit))
        })
    }

    /// World-space centre of tile `(x, y)` at ground level.
    pub fn tile_center(&self, x: i32, y: i32) -> Vec3 {
        Vec3::new(
            x as f32 * TILE_SIZE - self.width as f32 / 2.0,
            0.0,
            y as f32 * TILE_SIZE - self.height as f32 / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    #[test]
    fn test_configure_starts_empty() {
        let grid = TileGrid::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                let tile = grid.tile_at(x, y).unwrap();
                assert_eq!(tile, &Tile::default());
            }
        }
    }

    #[test]
    fn test_tile_at_returns_same_tile_every_time() {
        let grid = TileGrid::new(5, 5);
        for (x, y) in [(0, 0), (4, 4), (2, 3)] {
            let a = grid.tile_at(x, y).unwrap();
            let b = grid.tile_at(x, y).unwrap();
            assert!(std::ptr::eq(a, b));
        }
    }

    #[test]
    fn test_tile_at_out_of_bounds() {
        let grid = TileGrid::new(5, 4);
        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 4), (100, 100)] {
            assert_eq!(
                grid.tile_at(x, y),
                Err(GardenError::OutOfBounds { x, y, width: 5, height: 4 })
            );
        }
    }

    #[test]
    fn test_tile_at_mut_flips_flags() {
        let mut grid = TileGrid::new(3, 3);
        grid.tile_at_mut(1, 2).unwrap().animals = true;
        assert!(grid.tile_at(1, 2).unwrap().animals);
        assert!(!grid.tile_at(2, 1).unwrap().animals);
    }

    #[test]
    fn test_overlapping_fill_last_write_wins() {
        let mut grid = TileGrid::new(6, 6);
        grid.fill_region(TilePermission::CROPS, 0, 0, 4, 4).unwrap();
        grid.fill_region(TilePermission::ANIMALS, 2, 2, 4, 4).unwrap();

        assert_eq!(grid.tile_at(1, 1).unwrap().permission(), TilePermission::CROPS);
        assert_eq!(grid.tile_at(3, 3).unwrap().permission(), TilePermission::ANIMALS);
        assert_eq!(grid.tile_at(5, 5).unwrap().permission(), TilePermission::ANIMALS);
        assert_eq!(grid.tile_at(5, 0).unwrap().permission(), TilePermission::default());
    }

    #[test]
    fn test_fill_region_rejects_overhang_without_writing() {
        let mut grid = TileGrid::new(5, 5);
        let err = grid.fill_region(TilePermission::CROPS, 3, 0, 3, 1).unwrap_err();
        assert!(matches!(err, GardenError::OutOfBounds { x: 5, y: 0, .. }));
        assert!(!grid.tile_at(3, 0).unwrap().croppable, "nothing written on failure");

        assert!(grid.fill_region(TilePermission::CROPS, -1, 0, 2, 2).is_err());
        // Exactly touching the far edge is fine.
        grid.fill_region(TilePermission::CROPS, 3, 3, 2, 2).unwrap();
        assert!(grid.tile_at(4, 4).unwrap().croppable);
    }

    #[test]
    fn test_fill_region_clears_occupants() {
        let mut grid = TileGrid::new(5, 5);
        grid.fill_region(TilePermission::CROPS, 0, 0, 5, 5).unwrap();
        grid.place_unit(ItemType::Corn, world(0.0, 0.0), 0.0).unwrap();
        assert_eq!(grid.occupied().count(), 1);

        grid.fill_region(TilePermission::MIXED, 0, 0, 5, 5).unwrap();
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_from_layout_default_zones() {
        let grid = TileGrid::from_layout(&GardenLayout::default()).unwrap();
        assert_eq!((grid.width(), grid.height()), (28, 24));
        assert_eq!(grid.tile_at(0, 0).unwrap().permission(), TilePermission::CROPS);
        assert_eq!(grid.tile_at(23, 5).unwrap().permission(), TilePermission::ANIMALS);
        assert_eq!(grid.tile_at(27, 23).unwrap().permission(), TilePermission::MIXED);
        assert_eq!(grid.tile_at(15, 2).unwrap().permission(), TilePermission::default());
    }

    #[test]
    fn test_resolve_world_position_centres_grid() {
        let grid = TileGrid::new(10, 10);
        assert_eq!(grid.resolve_world_position(0.0, 0.0), Some((5, 5)));
        assert_eq!(grid.resolve_world_position(-5.0, -5.0), Some((0, 0)));
        assert_eq!(grid.resolve_world_position(4.2, -0.7), Some((9, 4)));
        assert_eq!(grid.resolve_world_position(5.0, 0.0), None);
        assert_eq!(grid.resolve_world_position(0.0, -6.0), None);
    }

    #[test]
    fn test_half_integer_rounds_away_from_zero() {
        let grid = TileGrid::new(10, 10);
        // -5.5 + 5 = -0.5 rounds to -1: off the grid.
        assert_eq!(grid.resolve_world_position(-5.5, 0.0), None);
        // 3.5 + 5 = 8.5 rounds to 9.
        assert_eq!(grid.resolve_world_position(3.5, 0.0), Some((9, 5)));
        // 4.5 + 5 = 9.5 rounds to 10: off the grid.
        assert_eq!(grid.resolve_world_position(4.5, 0.0), None);
        // Same input, same answer.
        for _ in 0..10 {
            assert_eq!(grid.resolve_world_position(-4.5, -4.5), Some((1, 1)));
        }
    }

    #[test]
    fn test_non_finite_position_is_off_grid() {
        let mut grid = TileGrid::new(10, 10);
        grid.fill_region(TilePermission::MIXED, 0, 0, 10, 10).unwrap();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(grid.resolve_world_position(bad, 0.0), None);
            assert_eq!(grid.resolve_world_position(0.0, bad), None);
            assert!(TileGrid::is_sentinel(grid.permission_at(bad, 0.0)));
            assert!(!grid.is_placeable(ItemType::Corn, world(0.0, bad)));
        }
    }

    #[test]
    fn test_sentinel_is_distinct_from_empty_tile() {
        let grid = TileGrid::new(4, 4);
        let inside = grid.permission_at(0.0, 0.0);
        let outside = grid.permission_at(50.0, 0.0);

        assert_eq!(inside.permission(), outside.permission(), "equal by value");
        assert!(!TileGrid::is_sentinel(inside));
        assert!(TileGrid::is_sentinel(outside));
    }

    #[test]
    fn test_crop_on_mixed_tile_leaves_room_for_animal() {
        let mut grid = TileGrid::new(4, 4);
        grid.fill_region(TilePermission::MIXED, 0, 0, 4, 4).unwrap();
        let pos = world(0.0, 0.0);

        grid.place_unit(ItemType::Tomato, pos, 0.0).unwrap();
        let tile = grid.permission_at(pos.x, pos.z);
        assert!(!tile.croppable);
        assert!(tile.animals);

        // The occupant still blocks placement until it is removed.
        assert!(!grid.is_placeable(ItemType::Cow, pos));
        let (x, y) = grid.resolve_world_position(pos.x, pos.z).unwrap();
        let removed = grid.remove_unit(x, y).unwrap();
        assert_eq!(removed.map(|unit| unit.item()), Some(ItemType::Tomato));

        assert!(grid.is_placeable(ItemType::Cow, pos));
        grid.place_unit(ItemType::Cow, pos, 0.0).unwrap();
        let tile = grid.permission_at(pos.x, pos.z);
        assert!(!tile.animals);
        assert_eq!(tile.occupant.as_ref().map(|unit| unit.item()), Some(ItemType::Cow));
    }

    #[test]
    fn test_place_on_occupied_tile_fails() {
        let mut grid = TileGrid::new(4, 4);
        grid.fill_region(TilePermission::MIXED, 0, 0, 4, 4).unwrap();
        grid.place_unit(ItemType::Corn, world(0.0, 0.0), 0.0).unwrap();
        assert_eq!(
            grid.place_unit(ItemType::Sheep, world(0.0, 0.0), 0.0).unwrap_err(),
            GardenError::TileOccupied { x: 2, y: 2 }
        );
    }

    #[test]
    fn test_place_off_grid_fails() {
        let mut grid = TileGrid::new(4, 4);
        let err = grid.place_unit(ItemType::Corn, world(10.0, 0.0), 0.0).unwrap_err();
        assert!(matches!(err, GardenError::OutOfBounds { .. }));
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_is_any_placeable() {
        let mut grid = TileGrid::new(4, 4);
        grid.fill_region(TilePermission::ANIMALS, 0, 0, 1, 1).unwrap();
        assert!(grid.is_any_placeable(world(-2.0, -2.0)));
        assert!(!grid.is_placeable(ItemType::Corn, world(-2.0, -2.0)));
        assert!(!grid.is_any_placeable(world(1.0, 1.0)));
        assert!(!grid.is_any_placeable(world(40.0, 1.0)));
    }

    #[test]
    fn test_advance_day_counts_changes() {
        let mut grid = TileGrid::new(4, 4);
        grid.fill_region(TilePermission::MIXED, 0, 0, 4, 4).unwrap();
        grid.place_unit(ItemType::Corn, world(-2.0, -2.0), 0.0).unwrap();
        grid.place_unit(ItemType::Sheep, world(0.0, 0.0), 0.0).unwrap();

        assert_eq!(grid.advance_day(), 1);
        assert_eq!(grid.advance_day(), 1);
        assert_eq!(grid.advance_day(), 0, "corn is mature, sheep never grows");

        let stages: Vec<u8> = grid.occupied().map(|(_, _, unit)| unit.stage()).collect();
        assert_eq!(stages, vec![3, 1]);
    }

    #[test]
    fn test_occupied_reports_coordinates() {
        let mut grid = TileGrid::new(6, 4);
        grid.fill_region(TilePermission::CROPS, 0, 0, 6, 4).unwrap();
        grid.place_unit(ItemType::Grape, world(1.0, -1.0), 0.0).unwrap();
        let coords: Vec<(i32, i32)> = grid.occupied().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(4, 1)]);
    }

    #[test]
    fn test_tile_center_inverts_resolve() {
        let grid = TileGrid::new(28, 24);
        for (x, y) in [(0, 0), (13, 7), (27, 23)] {
            let centre = grid.tile_center(x, y);
            assert_eq!(grid.resolve_world_position(centre.x, centre.z), Some((x, y)));
        }
    }
}

//! Buildings and rooms of one floor, derived from house walls
//!
//! Tiles in `[0, width) x [0, height)` are flood filled. Two neighbouring
//! tiles are connected unless a house wall stands on the edge between them.
//! A region that can reach past the map is open ground; every other region is
//! a room. Rooms touching through a wall form one building.
//!
//! A tile's south wall lives in its `Hwall` slot and its west wall in its
//! `Vwall` slot, so a room's north and east walls belong to the neighbouring
//! tiles. Those tiles join the room with a wall-only [`TilePart`].

mod building;

pub use building::{Building, Room, TilePart, TileSummary};

use crate::map::Map;
use crate::tile::Tile;
use std::collections::HashMap;

/// Snapshot of buildings and rooms on one floor
#[derive(Debug, Clone)]
pub struct BuildingsSummary {
    floor: i32,
    buildings: Vec<Building>,
    /// Building index of every interior tile
    building_of_tile: HashMap<(i32, i32), usize>,
    /// (building index, room index) of every interior tile
    room_of_tile: HashMap<(i32, i32), (usize, usize)>,
    /// Merged part of every tile owned by any building
    parts: HashMap<(i32, i32), TilePart>,
}

fn house_wall_south(map: &Map, x: i32, y: i32, floor: i32) -> bool {
    map.tile(x, y)
        .and_then(|tile| tile.horizontal_wall(floor))
        .is_some_and(|wall| wall.data().house_wall)
}

fn house_wall_west(map: &Map, x: i32, y: i32, floor: i32) -> bool {
    map.tile(x, y)
        .and_then(|tile| tile.vertical_wall(floor))
        .is_some_and(|wall| wall.data().house_wall)
}

/// Whether the edge from `(x, y)` towards `(dx, dy)` is walled off
fn blocked(map: &Map, x: i32, y: i32, (dx, dy): (i32, i32), floor: i32) -> bool {
    match (dx, dy) {
        (0, 1) => house_wall_south(map, x, y + 1, floor),
        (0, -1) => house_wall_south(map, x, y, floor),
        (1, 0) => house_wall_west(map, x + 1, y, floor),
        _ => house_wall_west(map, x, y, floor),
    }
}

const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Enclosed regions of the floor, each as a list of tile coordinates
fn enclosed_regions(map: &Map, floor: i32) -> Vec<Vec<(i32, i32)>> {
    let (width, height) = (map.width(), map.height());
    let in_range = |x: i32, y: i32| x >= 0 && y >= 0 && x < width && y < height;
    let mut visited = vec![false; (width * height) as usize];
    let index = |x: i32, y: i32| (x * height + y) as usize;
    let mut regions = Vec::new();

    for start_x in 0..width {
        for start_y in 0..height {
            if visited[index(start_x, start_y)] {
                continue;
            }
            visited[index(start_x, start_y)] = true;

            let mut region = Vec::new();
            let mut open = false;
            let mut stack = vec![(start_x, start_y)];
            while let Some((x, y)) = stack.pop() {
                region.push((x, y));
                for offset in NEIGHBOURS {
                    if blocked(map, x, y, offset, floor) {
                        continue;
                    }
                    let (nx, ny) = (x + offset.0, y + offset.1);
                    if !in_range(nx, ny) {
                        open = true;
                    } else if !visited[index(nx, ny)] {
                        visited[index(nx, ny)] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if !open {
                region.sort_unstable();
                regions.push(region);
            }
        }
    }
    regions
}

fn find(parents: &mut [usize], room: usize) -> usize {
    let mut root = room;
    while parents[root] != root {
        root = parents[root];
    }
    let mut current = room;
    while parents[current] != root {
        let next = parents[current];
        parents[current] = root;
        current = next;
    }
    root
}

fn room_tiles(region: &[(i32, i32)], room_of: &HashMap<(i32, i32), usize>, room: usize) -> Vec<TileSummary> {
    let mut parts: HashMap<(i32, i32), TilePart> = HashMap::new();
    for &(x, y) in region {
        parts.insert((x, y), TilePart::Everything);
    }
    for &(x, y) in region {
        let boundaries = [((x + 1, y), TilePart::VerticalWallOnly), ((x, y + 1), TilePart::HorizontalWallOnly)];
        for (position, part) in boundaries {
            if room_of.get(&position) == Some(&room) {
                continue;
            }
            parts
                .entry(position)
                .and_modify(|existing| *existing = existing.merge(part))
                .or_insert(part);
        }
    }

    let mut tiles: Vec<TileSummary> = parts
        .into_iter()
        .map(|((x, y), part)| TileSummary { x, y, part })
        .collect();
    tiles.sort_unstable_by_key(|tile| (tile.x, tile.y));
    tiles
}

impl BuildingsSummary {
    pub fn new(map: &Map, floor: i32) -> Self {
        let regions = enclosed_regions(map, floor);

        let mut room_of: HashMap<(i32, i32), usize> = HashMap::new();
        for (room, region) in regions.iter().enumerate() {
            for position in region {
                room_of.insert(*position, room);
            }
        }

        // Rooms on either side of a wall share a building
        let mut parents: Vec<usize> = (0..regions.len()).collect();
        for (room, region) in regions.iter().enumerate() {
            for &(x, y) in region {
                for (dx, dy) in NEIGHBOURS {
                    if let Some(&other) = room_of.get(&(x + dx, y + dy)) {
                        if other != room {
                            let (a, b) = (find(&mut parents, room), find(&mut parents, other));
                            parents[a] = b;
                        }
                    }
                }
            }
        }

        let mut building_of_root: HashMap<usize, usize> = HashMap::new();
        let mut buildings: Vec<Building> = Vec::new();
        let mut building_of_tile = HashMap::new();
        let mut room_of_tile = HashMap::new();

        for (room, region) in regions.iter().enumerate() {
            let root = find(&mut parents, room);
            let index = *building_of_root.entry(root).or_insert_with(|| {
                buildings.push(Building {
                    index: buildings.len(),
                    rooms: Vec::new(),
                    all_tiles: Vec::new(),
                });
                buildings.len() - 1
            });
            let building = &mut buildings[index];
            for position in region {
                building_of_tile.insert(*position, index);
                room_of_tile.insert(*position, (index, building.rooms.len()));
            }
            building.rooms.push(Room {
                tiles: room_tiles(region, &room_of, room),
            });
        }

        let mut parts: HashMap<(i32, i32), TilePart> = HashMap::new();
        for building in &mut buildings {
            let mut merged: HashMap<(i32, i32), TilePart> = HashMap::new();
            for tile in building.rooms.iter().flat_map(|room| room.tiles.iter()) {
                merged
                    .entry((tile.x, tile.y))
                    .and_modify(|part| *part = part.merge(tile.part))
                    .or_insert(tile.part);
            }
            for (&position, &part) in &merged {
                parts
                    .entry(position)
                    .and_modify(|existing: &mut TilePart| *existing = existing.merge(part))
                    .or_insert(part);
            }
            let mut all_tiles: Vec<TileSummary> = merged
                .into_iter()
                .map(|((x, y), part)| TileSummary { x, y, part })
                .collect();
            all_tiles.sort_unstable_by_key(|tile| (tile.x, tile.y));
            building.all_tiles = all_tiles;
        }

        tracing::debug!(
            floor,
            buildings = buildings.len(),
            rooms = regions.len(),
            "Computed buildings summary"
        );

        Self {
            floor,
            buildings,
            building_of_tile,
            room_of_tile,
            parts,
        }
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Building whose interior contains `tile`
    pub fn building_at_tile(&self, tile: &Tile) -> Option<&Building> {
        self.building_at_coords(tile.x(), tile.y())
    }

    pub fn building_at_coords(&self, x: i32, y: i32) -> Option<&Building> {
        self.building_of_tile
            .get(&(x, y))
            .map(|index| &self.buildings[*index])
    }

    pub fn room_at_tile(&self, tile: &Tile) -> Option<&Room> {
        self.room_of_tile
            .get(&(tile.x(), tile.y()))
            .map(|&(building, room)| &self.buildings[building].rooms[room])
    }

    fn part(&self, tile: &Tile) -> Option<TilePart> {
        self.parts.get(&(tile.x(), tile.y())).copied()
    }

    /// Whether the floor content of `tile` belongs to a building
    pub fn contains_floor(&self, tile: &Tile) -> bool {
        self.part(tile).is_some_and(|part| part.includes_floor())
    }

    pub fn contains_vertical_wall(&self, tile: &Tile) -> bool {
        self.part(tile).is_some_and(|part| part.includes_vertical_wall())
    }

    pub fn contains_horizontal_wall(&self, tile: &Tile) -> bool {
        self.part(tile).is_some_and(|part| part.includes_horizontal_wall())
    }

    pub fn buildings_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn rooms_count(&self) -> usize {
        self.buildings.iter().map(Building::rooms_count).sum()
    }
}

//! Command-line front end for deedplanner maps
//!
//! Run with: deedplanner <command> --help

use clap::{Parser, Subcommand, ValueEnum};
use deedplanner_editor::deedplanner_core::{BuildingsSummary, Database, NullScene, TITLE_STRING};
use deedplanner_editor::preferences::EditorPreferences;
use deedplanner_editor::project::MapProject;
use deedplanner_editor::tools::{
    map_warning_lines, materials_report, GroundTool, GroundToolMode, MaterialsMode, MouseButton, SelectionHit,
    SelectionTarget,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deedplanner", about = "Inspect and edit deedplanner map files")]
struct Cli {
    /// Content database to use instead of the bundled one
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty map
    New {
        /// Output map file path
        path: PathBuf,
        /// Width in tiles (default: from preferences)
        #[arg(long)]
        width: Option<i32>,
        /// Height in tiles (default: from preferences)
        #[arg(long)]
        height: Option<i32>,
    },
    /// Print size, height range, buildings and total materials
    Info {
        map: PathBuf,
    },
    /// List map warnings
    Warnings {
        map: PathBuf,
    },
    /// Materials needed for the building or room on a tile
    Materials {
        map: PathBuf,
        x: i32,
        y: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        floor: i32,
        #[arg(long, value_enum, default_value = "building")]
        mode: ReportMode,
    },
    /// Flood fill ground from a tile
    FillGround {
        map: PathBuf,
        x: i32,
        y: i32,
        /// Ground short name, e.g. "di"
        ground: String,
        /// Write the result here instead of overwriting the map
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportMode {
    /// Whole building, all levels
    Building,
    /// Building on the given floor
    Level,
    /// Room on the given floor
    Room,
}

impl From<ReportMode> for MaterialsMode {
    fn from(mode: ReportMode) -> Self {
        match mode {
            ReportMode::Building => MaterialsMode::BuildingAllLevels,
            ReportMode::Level => MaterialsMode::BuildingCurrentLevel,
            ReportMode::Room => MaterialsMode::RoomCurrentLevel,
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "{} failed", TITLE_STRING);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_database(path: Option<&Path>) -> Result<Database, Box<dyn std::error::Error>> {
    let database = match path {
        Some(path) => Database::from_json_file(path)?,
        None => deedplanner_editor::bundled_database()?,
    };
    Ok(database)
}

fn open(
    path: &Path,
    database: &Database,
    preferences: &mut EditorPreferences,
) -> Result<MapProject, Box<dyn std::error::Error>> {
    let project = MapProject::load(path, database, preferences, Box::new(NullScene))?;
    remember(preferences, &project);
    Ok(project)
}

fn remember(preferences: &mut EditorPreferences, project: &MapProject) {
    if let Some(path) = &project.path {
        preferences.add_recent_map(path.clone(), project.name().to_string());
        if let Err(e) = preferences.save() {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database = load_database(cli.database.as_deref())?;
    let mut preferences = EditorPreferences::load();

    match cli.command {
        Command::New {
            path,
            width,
            height,
        } => {
            let mut sized = preferences.clone();
            sized.default_width = width.unwrap_or(preferences.default_width);
            sized.default_height = height.unwrap_or(preferences.default_height);
            let mut project = MapProject::new(&database, &sized, Box::new(NullScene))?;
            project.save(&path)?;
            remember(&mut preferences, &project);
            println!(
                "Created {}x{} map {}",
                project.map.width(),
                project.map.height(),
                path.display()
            );
        }
        Command::Info { map } => {
            let project = open(&map, &database, &mut preferences)?;
            let map = &project.map;
            let summary = BuildingsSummary::new(map, 0);
            println!("{}", project.name());
            println!("Size: {}x{}", map.width(), map.height());
            println!(
                "Surface height: {} to {}",
                map.lowest_surface_height(),
                map.highest_surface_height()
            );
            println!(
                "Cave height: {} to {}",
                map.lowest_cave_height(),
                map.highest_cave_height()
            );
            println!(
                "Buildings: {}, rooms: {}",
                summary.buildings_count(),
                summary.rooms_count()
            );
            println!();
            print!("{}", map.calculate_map_materials());
        }
        Command::Warnings { map } => {
            let project = open(&map, &database, &mut preferences)?;
            for line in map_warning_lines(&project.map) {
                println!("{}", line);
            }
        }
        Command::Materials {
            map,
            x,
            y,
            floor,
            mode,
        } => {
            let project = open(&map, &database, &mut preferences)?;
            print!("{}", materials_report(&project.map, mode.into(), x, y, floor));
        }
        Command::FillGround {
            map,
            x,
            y,
            ground,
            output,
        } => {
            let data = database
                .ground(&ground)
                .ok_or_else(|| format!("Unknown ground '{}'", ground))?;
            let mut project = open(&map, &database, &mut preferences)?;

            let mut tool = GroundTool::new(data.clone(), data);
            tool.mode = GroundToolMode::Fill;
            let hit = SelectionHit {
                tile_x: x,
                tile_y: y,
                target: SelectionTarget::InnerTile,
            };
            let changed = tool.apply(&mut project.map, hit, MouseButton::Left)?;
            if changed > 0 {
                project.mark_dirty();
            }

            let target = output.unwrap_or(map);
            project.save(&target)?;
            println!("Filled {} tiles, saved {}", changed, target.display());
        }
    }
    Ok(())
}

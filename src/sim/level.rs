/// Level loading and parsing.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files)
///   2. Built-in embedded levels
///
/// ## Level file format (`.txt`):
///   Optional line 1: `; Level Name`
///   Lines: map rows, one character per 30 px tile.
///   Trailing whitespace / `\r` is trimmed; leading spaces are significant.
///
/// ## Tile legend:
///   '#' = Grass platform     'S' = Stone platform
///   'W' = Wood platform      'E' = Enemy spawn marker
///   'G' = Goal               'P' = Player spawn
///   anything else = Empty
///
/// ## Rotation
///
/// The level whose id is `level0` (or the first one) opens every run.
/// After that, levels are drawn at random without repetition until none
/// remain.

use std::path::{Path, PathBuf};

use rand::{Rng, RngCore};
use thiserror::Error;

use crate::domain::physics::{Platform, Rect};
use crate::domain::player::DEFAULT_SPAWN;
use crate::domain::tile::{Tile, TILE_SIZE};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {0:?} has no map rows")]
    Empty(String),
    #[error("level {0:?} has no platforms")]
    NoPlatforms(String),
    #[error("no levels available")]
    NoLevels,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Raw level text as loaded from disk or the embedded set.
#[derive(Clone, Debug)]
pub struct LevelDef {
    /// File stem (`level0`, `level3`, ...) used for rotation.
    pub id: String,
    pub name: String,
    pub rows: Vec<String>,
}

/// A parsed, immutable level.
#[derive(Clone, Debug)]
pub struct LevelGrid {
    pub name: String,
    /// Width in tiles (longest row).
    pub cols: usize,
    pub rows: usize,
    pub platforms: Vec<Platform>,
    pub goal: Option<Rect>,
    /// At least one entry; `DEFAULT_SPAWN` when the map has no `P`.
    pub spawn_points: Vec<(i32, i32)>,
    /// Top-left pixel of every `E` tile.
    pub enemy_markers: Vec<(i32, i32)>,
}

impl LevelGrid {
    pub fn parse(name: &str, rows: &[String]) -> Result<Self, LevelError> {
        if rows.iter().all(|r| r.trim().is_empty()) {
            return Err(LevelError::Empty(name.to_string()));
        }

        let mut platforms = vec![];
        let mut goal = None;
        let mut spawn_points = vec![];
        let mut enemy_markers = vec![];

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let x = col as i32 * TILE_SIZE;
                let y = row as i32 * TILE_SIZE;
                let tile = Tile::from_char(ch);
                if let Some(kind) = tile.platform_kind() {
                    platforms.push(Platform { rect: Rect::new(x, y, TILE_SIZE, TILE_SIZE), kind });
                    continue;
                }
                match tile {
                    Tile::EnemySpawn => enemy_markers.push((x, y)),
                    // last goal wins
                    Tile::Goal => goal = Some(Rect::new(x, y, TILE_SIZE, TILE_SIZE)),
                    Tile::PlayerSpawn => spawn_points.push((x, y)),
                    _ => {}
                }
            }
        }

        if platforms.is_empty() {
            return Err(LevelError::NoPlatforms(name.to_string()));
        }
        if spawn_points.is_empty() {
            tracing::warn!("level {name:?}: no spawn point, using default {DEFAULT_SPAWN:?}");
            spawn_points.push(DEFAULT_SPAWN);
        }

        Ok(LevelGrid {
            name: name.to_string(),
            cols: rows.iter().map(|r| r.chars().count()).max().unwrap_or(0),
            rows: rows.len(),
            platforms,
            goal,
            spawn_points,
            enemy_markers,
        })
    }

    pub fn from_def(def: &LevelDef) -> Result<Self, LevelError> {
        Self::parse(&def.name, &def.rows)
    }

    pub fn pixel_width(&self) -> i32 {
        self.cols as i32 * TILE_SIZE
    }

    /// Anything whose top edge passes this line has fallen out of the level.
    pub fn pixel_height(&self) -> i32 {
        self.rows as i32 * TILE_SIZE
    }
}

// ══════════════════════════════════════════════════════════════
// Level catalog
// ══════════════════════════════════════════════════════════════

/// Levels from `dir` if it holds any `.txt` files, otherwise the embedded set.
pub fn load_catalog(dir: &Path) -> Vec<LevelDef> {
    if dir.is_dir() {
        match load_from_directory(dir) {
            Ok(levels) if !levels.is_empty() => {
                tracing::info!("levels: {} loaded from {}", levels.len(), dir.display());
                return levels;
            }
            Ok(_) => tracing::info!("levels: {} has no .txt files", dir.display()),
            Err(e) => tracing::warn!("levels: {e}"),
        }
    }
    tracing::info!("levels: using embedded set");
    embedded_levels()
}

/// Parse one `.txt` level file body.
pub fn parse_level_text(id: &str, content: &str) -> LevelDef {
    let mut name = String::new();
    let mut rows = vec![];

    for (i, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if i == 0 {
            if let Some(rest) = line.strip_prefix(';') {
                name = rest.trim().to_string();
                continue;
            }
        }
        rows.push(line.to_string());
    }

    while rows.last().map_or(false, |r| r.is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = id.to_string();
    }

    LevelDef { id: id.to_string(), name, rows }
}

fn load_from_directory(dir: &Path) -> Result<Vec<LevelDef>, LevelError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| LevelError::Io { path: dir.to_path_buf(), source })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "txt"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        let id = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
        match std::fs::read_to_string(&path) {
            Ok(content) => levels.push(parse_level_text(&id, &content)),
            Err(source) => tracing::warn!("levels: {}", LevelError::Io { path, source }),
        }
    }
    Ok(levels)
}

// ══════════════════════════════════════════════════════════════
// Rotation
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct LevelRotation {
    opener: usize,
    remaining: Vec<usize>,
}

impl LevelRotation {
    pub fn new(catalog: &[LevelDef]) -> Result<Self, LevelError> {
        if catalog.is_empty() {
            return Err(LevelError::NoLevels);
        }
        let opener = catalog.iter().position(|d| d.id == "level0").unwrap_or(0);
        let remaining = (0..catalog.len()).filter(|&i| i != opener).collect();
        Ok(LevelRotation { opener, remaining })
    }

    pub fn opener(&self) -> usize {
        self.opener
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Draw the next unused level, or None when all have been played.
    pub fn next(&mut self, rng: &mut dyn RngCore) -> Option<usize> {
        if self.remaining.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(i))
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("level0", "Training Grounds", &[
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                              WWW       ",
            "                                        ",
            "                     WWWW           G   ",
            "                                   SSSS ",
            "  P          E                          ",
            "##########################   ###########",
            "SSSSSSSSSSSSSSSSSSSSSSSSSS   SSSSSSSSSSS",
        ]),
        make_embedded("level1", "Broken Bridge", &[
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                        ",
            "                                  G     ",
            "                               WWWWWW   ",
            "                                        ",
            "                        WWW             ",
            "                                        ",
            "                 SSS         E          ",
            "          E               #########     ",
            "  P     #####                           ",
            "#####           ####                    ",
            "SSSSS   SSSSS   SSSS      SSSSSSSSS     ",
        ]),
        make_embedded("level2", "Watchtower", &[
            "                                        ",
            "                                        ",
            "                                   G    ",
            "                                 SSSSS  ",
            "                         E              ",
            "                       WWWWW            ",
            "                                        ",
            "               E  WWW                   ",
            "             #######                    ",
            "                                        ",
            "      WWW                     E         ",
            "  P                        ######       ",
            "#####      ####     ####                ",
            "SSSSS      SSSS     SSSS    SSSSSS      ",
        ]),
        make_embedded("level3", "Cavern Run", &[
            "SSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSSS",
            "S                                      S",
            "S                                      S",
            "S                     E          G     S",
            "S                  WWWWWW     SSSSSS   S",
            "S                                      S",
            "S            E                         S",
            "S         ######         WWW           S",
            "S  P                                   S",
            "S#####        E                        S",
            "S         ########     E     ####      S",
            "S                    #####             S",
            "SSSSSSSS                       SSSSSSSSS",
        ]),
    ]
}

fn make_embedded(id: &str, name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        id: id.to_string(),
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::PlatformKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rows(map: &[&str]) -> Vec<String> {
        map.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_every_tile_kind() {
        let grid = LevelGrid::parse("t", &rows(&[
            "P  E  G",
            "#SW?  x",
        ])).unwrap();
        assert_eq!(grid.platforms.len(), 3);
        assert_eq!(grid.platforms[1].kind, PlatformKind::Stone);
        assert_eq!(grid.platforms[2].rect, Rect::new(60, 30, 30, 30));
        assert_eq!(grid.spawn_points, vec![(0, 0)]);
        assert_eq!(grid.enemy_markers, vec![(90, 0)]);
        assert_eq!(grid.goal, Some(Rect::new(180, 0, 30, 30)));
        assert_eq!((grid.cols, grid.rows), (7, 2));
        assert_eq!(grid.pixel_height(), 60);
    }

    #[test]
    fn missing_spawn_falls_back_to_default() {
        let grid = LevelGrid::parse("t", &rows(&["####"])).unwrap();
        assert_eq!(grid.spawn_points, vec![DEFAULT_SPAWN]);
        assert!(grid.goal.is_none());
    }

    #[test]
    fn empty_or_platformless_levels_fail() {
        assert!(matches!(LevelGrid::parse("a", &[]), Err(LevelError::Empty(_))));
        assert!(matches!(LevelGrid::parse("a", &rows(&["   ", ""])), Err(LevelError::Empty(_))));
        assert!(matches!(LevelGrid::parse("b", &rows(&["P  G"])), Err(LevelError::NoPlatforms(_))));
    }

    #[test]
    fn level_text_name_and_trimming() {
        let def = parse_level_text("level7", "; Sky High\r\n  P \r\n####\n\n");
        assert_eq!(def.name, "Sky High");
        assert_eq!(def.rows, vec!["  P".to_string(), "####".to_string()]);

        // leading blank rows are kept: they are sky
        let def = parse_level_text("level8", "\nP\n##");
        assert_eq!(def.name, "level8");
        assert_eq!(def.rows, vec![String::new(), "P".to_string(), "##".to_string()]);
    }

    #[test]
    fn embedded_levels_all_parse() {
        let levels = embedded_levels();
        assert_eq!(levels[0].id, "level0");
        for def in &levels {
            let grid = LevelGrid::from_def(def).unwrap();
            assert!(grid.goal.is_some(), "{} has no goal", def.name);
            assert!(!grid.enemy_markers.is_empty());
        }
    }

    #[test]
    fn rotation_opens_with_level0_then_draws_without_repeats() {
        let catalog = vec![
            parse_level_text("alpha", "##"),
            parse_level_text("level0", "##"),
            parse_level_text("beta", "##"),
            parse_level_text("gamma", "##"),
        ];
        let mut rot = LevelRotation::new(&catalog).unwrap();
        assert_eq!(rot.opener(), 1);
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = vec![];
        while let Some(i) = rot.next(&mut rng) {
            assert_ne!(i, 1);
            assert!(!seen.contains(&i));
            seen.push(i);
        }
        seen.sort();
        assert_eq!(seen, vec![0, 2, 3]);
        assert_eq!(rot.remaining(), 0);
    }

    #[test]
    fn rotation_without_level0_opens_with_first() {
        let catalog = vec![parse_level_text("a", "##"), parse_level_text("b", "##")];
        let rot = LevelRotation::new(&catalog).unwrap();
        assert_eq!(rot.opener(), 0);
        assert!(matches!(LevelRotation::new(&[]), Err(LevelError::NoLevels)));
    }

    #[test]
    fn missing_directory_uses_embedded() {
        let levels = load_catalog(Path::new("/nonexistent/shadowguide/levels"));
        assert_eq!(levels.len(), embedded_levels().len());
    }
}

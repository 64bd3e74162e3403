//! 地圖與設定載入器

use crate::error::{Context, LoadError, Result, RosterError};
use crate::grid::{Grid, Position, Terrain};
use crate::loader_schema::GameConfig;
use crate::unit::Roster;
use rand::Rng;
use std::collections::HashMap;

/// 森林符號，也可接在標記後面表示標記位於森林
const FOREST_TOKEN: char = '^';
const PLAIN_TOKEN: &str = ".";

/// 從 ASCII 格式載入地圖
///
/// ASCII 格式：每行用空格分隔的符號
/// - `.` = 平地
/// - `^` = 森林
/// - 其他字串（`P`、`E` 等）= 平地上的標記；以 `^` 結尾（`E^`）= 森林上的標記
/// - 相同的標記會全部收集成 Vec（由上而下、由左而右）
///
/// 例如：
/// ```text
/// P . ^
/// . ^ E^
/// . . .
/// ```
pub fn load_from_ascii(ascii: &str) -> Result<(Grid, HashMap<String, Vec<Position>>)> {
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LoadError::ParseError("地圖為空".to_string()).into());
    }

    let mut rows = Vec::with_capacity(lines.len());
    let mut markers: HashMap<String, Vec<Position>> = HashMap::new();

    for (y, line) in lines.iter().enumerate() {
        let mut row = Vec::new();
        for (x, cell) in line.split_whitespace().enumerate() {
            let (marker, terrain) = parse_token(cell);
            row.push(terrain);
            if let Some(marker) = marker {
                markers
                    .entry(marker.to_string())
                    .or_default()
                    .push(Position { x, y });
            }
        }
        rows.push(row);
    }

    let grid = Grid::from_rows(rows).context("ASCII 地圖每列長度必須一致")?;
    Ok((grid, markers))
}

fn parse_token(token: &str) -> (Option<&str>, Terrain) {
    if token == PLAIN_TOKEN {
        return (None, Terrain::Plain);
    }
    match token.strip_suffix(FOREST_TOKEN) {
        Some("") => (None, Terrain::Forest),
        Some(marker) => (Some(marker), Terrain::Forest),
        None => (Some(token), Terrain::Plain),
    }
}

/// 解析 TOML 設定
pub fn parse_config(toml_str: &str) -> Result<GameConfig> {
    toml::from_str(toml_str).map_err(|e| {
        LoadError::DeserializeError {
            format: "game config".to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// 依設定建立地圖與名冊
///
/// 有配置圖時使用配置圖，否則以 `rng` 隨機產生地圖。
/// 單位可用座標或標記指定位置，必須落在地圖內且彼此不重疊。
pub fn build_world<R: Rng>(config: &GameConfig, rng: &mut R) -> Result<(Grid, Roster)> {
    let (grid, markers) = match &config.map.layout {
        Some(layout) => load_from_ascii(layout).context("載入配置圖")?,
        None => {
            let grid = Grid::generate(
                config.map.cols,
                config.map.rows,
                config.map.forest_probability,
                rng,
            )
            .context("產生隨機地圖")?;
            (grid, HashMap::new())
        }
    };

    // 每個標記已分配出去的格數
    let mut used: HashMap<&str, usize> = HashMap::new();
    let mut roster = Roster::new();

    for unit in &config.units {
        let pos = match (&unit.position, &unit.marker) {
            (Some(pos), _) => *pos,
            (None, Some(marker)) => {
                let index = used.entry(marker.as_str()).or_insert(0);
                let pos = markers
                    .get(marker)
                    .and_then(|positions| positions.get(*index))
                    .copied()
                    .ok_or_else(|| LoadError::MissingMarker {
                        marker: marker.clone(),
                    })?;
                *index += 1;
                pos
            }
            (None, None) => {
                return Err(LoadError::MissingPosition {
                    unit: unit.name.clone(),
                }
                .into());
            }
        };

        grid.check_bounds(pos)
            .context(format!("單位 {} 的位置", unit.name))?;
        roster
            .spawn(unit.to_spec(pos))
            .context(format!("加入單位 {}", unit.name))?;
    }

    if roster.is_empty() {
        return Err(RosterError::EmptyRoster.into());
    }

    Ok((grid, roster))
}

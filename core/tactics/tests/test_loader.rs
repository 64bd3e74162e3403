//! 設定與地圖載入測試

use rand::SeedableRng;
use rand::rngs::StdRng;
use tactics::error::{ErrorKind, LoadError, RosterError};
use tactics::game::Game;
use tactics::grid::{Position, Terrain};
use tactics::loader::{build_world, parse_config};
use tactics::loader_schema::{GameConfig, ResolveMode};
use tactics::state::Phase;
use tactics::unit::Faction;

#[test]
fn test_empty_config_uses_default_skirmish() {
    let config = parse_config("").unwrap();
    assert_eq!(config, GameConfig::default());
    assert_eq!((config.map.cols, config.map.rows), (30, 20));
    assert_eq!(config.input.cursor_repeat_ms, 100);
    assert!(config.rules.show_tutorial);
    assert_eq!(config.rules.resolve, ResolveMode::Batch);

    let names: Vec<_> = config.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Byleth", "Edelgard", "Bandit"]);
    let bandit = &config.units[2];
    assert_eq!(bandit.faction, Faction::Enemy);
    assert_eq!(bandit.position, Some(Position::new(12, 8)));
    assert_eq!(bandit.stats.max_hp, 20);
    assert_eq!(bandit.stats.mov, 5);
}

#[test]
fn test_full_config() {
    let config = parse_config(
        r#"
        [map]
        seed = 9
        layout = """
        P . ^
        . ^ E^
        """

        [input]
        cursor_repeat_ms = 150

        [rules]
        show_tutorial = false
        resolve = "stepped"

        [[units]]
        name = "Byleth"
        faction = "player"
        marker = "P"
        stats = { str = 9, move = 6 }

        [[units]]
        name = "Bandit"
        faction = "enemy"
        marker = "E"
        hp = 12
        "#,
    )
    .unwrap();
    assert_eq!(config.rules.resolve, ResolveMode::Stepped);
    assert_eq!(config.units[0].stats.str, 9);
    assert_eq!(config.units[0].stats.mov, 6);
    assert_eq!(config.units[0].stats.def, 2, "未指定的屬性用預設值");

    let (grid, roster) = build_world(&config, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!((grid.cols(), grid.rows()), (3, 2));
    let bandit = roster.unit_at(Position::new(2, 1)).unwrap();
    assert_eq!(bandit.hp, 12);
    assert_eq!(grid.terrain_at(bandit.pos), Some(Terrain::Forest));

    let game = Game::from_config(&config).unwrap();
    assert_eq!(game.phase(), Phase::Map);
    assert_eq!(game.mode(), ResolveMode::Stepped);
}

#[test]
fn test_seeded_map_is_reproducible() {
    let mut config = GameConfig::default();
    config.map.seed = Some(1234);
    let a = Game::from_config(&config).unwrap();
    let b = Game::from_config(&config).unwrap();
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.phase(), Phase::Tutorial);
    assert_eq!(a.units().count(), 3);
    assert!(a.grid().positions().any(|p| a.terrain_at(p) == Some(Terrain::Forest)));
}

#[test]
fn test_bad_configs() {
    assert!(matches!(
        parse_config("[map]\ncols = \"wide\"").unwrap_err().kind(),
        ErrorKind::Load(LoadError::DeserializeError { .. })
    ));

    let mut rng = StdRng::seed_from_u64(0);
    let mut config = GameConfig::default();
    config.units[0].position = Some(Position::new(30, 0));
    let err = build_world(&config, &mut rng).unwrap_err();
    assert!(err.to_string().contains("Byleth"), "{err}");

    let mut config = GameConfig::default();
    config.units[1].position = config.units[0].position;
    assert!(matches!(
        build_world(&config, &mut rng).unwrap_err().kind(),
        ErrorKind::Roster(RosterError::PositionOccupied { .. })
    ));

    let mut config = GameConfig::default();
    config.units[0].position = None;
    config.units[0].marker = Some("X".to_string());
    assert!(matches!(
        build_world(&config, &mut rng).unwrap_err().kind(),
        ErrorKind::Load(LoadError::MissingMarker { .. })
    ));

    let mut config = GameConfig::default();
    config.units.clear();
    assert!(matches!(
        build_world(&config, &mut rng).unwrap_err().kind(),
        ErrorKind::Roster(RosterError::EmptyRoster)
    ));

    let mut config = GameConfig::default();
    config.map.forest_probability = 1.5;
    assert!(build_world(&config, &mut rng).is_err());
}

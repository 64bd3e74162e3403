//! Headless skirmish driver
//!
//! 載入設定、讓玩家方自動操作、逐步推進戰鬥與敵方回合，並輸出事件流。

mod autopilot;
mod pacer;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pacer::Pacer;
use serde::Serialize;
use std::path::PathBuf;
use tactics::event::{GameEvent, Outcome};
use tactics::game::Game;
use tactics::loader::parse_config;
use tactics::loader_schema::{GameConfig, ResolveMode};
use tactics::unit::Faction;

/// 無畫面的戰棋對局：玩家方由自動操作代打
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Play a tactics skirmish headlessly and print the event stream")]
struct Args {
    /// 遊戲設定檔（TOML）；未指定時使用預設的 30x20 對局
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 固定亂數種子，覆蓋設定檔
    #[arg(long)]
    seed: Option<u64>,

    /// 每輪最多幾個玩家回合，超過就停止
    #[arg(long, default_value_t = 50)]
    max_rounds: u32,

    /// 依動畫節奏實際等待（敵方每步 500ms）
    #[arg(long)]
    realtime: bool,

    /// 以 JSON Lines 輸出事件
    #[arg(long)]
    json: bool,

    /// 每個玩家回合開始時印出地圖
    #[arg(long)]
    board: bool,
}

#[derive(Serialize)]
struct Summary {
    outcome: Option<Outcome>,
    rounds: u32,
    survivors: Vec<String>,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("讀取設定檔 {}", path.display()))?;
            parse_config(&text).with_context(|| format!("解析設定檔 {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.map.seed = args.seed;
    }
    // 自動操作一律逐步推進，事件才能照節奏播放
    config.rules.resolve = ResolveMode::Stepped;
    Ok(config)
}

fn report<D: tactics::dice::Dice>(
    game: &Game<D>,
    args: &Args,
    pacer: Pacer,
    events: &[GameEvent],
) -> Result<()> {
    for event in events {
        if args.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", render::describe(game, event));
        }
        pacer.after(event);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut game = Game::from_config(&config).context("建立對局")?;
    let pacer = Pacer::new(args.realtime);
    tracing::info!(seed = ?config.map.seed, "skirmish started");

    let mut rounds = 0;
    if args.board && !args.json {
        print!("{}", render::board(&game));
    }

    while game.outcome().is_none() && rounds < args.max_rounds {
        let events = if game.is_busy() {
            let enemy_step = game.turn() == Faction::Enemy;
            let events = game.advance();
            if enemy_step && !events.is_empty() {
                pacer.ai_step();
            }
            events
        } else {
            let Some(intent) = autopilot::next_intent(&game) else {
                bail!("自動操作在 {} 階段沒有可用的操作", game.phase());
            };
            game.apply(intent)
                .with_context(|| format!("自動操作送出的 {intent:?} 被拒絕"))?
        };

        report(&game, &args, pacer, &events)?;
        for event in &events {
            if *event
                == (GameEvent::TurnChanged {
                    faction: Faction::Player,
                })
            {
                rounds += 1;
                if args.board && !args.json {
                    print!("{}", render::board(&game));
                }
            }
        }
    }

    let summary = Summary {
        outcome: game.outcome(),
        rounds,
        survivors: game.units().map(|u| u.name.clone()).collect(),
    };
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        match summary.outcome {
            Some(outcome) => println!("{outcome} after {rounds} round(s)"),
            None => println!("stopped after {rounds} round(s) without a winner"),
        }
        println!("survivors: {}", summary.survivors.join(", "));
    }
    Ok(())
}

//! Demo consumer: a `Player` entity composed from two behavior units.
//!
//! `HasHealthPoints` is applied first and `PlaysSoundEffects` after it,
//! so on `takedamage` the sound plays before the damage lands — the
//! most recently applied component always runs first.

use anyhow::Result;
use braid_compose::{arg, ComponentDef, EntityType};
use braid_value::Value;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "player_demo", about = "Composition engine demo")]
struct Args {
    /// Maximum (and starting) health points
    #[arg(long, default_value_t = 10)]
    maxhp: i64,

    /// Damage dealt per hit
    #[arg(long, default_value_t = 4)]
    damage: i64,

    /// Number of hits to take before healing
    #[arg(long, default_value_t = 1)]
    hits: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let plays_sounds = ComponentDef::builder("PlaysSoundEffects")
        .operation("jump", |_, _| {
            info!("playing jump sound");
            Ok(Value::Null)
        })
        .operation("takedamage", |_, _| {
            info!("playing hurt sound");
            Ok(Value::Null)
        })
        .build()?;

    let has_health = ComponentDef::builder("HasHealthPoints")
        .param("maxhp")
        .initializer(|unit, ctor| {
            let maxhp = ctor.get_i64("maxhp")?;
            unit.set("hp", maxhp);
            unit.set("maxhp", maxhp);
            Ok(())
        })
        .operation("heal", |me, _| {
            let maxhp = me.get("maxhp")?;
            me.set("hp", maxhp);
            Ok(Value::Null)
        })
        .operation("takedamage", |me, call_args| {
            let damage = arg(call_args, 0)?.as_i64().unwrap_or(0);
            let hp = me.get_i64("hp")?;
            me.set("hp", hp - damage);
            Ok(Value::Null)
        })
        .build()?;

    let mut player = EntityType::new("Player");
    player
        .compose(&has_health.operator(vec![Value::Int(args.maxhp)]))?
        .compose(&plays_sounds.operator(vec![]))?;
    let player = player.seal()?;

    for pass in player.applications() {
        info!(
            component = %pass.component,
            merged = ?pass.merged_operations,
            copied = ?pass.copied_fields,
            "composed"
        );
    }

    let mut p = player.spawn()?;
    for _ in 0..args.hits {
        p.call("takedamage", &[Value::Int(args.damage)])?;
    }
    println!("hp after {} hit(s): {}", args.hits, p.get_i64("hp")?);

    p.call("heal", &[])?;
    println!("hp after heal: {}", p.get_i64("hp")?);

    p.call("jump", &[])?;
    Ok(())
}

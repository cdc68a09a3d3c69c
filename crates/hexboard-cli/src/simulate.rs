//! Simulate command - drive a session with random valid moves
//!
//! Settlements go on random valid corners, roads prefer edges touching a
//! settlement, and every 7 moves the blocker to a random other tile.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info};

use hexboard_core::generator::board_rng;
use hexboard_core::{
    BoardAction, BoardEvent, BoardSession, CornerKey, EdgeKey, HexCoord, Resource, BLOCKER_ROLL,
};

use crate::config::BoardArgs;

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Settlements to place
    #[arg(long, default_value = "4")]
    pub settlements: usize,

    /// Roads to place
    #[arg(long, default_value = "4")]
    pub roads: usize,

    /// Dice rolls after placement
    #[arg(long, default_value = "20")]
    pub rolls: usize,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// How many of each move to make
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub settlements: usize,
    pub roads: usize,
    pub rolls: usize,
}

/// What happened during a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub settlements: Vec<CornerKey>,
    pub roads: Vec<EdgeKey>,
    pub rolls: Vec<u8>,
    pub collected: BTreeMap<Resource, u32>,
    pub blocker_moves: Vec<HexCoord>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = args.board.load()?;
    let mut session = BoardSession::from_config(&config).context("Failed to build board")?;
    // Move choice gets its own stream so it does not perturb the dice
    let mut rng = board_rng(config.seed.map(|s| s.wrapping_add(1)));

    let plan = Plan {
        settlements: args.settlements,
        roads: args.roads,
        rolls: args.rolls,
    };
    let report = simulate(&mut session, &mut rng, plan)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Play `plan` on `session`, returning what was placed and collected
pub fn simulate(session: &mut BoardSession, rng: &mut StdRng, plan: Plan) -> Result<SimulationReport> {
    let mut report = SimulationReport::default();

    for _ in 0..plan.settlements {
        let spots = session.graph().valid_settlement_spots();
        let Some(&corner) = spots.choose(rng) else {
            info!("no valid settlement spots left");
            break;
        };
        session.apply(BoardAction::BeginSettlementPlacement)?;
        let events = session.apply(BoardAction::PlaceSettlement(corner))?;
        session.apply(BoardAction::AnimationFinished)?;
        record(&mut report, events);
    }

    for _ in 0..plan.roads {
        let Some(edge) = pick_road(session, rng) else {
            info!("no valid road spots left");
            break;
        };
        session.apply(BoardAction::BeginRoadPlacement)?;
        let events = session.apply(BoardAction::PlaceRoad(edge))?;
        session.apply(BoardAction::AnimationFinished)?;
        record(&mut report, events);
    }

    for _ in 0..plan.rolls {
        let events = session.apply(BoardAction::RollDice)?;
        let rolled_seven = events
            .iter()
            .any(|e| matches!(e, BoardEvent::DiceRolled { total, .. } if *total == BLOCKER_ROLL));
        record(&mut report, events);

        if rolled_seven {
            let current = session.graph().blocker();
            let targets: Vec<HexCoord> = session
                .graph()
                .tiles()
                .map(|t| t.coord)
                .filter(|c| Some(*c) != current)
                .collect();
            if let Some(&to) = targets.choose(rng) {
                let events = session.apply(BoardAction::MoveBlocker(to))?;
                record(&mut report, events);
            }
        }
    }

    info!(
        settlements = report.settlements.len(),
        roads = report.roads.len(),
        rolls = report.rolls.len(),
        "simulation finished"
    );
    Ok(report)
}

/// A valid road next to a settlement if there is one, otherwise any valid road
fn pick_road(session: &BoardSession, rng: &mut StdRng) -> Option<EdgeKey> {
    let graph = session.graph();
    let spots = graph.valid_road_spots();
    let settled: Vec<EdgeKey> = spots
        .iter()
        .copied()
        .filter(|edge| {
            edge.endpoints()
                .iter()
                .any(|c| graph.get_corner(c).is_some_and(|c| c.has_settlement))
        })
        .collect();

    if settled.is_empty() {
        spots.choose(rng).copied()
    } else {
        settled.choose(rng).copied()
    }
}

fn record(report: &mut SimulationReport, events: Vec<BoardEvent>) {
    for event in events {
        debug!(?event, "event");
        match event {
            BoardEvent::SettlementPlaced { corner } => report.settlements.push(corner),
            BoardEvent::RoadPlaced { edge } => report.roads.push(edge),
            BoardEvent::DiceRolled { total, .. } => report.rolls.push(total),
            BoardEvent::ResourcesCollected { resources } => {
                for (resource, count) in resources {
                    *report.collected.entry(resource).or_insert(0) += count;
                }
            }
            BoardEvent::BlockerMoved { to, .. } => report.blocker_moves.push(to),
            BoardEvent::ModeChanged { .. } => {}
        }
    }
}

fn print_report(report: &SimulationReport) {
    println!("Settlements ({}): {}", report.settlements.len(), joined(&report.settlements));
    println!("Roads ({}): {}", report.roads.len(), joined(&report.roads));
    println!("Rolls ({}): {}", report.rolls.len(), joined(&report.rolls));
    println!("Blocker moves: {}", joined(&report.blocker_moves));

    println!("Collected:");
    for resource in Resource::ALL {
        let count = report.collected.get(&resource).copied().unwrap_or(0);
        println!("  {:<7} {}", resource.name(), count);
    }
}

fn joined<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexboard_core::BoardConfig;

    fn run_seeded(seed: u64, plan: Plan) -> (BoardSession, SimulationReport) {
        let mut session = BoardSession::from_config(&BoardConfig::seeded(seed)).unwrap();
        let mut rng = board_rng(Some(seed + 1));
        let report = simulate(&mut session, &mut rng, plan).unwrap();
        (session, report)
    }

    #[test]
    fn test_places_requested_pieces() {
        let plan = Plan { settlements: 5, roads: 6, rolls: 0 };
        let (session, report) = run_seeded(1, plan);

        assert_eq!(report.settlements.len(), 5);
        assert_eq!(report.roads.len(), 6);
        assert_eq!(session.graph().settlements().len(), 5);
        assert_eq!(session.graph().roads().len(), 6);
        assert!(!session.is_animating());
    }

    #[test]
    fn test_settlements_respect_distance_rule() {
        let plan = Plan { settlements: 8, roads: 0, rolls: 0 };
        let (session, report) = run_seeded(2, plan);

        for corner in &report.settlements {
            for neighbour in session.graph().adjacent_corners(corner) {
                assert!(!report.settlements.contains(&neighbour));
            }
        }
    }

    #[test]
    fn test_board_fills_up() {
        let plan = Plan { settlements: 100, roads: 0, rolls: 0 };
        let (session, report) = run_seeded(3, plan);

        assert!(report.settlements.len() < 54);
        assert!(session.graph().valid_settlement_spots().is_empty());
    }

    #[test]
    fn test_same_seed_same_report() {
        let plan = Plan { settlements: 3, roads: 3, rolls: 30 };
        let (_, a) = run_seeded(4, plan);
        let (_, b) = run_seeded(4, plan);
        assert_eq!(a, b);
        assert_eq!(a.rolls.len(), 30);
    }

    #[test]
    fn test_sevens_move_the_blocker() {
        let plan = Plan { settlements: 2, roads: 0, rolls: 60 };
        let (session, report) = run_seeded(5, plan);

        let sevens = report.rolls.iter().filter(|&&r| r == BLOCKER_ROLL).count();
        assert_eq!(report.blocker_moves.len(), sevens);
        if let Some(last) = report.blocker_moves.last() {
            assert_eq!(session.graph().blocker(), Some(*last));
        }
    }
}

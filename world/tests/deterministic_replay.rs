use std::time::Duration;

use waveform_core::{CellCoord, Command, DecayKind, Easing, Event, InfluenceKind, ObserverConfig};
use waveform_world::{self as world, query, World};

/// Replays a scripted command sequence and captures everything observable.
fn replay(commands: &[Command]) -> (Vec<Event>, Vec<f32>) {
    let mut world = World::new();
    let mut log = Vec::new();
    for command in commands {
        world::apply(&mut world, command.clone(), &mut log);
    }
    let values = query::collapsed_grid(&world)
        .map(|grid| grid.flattened_collapse_values)
        .unwrap_or_default();
    (log, values)
}

fn scripted_commands() -> Vec<Command> {
    let line = ObserverConfig {
        kind: InfluenceKind::Line,
        force: 1.0,
        range: 0,
        decay: DecayKind::Spread,
        can_rotate: true,
    };
    let radial = ObserverConfig {
        kind: InfluenceKind::Radial,
        force: -0.5,
        range: 3,
        decay: DecayKind::Fast,
        can_rotate: false,
    };

    let mut commands = vec![
        Command::ConfigureGrid {
            width: 5,
            height: 4,
        },
        Command::ConfigureSmoothing {
            speed: 0.4,
            easing: Easing::SmoothStep,
        },
        Command::SpawnObserver { config: line },
        Command::SpawnObserver { config: radial },
        Command::PlaceObserver {
            observer: waveform_core::ObserverId::new(0),
            slot: waveform_core::SlotId::new(2),
        },
        Command::PlaceObserver {
            observer: waveform_core::ObserverId::new(1),
            slot: waveform_core::SlotId::new(9),
        },
        Command::NudgeCell {
            cell: CellCoord::new(2, 2),
            value: 1.0,
        },
    ];
    for _ in 0..20 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(200),
        });
    }
    commands.push(Command::CycleDecay {
        slot: waveform_core::SlotId::new(2),
    });
    commands.push(Command::CycleRange {
        slot: waveform_core::SlotId::new(9),
    });
    for _ in 0..20 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(200),
        });
    }
    commands.push(Command::CollapseAll);
    commands
}

#[test]
fn identical_scripts_produce_identical_worlds() {
    let script = scripted_commands();
    let (first_events, first_values) = replay(&script);
    let (second_events, second_values) = replay(&script);

    assert_eq!(first_events, second_events, "event logs diverged");
    assert_eq!(
        first_values.len(),
        20,
        "five by four lattice flattens to twenty values"
    );
    // Collapse values must match bit for bit, not merely approximately.
    for (index, (first, second)) in first_values.iter().zip(&second_values).enumerate() {
        assert_eq!(
            first.to_bits(),
            second.to_bits(),
            "cell {index} diverged between replays"
        );
    }
}

#[test]
fn replay_ends_with_every_cell_quantized() {
    let (events, values) = replay(&scripted_commands());
    assert!(events.contains(&Event::GridCollapsed));
    for value in values {
        let quantized = [0.0_f32, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .any(|step| (value - step).abs() < 1e-6);
        assert!(quantized, "value {value} is not on the default targets");
    }
}

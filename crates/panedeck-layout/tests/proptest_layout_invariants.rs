//! Property tests for sizing and structure invariants.
//!
//! Random operation streams run against a [`LayoutSession`]; after every
//! step the tree must validate, every split's percentage children must sum
//! to 100, the visible columns must fill the viewport, and no pane may sit
//! deeper than its column's layer ceiling.

use panedeck_layout::{
    ColumnLocation, LayoutChangeReason, LayoutConfig, LayoutSession, MemoryHost, NodeId, PanelId,
    TabContent,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create { pane: usize },
    Split { panel: usize, pane: usize, vertical: bool, new_first: bool },
    Move { panel: usize, pane: usize, index: usize },
    Collapse { panel: usize, collapsed: bool },
    Destroy { panel: usize },
    Hide { panel: usize },
    Restore { pane: usize },
    Column { column: usize, visible: bool },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..16).prop_map(|pane| Op::Create { pane }),
        3 => (0usize..16, 0usize..16, any::<bool>(), any::<bool>()).prop_map(
            |(panel, pane, vertical, new_first)| Op::Split { panel, pane, vertical, new_first }
        ),
        2 => (0usize..16, 0usize..16, 0usize..6)
            .prop_map(|(panel, pane, index)| Op::Move { panel, pane, index }),
        2 => (0usize..16, any::<bool>()).prop_map(|(panel, collapsed)| Op::Collapse { panel, collapsed }),
        1 => (0usize..16).prop_map(|panel| Op::Destroy { panel }),
        1 => (0usize..16).prop_map(|panel| Op::Hide { panel }),
        1 => (0usize..16).prop_map(|pane| Op::Restore { pane }),
        1 => (0usize..3, any::<bool>()).prop_map(|(column, visible)| Op::Column { column, visible }),
    ]
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[index % items.len()])
}

fn live_panels(session: &LayoutSession) -> Vec<PanelId> {
    let mut ids: Vec<PanelId> = session.panels().map(|p| p.id).collect();
    ids.sort_unstable();
    ids
}

fn apply(session: &mut LayoutSession, op: &Op, counter: &mut usize) {
    let panes = session.tree().all_panes();
    let panels = live_panels(session);
    match *op {
        Op::Create { pane } => {
            if let Some(pane) = pick(&panes, pane) {
                *counter += 1;
                let source = format!("#tab{counter}");
                session.create_tab_from_content(TabContent::new(&source), pane, None);
            }
        }
        Op::Split {
            panel,
            pane,
            vertical,
            new_first,
        } => {
            if let (Some(panel), Some(pane)) = (pick(&panels, panel), pick(&panes, pane)) {
                session.split_with_panel(pane, panel, vertical, new_first);
            }
        }
        Op::Move { panel, pane, index } => {
            if let (Some(panel), Some(pane)) = (pick(&panels, panel), pick(&panes, pane)) {
                session.move_into_pane_at_index(panel, pane, index);
            }
        }
        Op::Collapse { panel, collapsed } => {
            if let Some(panel) = pick(&panels, panel) {
                session.set_tab_collapsed(panel, collapsed);
            }
        }
        Op::Destroy { panel } => {
            if let Some(panel) = pick(&panels, panel) {
                session.destroy_by_id(panel);
            }
        }
        Op::Hide { panel } => {
            if let Some(panel) = pick(&panels, panel) {
                let _ = session.hide_tab(panel, None);
            }
        }
        Op::Restore { pane } => {
            let hidden = session.hidden_tabs().first().map(|h| h.source_id.clone());
            if let (Some(source), Some(pane)) = (hidden, pick(&panes, pane)) {
                session.restore_hidden(&source, pane, 0);
            }
        }
        Op::Column { column, visible } => {
            let column = ColumnLocation::ALL[column % 3];
            if column != ColumnLocation::Center {
                session.apply_column_visibility(column, visible);
            }
        }
    }
}

fn flex_snapshot(session: &LayoutSession) -> Vec<(NodeId, String)> {
    let mut out: Vec<(NodeId, String)> = session
        .tree()
        .nodes()
        .map(|node| (node.id, node.flex.to_string()))
        .collect();
    out.sort_unstable_by_key(|(id, _)| *id);
    out
}

fn column_snapshot(session: &LayoutSession) -> Vec<(bool, String)> {
    session
        .columns()
        .iter()
        .map(|column| (column.visible, column.flex.to_string()))
        .collect()
}

fn assert_invariants(session: &LayoutSession) {
    let problems = session.tree().validate();
    assert!(problems.is_empty(), "tree problems: {problems:?}");

    for node in session.tree().nodes() {
        let Some(split) = node.as_split() else {
            continue;
        };
        let shares: Vec<f64> = split
            .children
            .iter()
            .filter_map(|c| session.tree().node(*c).and_then(|n| n.flex.as_percent()))
            .collect();
        if !shares.is_empty() {
            let sum: f64 = shares.iter().sum();
            assert!((sum - 100.0).abs() < 0.01, "split {} shares sum to {sum}", node.id);
        }
    }

    let sum = session.columns().active_sum();
    assert!((sum - 100.0).abs() < 0.01, "columns sum to {sum}");

    for pane in session.tree().all_panes() {
        let Some(column) = session.tree().column_of(pane) else {
            continue;
        };
        assert!(
            session.layer_count(pane) <= session.config().max_layers(column),
            "pane {pane} exceeds the {column} ceiling"
        );
    }
}

fn run(config: LayoutConfig, ops: &[Op]) -> LayoutSession {
    let mut session = LayoutSession::new(MemoryHost::new(), config);
    let mut counter = 0;
    for op in ops {
        apply(&mut session, op, &mut counter);
        assert_invariants(&session);
    }
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_preserve_layout_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        run(LayoutConfig::default(), &ops);
    }

    #[test]
    fn settling_twice_changes_nothing(
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let mut session = run(LayoutConfig::default(), &ops);
        let before = flex_snapshot(&session);
        let columns = column_snapshot(&session);
        session.notify_layout_changed(LayoutChangeReason::Unspecified);
        prop_assert_eq!(flex_snapshot(&session), before);
        prop_assert_eq!(column_snapshot(&session), columns);
    }

    #[test]
    fn layer_ceiling_holds_for_any_limit(
        limit in 1usize..=3,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let config = LayoutConfig {
            max_layers_left: limit,
            max_layers_center: limit,
            max_layers_right: limit,
            ..LayoutConfig::default()
        };
        let session = run(config, &ops);
        for pane in session.tree().all_panes() {
            prop_assert!(session.layer_count(pane) <= limit);
        }
    }
}

#[test]
fn restoring_every_hidden_tab_empties_the_list() {
    let mut session = LayoutSession::new(MemoryHost::new(), LayoutConfig::default());
    let pane = session
        .tree()
        .first_pane(ColumnLocation::Center)
        .expect("center pane");
    for index in 0..4 {
        let id = session
            .create_tab_from_content(TabContent::new(format!("#t{index}")), pane, None)
            .expect("tab created");
        session.hide_tab(id, None).expect("hidden");
    }
    assert_eq!(session.hidden_tabs().len(), 4);
    while let Some(source) = session.hidden_tabs().first().map(|h| h.source_id.clone()) {
        let pane = session
            .tree()
            .first_pane(ColumnLocation::Center)
            .expect("center pane");
        assert!(session.restore_hidden(&source, pane, 0).is_some());
        assert_invariants(&session);
    }
    assert_eq!(session.panels().count(), 4);
}

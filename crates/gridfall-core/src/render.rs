#![forbid(unsafe_code)]

//! Reply → DOM command planning.
//!
//! The web layer executes [`UiCommand`] lists verbatim and decides nothing;
//! everything the page does after a `/play` reply is planned here, against
//! the client's shadow of the last-rendered board. Only cells that actually
//! changed produce a [`UiCommand::SetCell`]; a shadow with different
//! dimensions (first attach, difficulty change) falls back to a full
//! repaint.
//!
//! Button enablement is deliberately absent from planning: the move
//! lifecycle machine in [`crate::flow`] owns it, and the executor translates
//! its actions into [`UiCommand::SetColumnsEnabled`]. One owner, no
//! double-toggles.

use serde::Serialize;

use crate::board::{BoardSnapshot, CellState};
use crate::protocol::MoveReply;

/// CSS class every grid cell carries.
pub const CELL_BASE_CLASS: &str = "cell";

/// Animation class applied to the landing cell; the executor removes it
/// again on `animationend`.
pub const DROP_ANIMATION_CLASS: &str = "anim-tombe";

/// Overlay text when the server ends the game without an outcome message.
pub const END_FALLBACK_MESSAGE: &str = "Partie terminée";

/// One DOM mutation, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiCommand {
    /// Update one cell's text mark and owner class.
    SetCell { row: u16, col: u16, state: CellState },
    /// Add the drop-in animation class to the landing cell.
    AnimateDrop { row: u16, col: u16 },
    /// Update the status line (whose turn it is).
    SetStatus { text: String },
    /// Show or clear the inverted-gravity hint.
    SetGravityHint { inverted: bool },
    /// Reveal the end-of-game overlay with the outcome text.
    ShowEndOverlay { message: String },
    /// Enable or disable every column button.
    SetColumnsEnabled { enabled: bool },
}

impl UiCommand {
    /// Encode this command as a stable JSON string (used for host traces).
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of planning one reply: the commands to execute and the new shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyPlan {
    pub commands: Vec<UiCommand>,
    pub board: BoardSnapshot,
}

/// Plan the DOM updates for an accepted reply.
///
/// `shadow` is the last-rendered board, or `None` on first render.
#[must_use]
pub fn plan_reply(shadow: Option<&BoardSnapshot>, reply: &MoveReply) -> ReplyPlan {
    let board = &reply.board;
    let full_repaint = shadow.is_none_or(|prev| prev.dims() != board.dims());

    let mut commands = Vec::new();
    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let state = board.get(row, col).unwrap_or_default();
            let changed = full_repaint
                || shadow.and_then(|prev| prev.get(row, col)) != Some(state);
            if changed {
                commands.push(UiCommand::SetCell { row, col, state });
            }
        }
    }

    if let Some((row, col)) = reply.landing {
        commands.push(UiCommand::AnimateDrop { row, col });
    }

    commands.push(UiCommand::SetGravityHint {
        inverted: reply.gravity_inverted,
    });

    if reply.game_over {
        let message = reply
            .message
            .clone()
            .unwrap_or_else(|| END_FALLBACK_MESSAGE.to_owned());
        commands.push(UiCommand::ShowEndOverlay { message });
    } else if let Some(message) = &reply.message {
        commands.push(UiCommand::SetStatus {
            text: message.clone(),
        });
    }

    ReplyPlan {
        commands,
        board: board.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Disc, WireCell};
    use crate::protocol::decode_reply;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn reply_from(body: &str) -> MoveReply {
        decode_reply(body).expect("fixture decodes")
    }

    fn set_cell_count(plan: &ReplyPlan) -> usize {
        plan.commands
            .iter()
            .filter(|cmd| matches!(cmd, UiCommand::SetCell { .. }))
            .count()
    }

    #[test]
    fn first_render_repaints_everything() {
        let reply = reply_from(r#"{"grille": [[0,0],[1,2]]}"#);
        let plan = plan_reply(None, &reply);
        assert_eq!(set_cell_count(&plan), 4);
    }

    #[test]
    fn second_render_emits_only_changed_cells() {
        let before = reply_from(r#"{"grille": [[0,0],[1,2]]}"#);
        let plan = plan_reply(None, &before);

        let after = reply_from(
            r#"{"grille": [[0,1],[1,2]], "derniereLigne": 0, "derniereCol": 1}"#,
        );
        let plan = plan_reply(Some(&plan.board), &after);
        assert_eq!(set_cell_count(&plan), 1);
        assert_eq!(
            plan.commands[0],
            UiCommand::SetCell {
                row: 0,
                col: 1,
                state: CellState::Taken(Disc::Red),
            }
        );
    }

    #[test]
    fn animate_drop_follows_its_set_cell() {
        let before = reply_from(r#"{"grille": [[0],[0]]}"#);
        let plan = plan_reply(None, &before);

        let after =
            reply_from(r#"{"grille": [[0],[1]], "derniereLigne": 1, "derniereCol": 0}"#);
        let plan = plan_reply(Some(&plan.board), &after);

        let cell_pos = plan
            .commands
            .iter()
            .position(|cmd| matches!(cmd, UiCommand::SetCell { row: 1, col: 0, .. }))
            .expect("set_cell present");
        let drop_pos = plan
            .commands
            .iter()
            .position(|cmd| matches!(cmd, UiCommand::AnimateDrop { row: 1, col: 0 }))
            .expect("animate_drop present");
        assert!(cell_pos < drop_pos);
    }

    #[test]
    fn dimension_change_forces_full_repaint() {
        let small = reply_from(r#"{"grille": [[0,0],[0,0]]}"#);
        let plan = plan_reply(None, &small);

        // Difficulty change: the next reply carries a wider grid.
        let wide = reply_from(r#"{"grille": [[0,0,0],[0,0,0]]}"#);
        let plan = plan_reply(Some(&plan.board), &wide);
        assert_eq!(set_cell_count(&plan), 6);
    }

    #[test]
    fn game_over_routes_message_to_overlay() {
        let reply = reply_from(
            r#"{"grille": [[1]], "finPartie": true, "message": "Victoire de Alice"}"#,
        );
        let plan = plan_reply(None, &reply);
        assert!(plan.commands.contains(&UiCommand::ShowEndOverlay {
            message: "Victoire de Alice".to_owned(),
        }));
        assert!(
            !plan
                .commands
                .iter()
                .any(|cmd| matches!(cmd, UiCommand::SetStatus { .. }))
        );
    }

    #[test]
    fn game_over_without_message_uses_fallback() {
        let reply = reply_from(r#"{"grille": [[1]], "finPartie": true}"#);
        let plan = plan_reply(None, &reply);
        assert!(plan.commands.contains(&UiCommand::ShowEndOverlay {
            message: END_FALLBACK_MESSAGE.to_owned(),
        }));
    }

    #[test]
    fn ongoing_game_routes_message_to_status() {
        let reply = reply_from(r#"{"grille": [[0]], "message": "À Alice de jouer"}"#);
        let plan = plan_reply(None, &reply);
        assert!(plan.commands.contains(&UiCommand::SetStatus {
            text: "À Alice de jouer".to_owned(),
        }));
    }

    #[test]
    fn planning_never_toggles_buttons() {
        let reply = reply_from(r#"{"grille": [[0]], "finPartie": true}"#);
        let plan = plan_reply(None, &reply);
        assert!(
            !plan
                .commands
                .iter()
                .any(|cmd| matches!(cmd, UiCommand::SetColumnsEnabled { .. }))
        );
    }

    #[test]
    fn command_json_is_js_friendly() {
        let cmd = UiCommand::SetCell {
            row: 1,
            col: 2,
            state: CellState::Taken(Disc::Red),
        };
        assert_eq!(
            cmd.to_json_string().expect("encode"),
            r#"{"kind":"set_cell","row":1,"col":2,"state":{"taken":"red"}}"#
        );
    }

    proptest! {
        #[test]
        fn set_cell_count_is_bounded_by_grid_size(
            rows in 1_usize..8,
            cols in 1_usize..10,
            fill in prop::collection::vec(0_i64..3, 0..80),
        ) {
            let mut idx = 0;
            let grid: Vec<Vec<WireCell>> = (0..rows)
                .map(|_| {
                    (0..cols)
                        .map(|_| {
                            let code = fill.get(idx).copied().unwrap_or(0);
                            idx += 1;
                            WireCell::Code(code)
                        })
                        .collect()
                })
                .collect();
            let board = crate::board::BoardSnapshot::from_wire(&grid).expect("decode");
            let reply = MoveReply {
                board,
                landing: None,
                game_over: false,
                current_player: None,
                gravity_inverted: false,
                message: None,
            };
            let plan = plan_reply(None, &reply);
            prop_assert_eq!(set_cell_count(&plan), rows * cols);

            // Replanning against the fresh shadow changes nothing.
            let replan = plan_reply(Some(&plan.board), &reply);
            prop_assert_eq!(set_cell_count(&replan), 0);
        }
    }
}

#![forbid(unsafe_code)]

//! Wire codec for the `/play` exchange.
//!
//! Field names follow the server exactly (`grille`, `derniereLigne`,
//! `finPartie`, …); this crate does not get to rename a protocol it only
//! consumes. Decoding is total: any input yields either a [`MoveReply`] or a
//! [`ProtocolError`], never a panic.
//!
//! Rejections are a separate path. The server writes `{"error": …}` while
//! older page code read a `message` key; [`decode_error_body`] accepts
//! either, falling back to the caller-supplied HTTP status line.

use serde::{Deserialize, Serialize};

use crate::board::{BoardDecodeError, BoardSnapshot, Disc, WireCell};

/// Endpoint the client POSTs each move to.
pub const PLAY_ENDPOINT: &str = "/play";

/// Content type for both the request body and the expected reply.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of `POST /play`.
///
/// The page buttons carry the column as a `data-col` attribute string; the
/// caller parses it to an integer first, because the server decodes an
/// integer field and rejects string payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub col: u16,
}

impl MoveRequest {
    /// Encode this request as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Raw reply shape as the server emits it.
#[derive(Debug, Deserialize)]
struct WireReply {
    grille: Vec<Vec<WireCell>>,
    #[serde(rename = "derniereLigne", default)]
    derniere_ligne: Option<i64>,
    #[serde(rename = "derniereCol", default)]
    derniere_col: Option<i64>,
    #[serde(rename = "finPartie", default)]
    fin_partie: bool,
    #[serde(rename = "joueurActuel", default)]
    joueur_actuel: Option<i64>,
    #[serde(rename = "gravityInverted", default)]
    gravity_inverted: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Decoded, validated `/play` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReply {
    /// Full grid snapshot after the move.
    pub board: BoardSnapshot,
    /// Landing cell of the accepted move, when the server names one.
    pub landing: Option<(u16, u16)>,
    /// Whether the game just ended (win or draw).
    pub game_over: bool,
    /// Whose turn it is now. `None` when the id is absent or not a player.
    pub current_player: Option<Disc>,
    /// The server flips gravity every few turns; replies carry the flag.
    pub gravity_inverted: bool,
    /// Human-readable status or outcome text.
    pub message: Option<String>,
}

/// Errors decoding a `/play` reply body.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Body is not JSON, or not the reply shape.
    Json(String),
    /// Grid present but undecodable.
    Board(BoardDecodeError),
    /// Landing coordinates outside the decoded grid.
    LandingOutOfBounds {
        row: i64,
        col: i64,
        rows: u16,
        cols: u16,
    },
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "reply is not valid JSON: {msg}"),
            Self::Board(err) => write!(f, "reply grid: {err}"),
            Self::LandingOutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(
                f,
                "landing cell ({row}, {col}) outside {rows}x{cols} grid"
            ),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardDecodeError> for ProtocolError {
    fn from(err: BoardDecodeError) -> Self {
        Self::Board(err)
    }
}

/// Decode and validate a `/play` reply body.
pub fn decode_reply(body: &str) -> Result<MoveReply, ProtocolError> {
    let wire: WireReply =
        serde_json::from_str(body).map_err(|err| ProtocolError::Json(err.to_string()))?;
    let board = BoardSnapshot::from_wire(&wire.grille)?;

    // The page only treated the landing cell as present when both halves
    // were; a lone coordinate is ignored, not an error.
    let landing = match (wire.derniere_ligne, wire.derniere_col) {
        (Some(row), Some(col)) => {
            let in_bounds = (0..i64::from(board.rows())).contains(&row)
                && (0..i64::from(board.cols())).contains(&col);
            if !in_bounds {
                return Err(ProtocolError::LandingOutOfBounds {
                    row,
                    col,
                    rows: board.rows(),
                    cols: board.cols(),
                });
            }
            Some((row as u16, col as u16))
        }
        _ => None,
    };

    let current_player = wire
        .joueur_actuel
        .and_then(|id| u8::try_from(id).ok())
        .and_then(Disc::from_player_id);

    Ok(MoveReply {
        board,
        landing,
        game_over: wire.fin_partie,
        current_player,
        gravity_inverted: wire.gravity_inverted,
        message: wire.message.filter(|m| !m.is_empty()),
    })
}

#[derive(Debug, Default, Deserialize)]
struct WireErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract a human-readable rejection message from an error body.
///
/// Infallible: non-JSON bodies and bodies with neither key fall back to
/// `fallback` (callers pass the HTTP status line).
#[must_use]
pub fn decode_error_body(body: &str, fallback: &str) -> String {
    let wire: WireErrorBody = serde_json::from_str(body).unwrap_or_default();
    wire.error
        .filter(|msg| !msg.is_empty())
        .or(wire.message.filter(|msg| !msg.is_empty()))
        .unwrap_or_else(|| fallback.to_owned())
}

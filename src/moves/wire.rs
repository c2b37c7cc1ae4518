//! Move encodings.
//!
//! ## JSON
//!
//! The exchanged move format is an array of single-key objects:
//!
//! ```text
//! {"setTurn": {"turnIndex": 0}}
//! {"endMatch": {"endMatchScores": [47, -47]}}
//! {"set": {"key": "type" | "board" | "deltas" | "trace" | "sorttype" | "tileN", "value": ...}}
//! {"setVisibility": {"key": "tileN", "visibleToPlayerIndices": [0] | null}}
//! {"shuffle": {"keys": ["tile0", "tile1", ...]}}
//! ```
//!
//! `null` visibility means visible to everyone. Boards are arrays of rows
//! with `-1` for empty cells.
//!
//! ## Binary
//!
//! [`Move::to_bytes`] and [`Move::from_bytes`] use bincode for compact
//! storage. The encoding is not versioned.

use serde_json::{Map, Value};
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::error::RuleError;
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::state::Visibility;
use crate::core::tile::TileId;

use super::operation::{Move, MoveKind, Operation, SortKind, StateField};

/// Errors decoding a move.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("move must be an array of operations")]
    NotAnArray,

    #[error("operation {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("invalid value: {0}")]
    Rule(#[from] RuleError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary error: {0}")]
    Binary(#[from] bincode::Error),
}

/// Encode a move in the JSON wire format.
pub fn to_wire(mv: &Move) -> Result<Value, WireError> {
    let operations = mv
        .operations()
        .iter()
        .map(operation_to_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(operations))
}

/// Decode a move from the JSON wire format.
pub fn from_wire(value: &Value) -> Result<Move, WireError> {
    let operations = value.as_array().ok_or(WireError::NotAnArray)?;
    let operations = operations
        .iter()
        .enumerate()
        .map(|(index, op)| operation_from_wire(index, op))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Move::from(operations))
}

impl Move {
    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a move written by [`Move::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

fn tagged(tag: &str, body: Map<String, Value>) -> Value {
    let mut outer = Map::new();
    outer.insert(tag.to_owned(), Value::Object(body));
    Value::Object(outer)
}

fn body<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

fn operation_to_wire(operation: &Operation) -> Result<Value, WireError> {
    let value = match operation {
        Operation::SetTurn(player) => tagged("setTurn", body([("turnIndex", Value::from(player.0))])),
        Operation::EndMatch(scores) => tagged(
            "endMatch",
            body([("endMatchScores", serde_json::to_value(scores)?)]),
        ),
        Operation::Set(field) => {
            let (key, value) = field_to_wire(field)?;
            tagged("set", body([("key", Value::String(key)), ("value", value)]))
        }
        Operation::SetVisibility(tile, visibility) => {
            let players = match visibility {
                Visibility::Everyone => Value::Null,
                Visibility::Players(players) => serde_json::to_value(players)?,
            };
            tagged(
                "setVisibility",
                body([
                    ("key", Value::String(tile.to_string())),
                    ("visibleToPlayerIndices", players),
                ]),
            )
        }
        Operation::Shuffle(keys) => {
            let keys = keys.iter().map(|key| Value::String(key.to_string())).collect();
            tagged("shuffle", body([("keys", Value::Array(keys))]))
        }
    };
    Ok(value)
}

fn field_to_wire(field: &StateField) -> Result<(String, Value), WireError> {
    let entry = match field {
        StateField::Type(kind) => ("type".to_owned(), Value::from(kind.name())),
        StateField::Board(board) => ("board".to_owned(), serde_json::to_value(board)?),
        StateField::Deltas(deltas) => ("deltas".to_owned(), serde_json::to_value(deltas)?),
        StateField::Trace(trace) => ("trace".to_owned(), serde_json::to_value(trace)?),
        StateField::SortType(kind) => ("sorttype".to_owned(), Value::from(kind.name())),
        StateField::Tile(id, tile) => (id.to_string(), serde_json::to_value(tile)?),
    };
    Ok(entry)
}

fn operation_from_wire(index: usize, op: &Value) -> Result<Operation, WireError> {
    let malformed = |reason: &str| WireError::Malformed {
        index,
        reason: reason.to_owned(),
    };
    let member = |payload: &Value, name: &str| -> Result<Value, WireError> {
        payload
            .get(name)
            .cloned()
            .ok_or_else(|| malformed(&format!("missing `{name}`")))
    };

    let (tag, payload) = match op.as_object() {
        Some(object) if object.len() == 1 => object
            .iter()
            .next()
            .ok_or_else(|| malformed("empty operation"))?,
        _ => return Err(malformed("expected an object with a single operation key")),
    };

    let operation = match tag.as_str() {
        "setTurn" => {
            let turn = member(payload, "turnIndex")?
                .as_u64()
                .and_then(|turn| u8::try_from(turn).ok())
                .ok_or_else(|| malformed("`turnIndex` must be a small non-negative integer"))?;
            Operation::SetTurn(PlayerId::new(turn))
        }
        "endMatch" => {
            let scores: Vec<i32> = serde_json::from_value(member(payload, "endMatchScores")?)?;
            Operation::EndMatch(PlayerMap::from(scores))
        }
        "set" => {
            let key = member(payload, "key")?;
            let key = key.as_str().ok_or_else(|| malformed("`key` must be a string"))?;
            Operation::Set(field_from_wire(key, member(payload, "value")?)?)
        }
        "setVisibility" => {
            let key = member(payload, "key")?;
            let tile = tile_key(key.as_str().ok_or_else(|| malformed("`key` must be a string"))?)?;
            let visibility = match member(payload, "visibleToPlayerIndices")? {
                Value::Null => Visibility::Everyone,
                players => Visibility::Players(serde_json::from_value::<SmallVec<[PlayerId; 4]>>(players)?),
            };
            Operation::SetVisibility(tile, visibility)
        }
        "shuffle" => {
            let keys = member(payload, "keys")?;
            let keys = keys
                .as_array()
                .ok_or_else(|| malformed("`keys` must be an array"))?
                .iter()
                .map(|key| {
                    key.as_str()
                        .ok_or_else(|| malformed("shuffle keys must be strings"))
                        .and_then(tile_key)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Operation::Shuffle(keys)
        }
        other => return Err(malformed(&format!("unknown operation `{other}`"))),
    };
    Ok(operation)
}

fn field_from_wire(key: &str, value: Value) -> Result<StateField, WireError> {
    let text = |value: &Value| -> Result<String, WireError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| WireError::UnknownKey(format!("{key} = {value}")))
    };

    let field = match key {
        "type" => StateField::Type(MoveKind::parse(&text(&value)?)?),
        "board" => StateField::Board(serde_json::from_value(value)?),
        "deltas" => StateField::Deltas(serde_json::from_value(value)?),
        "trace" => StateField::Trace(serde_json::from_value(value)?),
        "sorttype" => StateField::SortType(SortKind::parse(&text(&value)?)?),
        tile if tile.starts_with("tile") => {
            StateField::Tile(tile_key(tile)?, serde_json::from_value(value)?)
        }
        other => return Err(WireError::UnknownKey(other.to_owned())),
    };
    Ok(field)
}

fn tile_key(key: &str) -> Result<TileId, WireError> {
    let id = key
        .strip_prefix("tile")
        .and_then(|n| n.parse::<i32>().ok())
        .ok_or_else(|| WireError::UnknownKey(key.to_owned()))?;
    Ok(TileId::new(id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Position;
    use crate::core::delta::Delta;
    use crate::core::rng::Unshuffled;
    use crate::core::state::GameState;
    use crate::moves::Engine;
    use serde_json::json;

    fn dealt() -> (Engine, GameState) {
        let engine = Engine::default();
        let deal = engine.initial_move(PlayerId::new(0), 2).unwrap();
        let state = GameState::default().apply_move(&deal, &mut Unshuffled);
        (engine, state)
    }

    #[test]
    fn test_single_tile_move_wire_shape() {
        let (engine, state) = dealt();
        let tile = TileId::new(0).unwrap();
        let mv = engine
            .single_tile_move(
                PlayerId::new(0),
                &state,
                Delta::new(tile, Position::new(6, 0), Position::new(0, 0)),
            )
            .unwrap();

        let wire = to_wire(&mv).unwrap();
        let ops = wire.as_array().unwrap();
        assert_eq!(ops[0], json!({"setTurn": {"turnIndex": 0}}));
        assert_eq!(ops[1], json!({"set": {"key": "type", "value": "MOVE"}}));
        assert_eq!(ops[2]["set"]["value"][0][0], json!(0));
        assert_eq!(ops[2]["set"]["value"][6][0], json!(-1));
        assert_eq!(
            ops[3],
            json!({"set": {"key": "deltas", "value": [
                {"tileIndex": 0, "from": {"row": 6, "col": 0}, "to": {"row": 0, "col": 0}}
            ]}})
        );
        assert_eq!(
            ops[4],
            json!({"setVisibility": {"key": "tile0", "visibleToPlayerIndices": null}})
        );

        assert_eq!(from_wire(&wire).unwrap(), mv);
    }

    #[test]
    fn test_deal_wire_round_trip() {
        let engine = Engine::default();
        let deal = engine.initial_move(PlayerId::new(0), 3).unwrap();
        let wire = to_wire(&deal).unwrap();

        let ops = wire.as_array().unwrap();
        assert_eq!(
            ops[2],
            json!({"set": {"key": "trace", "value": {"nplayers": 3, "initial": [false, false, false], "nexttile": 42}}})
        );
        assert_eq!(
            ops[5],
            json!({"set": {"key": "tile0", "value": {"color": "blue", "score": 1}}})
        );
        assert_eq!(ops[111]["shuffle"]["keys"][105], json!("tile105"));
        assert_eq!(
            ops[112],
            json!({"setVisibility": {"key": "tile0", "visibleToPlayerIndices": [0]}})
        );

        assert_eq!(from_wire(&wire).unwrap(), deal);
    }

    #[test]
    fn test_sort_and_end_match_shapes() {
        let (engine, mut state) = dealt();
        let sort = engine.sort_move(PlayerId::new(0), &state, SortKind::Color).unwrap();
        let wire = to_wire(&sort).unwrap();
        assert_eq!(wire[2], json!({"set": {"key": "sorttype", "value": "color"}}));

        state.trace.next_tile = 105;
        let pick = engine.pick_move(PlayerId::new(0), &state).unwrap();
        let wire = to_wire(&pick).unwrap();
        assert_eq!(wire[0], json!({"endMatch": {"endMatchScores": [0, 0]}}));
        assert_eq!(from_wire(&wire).unwrap(), pick);
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(from_wire(&json!({"set": {}})), Err(WireError::NotAnArray)));
        assert!(matches!(
            from_wire(&json!([{"setTurn": {"turnIndex": 0}, "set": {}}])),
            Err(WireError::Malformed { index: 0, .. })
        ));
        assert!(matches!(
            from_wire(&json!([{"setTurn": {"turnIndex": 0}}, {"jump": {}}])),
            Err(WireError::Malformed { index: 1, .. })
        ));
        assert!(matches!(
            from_wire(&json!([{"set": {"key": "type", "value": "SEND"}}])),
            Err(WireError::Rule(_))
        ));
        assert!(matches!(
            from_wire(&json!([{"set": {"key": "colour", "value": 1}}])),
            Err(WireError::UnknownKey(_))
        ));
        assert!(matches!(
            from_wire(&json!([{"setVisibility": {"key": "tile106", "visibleToPlayerIndices": null}}])),
            Err(WireError::Rule(_))
        ));
        assert!(matches!(
            from_wire(&json!([{"set": {"key": "board", "value": [[107]]}}])),
            Err(WireError::Json(_))
        ));
    }

    #[test]
    fn test_binary_round_trip() {
        let (engine, state) = dealt();
        let pick = engine.pick_move(PlayerId::new(0), &state).unwrap();

        let bytes = pick.to_bytes().unwrap();
        assert_eq!(Move::from_bytes(&bytes).unwrap(), pick);
        assert!(Move::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}

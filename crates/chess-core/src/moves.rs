use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::PieceType;
use crate::position::Position;

/// A move from one square to another, with the promotion choice for pawns
/// reaching the back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub start_position: Position,
    pub end_position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_piece: Option<PieceType>,
}

impl Move {
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start_position: start,
            end_position: end,
            promotion_piece: None,
        }
    }

    pub const fn promoting(start: Position, end: Position, promotion: PieceType) -> Self {
        Self {
            start_position: start,
            end_position: end,
            promotion_piece: Some(promotion),
        }
    }
}

/// Coordinate notation, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start_position, self.end_position)?;
        if let Some(promotion) = self.promotion_piece {
            write!(f, "{}", promotion.letter())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mv = Move::new("e2".parse().unwrap(), "e4".parse().unwrap());
        assert_eq!(mv.to_string(), "e2e4");
        let promo = Move::promoting("e7".parse().unwrap(), "e8".parse().unwrap(), PieceType::Queen);
        assert_eq!(promo.to_string(), "e7e8q");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::json!({
            "startPosition": { "row": 7, "col": 1 },
            "endPosition": { "row": 8, "col": 1 },
            "promotionPiece": "KNIGHT"
        });
        let mv: Move = serde_json::from_value(json).unwrap();
        assert_eq!(mv, Move::promoting(Position::new(7, 1), Position::new(8, 1), PieceType::Knight));

        let plain: Move = serde_json::from_value(serde_json::json!({
            "startPosition": { "row": 2, "col": 1 },
            "endPosition": { "row": 3, "col": 1 }
        }))
        .unwrap();
        assert_eq!(plain.promotion_piece, None);
        let back = serde_json::to_value(plain).unwrap();
        assert!(back.get("promotionPiece").is_none());
    }
}

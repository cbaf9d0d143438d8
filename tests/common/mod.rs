#![allow(dead_code)]

use chess_core::{Board, Color, Game, Move, Piece, PieceType, Position};
use reqwest::Client;
use server::config::Config;
use server::AppState;

/// A server bound to an ephemeral port for the duration of a test.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = AppState::in_memory(Config::for_tests());
        let app = server::build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server crashed");
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// `"e2e4"` / `"e7e8q"` in coordinate notation.
pub fn mv(text: &str) -> Move {
    let from: Position = text[0..2].parse().expect("bad from square");
    let to: Position = text[2..4].parse().expect("bad to square");
    match text[4..].chars().next() {
        Some(c) => Move::promoting(from, to, PieceType::from_letter(c).expect("bad promotion")),
        None => Move::new(from, to),
    }
}

/// Board from the placement field of a FEN string.
pub fn board_from_fen(placement: &str) -> Board {
    let mut board = Board::new();
    for (i, rank) in placement.split('/').enumerate() {
        let row = 8 - i as u8;
        let mut col = 1u8;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip as u8;
                continue;
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let kind = PieceType::from_letter(c).expect("bad piece letter");
            board.add_piece(Position::new(row, col), Piece::new(color, kind));
            col += 1;
        }
    }
    board
}

/// FEN for `game` with no castling rights and no en passant square.
pub fn to_fen(game: &Game) -> String {
    let mut ranks = Vec::new();
    for row in (1..=8).rev() {
        let mut rank = String::new();
        let mut empty = 0;
        for col in 1..=8 {
            match game.board().get(Position::new(row, col)) {
                Some(piece) => {
                    if empty > 0 {
                        rank.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let letter = piece.kind.letter();
                    rank.push(match piece.color {
                        Color::White => letter.to_ascii_uppercase(),
                        Color::Black => letter,
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            rank.push_str(&empty.to_string());
        }
        ranks.push(rank);
    }
    let side = match game.turn() {
        Color::White => "w",
        Color::Black => "b",
    };
    format!("{} {side} - - 0 1", ranks.join("/"))
}

/// Every legal move for the side to move.
pub fn all_legal_moves(game: &Game) -> Vec<Move> {
    Position::all()
        .filter(|&pos| matches!(game.board().get(pos), Some(p) if p.color == game.turn()))
        .flat_map(|pos| game.legal_moves(pos))
        .collect()
}

//! Ratatui widgets: own board with the active piece overlaid, a sidebar
//! with score and next-piece preview, and one mini-board per opponent. Purely a view of the
//! reconciled session snapshot; colors are a rendering concern and
//! never cross the wire.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use block_battle::{
    ClientSession,
    entities::{BOARD_HEIGHT, BOARD_WIDTH, Board, Piece, PlayerState, Position},
};

pub fn draw(frame: &mut Frame, session: &ClientSession) {
    let [board_area, side_area] = Layout::horizontal([
        Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
        Constraint::Min(24),
    ])
    .areas(frame.area());

    let board = Paragraph::new(make_board_lines(
        &session.board,
        session.current_piece.as_ref(),
        session.position,
    ))
    .block(Block::bordered().title(session.nickname.clone()));
    frame.render_widget(board, board_area);

    draw_sidebar(frame, side_area, session);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, session: &ClientSession) {
    let mut constraints = vec![Constraint::Length(4), Constraint::Length(4)];
    constraints.extend(
        session
            .other_players
            .iter()
            .map(|_| Constraint::Length(BOARD_HEIGHT as u16 / 2 + 3)),
    );
    constraints.push(Constraint::Min(0));
    let areas = Layout::vertical(constraints).split(area);

    frame.render_widget(make_status(session), areas[0]);

    let preview = Paragraph::new(make_preview_lines(session.next_piece.as_ref()))
        .block(Block::bordered().title("next"));
    frame.render_widget(preview, areas[1]);

    // Stable ordering so opponents don't jump around between ticks.
    let mut opponents: Vec<(&String, &PlayerState)> = session.other_players.iter().collect();
    opponents.sort_by_key(|(id, _)| id.as_str());
    for (i, (id, state)) in opponents.iter().enumerate() {
        let mini = Paragraph::new(make_mini_board_lines(&state.board))
            .block(Block::bordered().title(format!("{id}: {}", state.score)));
        frame.render_widget(mini, areas[i + 2]);
    }
}

fn make_status(session: &ClientSession) -> Paragraph<'static> {
    let mut lines = vec![Line::from(format!("score: {}", session.score))];
    if session.game_over {
        lines.push(Line::from(Span::styled(
            "GAME OVER",
            Style::default().light_red().bold(),
        )));
    }
    if let Some(error) = &session.last_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().light_yellow(),
        )));
    }
    Paragraph::new(lines).block(Block::bordered().title("status"))
}

fn make_board_lines(
    board: &Board,
    piece: Option<&Piece>,
    position: Option<Position>,
) -> Vec<Line<'static>> {
    (0..BOARD_HEIGHT as i32)
        .map(|row| {
            let spans = (0..BOARD_WIDTH as i32)
                .map(|col| {
                    let cell = cell_with_overlay(board, piece, position, row, col);
                    if cell == 0 {
                        Span::raw(" .")
                    } else {
                        Span::styled("██", Style::default().fg(cell_color(cell)))
                    }
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

/// The upcoming piece's shape, or nothing while the server has yet to
/// assign one.
fn make_preview_lines(piece: Option<&Piece>) -> Vec<Line<'static>> {
    let Some(piece) = piece else {
        return Vec::new();
    };
    piece
        .shape
        .iter()
        .map(|row| {
            let spans = row
                .iter()
                .map(|&cell| {
                    if cell == 0 {
                        Span::raw("  ")
                    } else {
                        Span::styled("██", Style::default().fg(cell_color(piece.block_type)))
                    }
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

/// Two board rows per text line keeps opponent mirrors compact.
fn make_mini_board_lines(board: &Board) -> Vec<Line<'static>> {
    (0..BOARD_HEIGHT)
        .step_by(2)
        .map(|row| {
            let spans = (0..BOARD_WIDTH)
                .map(|col| {
                    let top = board.row(row)[col];
                    let bottom = board.row(row + 1)[col];
                    let glyph = match (top != 0, bottom != 0) {
                        (true, true) => "█",
                        (true, false) => "▀",
                        (false, true) => "▄",
                        (false, false) => " ",
                    };
                    let cell = if top != 0 { top } else { bottom };
                    if cell == 0 {
                        Span::raw(glyph)
                    } else {
                        Span::styled(glyph, Style::default().fg(cell_color(cell)))
                    }
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

/// The frozen cell value, or the active piece's block type where it
/// overlaps (row, col).
fn cell_with_overlay(
    board: &Board,
    piece: Option<&Piece>,
    position: Option<Position>,
    row: i32,
    col: i32,
) -> u8 {
    if let (Some(piece), Some(position)) = (piece, position) {
        let dy = row - position.row;
        let dx = col - position.col;
        if dy >= 0 && dx >= 0 {
            if let Some(&cell) = piece
                .shape
                .get(dy as usize)
                .and_then(|shape_row| shape_row.get(dx as usize))
            {
                if cell != 0 {
                    return piece.block_type;
                }
            }
        }
    }
    board.get(row, col).unwrap_or(0)
}

fn cell_color(cell: u8) -> Color {
    match cell {
        1 => Color::Cyan,
        2 => Color::Yellow,
        3 => Color::Magenta,
        4 => Color::LightRed,
        5 => Color::Blue,
        6 => Color::Green,
        7 => Color::Red,
        _ => Color::White,
    }
}

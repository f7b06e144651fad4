use crate::state::Position;

/// Bresenham cell sequence from `start` to `end`, both included.
///
/// Passability is not checked here.
pub fn line_path(start: Position, end: Position) -> Vec<Position> {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity(start.distance(end) as usize + 1);
    let mut current = start;
    let mut err = dx + dy;

    loop {
        cells.push(current);
        if current == end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            current.x += sx;
        }
        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_line() {
        let p = Position::new(2, 3);
        assert_eq!(line_path(p, p), vec![p]);
    }

    #[test]
    fn diagonal_line() {
        let cells = line_path(Position::new(0, 0), Position::new(3, 3));
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(1, 1),
                Position::new(2, 2),
                Position::new(3, 3)
            ]
        );
    }

    #[test]
    fn shallow_line_has_one_cell_per_column() {
        let cells = line_path(Position::new(0, 0), Position::new(6, 2));
        assert_eq!(cells.len(), 7);
        assert_eq!(cells.first(), Some(&Position::new(0, 0)));
        assert_eq!(cells.last(), Some(&Position::new(6, 2)));
        for pair in cells.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1);
        }
    }

    #[test]
    fn reversed_line_mirrors_endpoints() {
        let cells = line_path(Position::new(5, 1), Position::new(0, 4));
        assert_eq!(cells.first(), Some(&Position::new(5, 1)));
        assert_eq!(cells.last(), Some(&Position::new(0, 4)));
        assert_eq!(cells.len(), 6);
    }
}

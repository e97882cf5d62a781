use std::f32::consts::{FRAC_PI_2, PI};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Right,
    Left,
    Down,
    Up,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

    /// `(dx, dy)` where x follows columns and y follows rows.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Right => (1, 0),
            Dir::Left => (-1, 0),
            Dir::Down => (0, 1),
            Dir::Up => (0, -1),
        }
    }

    pub fn angle(self) -> f32 {
        match self {
            Dir::Right => 0.0,
            Dir::Left => PI,
            Dir::Down => FRAC_PI_2,
            Dir::Up => -FRAC_PI_2,
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Right => Dir::Left,
            Dir::Left => Dir::Right,
            Dir::Down => Dir::Up,
            Dir::Up => Dir::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_negates_delta() {
        for dir in Dir::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(dir.reverse().delta(), (-dx, -dy));
            assert_eq!(dir.reverse().reverse(), dir);
        }
    }

    #[test]
    fn angle_points_along_delta() {
        for dir in Dir::ALL {
            let (dx, dy) = dir.delta();
            assert!((dir.angle().cos() - dx as f32).abs() < 1e-6);
            assert!((dir.angle().sin() - dy as f32).abs() < 1e-6);
        }
    }
}

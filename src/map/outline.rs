use std::fmt;

use geo::{Coord, LineString};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Coord),
    LineTo(Coord),
    Close,
}

/// Vector path tracing one or more rings, one closed subpath per ring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOutline {
    commands: Vec<PathCommand>,
}

impl PathOutline {
    pub fn from_ring(ring: &LineString) -> Self {
        Self::from_rings(std::iter::once(ring))
    }

    /// Move to the first point of each ring, line to every following point, then close the subpath.
    /// Empty rings are skipped.
    pub fn from_rings<'a>(rings: impl IntoIterator<Item = &'a LineString>) -> Self {
        let mut commands = Vec::new();
        for ring in rings {
            let mut coords = ring.coords();
            let first = match coords.next() {
                Some(first) => *first,
                None => continue,
            };
            commands.push(PathCommand::MoveTo(first));
            commands.extend(coords.map(|coord| PathCommand::LineTo(*coord)));
            commands.push(PathCommand::Close);
        }
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// SVG path data, e.g. `M0,0L0,1L1,1Z`.
impl fmt::Display for PathOutline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            match command {
                PathCommand::MoveTo(coord) => write!(f, "M{},{}", coord.x, coord.y)?,
                PathCommand::LineTo(coord) => write!(f, "L{},{}", coord.x, coord.y)?,
                PathCommand::Close => write!(f, "Z")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geo::{coord, LineString};

    use super::{PathCommand, PathOutline};

    fn unit_square() -> LineString {
        vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)].into()
    }

    #[test]
    fn test_outline_from_closed_ring() {
        let outline = PathOutline::from_ring(&unit_square());
        let commands = outline.commands();

        assert_eq!(6, commands.len());
        assert_eq!(
            PathCommand::MoveTo(coord! { x: 0.0, y: 0.0 }),
            commands[0]
        );
        assert_eq!(
            PathCommand::LineTo(coord! { x: 0.0, y: 0.0 }),
            commands[4]
        );
        assert_eq!(Some(&PathCommand::Close), commands.last());
    }

    #[test]
    fn test_outline_svg_path_data() {
        let outline = PathOutline::from_ring(&unit_square());
        assert_eq!("M0,0L0,1L1,1L1,0L0,0Z", outline.to_string());
    }

    #[test]
    fn test_outline_with_several_rings_has_one_subpath_each() {
        let second: LineString =
            vec![(26.5, 63.0), (26.5, 63.5), (27.25, 63.5), (26.5, 63.0)].into();
        let outline = PathOutline::from_rings([&unit_square(), &LineString::new(vec![]), &second]);

        assert_eq!(
            "M0,0L0,1L1,1L1,0L0,0ZM26.5,63L26.5,63.5L27.25,63.5L26.5,63Z",
            outline.to_string()
        );
        let closes = outline
            .commands()
            .iter()
            .filter(|command| **command == PathCommand::Close)
            .count();
        assert_eq!(2, closes);
    }
}

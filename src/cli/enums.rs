//! CLI value types: click mode and point arguments.

use clap::ValueEnum;

use clickloop::action::parse_delay;
use clickloop::ClickMode;

/// How points are clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Every point on its own timer
    #[default]
    Parallel,
    /// One point at a time, in order
    Sequential,
}

impl From<Mode> for ClickMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Parallel => ClickMode::Parallel,
            Mode::Sequential => ClickMode::Sequential,
        }
    }
}

/// A point given on the command line as `X,Y` or `X,Y,DELAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointArg {
    pub x: i32,
    pub y: i32,
    pub delay_ms: Option<i64>,
}

/// Parse `X,Y[,DELAY]` where DELAY is milliseconds or `1h2m3s`.
pub fn parse_point(s: &str) -> Result<PointArg, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(format!(
            "Invalid point '{}'. Use X,Y or X,Y,DELAY (e.g., 640,360,500)",
            s
        ));
    }
    let x: i32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid x coordinate '{}' in point", parts[0]))?;
    let y: i32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid y coordinate '{}' in point", parts[1]))?;
    let delay_ms = match parts.get(2) {
        Some(delay) => Some(parse_delay(delay)?),
        None => None,
    };
    Ok(PointArg { x, y, delay_ms })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_without_delay() {
        assert_eq!(
            parse_point("640,360"),
            Ok(PointArg {
                x: 640,
                y: 360,
                delay_ms: None
            })
        );
    }

    #[test]
    fn test_parse_point_with_delay() {
        assert_eq!(parse_point("1, 2, 500").unwrap().delay_ms, Some(500));
        assert_eq!(parse_point("1,2,1m").unwrap().delay_ms, Some(60_000));
    }

    #[test]
    fn test_parse_point_negative_coordinates() {
        let point = parse_point("-1920,10").unwrap();
        assert_eq!(point.x, -1920);
    }

    #[test]
    fn test_parse_point_errors() {
        assert!(parse_point("1").is_err());
        assert!(parse_point("1,2,3,4").is_err());
        assert!(parse_point("a,2").is_err());
        assert!(parse_point("1,b").is_err());
        assert!(parse_point("1,2,soon").is_err());
    }

    #[test]
    fn test_mode_into_click_mode() {
        assert_eq!(ClickMode::from(Mode::Parallel), ClickMode::Parallel);
        assert_eq!(ClickMode::from(Mode::Sequential), ClickMode::Sequential);
    }
}

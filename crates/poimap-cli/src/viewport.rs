//! Parsing of viewport events read from stdin.
//!
//! Each line is either `sw_lat sw_lng ne_lat ne_lng zoom` (whitespace or
//! comma separated), `clear` to drop the session cache, or blank.

use anyhow::{bail, Context, Result};

use poimap_core::BoundingBox;

#[derive(Debug, PartialEq)]
pub enum InputLine {
    Viewport { bounds: BoundingBox, zoom: f64 },
    ClearCache,
    Blank,
}

pub fn parse_line(line: &str) -> Result<InputLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(InputLine::Blank);
    }
    if line.eq_ignore_ascii_case("clear") {
        return Ok(InputLine::ClearCache);
    }

    let values = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let value = part
                .parse::<f64>()
                .with_context(|| format!("Invalid number '{}'", part))?;
            if !value.is_finite() {
                bail!("Non-finite number '{}'", part);
            }
            Ok(value)
        })
        .collect::<Result<Vec<f64>>>()?;

    match values.as_slice() {
        [sw_lat, sw_lng, ne_lat, ne_lng, zoom] => Ok(InputLine::Viewport {
            bounds: BoundingBox::from_coords(*sw_lat, *sw_lng, *ne_lat, *ne_lng),
            zoom: *zoom,
        }),
        _ => bail!(
            "Expected 'sw_lat sw_lng ne_lat ne_lng zoom', got {} values",
            values.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport_line() {
        let parsed = parse_line("40.5 -71.0 42.0 -69.5 6").expect("valid line");
        assert_eq!(
            parsed,
            InputLine::Viewport {
                bounds: BoundingBox::from_coords(40.5, -71.0, 42.0, -69.5),
                zoom: 6.0,
            }
        );

        // Commas work as separators too
        let parsed = parse_line("40.5, -71.0, 42.0, -69.5, 7.5").expect("valid line");
        assert!(matches!(parsed, InputLine::Viewport { zoom, .. } if zoom == 7.5));
    }

    #[test]
    fn test_parse_commands_and_blanks() {
        assert_eq!(parse_line("clear").expect("clear"), InputLine::ClearCache);
        assert_eq!(parse_line("  CLEAR ").expect("clear"), InputLine::ClearCache);
        assert_eq!(parse_line("").expect("blank"), InputLine::Blank);
        assert_eq!(parse_line("# comment").expect("comment"), InputLine::Blank);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("40.5 -71.0 42.0").is_err());
        assert!(parse_line("40.5 -71.0 42.0 north 6").is_err());
        assert!(parse_line("40.5 -71.0 42.0 -69.5 NaN").is_err());
        assert!(parse_line("40.5 -71.0 inf -69.5 6").is_err());
    }
}

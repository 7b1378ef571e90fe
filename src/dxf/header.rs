//! HEADER section: `(9, $NAME)` groups each followed by a scalar value or a
//! 10/20/30 point. A variable is committed when the next `(9, ...)` or the
//! ENDSEC arrives, so a name with no value groups is dropped.

use std::collections::HashMap;

use tracing::debug;

use crate::core::result::Result;
use crate::document::{HeaderValue, Point};
use crate::dxf::ParseRun;

impl ParseRun<'_, '_> {
    pub(crate) fn parse_header(&mut self) -> Result<HashMap<String, HeaderValue>> {
        let mut header = HashMap::new();
        let mut name: Option<String> = None;
        let mut value: Option<HeaderValue> = None;

        loop {
            let curr = self.scanner.next()?;
            if curr.is(0, "ENDSEC") {
                flush(&mut header, &mut name, &mut value);
                break;
            }
            match curr.code {
                9 => {
                    flush(&mut header, &mut name, &mut value);
                    name = Some(curr.string());
                }
                10 => value = Some(HeaderValue::Point(Point::new(curr.float(), 0.0))),
                20 => match value.as_mut() {
                    Some(HeaderValue::Point(point)) => point.y = curr.float(),
                    _ => debug!(code = 20, "y-coordinate without a pending point"),
                },
                30 => match value.as_mut() {
                    Some(HeaderValue::Point(point)) => point.z = Some(curr.float()),
                    _ => debug!(code = 30, "z-coordinate without a pending point"),
                },
                _ => value = Some(HeaderValue::from(curr.value.clone())),
            }
        }
        Ok(header)
    }
}

fn flush(
    header: &mut HashMap<String, HeaderValue>,
    name: &mut Option<String>,
    value: &mut Option<HeaderValue>,
) {
    match (name.take(), value.take()) {
        (Some(name), Some(value)) => {
            header.insert(name, value);
        }
        (Some(name), None) => debug!(variable = %name, "header variable without a value"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::document::{HeaderValue, Point};
    use crate::dxf::Parser;

    #[test]
    fn scalars_and_points() {
        let source = "0\nSECTION\n2\nHEADER\n\
                      9\n$ACADVER\n1\nAC1027\n\
                      9\n$INSUNITS\n70\n4\n\
                      9\n$EXTMIN\n10\n-1.5\n20\n-2.5\n30\n0.0\n\
                      9\n$LTSCALE\n40\n0.5\n\
                      0\nENDSEC\n0\nEOF\n";
        let document = Parser::new().parse_str(source).unwrap();
        assert_eq!(
            document.header.get("$ACADVER"),
            Some(&HeaderValue::Str("AC1027".into()))
        );
        assert_eq!(document.header.get("$INSUNITS"), Some(&HeaderValue::Int(4)));
        assert_eq!(
            document.header.get("$EXTMIN"),
            Some(&HeaderValue::Point(Point::with_z(-1.5, -2.5, 0.0)))
        );
        assert_eq!(
            document.header.get("$LTSCALE"),
            Some(&HeaderValue::Float(0.5))
        );
    }

    #[test]
    fn valueless_variable_is_dropped() {
        let source =
            "0\nSECTION\n2\nHEADER\n9\n$EMPTY\n9\n$OK\n70\n1\n0\nENDSEC\n0\nEOF\n";
        let document = Parser::new().parse_str(source).unwrap();
        assert!(!document.header.contains_key("$EMPTY"));
        assert_eq!(document.header.get("$OK"), Some(&HeaderValue::Int(1)));
    }
}

// Board presentation. Produces the SVG blob sent as the `board` payload;
// clients drop it into the page as-is. Movement never looks at any of this.

use std::fmt::Write;

use msgs::{color::Color, coord::Coord};

use crate::board::{self, Board};

const FILLS: [&str; 3] = ["#ff0000", "#00ff00", "#0000ff"];

/// Is the triangle at this coordinate pointing down?
pub fn is_down(coord: Coord) -> bool {
    (coord.x + coord.y).rem_euclid(2) == 0
}

/// Converts triangular to cartesian coordinates.
pub fn to_cartesian(coord: Coord) -> (f64, f64) {
    (f64::from(coord.x) / 2.0, f64::from(coord.y) / 2.0 * 3f64.sqrt())
}

pub fn board_svg(board: &Board) -> String {
    let mut svg = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#, "\n",
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="1000" viewBox="-5 -5 10 10">"#, "\n",
        "  <style>\n",
        "    polygon {\n",
        "      stroke: black;\n",
        "      stroke-width: 0.07;\n",
        "      stroke-linejoin: round;\n",
        "    }\n",
        "  </style>\n",
        "  <defs>\n",
        r#"    <polygon id="down-triangle" points="0,0 1,0 0.5,0.866"/>"#, "\n",
        r#"    <polygon id="up-triangle" points="0.5,0 0,0.866 1,0.866"/>"#, "\n",
        "  </defs>\n",
    ));

    for coord in board::cells() {
        let href = if is_down(coord) { "#down-triangle" } else { "#up-triangle" };
        let fill = board.get(coord).map_or("none", fill_for);
        let (cx, cy) = to_cartesian(coord);
        let _ = writeln!(
            svg,
            r#"  <use href="{href}" transform="translate({cx},{cy})" fill="{fill}" data-x="{}" data-y="{}"/>"#,
            coord.x, coord.y,
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn fill_for(color: Color) -> &'static str {
    FILLS[color.index()]
}

//! Debug rendering of a routed connector as a standalone SVG document.

use std::io::Write;

use itertools::Itertools;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::edit::{EditedPath, FixedSegment};
use crate::errors::{Error, Result};
use crate::geometry::{BoundingBox, BoundingBoxBuilder, Point};
use crate::shapes::Shape;

/// Space around the drawing, in user units
const BORDER: f64 = 10.;

/// Return a 'minimal' representation of the given number
fn fstr(x: f64) -> String {
    if x == (x as i64) as f64 {
        return (x as i64).to_string();
    }
    let result = format!("{x:.3}");
    if result.contains('.') {
        result.trim_end_matches('0').trim_end_matches('.').into()
    } else {
        result
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fstr(p.x), fstr(p.y)))
        .join(" ")
}

fn extent(shapes: &[Shape], points: &[Point]) -> BoundingBox {
    let mut builder = BoundingBoxBuilder::new();
    for shape in shapes {
        builder.extend(shape.world_bounds());
    }
    for p in points {
        builder.extend(BoundingBox::around(*p, 0.));
    }
    let mut bbox = builder.build().unwrap_or(BoundingBox::new(0., 0., 0., 0.));
    bbox.expand(BORDER, BORDER);
    bbox
}

fn shape_element(shape: &Shape) -> BytesStart<'static> {
    let b = &shape.bounds;
    let mut el = BytesStart::new("rect").with_attributes([
        ("id", shape.id.as_str()),
        ("x", fstr(b.x1).as_str()),
        ("y", fstr(b.y1).as_str()),
        ("width", fstr(b.width()).as_str()),
        ("height", fstr(b.height()).as_str()),
        ("fill", "none"),
        ("stroke", "gray"),
    ]);
    if shape.rotation != 0. {
        let c = b.center();
        let transform = format!(
            "rotate({} {} {})",
            fstr(shape.rotation.to_degrees()),
            fstr(c.x),
            fstr(c.y)
        );
        el.push_attribute(("transform", transform.as_str()));
    }
    el.into_owned()
}

fn fixed_element(seg: &FixedSegment) -> BytesStart<'static> {
    BytesStart::new("line")
        .with_attributes([
            ("x1", fstr(seg.start.x).as_str()),
            ("y1", fstr(seg.start.y).as_str()),
            ("x2", fstr(seg.end.x).as_str()),
            ("y2", fstr(seg.end.y).as_str()),
            ("stroke", "orange"),
            ("stroke-width", "3"),
            ("stroke-opacity", "0.6"),
        ])
        .into_owned()
}

/// Write an SVG document showing the shapes, the path and its pinned
/// segments.
pub fn write_svg(writer: &mut dyn Write, shapes: &[Shape], path: &EditedPath) -> Result<()> {
    let bbox = extent(shapes, &path.points);
    let view_box = format!(
        "{} {} {} {}",
        fstr(bbox.x1),
        fstr(bbox.y1),
        fstr(bbox.width()),
        fstr(bbox.height())
    );
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    let svg = BytesStart::new("svg").with_attributes([
        ("xmlns", "http://www.w3.org/2000/svg"),
        ("viewBox", view_box.as_str()),
    ]);
    writer.write_event(Event::Start(svg)).map_err(Error::from_err)?;
    for shape in shapes {
        writer
            .write_event(Event::Empty(shape_element(shape)))
            .map_err(Error::from_err)?;
    }
    for seg in &path.fixed_segments {
        writer
            .write_event(Event::Empty(fixed_element(seg)))
            .map_err(Error::from_err)?;
    }
    let connector = BytesStart::new("polyline").with_attributes([
        ("points", points_attr(&path.points).as_str()),
        ("fill", "none"),
        ("stroke", "black"),
    ]);
    writer
        .write_event(Event::Empty(connector))
        .map_err(Error::from_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("svg")))
        .map_err(Error::from_err)?;
    Ok(())
}

pub fn render_svg(shapes: &[Shape], path: &EditedPath) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    write_svg(&mut out, shapes, path)?;
    String::from_utf8(out).map_err(Error::from_err)
}

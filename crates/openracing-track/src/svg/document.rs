//! Outline extraction from SVG documents.
//!
//! Only what a track map needs: `<path d>`, `<polygon points>` and
//! `<polyline points>`, positioned by nested group transforms and the root
//! viewport. Anything inside `<defs>`, `<clipPath>`, `<mask>`, `<symbol>` or
//! `<pattern>` is not drawn and is skipped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use super::path_data::{NumberLexer, PathData};
use super::transform::Affine;
use crate::error::{Result, TrackError};
use crate::point::Point2;

/// Outlines found in one document, in document order, already in document
/// (root viewport) coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgDocument {
    outlines: Vec<PathData>,
}

impl SvgDocument {
    /// Parse `text` and collect every drawable outline.
    ///
    /// Elements with malformed geometry or an unparsable `transform` are
    /// skipped with a warning, the latter together with their children.
    ///
    /// # Errors
    ///
    /// [`TrackError::Xml`] if the markup is not well formed and
    /// [`TrackError::NoOutline`] if no usable outline was found.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        // transform in effect for children of each open element
        let mut stack: Vec<Affine> = Vec::new();
        let mut hidden_depth: Option<usize> = None;
        let mut outlines = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) => {
                    let parent = stack.last().copied();
                    let inherited = parent.unwrap_or(Affine::IDENTITY);
                    let ctm = if hidden_depth.is_some() {
                        inherited
                    } else if let Some(ctm) = usable_ctm(&element, parent)? {
                        ctm
                    } else {
                        // drop the whole subtree, keep the stack balanced
                        hidden_depth = Some(stack.len());
                        inherited
                    };
                    if hidden_depth.is_none() && is_hidden_container(local_name(&element)) {
                        hidden_depth = Some(stack.len());
                    }
                    if hidden_depth.is_none() {
                        collect_outline(&element, &ctm, &mut outlines)?;
                    }
                    stack.push(ctm);
                }
                Event::Empty(element) => {
                    if hidden_depth.is_none()
                        && let Some(ctm) = usable_ctm(&element, stack.last().copied())?
                    {
                        collect_outline(&element, &ctm, &mut outlines)?;
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if hidden_depth.is_some_and(|depth| stack.len() <= depth) {
                        hidden_depth = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if outlines.is_empty() {
            return Err(TrackError::NoOutline);
        }
        debug!(outlines = outlines.len(), "SVG outlines extracted");
        Ok(Self { outlines })
    }

    /// One path per outline element.
    pub fn outlines(&self) -> &[PathData] {
        &self.outlines
    }

    /// All outlines as one path.
    pub fn union(&self) -> PathData {
        let mut union = PathData::new();
        for outline in &self.outlines {
            union.extend(outline);
        }
        union
    }
}

/// Element name without any namespace prefix.
fn local_name<'e>(element: &'e BytesStart<'_>) -> &'e [u8] {
    element.local_name().into_inner()
}

fn is_hidden_container(name: &[u8]) -> bool {
    matches!(
        name,
        b"defs" | b"clipPath" | b"mask" | b"symbol" | b"pattern" | b"marker"
    )
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().with_checks(false) {
        let attr = attr.map_err(|err| TrackError::Xml(err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = std::str::from_utf8(attr.value.as_ref())
                .map_err(|err| TrackError::Xml(err.to_string()))?;
            return Ok(Some(value.trim().to_string()));
        }
    }
    Ok(None)
}

/// Current transform for `element`: parent, then its own `transform`.
/// The root `<svg>` contributes the viewport transform instead.
fn element_ctm(element: &BytesStart<'_>, parent: Option<Affine>) -> Result<Affine> {
    let Some(parent) = parent else {
        return if local_name(element) == b"svg" {
            viewport_transform(element)
        } else {
            own_transform(element)
        };
    };
    Ok(parent.multiply(&own_transform(element)?))
}

/// Like [`element_ctm`], but an unparsable transform only skips the element.
fn usable_ctm(element: &BytesStart<'_>, parent: Option<Affine>) -> Result<Option<Affine>> {
    match element_ctm(element, parent) {
        Ok(ctm) => Ok(Some(ctm)),
        Err(err @ TrackError::Xml(_)) => Err(err),
        Err(err) => {
            warn!(
                element = %String::from_utf8_lossy(local_name(element)),
                error = %err,
                "element with invalid transform skipped"
            );
            Ok(None)
        }
    }
}

fn own_transform(element: &BytesStart<'_>) -> Result<Affine> {
    match attribute(element, b"transform")? {
        Some(list) => Affine::parse_list(&list),
        None => Ok(Affine::IDENTITY),
    }
}

/// `viewBox` origin to (0,0); with numeric `width`/`height`, a uniform
/// `min(sx, sy)` scale into that size.
fn viewport_transform(root: &BytesStart<'_>) -> Result<Affine> {
    let Some(view_box) = attribute(root, b"viewBox")? else {
        return Ok(Affine::IDENTITY);
    };
    let numbers = NumberLexer::new(&view_box)
        .numbers()
        .map_err(|err| TrackError::Xml(format!("invalid viewBox `{view_box}`: {err}")))?;
    let &[min_x, min_y, vb_width, vb_height] = numbers.as_slice() else {
        return Err(TrackError::Xml(format!("invalid viewBox `{view_box}`")));
    };

    let origin = Affine::translate(-min_x, -min_y);
    let width = attribute(root, b"width")?.and_then(|w| parse_length(&w));
    let height = attribute(root, b"height")?.and_then(|h| parse_length(&h));
    match (width, height) {
        (Some(w), Some(h)) if vb_width > 0.0 && vb_height > 0.0 => {
            let scale = (w / vb_width).min(h / vb_height);
            Ok(Affine::scale(scale, scale).multiply(&origin))
        }
        _ => Ok(origin),
    }
}

/// Plain numbers, optionally with a `px` suffix. Percentages and other units
/// are not numeric sizes.
fn parse_length(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix("px").unwrap_or(text);
    text.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

fn collect_outline(element: &BytesStart<'_>, ctm: &Affine, outlines: &mut Vec<PathData>) -> Result<()> {
    let parsed = match local_name(element) {
        b"path" => match attribute(element, b"d")? {
            Some(d) => PathData::parse(&d),
            None => return Ok(()),
        },
        name @ (b"polygon" | b"polyline") => match attribute(element, b"points")? {
            Some(points) => parse_points(&points).map(|pts| PathData::from_points(&pts, name == b"polygon")),
            None => return Ok(()),
        },
        _ => return Ok(()),
    };
    match parsed {
        Ok(path) if !path.is_empty() => outlines.push(path.transformed(ctm)),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "skipping malformed outline element"),
    }
    Ok(())
}

fn parse_points(text: &str) -> Result<Vec<Point2>> {
    let numbers = NumberLexer::new(text).numbers()?;
    // an odd trailing coordinate is ignored
    Ok(numbers
        .chunks_exact(2)
        .filter_map(|pair| match *pair {
            [x, y] => Some(Point2::new(x, y)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::path_data::PathSegment;
    use approx::assert_abs_diff_eq;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn first_point(path: &PathData) -> Option<Point2> {
        match path.segments().first()? {
            PathSegment::MoveTo(p) => Some(*p),
            _ => None,
        }
    }

    #[test]
    fn nested_group_transforms_apply_inner_first() -> TestResult {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
            <g transform="translate(100 0)">
              <g transform="scale(2)">
                <path d="M1 1 L2 1" transform="translate(1 0)"/>
              </g>
            </g>
        </svg>"#;
        let doc = SvgDocument::parse(svg)?;
        let outline = doc.outlines().first().ok_or("no outline")?;
        // translate(1,0) -> (2,1), scale(2) -> (4,2), translate(100,0) -> (104,2)
        assert_eq!(first_point(outline), Some(Point2::new(104.0, 2.0)));
        Ok(())
    }

    #[test]
    fn viewbox_moves_origin_and_scales_uniformly() -> TestResult {
        let svg = r#"<svg viewBox="10 20 100 50" width="200" height="200">
            <path d="M10 20 L110 70"/>
        </svg>"#;
        let doc = SvgDocument::parse(svg)?;
        let bounds = doc.union().control_bounds();
        assert_abs_diff_eq!(bounds.min.x, 0.0);
        assert_abs_diff_eq!(bounds.min.y, 0.0);
        // min(200/100, 200/50) = 2
        assert_abs_diff_eq!(bounds.max.x, 200.0);
        assert_abs_diff_eq!(bounds.max.y, 100.0);
        Ok(())
    }

    #[test]
    fn viewbox_without_size_only_translates() -> TestResult {
        let svg = r#"<svg viewBox="-5 -5 10 10" width="100%"><path d="M-5 -5 L5 5"/></svg>"#;
        let bounds = SvgDocument::parse(svg)?.union().control_bounds();
        assert_eq!(bounds.min, Point2::ORIGIN);
        assert_eq!(bounds.max, Point2::new(10.0, 10.0));
        Ok(())
    }

    #[test]
    fn polygons_close_and_polylines_do_not() -> TestResult {
        let svg = r#"<svg>
            <polygon points="0,0 10,0 10,10"/>
            <polyline points="0 0 5 5 6"/>
        </svg>"#;
        let doc = SvgDocument::parse(svg)?;
        let [polygon, polyline] = doc.outlines() else {
            return Err("expected two outlines".into());
        };
        assert_eq!(polygon.segments().last(), Some(&PathSegment::Close));
        assert_eq!(polyline.segments().len(), 2);
        Ok(())
    }

    #[test]
    fn defs_are_not_drawn() -> TestResult {
        let svg = r#"<svg>
            <defs><path id="ghost" d="M0 0 L1000 1000"/></defs>
            <path d="M0 0 L1 1"/>
        </svg>"#;
        let doc = SvgDocument::parse(svg)?;
        assert_eq!(doc.outlines().len(), 1);
        Ok(())
    }

    #[test]
    fn missing_outline_is_an_error() {
        assert_eq!(
            SvgDocument::parse("<svg><rect width='5' height='5'/></svg>"),
            Err(TrackError::NoOutline)
        );
    }

    #[test]
    fn malformed_path_is_skipped() -> TestResult {
        let svg = r#"<svg><path d="M0 0 L x"/><path d="M0 0 L3 4"/></svg>"#;
        assert_eq!(SvgDocument::parse(svg)?.outlines().len(), 1);
        Ok(())
    }

    #[test]
    fn bad_transform_skips_only_its_subtree() -> TestResult {
        let svg = r#"<svg>
            <g transform="bogus(1)"><path d="M0 0 L5 5"/><g><path d="M1 1 L2 2"/></g></g>
            <path transform="rotate(" d="M0 0 L7 7"/>
            <path d="M0 0 L10 0 L10 10"/>
        </svg>"#;
        let doc = SvgDocument::parse(svg)?;
        assert_eq!(doc.outlines().len(), 1);
        assert_eq!(
            doc.outlines().first().and_then(|p| p.segments().last().copied()),
            Some(PathSegment::LineTo(Point2::new(10.0, 10.0)))
        );
        Ok(())
    }

    #[test]
    fn broken_markup_is_an_xml_error() {
        assert!(matches!(
            SvgDocument::parse("<svg><g></svg>"),
            Err(TrackError::Xml(_))
        ));
    }
}

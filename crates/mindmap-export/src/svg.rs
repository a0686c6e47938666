//! SVG rendering of a scene, as drawn on screen

use crate::error::Result;
use mindmap_core::scene::{RootBadge, Scene, SceneNode};
use std::fmt::{self, Write};

const BACKGROUND: &str = "#f8f9fa";
const EDGE_COLOR: &str = "#546E7A";
const SELECTED_STROKE: &str = "#FF9900";
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Render `scene` as a standalone SVG document. The view box is the scene's
/// viewport and the document size is its screen size.
pub fn render_svg(scene: &Scene) -> Result<String> {
    let mut out = String::new();
    write_svg(&mut out, scene)?;
    Ok(out)
}

/// Write the SVG document for `scene` to `out`.
pub fn write_svg(out: &mut impl Write, scene: &Scene) -> fmt::Result {
    let vb = scene.viewport;

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">",
        scene.screen.width, scene.screen.height, vb.x, vb.y, vb.width, vb.height
    )?;
    writeln!(out, "<defs>")?;
    writeln!(
        out,
        "  <marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"9\" refY=\"3.5\" orient=\"auto\">\n    \
         <polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{EDGE_COLOR}\"/>\n  </marker>"
    )?;
    writeln!(out, "</defs>")?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{BACKGROUND}\"/>",
        vb.x, vb.y, vb.width, vb.height
    )?;

    writeln!(out, "<g class=\"edges\">")?;
    for edge in &scene.edges {
        writeln!(
            out,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{EDGE_COLOR}\" stroke-width=\"2\" marker-end=\"url(#arrowhead)\"/>",
            edge.from.x, edge.from.y, edge.to.x, edge.to.y
        )?;
    }
    writeln!(out, "</g>")?;

    writeln!(out, "<g class=\"nodes\">")?;
    for node in &scene.nodes {
        let selected = scene.selected.as_deref() == Some(node.id.as_str());
        if node.is_central {
            write_root(out, node, &scene.root_badge)?;
        } else {
            write_node(out, node, selected)?;
        }
    }
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")
}

fn write_root(out: &mut impl Write, node: &SceneNode, badge: &RootBadge) -> fmt::Result {
    let p = node.position;
    match badge {
        RootBadge::Image { data_uri } => {
            writeln!(
                out,
                "  <image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" href=\"{}\"/>",
                p.x - node.width / 2.0,
                p.y - node.height / 2.0,
                node.width,
                node.height,
                escape_xml(data_uri)
            )?;
        }
        RootBadge::Glyph { text } => {
            writeln!(
                out,
                "  <ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"white\" stroke=\"{}\" stroke-width=\"2\"/>",
                p.x,
                p.y,
                node.width / 2.0,
                node.height / 2.0,
                node.color
            )?;
            writeln!(
                out,
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"24\" font-weight=\"bold\">{}</text>",
                p.x,
                p.y + 8.0,
                node.color,
                escape_xml(text)
            )?;
        }
    }
    Ok(())
}

fn write_node(out: &mut impl Write, node: &SceneNode, selected: bool) -> fmt::Result {
    let p = node.position;
    let stroke = if selected {
        format!(" stroke=\"{SELECTED_STROKE}\" stroke-width=\"3\"")
    } else {
        String::new()
    };
    writeln!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"8\" fill=\"{}\"{stroke}/>",
        p.x - node.width / 2.0,
        p.y - node.height / 2.0,
        node.width,
        node.height,
        node.color
    )?;
    writeln!(
        out,
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"white\" font-family=\"{FONT_FAMILY}\" font-size=\"12\" font-weight=\"bold\">{}</text>",
        p.x,
        p.y + 4.0,
        escape_xml(&node.display)
    )?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

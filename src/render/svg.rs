//! SVG output for scenes.

use crate::core::curve::num;
use crate::render::scene::{axis_domain_path, AxisOrient, DrawCommand, Scene, TextAnchor, TICK_SIZE};
use std::fmt::Write;

/// Render a scene as a standalone SVG document.
pub fn render_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let [iw, ih] = scene.inner;
    let clip_id = format!("{}-clip", scene.mount);

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif" font-size="10">"#,
        escape(&scene.mount),
        num(scene.width),
        num(scene.height),
        num(scene.width),
        num(scene.height)
    );
    let _ = writeln!(
        out,
        r#"<defs><clipPath id="{clip_id}"><rect width="{}" height="{}"/></clipPath></defs>"#,
        num(iw),
        num(ih)
    );
    let _ = writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        num(scene.margin.left),
        num(scene.margin.top)
    );

    for command in &scene.commands {
        write_command(&mut out, command, &clip_id);
    }

    out.push_str("</g>\n</svg>\n");
    out
}

fn write_command(out: &mut String, command: &DrawCommand, clip_id: &str) {
    match command {
        DrawCommand::Axis(axis) => {
            let class = match axis.orient {
                AxisOrient::Bottom => "x-axis",
                AxisOrient::Left => "y-axis",
            };
            let _ = writeln!(
                out,
                r#"<g class="{class}" transform="translate({},{})" fill="none">"#,
                num(axis.offset[0]),
                num(axis.offset[1])
            );
            let _ = writeln!(
                out,
                r#"<path class="domain" stroke="currentColor" d="{}"/>"#,
                axis_domain_path(axis)
            );
            for tick in &axis.ticks {
                let p = num(tick.position);
                let label = escape(&tick.label);
                match axis.orient {
                    AxisOrient::Bottom => {
                        let _ = writeln!(
                            out,
                            r#"<g class="tick" transform="translate({p},0)"><line stroke="currentColor" y2="{}"/><text fill="currentColor" y="{}" dy="0.71em" text-anchor="middle">{label}</text></g>"#,
                            num(TICK_SIZE),
                            num(TICK_SIZE + 3.0)
                        );
                    }
                    AxisOrient::Left => {
                        let _ = writeln!(
                            out,
                            r#"<g class="tick" transform="translate(0,{p})"><line stroke="currentColor" x2="{}"/><text fill="currentColor" x="{}" dy="0.32em" text-anchor="end">{label}</text></g>"#,
                            num(-TICK_SIZE),
                            num(-(TICK_SIZE + 3.0))
                        );
                    }
                }
            }
            out.push_str("</g>\n");
        }
        DrawCommand::Line {
            channel,
            d,
            stroke,
            stroke_width,
        } => {
            if d.is_empty() {
                return;
            }
            let _ = writeln!(
                out,
                r#"<path class="line line-{}" clip-path="url(#{clip_id})" fill="none" stroke="{}" stroke-width="{}" d="{d}"/>"#,
                channel.key(),
                escape(stroke),
                num(*stroke_width)
            );
        }
        DrawCommand::Marker {
            channel,
            index,
            cx,
            cy,
            r,
            fill,
            opacity,
        } => {
            let _ = writeln!(
                out,
                r#"<circle class="dot-{}" data-index="{index}" clip-path="url(#{clip_id})" cx="{}" cy="{}" r="{}" fill="{}" opacity="{}"/>"#,
                channel.key(),
                num(*cx),
                num(*cy),
                num(*r),
                escape(fill),
                num(*opacity)
            );
        }
        DrawCommand::Text {
            x,
            y,
            text,
            anchor,
            font_size,
            rotate,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let mut attrs = format!(r#"x="{}" y="{}" text-anchor="{anchor}""#, num(*x), num(*y));
            if let Some(size) = font_size {
                let _ = write!(attrs, r#" font-size="{}px""#, num(*size));
            }
            if let Some(deg) = rotate {
                let _ = write!(attrs, r#" transform="rotate({})""#, num(*deg));
            }
            let _ = writeln!(out, "<text {attrs}>{}</text>", escape(text));
        }
        DrawCommand::Selection { x, width, height } => {
            let _ = writeln!(
                out,
                r##"<rect class="selection" x="{}" y="0" width="{}" height="{}" fill="#777" fill-opacity="0.3" stroke="#fff"/>"##,
                num(*x),
                num(*width),
                num(*height)
            );
        }
    }
}

/// Escape text for use in SVG content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

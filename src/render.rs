use crate::config::RenderConfig;
use crate::layout::SceneLayout;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const PIN_RADIUS: f32 = 3.0;

pub fn render_svg(layout: &SceneLayout, theme: &Theme, config: &RenderConfig) -> String {
    let mut svg = String::new();
    let pad = config.padding.max(0.0);
    let min_x = layout.bounds.x_min - pad;
    let min_y = layout.bounds.y_min - pad;
    let width = (layout.bounds.width() + pad * 2.0).max(1.0);
    let height = (layout.bounds.height() + pad * 2.0).max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{min_x:.2} {min_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{min_x:.2}\" y=\"{min_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for component in layout.components.values() {
        let rect = component.rect;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            rect.x_min,
            rect.y_min,
            rect.width(),
            rect.height(),
            theme.component_fill,
            theme.component_border
        ));
        if config.show_labels {
            let center = rect.center();
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                center.x,
                center.y,
                escape_xml(&theme.font_family),
                theme.font_size,
                theme.label_color,
                escape_xml(&component.label)
            ));
        }
    }

    for wire in &layout.wires {
        if wire.curve.is_empty() {
            continue;
        }
        svg.push_str(&format!(
            "<path id=\"wire-{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linejoin=\"round\"/>",
            wire.id.0,
            wire.curve.to_svg_path(),
            theme.wire_color,
            config.wire_width
        ));
    }

    if let Some(preview) = &layout.preview {
        if !preview.curve.is_empty() {
            svg.push_str(&format!(
                "<path class=\"preview\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-dasharray=\"6 4\"/>",
                preview.curve.to_svg_path(),
                theme.preview_color,
                config.wire_width
            ));
        }
    }

    // Pins go last so wire ends never hide them.
    if config.show_pins {
        for component in layout.components.values() {
            for pin in &component.pins {
                let Some(point) = component.pin_position(&pin.name) else {
                    continue;
                };
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{PIN_RADIUS}\" fill=\"{}\"/>",
                    point.x, point.y, theme.pin_color
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid default render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

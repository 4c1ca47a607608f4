//! Core rendering functions
//! Projection, back-face culling, flat lighting and painter's-algorithm line drawing

use super::canvas::Canvas;
use super::lighting::{shade, LightSource};
use super::math::{Vec3, Vec4};
use super::types::{LineToDraw, RenderSettings, RenderStats, Transforms};
use crate::error::RenderError;
use crate::model::Model;

/// Viewport transform: clip space to screen pixels.
///
/// Y is flipped (rows grow downward) and NDC z in [-1, 1] is remapped to
/// depth in [0, 1] with 0 at the near plane.
pub fn clip_to_screen(clip: Vec4, width: usize, height: usize) -> Vec3 {
    let ndc = clip.perspective_divide().unwrap_or_else(|| clip.xyz());
    Vec3 {
        x: (ndc.x + 1.0) * 0.5 * width as f32,
        y: (1.0 - (ndc.y + 1.0) * 0.5) * height as f32,
        z: (ndc.z + 1.0) * 0.5,
    }
}

/// Project, cull and light every primitive of `model` into screen-space lines.
///
/// Faces contribute their three edges, lit by `light`; wireframe edges are
/// drawn at `settings.wire_intensity` with no culling or lighting. Primitives
/// with out-of-range indices are skipped. The result is not sorted.
pub fn build_line_list(
    model: &Model,
    transforms: &Transforms,
    light: &LightSource,
    camera_pos: Vec3,
    settings: &RenderSettings,
    width: usize,
    height: usize,
) -> Result<(Vec<LineToDraw>, RenderStats), RenderError> {
    let mvp = transforms.mvp();
    let normal_matrix = if settings.exact_normals {
        transforms.model.normal_matrix().unwrap_or(transforms.model)
    } else {
        transforms.model
    };

    let capacity = model.faces.len() * 3 + model.edges.len();
    let mut lines: Vec<LineToDraw> = Vec::new();
    lines
        .try_reserve_exact(capacity)
        .map_err(|_| RenderError::Allocation(capacity))?;

    let mut stats = RenderStats::default();

    for (face_idx, face) in model.faces.iter().enumerate() {
        stats.faces_total += 1;

        let Some([v0, v1, v2]) = model.face_vertices(*face) else {
            log::warn!(
                "Face {} has a vertex index out of range ({} vertices), skipping",
                face_idx,
                model.num_vertices()
            );
            stats.skipped += 1;
            continue;
        };

        let world0 = transforms.model.transform_point(v0);

        // Face normal in model space, moved to world space without translation
        let normal = (v1 - v0).cross(v2 - v0).normalize();
        let normal_world = normal_matrix.transform_direction(normal).normalize();

        if settings.backface_cull {
            let view_dir = (camera_pos - world0).normalize();
            if normal_world.dot(view_dir) <= 0.0 {
                stats.faces_culled += 1;
                continue;
            }
        }

        let clip = [mvp.transform_vec4(v0), mvp.transform_vec4(v1), mvp.transform_vec4(v2)];

        // Near-plane heuristic: drop the whole triangle, no clipping
        if clip.iter().any(|c| c.w < settings.near_w) {
            stats.faces_near_rejected += 1;
            continue;
        }

        let screen = clip.map(|c| clip_to_screen(c, width, height));

        let light_dir = (light.position - world0).normalize();
        let intensity = shade(normal_world, light_dir, light, settings.ambient);

        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            lines.push(LineToDraw::new(screen[a], screen[b], intensity));
        }
        stats.faces_drawn += 1;
    }

    for (edge_idx, edge) in model.edges.iter().enumerate() {
        let Some((v0, v1)) = model.edge_vertices(*edge) else {
            log::warn!(
                "Edge {} ({}, {}) has a vertex index out of range ({} vertices), skipping",
                edge_idx,
                edge.a,
                edge.b,
                model.num_vertices()
            );
            stats.skipped += 1;
            continue;
        };

        let c0 = mvp.transform_vec4(v0);
        let c1 = mvp.transform_vec4(v1);
        if c0.w < settings.near_w || c1.w < settings.near_w {
            stats.edges_near_rejected += 1;
            continue;
        }

        lines.push(LineToDraw::new(
            clip_to_screen(c0, width, height),
            clip_to_screen(c1, width, height),
            settings.wire_intensity,
        ));
        stats.edges_drawn += 1;
    }

    stats.lines = lines.len();
    Ok((lines, stats))
}

/// Painter's algorithm order: farthest average depth first
pub fn sort_lines_back_to_front(lines: &mut [LineToDraw]) {
    lines.sort_unstable_by(|a, b| b.avg_z.total_cmp(&a.avg_z));
}

/// Draw lines in slice order, each at its own average depth and intensity
pub fn draw_lines(canvas: &mut Canvas, lines: &[LineToDraw], thickness: f32) {
    for line in lines {
        canvas.draw_line(
            line.p1.x,
            line.p1.y,
            line.p2.x,
            line.p2.y,
            thickness,
            line.intensity,
            line.avg_z,
        );
    }
}

/// Render a model onto the canvas.
///
/// The line buffer is allocated before any pixel is touched, so an
/// allocation failure leaves the canvas unchanged.
pub fn render(
    canvas: &mut Canvas,
    model: &Model,
    transforms: &Transforms,
    light: &LightSource,
    camera_pos: Vec3,
    settings: &RenderSettings,
) -> Result<RenderStats, RenderError> {
    let (mut lines, stats) = build_line_list(
        model,
        transforms,
        light,
        camera_pos,
        settings,
        canvas.width(),
        canvas.height(),
    )?;

    sort_lines_back_to_front(&mut lines);
    draw_lines(canvas, &lines, settings.line_thickness);

    log::debug!(
        "Rendered {} lines: {} faces drawn, {} culled, {} near-rejected, {} edges, {} skipped",
        stats.lines,
        stats.faces_drawn,
        stats.faces_culled,
        stats.faces_near_rejected,
        stats.edges_drawn,
        stats.skipped
    );

    Ok(stats)
}

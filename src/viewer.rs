use std::f64::consts;
use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, Ui};
use itertools::Itertools;
use nalgebra::Vector3;
use starchart::bodies::{Classification, OrbitData};
use starchart::camera::CameraPose;

use crate::session::SystemSession;

const ORBIT_SAMPLES: usize = 96;
const BELT_SAMPLES: usize = 64;
const NEAR_PLANE: f64 = 0.1;

/// Perspective projection of the live scene into a viewport rect.
struct Projector {
    eye: Vector3<f64>,
    right: Vector3<f64>,
    up: Vector3<f64>,
    forward: Vector3<f64>,
    focal: f32,
    center: Pos2,
}

impl Projector {
    fn new(pose: CameraPose, rect: Rect) -> Self {
        let mut forward = pose.target - pose.position;
        if forward.norm() <= f64::EPSILON {
            forward = -Vector3::z();
        }
        let forward = forward.normalize();
        let mut right = forward.cross(&Vector3::y());
        if right.norm() <= 1e-9 {
            // Looking straight down: any horizontal right axis works.
            right = Vector3::x();
        }
        let right = right.normalize();
        let up = right.cross(&forward);
        Self {
            eye: pose.position,
            right,
            up,
            forward,
            focal: rect.height() * 1.2,
            center: rect.center(),
        }
    }

    /// Screen position, perspective scale and depth, or `None` behind
    /// the camera.
    fn project(&self, world: Vector3<f64>) -> Option<(Pos2, f32, f64)> {
        let rel = world - self.eye;
        let z = rel.dot(&self.forward);
        if z < NEAR_PLANE {
            return None;
        }
        let scale = self.focal / z as f32;
        let x = rel.dot(&self.right) as f32 * scale;
        let y = rel.dot(&self.up) as f32 * scale;
        Some((self.center + egui::vec2(x, -y), scale, z))
    }
}

fn classification_color(classification: Classification) -> Color32 {
    match classification {
        Classification::Star => Color32::from_rgb(255, 214, 90),
        Classification::Planet => Color32::from_rgb(110, 170, 255),
        Classification::DwarfPlanet => Color32::from_rgb(150, 190, 230),
        Classification::Moon => Color32::from_rgb(190, 190, 190),
        Classification::Belt => Color32::from_rgb(170, 140, 100),
        Classification::JumpPoint => Color32::from_rgb(170, 110, 255),
        Classification::Station => Color32::from_rgb(120, 230, 180),
        Classification::BlackHole => Color32::from_rgb(90, 70, 120),
    }
}

/// Draw the system and route pointer input. Returns the id of a
/// clicked object, if any.
pub fn show(ui: &mut Ui, session: &mut SystemSession) -> Option<Arc<str>> {
    let rect = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(rect, Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::from_rgb(8, 10, 18));

    if response.dragged() {
        let delta = response.drag_delta();
        session
            .camera
            .apply_user_orbit(-delta.x as f64 * 0.008, delta.y as f64 * 0.008);
    }
    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    if scroll.abs() > 0.0 {
        session
            .camera
            .apply_user_zoom((1.0 - scroll as f64 * 0.001).clamp(0.5, 2.0));
    }

    let Some(system) = session.system().cloned() else {
        return None;
    };
    let Some(config) = session.mode_config() else {
        return None;
    };
    let linear = config.orbit_scaling.is_linear();
    let layouts = session.layouts();
    let projector = Projector::new(session.camera.pose(), rect);

    let orbit_stroke = Stroke::new(1.0, Color32::from_gray(70));
    let belt_stroke = Stroke::new(1.0, Color32::from_rgb(110, 90, 60));

    // Orbit paths and belt rings first, then bodies far-to-near on top.
    struct BodyDraw {
        id: Arc<str>,
        name: Arc<str>,
        classification: Classification,
        selected: bool,
        pos: Pos2,
        radius: f32,
        depth: f64,
    }
    let mut bodies: Vec<BodyDraw> = Vec::new();
    for object in &system.objects {
        let Some(handle) = session.registry().resolve(&object.id) else {
            continue;
        };
        let world = handle.read().position;
        let layout = layouts.get(&object.id).copied();

        match (&object.orbit, layout) {
            (Some(orbit @ OrbitData::Keplerian { .. }), Some(layout)) => {
                if let Some(parent_handle) = session.registry().resolve(orbit.parent()) {
                    let parent = parent_handle.read().position;
                    if linear {
                        if let (Some((a, _, _)), Some((b, _, _))) =
                            (projector.project(parent), projector.project(world))
                        {
                            painter.line_segment([a, b], orbit_stroke);
                        }
                    } else {
                        draw_ring(&painter, &projector, parent, layout.orbit_distance, orbit_stroke);
                    }
                }
            }
            (Some(orbit @ OrbitData::Belt { .. }), Some(layout)) => {
                if let (Some(parent_handle), Some(belt)) =
                    (session.registry().resolve(orbit.parent()), layout.belt)
                {
                    let parent = parent_handle.read().position;
                    draw_belt_ring(&painter, &projector, parent, belt.inner, belt_stroke);
                    draw_belt_ring(&painter, &projector, parent, belt.outer, belt_stroke);
                }
            }
            _ => {}
        }

        if object.is_belt() {
            continue;
        }
        if let Some((pos, scale, depth)) = projector.project(world) {
            let radius = layout.map_or(1.0, |l| l.visual_radius as f32) * scale * 0.05;
            bodies.push(BodyDraw {
                id: object.id.clone(),
                name: object.name.clone(),
                classification: object.classification,
                selected: session.selected().map(|s| &**s) == Some(&*object.id),
                pos,
                radius: radius.clamp(1.5, 60.0),
                depth,
            });
        }
    }

    let mut hits: Vec<(Arc<str>, Pos2, f32)> = Vec::new();
    for body in bodies
        .into_iter()
        .sorted_by(|a, b| b.depth.total_cmp(&a.depth))
    {
        painter.circle_filled(body.pos, body.radius, classification_color(body.classification));
        if body.selected {
            painter.circle_stroke(body.pos, body.radius + 3.0, Stroke::new(1.5, Color32::WHITE));
        }
        if body.radius > 2.5 {
            painter.text(
                body.pos + egui::vec2(body.radius + 4.0, 0.0),
                egui::Align2::LEFT_CENTER,
                &*body.name,
                egui::FontId::proportional(11.0),
                Color32::from_gray(200),
            );
        }
        hits.push((body.id, body.pos, body.radius));
    }

    if response.clicked() {
        if let Some(pointer) = response.interact_pointer_pos() {
            return hits
                .iter()
                .filter(|(_, pos, radius)| pos.distance(pointer) <= radius + 4.0)
                .min_by(|a, b| {
                    a.1.distance(pointer)
                        .partial_cmp(&b.1.distance(pointer))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(id, _, _)| id.clone());
        }
    }
    None
}

/// A circular orbit guide in the system plane around `center`.
fn draw_ring(
    painter: &egui::Painter,
    projector: &Projector,
    center: Vector3<f64>,
    radius: f64,
    stroke: Stroke,
) {
    if radius <= 0.0 {
        return;
    }
    sample_ring(painter, projector, center, radius, ORBIT_SAMPLES, stroke);
}

fn draw_belt_ring(
    painter: &egui::Painter,
    projector: &Projector,
    center: Vector3<f64>,
    radius: f64,
    stroke: Stroke,
) {
    sample_ring(painter, projector, center, radius, BELT_SAMPLES, stroke);
}

fn sample_ring(
    painter: &egui::Painter,
    projector: &Projector,
    center: Vector3<f64>,
    radius: f64,
    samples: usize,
    stroke: Stroke,
) {
    let mut points = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let theta = 2.0 * consts::PI * i as f64 / samples as f64;
        let world =
            center + Vector3::new(radius * libm::cos(theta), 0.0, radius * libm::sin(theta));
        match projector.project(world) {
            Some((pos, _, _)) => points.push(pos),
            None => {
                // Segment crosses behind the camera; draw what we have
                // and start a new polyline.
                if points.len() > 1 {
                    painter.add(Shape::line(std::mem::take(&mut points), stroke));
                } else {
                    points.clear();
                }
            }
        }
    }
    if points.len() > 1 {
        painter.add(Shape::line(points, stroke));
    }
}

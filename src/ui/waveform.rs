use std::f32::consts::PI;

use iced::mouse;
use iced::widget::canvas::{self, path, Cache, Geometry, Path, Stroke};
use iced::{Color, Point, Radians, Rectangle, Renderer, Theme, Vector};

/// Which side of the baseline a segment is drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Positive height, arc bulging away from the baseline downward.
    Below,
    /// Negated height, arc bulging upward.
    Above,
}

/// One line-arc-line unit of the waveform, in baseline-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x: f32,
    pub width: f32,
    /// Signed offset from the baseline (y grows downward).
    pub height: f32,
    pub orientation: Orientation,
}

/// Lay out one segment per summary value across `surface_width`.
///
/// Heights are `value * surface_height - padding`, clamped to
/// `[0, surface_height / 2]`, then mirrored by index parity.
pub fn layout_segments(
    normalized: &[f32],
    surface_width: f32,
    surface_height: f32,
    padding: f32,
) -> Vec<Segment> {
    if normalized.is_empty() {
        return Vec::new();
    }
    let width = surface_width / normalized.len() as f32;
    let max_height = (surface_height / 2.0).max(0.0);

    normalized
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let height = (value * surface_height - padding).clamp(0.0, max_height);
            let orientation = if (i + 1) % 2 == 1 {
                Orientation::Below
            } else {
                Orientation::Above
            };
            let height = match orientation {
                Orientation::Below => height,
                Orientation::Above => -height,
            };
            Segment {
                x: width * i as f32,
                width,
                height,
                orientation,
            }
        })
        .collect()
}

/// Semicircle capping a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Segment {
    /// Centred on the segment's far end, sweeping away from the baseline.
    pub fn arc(&self) -> ArcParams {
        let radius = self.width / 2.0;
        // Canvas y points down: sweeping PI -> 0 passes through PI/2 (below),
        // PI -> 2PI passes through 3PI/2 (above).
        let end_angle = match self.orientation {
            Orientation::Below => 0.0,
            Orientation::Above => 2.0 * PI,
        };
        ArcParams {
            center: Point::new(self.x + radius, self.height),
            radius,
            start_angle: PI,
            end_angle,
        }
    }

    fn path(&self) -> Path {
        let arc = self.arc();
        Path::new(|b| {
            b.move_to(Point::new(self.x, 0.0));
            b.line_to(Point::new(self.x, self.height));
            b.arc(path::Arc {
                center: arc.center,
                radius: arc.radius,
                start_angle: Radians(arc.start_angle),
                end_angle: Radians(arc.end_angle),
            });
            b.line_to(Point::new(self.x + self.width, 0.0));
        })
    }
}

/// Canvas program drawing the condensed waveform.
pub struct WaveformView {
    cache: Cache,
    normalized: Vec<f32>,
    padding: f32,
    stroke: Color,
    background: Color,
}

impl WaveformView {
    pub fn new(padding: f32, stroke: Color, background: Color) -> Self {
        Self {
            cache: Cache::new(),
            normalized: Vec::new(),
            padding,
            stroke,
            background,
        }
    }

    pub fn set_summary(&mut self, normalized: Vec<f32>) {
        self.normalized = normalized;
        self.cache.clear();
    }

    pub fn clear(&mut self) {
        self.normalized.clear();
        self.cache.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Canvas height needed for a surface of `surface_height`.
    pub fn canvas_height(&self, surface_height: f32) -> f32 {
        surface_height + self.padding * 2.0
    }
}

impl<Message> canvas::Program<Message> for WaveformView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, bounds.size(), self.background);

            let surface_height = (bounds.height - self.padding * 2.0).max(0.0);
            frame.translate(Vector::new(0.0, surface_height / 2.0 + self.padding));

            let stroke = Stroke::default().with_color(self.stroke).with_width(1.0);
            let segments = layout_segments(
                &self.normalized,
                bounds.width,
                surface_height,
                self.padding,
            );
            for segment in segments {
                frame.stroke(&segment.path(), stroke);
            }
        });

        vec![geometry]
    }
}

use crate::{
    data::ContinentNames,
    scale::{BandScale, LogScale},
    types::{ColorId, FillMode, Placement, Vec2},
};

const SOLID_GLYPH: char = '█';
const KEY_GLYPH: char = '■';
const OVERLAY_DEPTH: f32 = f32::MAX;
const FOCUS_DEPTH: f32 = f32::MAX / 2.0;

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderCell {
    pub ch: char,
    pub depth: f32,
    pub color: ColorId,
}

impl RenderCell {
    const BLANK: RenderCell = RenderCell {
        ch: ' ',
        depth: f32::NEG_INFINITY,
        color: ColorId::White,
    };
}

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        self.cells.resize(len, RenderCell::BLANK);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(RenderCell::BLANK);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    /// Deeper cells win; ties go to the later write.
    fn set(&mut self, x: i32, y: i32, ch: char, depth: f32, color: ColorId) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if depth >= cell.depth {
            *cell = RenderCell { ch, depth, color };
        }
    }

    fn put_str(&mut self, x: i32, y: i32, text: &str, color: ColorId) {
        for (i, ch) in text.chars().enumerate() {
            self.set(x + i as i32, y, ch, OVERLAY_DEPTH, color);
        }
    }
}

/// Static per-entity drawing data, in store order.
#[derive(Clone, Debug)]
pub struct Bubble {
    pub code: Vec<char>,
    pub radius: f32,
    pub color: ColorId,
}

pub enum Overlay<'a> {
    None,
    Legend(&'a [(String, ColorId)]),
    Axes {
        band: &'a BandScale,
        log: &'a LogScale,
        names: &'a ContinentNames,
    },
}

pub struct Scene<'a> {
    pub bubbles: &'a [Bubble],
    pub placements: &'a [Placement],
    pub canvas: Vec2,
    pub fill: FillMode,
    pub focus: Option<usize>,
    pub overlay: Overlay<'a>,
}

pub fn draw(scene: &Scene<'_>, viewport: Viewport, frame: &mut FrameBuffer) {
    if frame.width() != viewport.width || frame.height() != viewport.height {
        frame.resize(viewport.width, viewport.height);
    } else {
        frame.clear();
    }
    if viewport.width == 0 || viewport.height == 0 {
        return;
    }

    let sx = viewport.width as f32 / scene.canvas.x;
    let sy = viewport.height as f32 / scene.canvas.y;

    for (idx, (bubble, placement)) in scene.bubbles.iter().zip(scene.placements).enumerate() {
        let focused = scene.focus == Some(idx);
        let (depth, color) = if focused {
            (FOCUS_DEPTH, ColorId::Red)
        } else if scene.fill == FillMode::Texture {
            (-bubble.radius, ColorId::White)
        } else {
            (-bubble.radius, bubble.color)
        };
        draw_disc(
            frame,
            Vec2::new(placement.pos.x * sx, placement.pos.y * sy),
            Vec2::new(bubble.radius * sx, bubble.radius * sy),
            |col, row| match scene.fill {
                FillMode::Solid => SOLID_GLYPH,
                FillMode::Texture => texture_glyph(&bubble.code, col, row),
            },
            depth,
            color,
        );
    }

    match scene.overlay {
        Overlay::None => {}
        Overlay::Legend(entries) => draw_legend(frame, entries),
        Overlay::Axes { band, log, names } => draw_axes(frame, band, log, names, sx, sy),
    }
}

fn draw_disc(
    frame: &mut FrameBuffer,
    center: Vec2,
    radii: Vec2,
    glyph: impl Fn(i32, i32) -> char,
    depth: f32,
    color: ColorId,
) {
    let (rx, ry) = (radii.x.max(f32::EPSILON), radii.y.max(f32::EPSILON));
    let (x0, x1) = ((center.x - rx).floor() as i32, (center.x + rx).ceil() as i32);
    let (y0, y1) = ((center.y - ry).floor() as i32, (center.y + ry).ceil() as i32);
    let mut painted = false;
    for row in y0..=y1 {
        for col in x0..=x1 {
            let dx = (col as f32 + 0.5 - center.x) / rx;
            let dy = (row as f32 + 0.5 - center.y) / ry;
            if dx * dx + dy * dy <= 1.0 {
                frame.set(col, row, glyph(col, row), depth, color);
                painted = true;
            }
        }
    }
    // Discs smaller than a cell still get one.
    if !painted {
        let (col, row) = (center.x.floor() as i32, center.y.floor() as i32);
        frame.set(col, row, glyph(col, row), depth, color);
    }
}

fn texture_glyph(code: &[char], col: i32, row: i32) -> char {
    if code.is_empty() {
        return SOLID_GLYPH;
    }
    code[(col + row).rem_euclid(code.len() as i32) as usize]
}

fn draw_legend(frame: &mut FrameBuffer, entries: &[(String, ColorId)]) {
    let total: usize = entries
        .iter()
        .map(|(name, _)| name.chars().count() + 4)
        .sum();
    let row = frame.height() as i32 - 1;
    let mut x = (frame.width() as i32 - total as i32).max(0) / 2;
    for (name, color) in entries {
        frame.put_str(x, row, &KEY_GLYPH.to_string(), *color);
        frame.put_str(x + 2, row, name, ColorId::White);
        x += name.chars().count() as i32 + 4;
    }
}

fn draw_axes(
    frame: &mut FrameBuffer,
    band: &BandScale,
    log: &LogScale,
    names: &ContinentNames,
    sx: f32,
    sy: f32,
) {
    for value in log.decades() {
        let row = (log.apply(value) * sy).floor() as i32;
        frame.put_str(0, row, &format_si(value), ColorId::Gray);
    }
    let row = frame.height() as i32 - 1;
    let room = ((band.bandwidth() * sx).floor() as usize).max(2);
    for category in band.domain() {
        if let Some(center) = band.center(category) {
            let name: String = names.name(category).chars().take(room).collect();
            let col = (center * sx).round() as i32 - name.chars().count() as i32 / 2;
            frame.put_str(col, row, &name, ColorId::Gray);
        }
    }
}

/// Decade labels such as `10k` or `1G`.
pub fn format_si(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1.0e12, "T"), (1.0e9, "G"), (1.0e6, "M"), (1.0e3, "k")];
    for (unit, suffix) in UNITS {
        if value >= unit {
            return format!("{}{suffix}", (value / unit).round());
        }
    }
    format!("{}", value.round())
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: f64) -> String {
    let digits = format!("{}", value.round().max(0.0) as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, EntityId};

    fn bubble(code: &str, radius: f32, color: ColorId) -> Bubble {
        Bubble {
            code: code.chars().collect(),
            radius,
            color,
        }
    }

    fn placement(id: &str, x: f32, y: f32) -> Placement {
        Placement {
            id: EntityId(id.to_string()),
            pos: Vec2::new(x, y),
        }
    }

    fn scene<'a>(bubbles: &'a [Bubble], placements: &'a [Placement]) -> Scene<'a> {
        Scene {
            bubbles,
            placements,
            canvas: Vec2::new(800.0, 240.0),
            fill: FillMode::Solid,
            focus: None,
            overlay: Overlay::None,
        }
    }

    mod framebuffer {
        use super::*;

        #[test]
        fn creates_with_correct_dimensions() {
            let fb = FrameBuffer::new(80, 24);
            assert_eq!(fb.width(), 80);
            assert_eq!(fb.height(), 24);
        }

        #[test]
        fn resize_clears_cells() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(1, 1, 'A', 1.0, ColorId::Blue);
            fb.resize(20, 15);
            assert_eq!(fb.width(), 20);
            assert_eq!(fb.get(1, 1).ch, ' ');
        }

        #[test]
        fn deeper_write_wins() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(5, 5, 'A', 10.0, ColorId::Blue);
            fb.set(5, 5, 'B', 5.0, ColorId::Red);
            assert_eq!(fb.get(5, 5).ch, 'A');
            fb.set(5, 5, 'C', 10.0, ColorId::Green);
            assert_eq!(fb.get(5, 5).ch, 'C');
        }

        #[test]
        fn out_of_bounds_is_ignored() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(-1, 3, 'X', 10.0, ColorId::Blue);
            fb.set(100, 100, 'X', 10.0, ColorId::Blue);
        }
    }

    mod draw_fn {
        use super::*;

        #[test]
        fn empty_scene_produces_empty_frame() {
            let mut frame = FrameBuffer::new(80, 24);
            draw(&scene(&[], &[]), Viewport { width: 80, height: 24 }, &mut frame);
            for y in 0..24 {
                for x in 0..80 {
                    assert_eq!(frame.get(x, y).ch, ' ');
                }
            }
        }

        #[test]
        fn disc_is_filled_in_category_color() {
            // 10 canvas units per cell on both axes.
            let bubbles = [bubble("FR", 30.0, ColorId::Blue)];
            let placements = [placement("FR", 400.0, 120.0)];
            let mut frame = FrameBuffer::new(80, 24);
            draw(&scene(&bubbles, &placements), Viewport { width: 80, height: 24 }, &mut frame);
            let center = frame.get(40, 12);
            assert_eq!(center.ch, SOLID_GLYPH);
            assert_eq!(center.color, ColorId::Blue);
            assert_eq!(frame.get(42, 12).ch, SOLID_GLYPH);
            assert_eq!(frame.get(45, 12).ch, ' ');
        }

        #[test]
        fn tiny_disc_still_visible() {
            let bubbles = [bubble("VA", 0.5, ColorId::Yellow)];
            let placements = [placement("VA", 405.0, 125.0)];
            let mut frame = FrameBuffer::new(80, 24);
            draw(&scene(&bubbles, &placements), Viewport { width: 80, height: 24 }, &mut frame);
            assert_eq!(frame.get(40, 12).color, ColorId::Yellow);
        }

        #[test]
        fn smaller_bubble_draws_on_top() {
            let bubbles = [
                bubble("SM", 10.0, ColorId::Green),
                bubble("BG", 60.0, ColorId::Blue),
            ];
            let placements = [placement("SM", 400.0, 120.0), placement("BG", 400.0, 120.0)];
            let mut frame = FrameBuffer::new(80, 24);
            draw(&scene(&bubbles, &placements), Viewport { width: 80, height: 24 }, &mut frame);
            assert_eq!(frame.get(40, 12).color, ColorId::Green);
        }

        #[test]
        fn texture_fill_tiles_country_code() {
            let bubbles = [bubble("JP", 40.0, ColorId::Blue)];
            let placements = [placement("JP", 400.0, 120.0)];
            let mut s = scene(&bubbles, &placements);
            s.fill = FillMode::Texture;
            let mut frame = FrameBuffer::new(80, 24);
            draw(&s, Viewport { width: 80, height: 24 }, &mut frame);
            let a = frame.get(40, 12);
            let b = frame.get(41, 12);
            assert!(['J', 'P'].contains(&a.ch));
            assert_ne!(a.ch, b.ch);
            assert_eq!(a.color, ColorId::White);
        }

        #[test]
        fn focused_bubble_is_red_and_on_top() {
            let bubbles = [
                bubble("BG", 60.0, ColorId::Blue),
                bubble("SM", 10.0, ColorId::Green),
            ];
            let placements = [placement("BG", 400.0, 120.0), placement("SM", 400.0, 120.0)];
            let mut s = scene(&bubbles, &placements);
            s.focus = Some(0);
            let mut frame = FrameBuffer::new(80, 24);
            draw(&s, Viewport { width: 80, height: 24 }, &mut frame);
            assert_eq!(frame.get(40, 12).color, ColorId::Red);
        }

        #[test]
        fn legend_sits_on_bottom_row() {
            let entries = vec![("Europe".to_string(), ColorId::Blue)];
            let mut s = scene(&[], &[]);
            s.overlay = Overlay::Legend(&entries);
            let mut frame = FrameBuffer::new(80, 24);
            draw(&s, Viewport { width: 80, height: 24 }, &mut frame);
            let row: String = (0..80).map(|x| frame.get(x, 23).ch).collect();
            assert!(row.contains("■ Europe"));
            assert_eq!(frame.get(0, 0).ch, ' ');
        }

        #[test]
        fn axes_label_decades_and_bands() {
            let band = BandScale::new(vec![Category::new("EU")], (0.0, 800.0));
            let log = LogScale::new((100.0, 1_000_000.0), (220.0, 20.0));
            let names = ContinentNames::default();
            let mut s = scene(&[], &[]);
            s.overlay = Overlay::Axes {
                band: &band,
                log: &log,
                names: &names,
            };
            let mut frame = FrameBuffer::new(80, 24);
            draw(&s, Viewport { width: 80, height: 24 }, &mut frame);
            let text: String = (0..24)
                .map(|y| (0..80).map(|x| frame.get(x, y).ch).collect::<String>())
                .collect::<Vec<_>>()
                .join("\n");
            assert!(text.contains("1M"));
            assert!(text.contains("100"));
            assert!(text.contains("EU"));
        }

        #[test]
        fn zero_viewport_does_not_panic() {
            let bubbles = [bubble("FR", 30.0, ColorId::Blue)];
            let placements = [placement("FR", 400.0, 120.0)];
            let mut frame = FrameBuffer::new(0, 0);
            draw(&scene(&bubbles, &placements), Viewport { width: 0, height: 0 }, &mut frame);
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn si_suffixes() {
            assert_eq!(format_si(100.0), "100");
            assert_eq!(format_si(10_000.0), "10k");
            assert_eq!(format_si(1.0e6), "1M");
            assert_eq!(format_si(1.0e9), "1G");
        }

        #[test]
        fn groups_thousands() {
            assert_eq!(group_thousands(0.0), "0");
            assert_eq!(group_thousands(999.0), "999");
            assert_eq!(group_thousands(1_000.0), "1,000");
            assert_eq!(group_thousands(1_234_567.0), "1,234,567");
        }
    }
}

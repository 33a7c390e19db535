use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    config,
    core::{Simulation, TickOutcome},
    data::ContinentNames,
    layout::{LayoutController, ModeEvent},
    render::{self, Bubble, Overlay, Scene},
    types::{ColorId, FillMode, LayoutMode, Placement, Vec2},
};

/// Everything the front ends need: the running core plus display metadata.
pub struct App {
    pub sim: Simulation,
    pub controller: LayoutController,
    pub names: ContinentNames,
    pub canvas: Vec2,
}

pub fn run(mut app: App) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);
    shutdown_terminal(&mut terminal)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let bubbles = bubbles_for(&app.sim);
    let legend = legend_for(&app.sim, &app.names);
    let mut ui_state = UiState::new(app.sim.placements().to_vec());

    // Starting first turns the startup layout event into a full settle.
    app.sim.start();
    app.controller.apply_pending(&mut app.sim);

    let mut accumulator = 0.0_f32;
    let mut last_tick = Instant::now();
    let mut last_render = Instant::now();
    let render_interval = Duration::from_secs_f32(1.0 / config::RENDER_HZ);
    let mut sim_counter = 0_u32;
    let mut render_counter = 0_u32;
    let mut last_fps_sample = Instant::now();
    let mut sim_fps = 0.0_f32;
    let mut render_fps = 0.0_f32;

    loop {
        let now = Instant::now();
        let dt = (now - last_tick).as_secs_f32();
        last_tick = now;
        accumulator += dt;

        while accumulator >= config::DT {
            app.controller.apply_pending(&mut app.sim);
            let placements = &mut ui_state.placements;
            let outcome = app
                .sim
                .tick(&mut |p: &[Placement]| placements.clone_from_slice(p));
            if outcome == TickOutcome::Moved {
                sim_counter += 1;
            }
            accumulator -= config::DT;
        }

        while event::poll(Duration::from_millis(0))? {
            if let CrosstermEvent::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        info!("quit requested");
                        return Ok(());
                    }
                    KeyCode::Char(ch @ '1'..='4') => {
                        let idx = ch as usize - '1' as usize;
                        app.controller.push(ModeEvent::Layout(LayoutMode::ALL[idx]));
                    }
                    KeyCode::Char('f') => app.controller.push(ModeEvent::ToggleFill),
                    KeyCode::Tab => ui_state.cycle_focus(bubbles.len(), 1),
                    KeyCode::BackTab => ui_state.cycle_focus(bubbles.len(), -1),
                    _ => {}
                }
            }
        }
        // Fill changes only affect drawing, so apply them before the next frame.
        app.controller.apply_pending(&mut app.sim);

        if last_render.elapsed() >= render_interval {
            let stats = app.sim.stats();
            if last_fps_sample.elapsed() >= Duration::from_secs(1) {
                let secs = last_fps_sample.elapsed().as_secs_f32();
                sim_fps = sim_counter as f32 / secs;
                render_fps = render_counter as f32 / secs;
                sim_counter = 0;
                render_counter = 0;
                last_fps_sample = Instant::now();
            }
            let layout = app.controller.layout();
            let fill = app.controller.fill();
            let (band, log) = app.sim.forces().population_axes();
            let overlay = if layout == LayoutMode::PopulationScatter {
                Overlay::Axes {
                    band,
                    log,
                    names: &app.names,
                }
            } else if fill == FillMode::Solid {
                Overlay::Legend(&legend)
            } else {
                Overlay::None
            };
            let info = ui_state
                .focus
                .and_then(|idx| app.sim.store().entities().get(idx))
                .map(|e| format!("{}: {}", e.name, render::group_thousands(e.population)))
                .unwrap_or_default();

            terminal.draw(|frame| {
                let size = frame.size();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(3),
                        Constraint::Length(3),
                    ])
                    .split(size);

                let header = Paragraph::new(format!(
                    "layout: {} | fill: {:?} | alpha: {:.3} | {:?} | ticks: {} | collisions: {} | speed: {:.2} | sim fps: {:.1} | render fps: {:.1}",
                    layout.label(),
                    fill,
                    stats.alpha,
                    stats.phase,
                    stats.ticks,
                    stats.collisions,
                    stats.mean_speed,
                    sim_fps,
                    render_fps
                ))
                .block(Block::default().borders(Borders::ALL).title("popbubbles"));
                frame.render_widget(header, chunks[0]);

                let inner = Block::default().borders(Borders::ALL).inner(chunks[1]);
                let scene = Scene {
                    bubbles: &bubbles,
                    placements: &ui_state.placements,
                    canvas: app.canvas,
                    fill,
                    focus: ui_state.focus,
                    overlay,
                };
                render::draw(
                    &scene,
                    render::Viewport {
                        width: inner.width,
                        height: inner.height,
                    },
                    &mut ui_state.framebuf,
                );

                let framebuf = &ui_state.framebuf;
                let lines: Vec<Line> = (0..framebuf.height())
                    .map(|y| {
                        let spans: Vec<Span> = (0..framebuf.width())
                            .map(|x| {
                                let cell = framebuf.get(x, y);
                                Span::styled(
                                    cell.ch.to_string(),
                                    Style::default().fg(color_for(cell.color)),
                                )
                            })
                            .collect();
                        Line::from(spans)
                    })
                    .collect();
                let viewport = Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL).title("Countries"));
                frame.render_widget(viewport, chunks[1]);

                let footer = Paragraph::new(format!(
                    "{} | 1: combine 2: country centers 3: continents 4: population | f: fill | Tab: focus | q: quit",
                    if info.is_empty() { "-" } else { info.as_str() }
                ))
                .block(Block::default().borders(Borders::ALL).title("Controls"));
                frame.render_widget(footer, chunks[2]);
            })?;

            last_render = Instant::now();
            render_counter += 1;
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn shutdown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs a fixed number of ticks without a terminal and returns the final
/// placements as pretty JSON.
pub fn run_headless(mut app: App, ticks: u64) -> Result<String, Box<dyn Error>> {
    app.sim.start();
    app.controller.apply_pending(&mut app.sim);
    let mut last: Vec<Placement> = app.sim.placements().to_vec();
    let mut moved = 0_u64;
    for _ in 0..ticks {
        app.controller.apply_pending(&mut app.sim);
        match app.sim.tick(&mut |p: &[Placement]| last.clone_from_slice(p)) {
            TickOutcome::Moved => moved += 1,
            TickOutcome::Resting | TickOutcome::Idle => break,
        }
    }
    info!(
        "headless run finished after {moved} moving ticks in {:?}, alpha {:.4}",
        app.sim.mode(),
        app.sim.alpha()
    );
    Ok(serde_json::to_string_pretty(&last)?)
}

fn bubbles_for(sim: &Simulation) -> Vec<Bubble> {
    let categories = sim.store().categories();
    sim.store()
        .entities()
        .iter()
        .map(|e| Bubble {
            code: e.id.0.chars().collect(),
            radius: e.radius,
            color: ColorId::for_index(
                categories.iter().position(|c| c == &e.category).unwrap_or(0),
            ),
        })
        .collect()
}

fn legend_for(sim: &Simulation, names: &ContinentNames) -> Vec<(String, ColorId)> {
    sim.store()
        .categories()
        .iter()
        .enumerate()
        .map(|(idx, c)| (names.name(c).to_string(), ColorId::for_index(idx)))
        .collect()
}

struct UiState {
    framebuf: render::FrameBuffer,
    placements: Vec<Placement>,
    focus: Option<usize>,
}

impl UiState {
    fn new(placements: Vec<Placement>) -> Self {
        Self {
            framebuf: render::FrameBuffer::new(0, 0),
            placements,
            focus: None,
        }
    }

    /// Steps through the entities and back to no focus.
    fn cycle_focus(&mut self, count: usize, step: isize) {
        if count == 0 {
            self.focus = None;
            return;
        }
        let slots = count as isize + 1;
        let current = self.focus.map_or(count as isize, |idx| idx as isize);
        let next = (current + step).rem_euclid(slots) as usize;
        self.focus = (next < count).then_some(next);
    }
}

fn color_for(color: ColorId) -> Color {
    match color {
        ColorId::White => Color::White,
        ColorId::Cyan => Color::Cyan,
        ColorId::Blue => Color::Blue,
        ColorId::Green => Color::Green,
        ColorId::Yellow => Color::Yellow,
        ColorId::Magenta => Color::Magenta,
        ColorId::Red => Color::Red,
        ColorId::LightBlue => Color::LightBlue,
        ColorId::LightGreen => Color::LightGreen,
        ColorId::Gray => Color::DarkGray,
    }
}

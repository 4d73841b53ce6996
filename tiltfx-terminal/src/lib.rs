/// Terminal host for the tilt engine: mouse motion tilts a stack of ASCII
/// layer outlines.
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyCode, KeyEvent, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Point2;
use std::convert::Infallible;
use std::fs;
use std::io::{self, stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tiltfx_core::{
    ContainerLayout, FrameEmulator, Host, LayerConfig, LayerRole, LayerTransform, PointerSample, Surface,
    TiltEngine,
};

pub mod renderer;

pub use renderer::Canvas;

use renderer::{glyph_color, BACK_GLYPH, FRONT_GLYPHS};

/// Rows reserved above the container for the status line
const STATUS_ROWS: u16 = 1;

/// A layer as the terminal sees it: a glyph and the last transform written.
#[derive(Debug, Clone)]
pub struct CellLayer {
    pub glyph: char,
    pub transform: LayerTransform,
}

impl Surface for CellLayer {
    fn set_transform(&mut self, transform: &LayerTransform) {
        self.transform = *transform;
    }
}

/// The terminal window below the status line is the container.
#[derive(Debug)]
pub struct TerminalHost {
    columns: u16,
    rows: u16,
    fronts_created: usize,
}

impl TerminalHost {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            fronts_created: 0,
        }
    }

    pub fn set_size(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Whether a terminal cell lies inside the container.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column < self.columns && row >= STATUS_ROWS && row < self.rows
    }
}

impl Host for TerminalHost {
    type Surface = CellLayer;
    type Error = Infallible;

    fn create_surface(
        &mut self,
        role: LayerRole,
        _source: &str,
        _opacity: Option<f64>,
    ) -> Result<CellLayer, Infallible> {
        let glyph = match role {
            LayerRole::Back => BACK_GLYPH,
            LayerRole::Front => {
                let glyph = FRONT_GLYPHS[self.fronts_created.min(FRONT_GLYPHS.len() - 1)];
                self.fronts_created += 1;
                glyph
            }
        };

        Ok(CellLayer {
            glyph,
            transform: LayerTransform::rest(0.0),
        })
    }

    fn mount(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn measure(&self) -> ContainerLayout {
        ContainerLayout::new(
            f64::from(self.columns),
            f64::from(self.rows.saturating_sub(STATUS_ROWS)),
        )
    }

    fn container_origin(&self) -> Point2<f64> {
        Point2::new(0.0, f64::from(STATUS_ROWS))
    }
}

/// Read a layer configuration from a TOML file.
pub fn load_config(path: &Path) -> io::Result<LayerConfig> {
    let text = fs::read_to_string(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to read config file {}: {}", path.display(), e),
        )
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> io::Result<LayerConfig> {
    toml::from_str(text).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse config: {}", e))
    })
}

/// Main application struct for the terminal tilt demo
pub struct TerminalApp {
    engine: TiltEngine<TerminalHost>,
    canvas: Canvas,
    frames: FrameEmulator,
    started: Instant,
    reset_at: Option<f64>,
    pointer_inside: bool,
    running: bool,
    dirty: bool,
}

impl TerminalApp {
    pub fn new(config: LayerConfig) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self::with_size(config, columns, rows))
    }

    pub fn with_size(config: LayerConfig, columns: u16, rows: u16) -> Self {
        let host = TerminalHost::new(columns, rows);
        let engine = match TiltEngine::new(host, "terminal", &config) {
            Ok(engine) => engine,
            Err(never) => match never {},
        };
        let layout = engine.stack().layout();

        let mut app = Self {
            engine,
            canvas: Canvas::new(layout.width as usize, layout.height as usize),
            frames: FrameEmulator::default(),
            started: Instant::now(),
            reset_at: None,
            pointer_inside: false,
            running: true,
            dirty: true,
        };
        app.engine.reset();
        app
    }

    pub fn engine(&self) -> &TiltEngine<TerminalHost> {
        &self.engine
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            // Collect input until the next emulated refresh tick
            let frame = self.frames.request(self.now_ms());
            let deadline = self.started + Duration::from_secs_f64(frame.timestamp_ms / 1000.0);
            loop {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if !event::poll(timeout)? {
                    break;
                }
                let event = event::read()?;
                self.handle_event(event);
            }

            self.update(self.now_ms());
            if self.dirty {
                self.render()?;
                self.dirty = false;
            }
        }

        Ok(())
    }

    /// Event intake: record input, never compute transforms.
    pub fn handle_event(&mut self, event: Event) {
        let now = self.now_ms();
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('r') => {
                    self.engine.reset();
                    self.dirty = true;
                }
                _ => {}
            },
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => {
                if self.engine.host().contains(column, row) {
                    self.pointer_inside = true;
                    self.reset_at = None;
                    self.engine
                        .pointer_moved(&PointerSample::at_page(f64::from(column), f64::from(row)));
                } else {
                    self.pointer_leave(now);
                }
            }
            Event::FocusLost => self.pointer_leave(now),
            Event::Resize(columns, rows) => {
                self.engine.host_mut().set_size(columns, rows);
                self.engine.window_resized(now);
                let layout = self.engine.host().measure();
                self.canvas.resize(layout.width as usize, layout.height as usize);
                self.dirty = true;
            }
            _ => {}
        }
    }

    fn pointer_leave(&mut self, now: f64) {
        if !self.pointer_inside {
            return;
        }
        self.pointer_inside = false;
        let delay = self.engine.pointer_left();
        self.reset_at = Some(now + delay.as_secs_f64() * 1000.0);
    }

    /// Tick stage: apply the latest pointer position and any due reset.
    pub fn update(&mut self, now: f64) {
        if self.engine.has_pending_frame() && self.engine.tick() > 0 {
            self.dirty = true;
        }

        if self.reset_at.is_some_and(|at| now >= at) {
            self.reset_at = None;
            if self.engine.reset_after_leave() {
                self.dirty = true;
            }
        }
    }

    /// Draw every layer, back to front.
    pub fn paint(&mut self) {
        self.canvas.clear();
        for layer in self.engine.stack().layers() {
            let surface = layer.surface();
            self.canvas
                .draw_layer(&surface.transform, surface.glyph, glyph_color(surface.glyph));
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.paint();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, STATUS_ROWS))?;
        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "TiltFx Terminal | Layers: {} | Move the mouse to tilt  R=Reset Q=Quit",
                self.engine.stack().layer_count()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

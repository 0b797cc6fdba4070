use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    DefaultTerminal, Frame,
};
use std::fs::File;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sonic_vision::catalog::Catalog;
use sonic_vision::config::{PlayerCli, PlayerConfig, PlayerFileConfig};
use sonic_vision::lyrics::{KaraokeView, LineEstimator, LyricsDocument};
use sonic_vision::lyrics_client::{LookupError, LyricsLookup};
use sonic_vision::playback::{
    MediaEvent, MediaSource, PlaybackController, PlayerStatus, RodioElement,
};
use sonic_vision::visualizer::{CanvasView, PixelCanvas, RenderLoop, SteppedScheduler};

const CANVAS_WIDTH: f32 = 800.0;
const CANVAS_HEIGHT: f32 = 400.0;
const TICK: Duration = Duration::from_millis(16);
const SEEK_STEP: f64 = 5.0;
const VOLUME_STEP: f32 = 0.05;

struct App {
    controller: PlaybackController<RodioElement>,
    render_loop: RenderLoop<SteppedScheduler>,
    canvas: PixelCanvas,
    catalog: Catalog,
    current_song: Option<String>,
    lyrics: Option<LyricsDocument>,
    estimator: LineEstimator,
    lookup: Option<LyricsLookup>,
    pending_lookup: Option<Receiver<Result<LyricsDocument, LookupError>>>,
    message: Option<String>,
    started: Instant,
    should_quit: bool,
}

impl App {
    fn new(config: &PlayerConfig, catalog: Catalog) -> Result<Self> {
        let element = RodioElement::open(config.device.as_deref())
            .context("Failed to open audio output")?;
        let lookup = match &config.proxy_url {
            Some(url) => Some(LyricsLookup::new(url, config.lookup_timeout)?),
            None => None,
        };
        let render_loop = RenderLoop::new(SteppedScheduler::new(), config.theme);
        let mut canvas = PixelCanvas::scaled(CANVAS_WIDTH, CANVAS_HEIGHT, 80, 40);
        render_loop.clear(&mut canvas);

        Ok(Self {
            controller: PlaybackController::with_volume(element, config.volume),
            render_loop,
            canvas,
            catalog,
            current_song: None,
            lyrics: None,
            estimator: LineEstimator::default(),
            lookup,
            pending_lookup: None,
            message: None,
            started: Instant::now(),
            should_quit: false,
        })
    }

    fn set_lyrics(&mut self, lyrics: Option<LyricsDocument>) {
        let lines = lyrics.as_ref().map_or(0, LyricsDocument::line_count);
        self.estimator.reset(lines);
        self.lyrics = lyrics;
    }

    fn load_song(&mut self, id: &str) -> Result<()> {
        let Some(song) = self.catalog.find(id).cloned() else {
            bail!("No song '{}' in the catalog", id);
        };
        self.controller.load(MediaSource::Catalog(song.clone()))?;
        self.current_song = Some(song.id.clone());
        self.pending_lookup = None;
        self.set_lyrics(Some(song.document()));
        self.message = None;
        Ok(())
    }

    fn load_file(&mut self, path: &Path, query: Option<String>) -> Result<()> {
        self.controller.load(MediaSource::File(path.to_path_buf()))?;
        self.current_song = None;
        self.set_lyrics(None);
        self.message = None;

        let query = query.or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
        });
        self.pending_lookup = match (&self.lookup, query) {
            (Some(lookup), Some(query)) => {
                info!("Looking up lyrics for '{}'", query);
                Some(lookup.spawn(query))
            }
            _ => None,
        };
        Ok(())
    }

    fn next_song(&mut self) {
        let Some(next) = self
            .catalog
            .next_after(self.current_song.as_deref())
            .map(|song| song.id.clone())
        else {
            self.message = Some("The catalog is empty".to_string());
            return;
        };
        if let Err(e) = self.load_song(&next) {
            self.message = Some(e.to_string());
            return;
        }
        self.controller.play();
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.controller.toggle(),
            KeyCode::Char('t') => {
                let theme = self.render_loop.theme().next();
                info!("Theme: {}", theme.name);
                self.render_loop.set_theme(theme);
                self.render_loop.clear(&mut self.canvas);
            }
            KeyCode::Char('v') => self.render_loop.toggle_mode(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                let volume = self.controller.state().volume + VOLUME_STEP;
                self.controller.set_volume(volume);
            }
            KeyCode::Char('-') | KeyCode::Down => {
                let volume = self.controller.state().volume - VOLUME_STEP;
                self.controller.set_volume(volume);
            }
            KeyCode::Right => self.controller.seek_by(SEEK_STEP),
            KeyCode::Left => self.controller.seek_by(-SEEK_STEP),
            KeyCode::Char('n') => self.next_song(),
            KeyCode::Char('x') => self.message = None,
            _ => {}
        }
    }

    /// One display refresh: media events, lyric lookups, then any due frame.
    fn tick(&mut self) {
        for event in self.controller.poll() {
            match event {
                MediaEvent::LoadedMetadata { duration } => {
                    info!("Duration: {:.1}s", duration);
                }
                MediaEvent::TimeUpdate(time) => {
                    self.estimator.update(time);
                }
                MediaEvent::Ended => info!("Song ended"),
            }
        }

        if let Some(rx) = &self.pending_lookup {
            match rx.try_recv() {
                Ok(Ok(document)) => {
                    self.pending_lookup = None;
                    self.set_lyrics(Some(document));
                }
                Ok(Err(e)) => {
                    self.pending_lookup = None;
                    self.message = Some(e.to_string());
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("Lyrics lookup thread went away");
                    self.pending_lookup = None;
                }
            }
        }

        self.render_loop.sync(self.controller.visualization_active());
        let timestamp = self.started.elapsed().as_secs_f64();
        for handle in self.render_loop.scheduler_mut().take_ready() {
            if let Some(analyzer) = self.controller.analyzer_mut() {
                self.render_loop
                    .on_frame(handle, timestamp, analyzer, &mut self.canvas);
            }
        }
    }

    fn layout(&self, area: Rect) -> Rc<[Rect]> {
        let mut constraints = vec![
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(1),
            Constraint::Length(1),
        ];
        if self.message.is_some() {
            constraints.push(Constraint::Length(1));
        }
        Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area)
    }

    /// Rasterizes the visualizer at one pixel per column and two per row of
    /// its terminal area.
    fn fit_canvas(&mut self, area: Rect) {
        let canvas_area = self.layout(area)[1];
        let width = canvas_area.width.max(1) as u32;
        let height = canvas_area.height.max(1) as u32 * 2;
        if self.canvas.resize(width, height) {
            debug!("Canvas resized to {}x{}", width, height);
            self.render_loop.clear(&mut self.canvas);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = self.layout(frame.area());

        let theme = self.render_loop.theme();
        let primary = theme.colors.primary.to_terminal();

        let title = match self.controller.source() {
            Some(source) => source.label(),
            None => "No song loaded".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Sonic Vision ", Style::default().fg(primary).bold()),
                Span::raw(title),
            ])),
            chunks[0],
        );

        frame.render_widget(CanvasView::new(&self.canvas), chunks[1]);

        frame.render_widget(
            KaraokeView::new(self.lyrics.as_ref(), self.estimator.current(), theme)
                .loading(self.pending_lookup.is_some()),
            chunks[2],
        );

        self.draw_progress(frame, chunks[3]);

        let state = self.controller.state();
        let status = match self.controller.status() {
            PlayerStatus::Idle => "idle",
            PlayerStatus::Loaded => "ready",
            PlayerStatus::Playing => "playing",
            PlayerStatus::Paused => "paused",
            PlayerStatus::Ended => "ended",
        };
        let mode = self.render_loop.mode();
        let help = format!(
            " {} | vol {:>3}% | {} ({}) - {} | {} | space play/pause  t theme  v mode  +/- volume  ←/→ seek  n next  q quit",
            status,
            (state.volume * 100.0).round() as u32,
            theme.name,
            theme.style,
            mode.label(),
            mode.description(),
        );
        frame.render_widget(Paragraph::new(help).dim(), chunks[4]);

        if let Some(message) = &self.message {
            frame.render_widget(
                Paragraph::new(format!(" {}  (x to dismiss)", message))
                    .style(Style::default().fg(Color::LightRed)),
                chunks[5],
            );
        }
    }

    fn draw_progress(&self, frame: &mut Frame, area: Rect) {
        let state = self.controller.state();
        let ratio = if state.duration > 0.0 {
            (state.current_time / state.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let label = format!(
            "{} / {}",
            format_time(state.current_time),
            format_time(state.duration)
        );
        frame.render_widget(
            Gauge::default()
                .gauge_style(
                    Style::default().fg(self.render_loop.theme().colors.secondary.to_terminal()),
                )
                .ratio(ratio)
                .label(label),
            area,
        );
    }
}

fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    while !app.should_quit {
        let size = terminal.size()?;
        app.fit_canvas(Rect::new(0, 0, size.width, size.height));
        app.tick();
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = PlayerCli::parse();

    if cli.list_devices {
        for name in RodioElement::output_device_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let file_config = cli.config.as_deref().map(PlayerFileConfig::load).transpose()?;
    let config = PlayerConfig::resolve(&cli, file_config)?;
    init_logging(&config.log_file)?;
    info!("sonic-vision starting...");

    let catalog = match Catalog::load(&config.catalog) {
        Ok(catalog) => catalog,
        Err(e) if config.song.is_none() => {
            warn!("Catalog unavailable: {}", e);
            Catalog::default()
        }
        Err(e) => return Err(e.into()),
    };

    let mut app = App::new(&config, catalog)?;
    match (&config.file, &config.song) {
        (Some(path), _) => app.load_file(path, config.lyrics_query.clone())?,
        (None, Some(id)) => app.load_song(id)?,
        (None, None) => {
            if let Some(first) = app.catalog.songs().first().map(|song| song.id.clone()) {
                app.load_song(&first)?;
            }
        }
    }
    app.controller.play();

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app);
    ratatui::restore();
    result
}

use crate::export::{write_csv, write_snapshot};
use crate::form::{FormStatus, SubmissionForm};
use anyhow::{Context, Result};
use cueing_core::{Phase, ResponseDirection, SessionPhase};
use cueing_experiment::{Handled, ResponseEvent, SessionEvent, SessionStateMachine};
use cueing_render::{EndScreen, FontVec, FrameView, SkiaRenderer, SubmitStatus};
use cueing_report::{HttpReporter, ReportError, ResultReporter};
use cueing_timing::{Deadline, HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

type Session = SessionStateMachine<HighPrecisionTimer, StdRng>;
type Delivery = Result<serde_json::Value, ReportError>;

pub struct AppOptions {
    pub debug: bool,
    pub export_dir: PathBuf,
    pub crosshair: bool,
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    font: Option<FontVec>,

    session: Session,
    form: SubmissionForm,
    reporter: HttpReporter,
    delivery: Option<Receiver<Delivery>>,
    flash: Option<Deadline>,

    options: AppOptions,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    refresh_rate: Option<f64>,
    should_exit: bool,
}

impl App {
    pub fn new(
        session: Session,
        form: SubmissionForm,
        reporter: HttpReporter,
        options: AppOptions,
        font: Option<FontVec>,
    ) -> Result<Self> {
        if options.debug {
            write_snapshot(&options.export_dir, &session)?;
            write_csv(&options.export_dir, &session)?;
        }

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            font,
            session,
            form,
            reporter,
            delivery: None,
            flash: None,
            options,
            current_size: None,
            scale_factor: 1.0,
            refresh_rate: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            endpoint = self.reporter.endpoint(),
            "press SPACE to start or ESC to exit"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .context("no monitor available")?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title("Visual Search")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale = self.scale_factor,
            refresh_hz = self.refresh_rate,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SkiaRenderer::new(
            physical_size.width,
            physical_size.height,
            self.font.take(),
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pix), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let phase = *self.session.current_phase();
        let mut view = FrameView::new(phase);
        view.layout = self.session.visible_layout();
        view.practice_progress = self.session.trial_progress().filter(|_| phase.is_practice());
        view.block_progress = self.session.block_progress();
        view.flash = self
            .flash
            .is_some_and(|d| !d.is_due(&self.session.timer));
        view.crosshair = self.options.crosshair;

        if phase.is_ended() {
            let status = match self.form.status() {
                FormStatus::Editing => SubmitStatus::Editing,
                FormStatus::Sending => SubmitStatus::Sending,
                FormStatus::Sent => SubmitStatus::Sent,
                FormStatus::Failed(msg) => SubmitStatus::Failed(msg),
            };
            view.end = Some(EndScreen {
                correct: self.session.total_correct(),
                total: self.session.main_trial_count(),
                participant: self.form.participant(),
                condition: self.form.condition().unwrap_or("-"),
                status,
            });
        }

        let timer = &self.session.timer;
        let stats = renderer.render_frame(&view, pix.frame_mut(), timer)?;
        let now = timer.now();
        pix.render()?;
        trace!(
            present_ms = timer.elapsed(now).as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            phase_ms = stats.phase.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            dirty = stats.dirty_count,
            "frame"
        );
        Ok(())
    }

    fn update(&mut self) {
        for event in self.session.update() {
            self.session.handle_event(event);
        }
        if self.flash.is_some_and(|d| d.is_due(&self.session.timer)) {
            self.flash = None;
        }
        self.poll_delivery();
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match self.session.handle_event(event) {
            Handled::Scored(feedback) if !feedback.outcome.is_correct() => {
                self.flash = Some(Deadline::after(
                    &self.session.timer,
                    self.session.config.incorrect_feedback(),
                ));
            }
            Handled::Transitioned(phase) => debug!(?phase, "phase changed"),
            _ => {}
        }
    }

    fn handle_input(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if code == KeyCode::Escape {
            self.cleanup_and_exit(event_loop);
            return;
        }

        let phase = *self.session.current_phase();
        if phase.is_ended() {
            self.handle_form_input(code, event);
            return;
        }

        match code {
            KeyCode::Space if phase == SessionPhase::Idle => {
                self.dispatch(SessionEvent::BeginPractice)
            }
            KeyCode::Space if phase == SessionPhase::MainPending => {
                self.dispatch(SessionEvent::BeginMain)
            }
            KeyCode::ArrowLeft | KeyCode::ArrowRight if phase.allows_response() => {
                let direction = if code == KeyCode::ArrowLeft {
                    ResponseDirection::Left
                } else {
                    ResponseDirection::Right
                };
                let stamped = ResponseEvent::at(direction, self.session.timer.now());
                self.dispatch(SessionEvent::Response(stamped));
            }
            KeyCode::KeyE if self.options.debug => {
                if let Err(e) = write_csv(&self.options.export_dir, &self.session) {
                    error!("{e:#}");
                }
            }
            _ => {}
        }
    }

    fn handle_form_input(&mut self, code: KeyCode, event: &KeyEvent) {
        match code {
            KeyCode::Tab | KeyCode::ArrowDown => self.form.cycle_condition(true),
            KeyCode::ArrowUp => self.form.cycle_condition(false),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter | KeyCode::NumpadEnter => self.submit(),
            _ => {
                if let Some(text) = &event.text {
                    self.form.push_str(text);
                }
            }
        }
    }

    fn submit(&mut self) {
        if !self.form.is_editable() {
            return;
        }
        let records = match self.session.finished_results() {
            Ok(records) => records,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };
        let submission = match self.form.begin_submit(records) {
            Ok(submission) => submission,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        let reporter = self.reporter.clone();
        thread::spawn(move || {
            let _ = tx.send(reporter.submit(&submission));
        });
        self.delivery = Some(rx);
    }

    fn poll_delivery(&mut self) {
        let Some(rx) = &self.delivery else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(Ok(ack)) => {
                info!(%ack, "results delivered");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(retryable = e.is_retryable(), "{e}");
                Err(e.to_string())
            }
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("submission worker stopped".to_string()),
        };
        self.form.finish(outcome);
        self.delivery = None;
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                error!("failed to resize renderer: {e:#}");
            }
        }
        info!(
            width = new_size.width,
            height = new_size.height,
            "display resized"
        );
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        if !self.session.current_phase().is_ended() {
            warn!(
                recorded = self.session.results().len(),
                "exiting before the session ended; results were not submitted"
            );
        } else if self.form.status() != &FormStatus::Sent {
            warn!("exiting without a successful submission");
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!("render failed: {e:#}");
                    event_loop.exit();
                    return;
                }
                self.update();
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_input(&event, event_loop);
            }
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

mod audio;
mod cli;
mod input;
mod render;

use clap::Parser;
use winit::keyboard::{Key, NamedKey};
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use particle_morph::{FrequencySource, Visualizer};

use crate::audio::{AudioPlayer, PlayerStatus};
use crate::cli::Args;
use crate::input::{start_mouse_tracker, CursorCell};
use crate::render::GpuState;

const COUNT_STEP: usize = 5_000;
const COUNT_MIN: usize = 1_000;
const SENSITIVITY_STEP: f32 = 0.25;
const POINT_SIZE_STEP: f32 = 0.05;

fn window_title(vis: &Visualizer) -> String {
    let shape = if vis.engine().is_shell() {
        "shell".to_string()
    } else {
        vis.config().shape.to_string()
    };
    format!(
        "particle-morph: {shape} ({} particles, sensitivity {:.2}, size {:.2})",
        vis.config().particle_count,
        vis.config().sensitivity,
        vis.config().point_size
    )
}

fn apply_scale_factor(vis: &mut Visualizer, scale_factor: f64) {
    if let Err(e) = vis.set_pixel_density(scale_factor as f32) {
        log::warn!("ignoring scale factor {scale_factor}: {e}");
    }
}

fn open_audio(args: &Args) -> Option<AudioPlayer> {
    let path = args.audio.as_ref()?;
    let mut player = match AudioPlayer::new() {
        Ok(p) => p,
        Err(e) => {
            log::error!("audio output unavailable: {e:#}");
            return None;
        }
    };
    if let Err(e) = player.load(path) {
        log::error!("could not load audio: {e:#}");
        return Some(player);
    }
    if args.autoplay {
        player.play();
    }
    Some(player)
}

/// Apply one key press. Returns false when the app should quit.
fn handle_key(key: &Key, vis: &mut Visualizer, player: Option<&mut AudioPlayer>) -> bool {
    match key {
        Key::Named(NamedKey::Escape) => return false,
        Key::Named(NamedKey::ArrowRight) => vis.set_shape(vis.config().shape.next()),
        Key::Named(NamedKey::ArrowLeft) => vis.set_shape(vis.config().shape.prev()),
        Key::Named(NamedKey::Space) => {
            if let Some(p) = player {
                p.toggle();
            }
        }
        Key::Character(c) => match c.as_str() {
            "s" | "S" => {
                if let Some(p) = player {
                    p.stop();
                    vis.reset_audio();
                }
            }
            "[" | "]" => {
                let step = if c.as_str() == "]" { SENSITIVITY_STEP } else { -SENSITIVITY_STEP };
                let sensitivity = (vis.config().sensitivity + step).max(0.0);
                if let Err(e) = vis.set_sensitivity(sensitivity) {
                    log::warn!("{e}");
                }
            }
            "," | "." => {
                let step = if c.as_str() == "." { POINT_SIZE_STEP } else { -POINT_SIZE_STEP };
                let size = (vis.config().point_size + step).max(POINT_SIZE_STEP);
                if let Err(e) = vis.set_point_size(size) {
                    log::warn!("{e}");
                }
            }
            "c" | "C" => {
                let enabled = !vis.config().camera_enabled;
                vis.set_camera_enabled(enabled);
                log::info!("hand tracking {}", if enabled { "on" } else { "off" });
            }
            "+" | "=" => {
                let count = vis.config().particle_count + COUNT_STEP;
                if let Err(e) = vis.set_particle_count(count) {
                    log::warn!("{e}");
                }
            }
            "-" | "_" => {
                let count = vis
                    .config()
                    .particle_count
                    .saturating_sub(COUNT_STEP)
                    .max(COUNT_MIN);
                if let Err(e) = vis.set_particle_count(count) {
                    log::warn!("{e}");
                }
            }
            _ => {}
        },
        _ => {}
    }
    true
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.visual_config()?;
    let mut visualizer = Visualizer::new(config)?;
    if let Some(name) = args.unknown_shape() {
        visualizer.set_shape_named(name);
    }
    let mut player = open_audio(&args);

    let mut cursor: Option<CursorCell> = None;
    if visualizer.config().camera_enabled {
        match start_mouse_tracker() {
            Ok((cell, feed)) => {
                visualizer.attach_gesture(feed.factor, feed.status);
                cursor = Some(cell);
            }
            Err(e) => {
                log::warn!("hand tracking unavailable: {e}");
                visualizer.set_camera_enabled(false);
            }
        }
    }

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(window_title(&visualizer))
        .build(&event_loop)?;
    apply_scale_factor(&mut visualizer, window.scale_factor());

    let mut state = pollster::block_on(GpuState::new(&window, visualizer.config().particle_count))?;
    let (w, h) = state.size();
    visualizer.camera_mut().set_viewport(w, h);
    let mut audio_status = player.as_mut().map(AudioPlayer::status);
    let mut gesture_status = visualizer.gesture_status().cloned();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                state.resize(size);
                visualizer.camera_mut().set_viewport(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                apply_scale_factor(&mut visualizer, scale_factor);
            }
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(cell) = &cursor {
                    let (w, h) = state.size();
                    cell.publish(Some([
                        position.x as f32 / w.max(1) as f32,
                        position.y as f32 / h.max(1) as f32,
                    ]));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(cell) = &cursor {
                    cell.publish(None);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if !handle_key(&logical_key, &mut visualizer, player.as_mut()) {
                    elwt.exit();
                }
                state.window.set_title(&window_title(&visualizer));
            }
            _ => {}
        },
        Event::AboutToWait => {
            let status = player.as_mut().map(AudioPlayer::status);
            if status != audio_status {
                match &status {
                    Some(PlayerStatus::Error(msg)) => log::error!("audio: {msg}"),
                    Some(s) => log::info!("audio status: {s:?}"),
                    None => {}
                }
                audio_status = status;
            }
            let hand = visualizer.gesture_status().cloned();
            if hand != gesture_status {
                if let Some(s) = &hand {
                    log::info!("hand tracking status: {s:?}");
                }
                gesture_status = hand;
            }
            let (w, h) = state.size();
            let source = player.as_mut().map(|p| p as &mut dyn FrequencySource);
            let frame = visualizer.frame(source);
            let uniforms = frame.uniforms.pack(frame.view_proj, [w as f32, h as f32]);
            match state.render(frame.particles, &uniforms) {
                Ok(()) => state.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => {
                    log::warn!("surface lost, reconfiguring");
                    state.resize(state.window.inner_size());
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("GPU out of memory");
                    elwt.exit();
                }
                Err(e) => log::warn!("frame skipped: {e}"),
            }
        }
        _ => {}
    })?;
    Ok(())
}

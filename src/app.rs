use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::context::ViewerContext;
use crate::decode::PixelData;
use crate::loader::{self, LoadOptions, LoadOutcome};
use crate::metadata::Rotation;
use crate::scanner::{self, DirectoryTable};
use crate::sort_order::{self, SystemShell};
use crate::thumbs::{self, ATLAS_DIM, ThumbnailAtlas};
use crate::view;

/// Shown when no file is open or the current file failed to load.
const LOGO_PNG: &[u8] = include_bytes!("../assets/glimpse-logo.png");

/// Transient status-line alerts expire after this many frames.
const ALERT_FRAMES: u32 = 300;

/// On-screen edge length of one thumbnail in the strip.
const STRIP_CELL: f32 = 80.0;

struct Alert {
    message: String,
    frames_left: u32,
}

struct AnimPlayback {
    frame: usize,
    count: usize,
    delays_ms: Vec<u32>,
    last_flip: Instant,
    playing: bool,
}

pub struct GlimpseApp {
    shared: Arc<ViewerContext>,
    config: AppConfig,
    load_tx: mpsc::SyncSender<LoadOutcome>,
    load_rx: mpsc::Receiver<LoadOutcome>,
    texture: Option<egui::TextureHandle>,
    logo: egui::TextureHandle,
    showing_placeholder: bool,
    anim: Option<AnimPlayback>,
    zoom: f32,
    pan: egui::Vec2,
    rotation: Rotation,
    aspect: Option<(u32, u32)>,
    alert: Option<Alert>,
    show_exif: bool,
    show_histogram: bool,
    show_settings: bool,
}

impl GlimpseApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        initial_path: Option<PathBuf>,
    ) -> Self {
        let shared = ViewerContext::new(crate::context::DEFAULT_MAX_GPU);
        let (load_tx, load_rx) = mpsc::sync_channel(8);

        let logo_image = image::load_from_memory(LOGO_PNG)
            .expect("embedded logo should decode as PNG")
            .into_rgba8();
        let logo_size = [logo_image.width() as usize, logo_image.height() as usize];
        let logo = cc.egui_ctx.load_texture(
            "logo",
            egui::ColorImage::from_rgba_unmultiplied(logo_size, &logo_image.into_raw()),
            egui::TextureOptions::NEAREST,
        );

        let atlas_texture = cc.egui_ctx.tex_manager().write().alloc(
            "thumbnail_atlas".into(),
            egui::ColorImage::new([ATLAS_DIM, ATLAS_DIM], egui::Color32::from_gray(24)).into(),
            egui::TextureOptions::LINEAR,
        );
        shared.atlas.lock().unwrap().attach(atlas_texture);

        let mut app = Self {
            shared,
            config,
            load_tx,
            load_rx,
            texture: None,
            logo,
            showing_placeholder: true,
            anim: None,
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            rotation: Rotation::None,
            aspect: None,
            alert: None,
            show_exif: false,
            show_histogram: false,
            show_settings: false,
        };
        if let Some(path) = initial_path {
            app.open_path(&cc.egui_ctx, &path, false);
        }
        app
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            parse_exif: self.config.parse_exif,
            calculate_histograms: self.config.calculate_histograms,
            max_gpu: self.shared.max_gpu,
        }
    }

    fn push_alert(&mut self, message: String) {
        self.alert = Some(Alert {
            message,
            frames_left: ALERT_FRAMES,
        });
    }

    /// Scans `path` and, on success, swaps in the new table and kicks off the
    /// sort resolution, the thumbnail builder and the first load. A failed
    /// scan only raises an alert; the previous table stays usable.
    fn open_path(&mut self, ctx: &egui::Context, path: &Path, dropped: bool) {
        match scanner::scan(path) {
            Ok(result) => {
                let scan_id = self.shared.scan_gen.fetch_add(1, Ordering::SeqCst) + 1;
                {
                    let mut table = self.shared.table.lock().unwrap();
                    let nav_gen = table.nav_gen + 1;
                    *table = DirectoryTable {
                        entries: result.entries,
                        current: result.current,
                        scan_id,
                        nav_gen,
                    };
                }
                self.shared.atlas.lock().unwrap().reset();

                if self.config.sort_by_shell_order {
                    sort_order::resolve(
                        &self.shared,
                        &SystemShell,
                        &result.base_dir,
                        result.requested_name.as_deref(),
                    );
                }
                if self.config.preview_thumbnails {
                    let _ = thumbs::start(Arc::clone(&self.shared), ctx.clone(), scan_id);
                }

                let current = self.shared.current_index();
                self.request(ctx, current, dropped);
            }
            Err(err) => {
                warn!(%err, path = %path.display(), "scan failed");
                self.push_alert(err.to_string());
            }
        }
    }

    fn request(&mut self, ctx: &egui::Context, index: usize, dropped: bool) {
        let dispatched = loader::request_load(
            &self.shared,
            ctx,
            &self.load_tx,
            index,
            dropped,
            self.load_options(),
        );
        if dispatched {
            // A fresh load outlives whatever the last alert complained about.
            self.alert = None;
        }
    }

    fn jump_to(&mut self, ctx: &egui::Context, index: usize) {
        if index < self.shared.file_count() {
            self.request(ctx, index, false);
        }
    }

    fn poll_input(&mut self, ctx: &egui::Context) {
        let (next, prev, reload, toggle_play) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::R) || i.key_pressed(egui::Key::F5),
                i.key_pressed(egui::Key::Space),
            )
        });
        if ctx.input(|i| i.key_pressed(egui::Key::E)) {
            self.show_exif = !self.show_exif;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::H)) {
            self.show_histogram = !self.show_histogram;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            self.show_settings = !self.show_settings;
        }

        let dropped_path = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
        if let Some(path) = dropped_path {
            self.open_path(ctx, &path, true);
            return;
        }

        let count = self.shared.file_count();
        if count == 0 || self.shared.is_sorting() {
            return;
        }
        let current = self.shared.current_index();
        if next {
            if let Some(target) = step_index(current, count, true) {
                self.request(ctx, target, false);
            }
        } else if prev {
            if let Some(target) = step_index(current, count, false) {
                self.request(ctx, target, false);
            }
        } else if reload {
            self.request(ctx, current, false);
        }

        if toggle_play {
            if let Some(anim) = &mut self.anim {
                anim.playing = !anim.playing;
                anim.last_flip = Instant::now();
            }
        }
    }

    fn drain_outcomes(&mut self, ctx: &egui::Context) {
        while let Ok(outcome) = self.load_rx.try_recv() {
            match outcome {
                LoadOutcome::Committed { index } => self.adopt_committed(ctx, index),
                LoadOutcome::Superseded { index } => {
                    debug!(index, "discarded a superseded load");
                }
                LoadOutcome::Failed { index, error } => {
                    self.push_alert(error.to_string());
                    if index == self.shared.current_index() {
                        self.set_placeholder();
                    }
                }
            }
        }
    }

    /// Uploads a freshly committed image, applies the fit/zoom/position
    /// policy and releases the CPU-side buffer of static images.
    fn adopt_committed(&mut self, ctx: &egui::Context, index: usize) {
        let (color_image, animated, delays_ms, frame_count) = {
            let mut slot = self.shared.image.lock().unwrap();
            if !slot.upload_pending {
                return;
            }
            slot.upload_pending = false;
            let Some(image) = slot.image.as_mut() else {
                return;
            };
            let size = [image.width as usize, image.height as usize];
            let Some(first) = image.frame(0) else {
                return;
            };
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, first);
            self.rotation = image.rotation;
            self.aspect = Some(view::reduced_fraction(image.width, image.height));
            let animated = image.is_animated();
            let delays_ms = match &image.pixels {
                PixelData::Animated { delays_ms, .. } => delays_ms.clone(),
                PixelData::Static { .. } => Vec::new(),
            };
            let frame_count = image.frame_count();
            if !animated {
                // Uploaded below; the raw buffer has served its purpose.
                drop(image.take_static_pixels());
            }
            (color_image, animated, delays_ms, frame_count)
        };

        let image_size = (color_image.width() as u32, color_image.height() as u32);
        self.texture = Some(ctx.load_texture(
            "current_image",
            color_image,
            egui::TextureOptions::LINEAR,
        ));
        self.showing_placeholder = false;
        self.anim = animated.then(|| AnimPlayback {
            frame: 0,
            count: frame_count,
            delays_ms,
            last_flip: Instant::now(),
            playing: self.config.autoplay_animations,
        });

        let (memory, name) = {
            let table = self.shared.table.lock().unwrap();
            let entry = table.entries.get(index);
            (
                entry.map(|e| view::ViewMemory {
                    pos: e.last_pos,
                    scale: e.last_scale,
                    manually_scaled: e.manually_scaled,
                }),
                entry.map(|e| e.name.clone()),
            )
        };
        let memory = memory.unwrap_or(view::ViewMemory {
            pos: (0.0, 0.0),
            scale: 1.0,
            manually_scaled: false,
        });
        let win = ctx.screen_rect().size();
        if let Some(scale) = view::scale_for(
            self.config.zoom_policy,
            self.config.new_file_zoom,
            (win.x, win.y),
            image_size,
            &memory,
        ) {
            self.zoom = scale;
        }
        if let Some(pos) = view::position_for(self.config.position_policy, &memory) {
            self.pan = egui::vec2(pos.0, pos.1);
        }
        if let Some(name) = name {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!("glimpse — {name}")));
        }
    }

    fn set_placeholder(&mut self) {
        self.texture = None;
        self.showing_placeholder = true;
        self.anim = None;
        self.aspect = None;
        self.rotation = Rotation::None;
        self.zoom = 4.0;
        self.pan = egui::Vec2::ZERO;
    }

    fn step_animation(&mut self, ctx: &egui::Context) {
        let Some(anim) = &mut self.anim else {
            return;
        };
        if !anim.playing || anim.count <= 1 {
            return;
        }
        let delay = Duration::from_millis(u64::from(
            anim.delays_ms.get(anim.frame).copied().unwrap_or(100),
        ));
        let elapsed = anim.last_flip.elapsed();
        if elapsed < delay {
            ctx.request_repaint_after(delay - elapsed);
            return;
        }
        anim.frame = (anim.frame + 1) % anim.count;
        anim.last_flip = Instant::now();
        let next_delay = anim.delays_ms.get(anim.frame).copied().unwrap_or(100);
        let frame_index = anim.frame;

        let slot = self.shared.image.lock().unwrap();
        if let Some(image) = slot.image.as_ref() {
            if let Some(frame) = image.frame(frame_index) {
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame);
                if let Some(texture) = &mut self.texture {
                    texture.set(color_image, egui::TextureOptions::LINEAR);
                }
            }
        }
        drop(slot);
        ctx.request_repaint_after(Duration::from_millis(u64::from(next_delay)));
    }

    fn remember_view(&self, manual_zoom: bool) {
        let mut table = self.shared.table.lock().unwrap();
        let current = table.current;
        if let Some(entry) = table.entries.get_mut(current) {
            entry.last_pos = (self.pan.x, self.pan.y);
            entry.last_scale = self.zoom;
            if manual_zoom {
                entry.manually_scaled = true;
            }
        }
    }

    fn draw_image_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(egui::Color32::from_gray(16)))
            .show(ctx, |ui| {
                let response = ui.allocate_response(
                    ui.available_size(),
                    egui::Sense::click_and_drag(),
                );
                let panel = response.rect;

                if response.dragged() {
                    self.pan += response.drag_delta();
                    self.remember_view(false);
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll != 0.0 {
                        let factor = (scroll * 0.002).exp();
                        self.zoom = (self.zoom * factor).clamp(0.01, 100.0);
                        self.remember_view(true);
                    }
                }
                if response.double_clicked() {
                    self.zoom = 1.0;
                    self.pan = egui::Vec2::ZERO;
                    self.remember_view(true);
                }

                let texture = if self.showing_placeholder || self.texture.is_none() {
                    &self.logo
                } else {
                    self.texture.as_ref().unwrap()
                };
                let tex_size = texture.size_vec2();
                let display = tex_size * self.zoom;
                let rect = egui::Rect::from_center_size(panel.center() + self.pan, display);
                let image = egui::Image::from_texture(texture)
                    .rotate(self.rotation.radians(), egui::Vec2::splat(0.5));
                image.paint_at(ui, rect);

                let (loading, _) = self.shared.current_flags();
                if loading {
                    egui::Spinner::new()
                        .paint_at(ui, egui::Rect::from_center_size(
                            panel.center(),
                            egui::vec2(32.0, 32.0),
                        ));
                }
            });
    }

    fn draw_thumb_strip(&mut self, ctx: &egui::Context) {
        let count = self.shared.file_count();
        if !self.config.preview_thumbnails || count == 0 {
            return;
        }
        let current = self.shared.current_index();
        let mut clicked: Option<usize> = None;

        egui::TopBottomPanel::bottom("thumbnail_strip")
            .exact_height(STRIP_CELL + 10.0)
            .show(ctx, |ui| {
                let fit = (ui.available_width() / (STRIP_CELL + 4.0)) as usize + 2;
                let (start, end) = strip_range(current, count, fit);

                let atlas_texture = self.shared.atlas.lock().unwrap().texture();
                let ready: Vec<bool> = {
                    let atlas = self.shared.atlas.lock().unwrap();
                    (start..end).map(|i| atlas.is_ready(i)).collect()
                };

                ui.horizontal(|ui| {
                    for (offset, index) in (start..end).enumerate() {
                        let (rect, response) = ui.allocate_exact_size(
                            egui::vec2(STRIP_CELL, STRIP_CELL),
                            egui::Sense::click(),
                        );
                        let painter = ui.painter();
                        match (atlas_texture, ThumbnailAtlas::uv_rect(index)) {
                            (Some(texture), Some(uv)) if ready[offset] => {
                                painter.image(texture, rect, uv, egui::Color32::WHITE);
                            }
                            _ => {
                                painter.rect_filled(rect, 2.0, egui::Color32::from_gray(40));
                            }
                        }
                        if index == current {
                            painter.rect_stroke(
                                rect,
                                2.0,
                                egui::Stroke::new(2.0, ui.visuals().selection.bg_fill),
                                egui::StrokeKind::Inside,
                            );
                        }
                        if response.clicked() {
                            clicked = Some(index);
                        }
                    }
                });
            });

        if let Some(index) = clicked {
            self.jump_to(ctx, index);
        }
    }

    fn draw_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let count = self.shared.file_count();
                if count == 0 {
                    ui.label("No file open — drop an image or folder here");
                } else {
                    let current = self.shared.current_index();
                    let name = self.shared.current_file_name().unwrap_or_default();
                    ui.label(format!("{} / {}", current + 1, count));
                    ui.separator();
                    ui.label(egui::RichText::new(name).strong());
                    if let Some((a, b)) = self.aspect {
                        ui.separator();
                        ui.label(format!("{a}:{b}"));
                    }
                    ui.separator();
                    ui.label(format!("{:.0}%", self.zoom * 100.0));
                    let (loading, failed) = self.shared.current_flags();
                    if loading {
                        ui.separator();
                        ui.spinner();
                    } else if failed {
                        ui.separator();
                        ui.colored_label(egui::Color32::LIGHT_RED, "failed");
                    }
                }

                if let Some(alert) = &mut self.alert {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, alert.message.as_str());
                    alert.frames_left = alert.frames_left.saturating_sub(1);
                    ui.ctx().request_repaint_after(Duration::from_millis(33));
                }
                if self
                    .alert
                    .as_ref()
                    .is_some_and(|alert| alert.frames_left == 0)
                {
                    self.alert = None;
                }
            });
        });
    }

    fn draw_exif_window(&mut self, ctx: &egui::Context) {
        if !self.show_exif {
            return;
        }
        let metadata = self.shared.metadata_snapshot();
        let mut open = self.show_exif;
        egui::Window::new("EXIF")
            .open(&mut open)
            .default_size([300.0, 260.0])
            .show(ctx, |ui| {
                let Some(meta) = metadata else {
                    ui.label(egui::RichText::new("No EXIF data").weak());
                    return;
                };
                egui::Grid::new("exif_grid")
                    .num_columns(2)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        let mut row = |label: &str, value: Option<String>| {
                            if let Some(v) = value {
                                ui.label(egui::RichText::new(label).weak());
                                ui.label(v);
                                ui.end_row();
                            }
                        };

                        let camera = match (&meta.camera_make, &meta.camera_model) {
                            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
                            (Some(make), None) => Some(make.clone()),
                            (None, Some(model)) => Some(model.clone()),
                            _ => None,
                        };

                        row("Camera", camera);
                        row("Lens", meta.lens.clone());
                        row("Date", meta.date_taken.clone());
                        row("Shutter", meta.shutter_speed.clone());
                        row("Aperture", meta.aperture.clone());
                        row("ISO", meta.iso.map(|v| v.to_string()));
                        row("Focal length", meta.focal_length.clone());
                        let turns = meta.rotation.quarter_turns();
                        if turns != 0 {
                            row("Rotation", Some(format!("{}°", u32::from(turns) * 90)));
                        }
                    });
            });
        self.show_exif = open;
    }

    fn draw_histogram_window(&mut self, ctx: &egui::Context) {
        if !self.show_histogram {
            return;
        }
        let histogram = self.shared.histogram_snapshot();
        let mut open = self.show_histogram;
        egui::Window::new("Histogram")
            .open(&mut open)
            .default_size([280.0, 140.0])
            .show(ctx, |ui| {
                let Some(hist) = histogram else {
                    ui.label(egui::RichText::new("No histogram for this image").weak());
                    return;
                };
                let (rect, _) = ui.allocate_exact_size(
                    egui::vec2(ui.available_width(), 120.0),
                    egui::Sense::hover(),
                );
                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, 2.0, egui::Color32::from_gray(12));
                if hist.max == 0 {
                    return;
                }
                let channels = [
                    (&hist.r, egui::Color32::from_rgb(220, 80, 80)),
                    (&hist.g, egui::Color32::from_rgb(90, 200, 90)),
                    (&hist.b, egui::Color32::from_rgb(90, 120, 230)),
                ];
                for (bins, color) in channels {
                    let points: Vec<egui::Pos2> = bins
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| {
                            let x = rect.left() + rect.width() * (i as f32 / 255.0);
                            let y = rect.bottom()
                                - rect.height() * (v as f32 / hist.max as f32).min(1.0);
                            egui::pos2(x, y)
                        })
                        .collect();
                    painter.add(egui::Shape::line(points, egui::Stroke::new(1.0, color)));
                }
            });
        self.show_histogram = open;
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }
        let mut open = self.show_settings;
        let mut thumbs_toggled_on = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.checkbox(
                    &mut self.config.sort_by_shell_order,
                    "Match file manager order",
                );
                let before = self.config.preview_thumbnails;
                ui.checkbox(&mut self.config.preview_thumbnails, "Thumbnail previews");
                thumbs_toggled_on = !before && self.config.preview_thumbnails;
                ui.checkbox(&mut self.config.autoplay_animations, "Autoplay animations");
                ui.checkbox(&mut self.config.parse_exif, "Read EXIF metadata");
                ui.checkbox(&mut self.config.calculate_histograms, "Calculate histograms");

                ui.add_space(6.0);
                egui::ComboBox::from_label("Zoom on new image")
                    .selected_text(format!("{:?}", self.config.zoom_policy))
                    .show_ui(ui, |ui| {
                        for policy in [
                            view::ZoomPolicy::Persistent,
                            view::ZoomPolicy::PerFile,
                            view::ZoomPolicy::FitWidth,
                            view::ZoomPolicy::FitHeight,
                            view::ZoomPolicy::Actual,
                        ] {
                            ui.selectable_value(
                                &mut self.config.zoom_policy,
                                policy,
                                format!("{policy:?}"),
                            );
                        }
                    });
                egui::ComboBox::from_label("Position on new image")
                    .selected_text(format!("{:?}", self.config.position_policy))
                    .show_ui(ui, |ui| {
                        for policy in [
                            view::PositionPolicy::Persistent,
                            view::PositionPolicy::PerFile,
                            view::PositionPolicy::Center,
                        ] {
                            ui.selectable_value(
                                &mut self.config.position_policy,
                                policy,
                                format!("{policy:?}"),
                            );
                        }
                    });
            });
        self.show_settings = open;

        if thumbs_toggled_on {
            let scan_id = self.shared.scan_gen.load(Ordering::SeqCst);
            if scan_id > 0 {
                let _ = thumbs::start(Arc::clone(&self.shared), ctx.clone(), scan_id);
            }
        }
    }
}

/// Clamped navigation step: `None` at the boundary, never wrapping.
fn step_index(current: usize, count: usize, forward: bool) -> Option<usize> {
    if forward {
        (current + 1 < count).then(|| current + 1)
    } else {
        (current > 0).then(|| current - 1)
    }
}

/// Window of `fit` thumbnails centered on `current`, clipped to `0..count`.
fn strip_range(current: usize, count: usize, fit: usize) -> (usize, usize) {
    let start = current - current.min(fit / 2);
    let end = (start + fit).min(count);
    (start, end)
}

impl eframe::App for GlimpseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        // Input poll step, then the frame update: drain worker results,
        // advance any animation, draw.
        self.poll_input(ctx);
        self.drain_outcomes(ctx);
        self.step_animation(ctx);

        self.draw_status_bar(ctx);
        self.draw_thumb_strip(ctx);
        self.draw_image_panel(ctx);
        self.draw_exif_window(ctx);
        self.draw_histogram_window(ctx);
        self.draw_settings_window(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.save();
    }
}

#[cfg(test)]
mod tests {
    use super::{step_index, strip_range};

    #[test]
    fn next_stops_at_the_last_index() {
        assert_eq!(step_index(0, 3, true), Some(1));
        assert_eq!(step_index(1, 3, true), Some(2));
        assert_eq!(step_index(2, 3, true), None);
    }

    #[test]
    fn previous_stops_at_zero() {
        assert_eq!(step_index(2, 3, false), Some(1));
        assert_eq!(step_index(1, 3, false), Some(0));
        assert_eq!(step_index(0, 3, false), None);
    }

    #[test]
    fn single_file_never_navigates() {
        assert_eq!(step_index(0, 1, true), None);
        assert_eq!(step_index(0, 1, false), None);
    }

    #[test]
    fn strip_centers_on_the_current_index() {
        assert_eq!(strip_range(10, 100, 6), (7, 13));
        assert_eq!(strip_range(0, 100, 6), (0, 6));
        assert_eq!(strip_range(99, 100, 6), (96, 100));
        assert_eq!(strip_range(0, 2, 6), (0, 2));
    }
}

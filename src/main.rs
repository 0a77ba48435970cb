#![windows_subsystem = "windows"]
//! CEP Lookup - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod cep;
mod constants;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;
mod viacep;

use app::App;
use constants::*;
use eframe::egui;
use std::path::PathBuf;
use tracing::info;
use ui::components;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "cep-lookup.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cep_lookup=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("CEP Lookup");

    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "CEP Lookup starting");

    // Load saved window position/size
    let settings = settings::Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(400.0, 560.0)))
        .with_min_inner_size([360.0, 500.0])
        .with_title("Busca de CEP");

    // Set window/taskbar icon from the inline SVG
    {
        let (rgba, w, h) = utils::rasterize_icon(64);
        let icon = egui::IconData { rgba, width: w, height: h };
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Busca de CEP",
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, data_dir);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        // Snapshot the shared state; lookup tasks may settle it at any time
        let (loading, address, message) = {
            let s = self.lookup_state.lock().unwrap();
            (s.is_loading(), s.address.clone(), s.message.clone())
        };

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(16)),
            )
            .show(ctx, |ui| {
                // Header
                ui.add_space(4.0);
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(egui_phosphor::regular::MAP_PIN)
                                .size(32.0)
                                .color(theme::ACCENT),
                        )
                        .selectable(false),
                    );
                    ui.add_space(2.0);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("BUSCA DE ENDEREÇO").size(16.0).strong(),
                        )
                        .selectable(false),
                    );
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("Digite um CEP para preencher o endereço")
                                .size(11.0)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                });
                ui.add_space(theme::SPACING_LG);

                // Lookup card: input, submit, loading indicator
                theme::section_frame().show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("CEP").size(11.0).color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );

                    let input_response = theme::input_frame()
                        .show(ui, |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            ui.horizontal(|ui| {
                                ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(
                                            egui_phosphor::regular::MAGNIFYING_GLASS,
                                        )
                                        .size(14.0)
                                        .color(theme::TEXT_DIM),
                                    )
                                    .selectable(false),
                                );
                                ui.add(
                                    egui::TextEdit::singleline(&mut self.cep_input)
                                        .hint_text("00000-000")
                                        .frame(false)
                                        .desired_width(ui.available_width())
                                        .font(egui::FontId::proportional(15.0)),
                                )
                            })
                            .inner
                        })
                        .inner;

                    if self.focus_input {
                        self.focus_input = false;
                        input_response.request_focus();
                    }

                    // Live mask: digits only, hyphen after the 5th digit
                    if input_response.changed() {
                        let masked = cep::mask(&self.cep_input);
                        if masked != self.cep_input {
                            self.cep_input = masked;
                        }
                    }

                    let submitted = input_response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    ui.add_space(theme::SPACING_MD);

                    // Submit button (full width, disabled while a lookup is in flight)
                    let enabled = !loading;
                    let rect = ui.available_rect_before_wrap();
                    let rect = egui::Rect::from_min_size(
                        rect.min,
                        egui::vec2(rect.width(), 36.0),
                    );
                    let response = ui.allocate_rect(rect, egui::Sense::click());

                    let fill = if enabled {
                        theme::BTN_ACCENT
                    } else {
                        theme::BTN_DISABLED
                    };
                    let (fill, draw_rect) = if enabled {
                        theme::button_visual(&response, fill, rect)
                    } else {
                        (fill, rect)
                    };
                    ui.painter()
                        .rect_filled(draw_rect, theme::RADIUS_DEFAULT, fill);
                    let text_color = if enabled {
                        theme::BTN_ACCENT_TEXT
                    } else {
                        theme::BTN_DISABLED_TEXT
                    };
                    ui.painter().text(
                        draw_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("{}  Buscar", egui_phosphor::regular::MAGNIFYING_GLASS),
                        egui::FontId::proportional(14.0),
                        text_color,
                    );
                    if response.hovered() {
                        ui.ctx().set_cursor_icon(if enabled {
                            egui::CursorIcon::PointingHand
                        } else {
                            egui::CursorIcon::NotAllowed
                        });
                    }

                    let clicked = enabled && response.clicked();
                    if clicked || (submitted && enabled) {
                        self.submit_lookup(ctx);
                        self.focus_input = true;
                    }

                    if loading {
                        ui.add_space(theme::SPACING_SM);
                        components::loading_row(ui);
                    }
                });

                // Message region
                if let Some(msg) = &message {
                    ui.add_space(theme::SPACING_MD);
                    components::message_banner(ui, msg);
                }

                ui.add_space(theme::SPACING_MD);

                // Address card
                theme::section_frame().show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    components::output_field(ui, "LOGRADOURO", &address.street);
                    ui.add_space(theme::SPACING_SM);
                    components::output_field(ui, "BAIRRO", &address.district);
                    ui.add_space(theme::SPACING_SM);
                    ui.horizontal(|ui| {
                        let uf_width = 72.0;
                        let spacing = ui.spacing().item_spacing.x;
                        let city_width = ui.available_width() - uf_width - spacing;
                        ui.vertical(|ui| {
                            ui.set_width(city_width);
                            components::output_field(ui, "LOCALIDADE", &address.city);
                        });
                        ui.vertical(|ui| {
                            ui.set_width(uf_width);
                            components::output_field(ui, "UF", &address.state);
                        });
                    });
                });

                // Version at very bottom
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(format!("v{}", APP_VERSION))
                                .size(10.0)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                });
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}

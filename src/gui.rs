// src/gui.rs
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotPoints};

use crate::config::PlotterConfig;
use crate::drivers::{available_ports, render_frame_png, PlotStyle};
use crate::plotter::Plotter;
use crate::types::{ConnectionMode, Rgb};

const MIN_POINTS: usize = 50;
const MAX_POINTS: usize = 5000;

pub struct PlotterApp {
    plotter: Plotter,

    // Connection form
    connection_mode: ConnectionMode,
    ports: Vec<String>,
    selected_port: String,
    baud_text: String,

    // Pending capacity edits, applied on "Apply"
    capacity_edits: Vec<usize>,

    show_instructions: bool,
    log_messages: Vec<String>,
}

impl PlotterApp {
    pub fn new(plotter: Plotter, config: &PlotterConfig) -> Self {
        let ports = available_ports();
        let selected_port = config
            .port
            .clone()
            .or_else(|| ports.first().cloned())
            .unwrap_or_default();
        let capacity_edits = (0..plotter.num_channels())
            .map(|i| plotter.capacity(i).unwrap_or(config.max_points))
            .collect();
        Self {
            plotter,
            connection_mode: ConnectionMode::Hardware,
            ports,
            selected_port,
            baud_text: config.baud_rate.clone(),
            capacity_edits,
            show_instructions: false,
            log_messages: vec!["Michelin-Plotter ready.".to_owned()],
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    fn color32(rgb: Rgb) -> Color32 {
        Color32::from_rgb(rgb.0, rgb.1, rgb.2)
    }

    fn export_png(&mut self) {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let filename = format!("frame_{stamp}.png");
        let result = render_frame_png(self.plotter.frame(), PlotStyle::default())
            .and_then(|png| std::fs::write(&filename, png).map_err(Into::into));
        match result {
            Ok(()) => {
                log::info!("exported frame to {filename}");
                self.log(&format!("Saved {filename}"));
            }
            Err(e) => {
                log::error!("frame export failed: {e}");
                self.log(&format!("Export failed: {e}"));
            }
        }
    }

    fn connection_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.connection_mode, ConnectionMode::Hardware, "SERIAL");
            ui.selectable_value(&mut self.connection_mode, ConnectionMode::Simulation, "SIM");
        });

        ui.label("Port:");
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_source("port_select")
                .selected_text(self.selected_port.as_str())
                .show_ui(ui, |ui| {
                    for port in &self.ports {
                        ui.selectable_value(&mut self.selected_port, port.clone(), port.as_str());
                    }
                });
            if ui.button("🔄").on_hover_text("Rescan ports").clicked() {
                self.ports = available_ports();
            }
        });

        ui.label("Baud rate:");
        ui.text_edit_singleline(&mut self.baud_text);

        ui.horizontal(|ui| {
            if ui.button("Connect").clicked() {
                let port = self.selected_port.clone();
                let baud = self.baud_text.clone();
                if let Err(e) = self.plotter.connect(self.connection_mode, &port, &baud) {
                    self.log(&e.to_string());
                }
            }
            if ui
                .add_enabled(self.plotter.is_connected(), egui::Button::new("Disconnect"))
                .clicked()
            {
                self.plotter.disconnect();
            }
        });

        ui.label(self.plotter.status().to_string());
        let counts = self.plotter.counts();
        ui.label(
            RichText::new(format!(
                "{} lines, {} dropped, {} bytes",
                counts.lines_decoded, counts.lines_dropped, counts.bytes_received
            ))
            .small()
            .color(Color32::GRAY),
        );
    }

    fn routing_panel(&mut self, ui: &mut egui::Ui) {
        ui.label("Channel to plot assignment:");
        let slots = self.plotter.routing().slot_count();
        for channel in 0..self.plotter.num_channels() {
            let current = self.plotter.routing().target(channel).unwrap_or(channel);
            let mut selected = current;
            ui.horizontal(|ui| {
                ui.label(format!("Channel {}:", channel + 1));
                egui::ComboBox::from_id_source(("route", channel))
                    .selected_text(format!("Plot {}", selected + 1))
                    .show_ui(ui, |ui| {
                        for slot in 0..slots {
                            ui.selectable_value(&mut selected, slot, format!("Plot {}", slot + 1));
                        }
                    });
            });
            if selected != current {
                if let Err(e) = self.plotter.assign(channel, selected) {
                    self.log(&e.to_string());
                }
            }
        }
        if ui.button("Reset assignment").clicked() {
            self.plotter.reset_routing();
        }
    }

    fn plot_slot(&mut self, ui: &mut egui::Ui, slot: usize, plot_height: f32) {
        // Slot i carries channel i's controls and labels; curves follow the routing.
        let style = self.plotter.styles()[slot].clone();
        let mut title = style.title.clone();
        let mut x_label = style.x_label.clone();
        let mut y_label = style.y_label.clone();
        let mut color = style.color.to_array();

        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut title).desired_width(140.0));
                ui.label("SPS:");
                ui.add(
                    egui::DragValue::new(&mut self.capacity_edits[slot])
                        .clamp_range(MIN_POINTS..=MAX_POINTS),
                );
                if ui.button("Apply").clicked() {
                    let value = self.capacity_edits[slot];
                    if let Err(e) = self.plotter.set_capacity(slot, value) {
                        log::warn!("{e}");
                        self.log(&e.to_string());
                    }
                }
                ui.color_edit_button_srgb(&mut color);
            });
            ui.horizontal(|ui| {
                ui.label("Y:");
                ui.add(egui::TextEdit::singleline(&mut y_label).desired_width(120.0));
            });

            let curves = self.plotter.frame().slot(slot);
            let styles = self.plotter.styles();
            Plot::new(("plot_slot", slot))
                .height(plot_height)
                .include_y(-1.1)
                .include_y(1.1)
                .allow_scroll(false)
                .x_axis_label(x_label.as_str())
                .y_axis_label(y_label.as_str())
                .show(ui, |plot_ui| {
                    for curve in curves {
                        let points: PlotPoints = curve
                            .values
                            .iter()
                            .enumerate()
                            .map(|(i, v)| [i as f64, *v])
                            .collect();
                        let name = styles
                            .get(curve.channel)
                            .map(|s| s.title.clone())
                            .unwrap_or_else(|| format!("Ch{}", curve.channel + 1));
                        plot_ui.line(
                            Line::new(points)
                                .color(Self::color32(curve.color))
                                .width(2.0)
                                .name(name),
                        );
                    }
                });
            ui.horizontal(|ui| {
                ui.label("X:");
                ui.add(egui::TextEdit::singleline(&mut x_label).desired_width(160.0));
            });
        });

        let mut results = Vec::new();
        if title != style.title {
            results.push(self.plotter.set_title(slot, &title));
        }
        if x_label != style.x_label {
            results.push(self.plotter.set_x_label(slot, &x_label));
        }
        if y_label != style.y_label {
            results.push(self.plotter.set_y_label(slot, &y_label));
        }
        let color = Rgb::from_array(color);
        if color != style.color {
            results.push(self.plotter.set_color(slot, color));
        }
        for e in results.into_iter().filter_map(Result::err) {
            log::warn!("{e}");
            self.log(&e.to_string());
        }
    }
}

impl eframe::App for PlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. Render tick (no-op between ticks; frame keeps the last snapshot)
        let now = Instant::now();
        self.plotter.tick(now);
        ctx.request_repaint_after(self.plotter.time_until_next_tick(Instant::now()));

        // 2. UI
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = Color32::from_rgb(30, 30, 30);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("sidebar").min_width(180.0).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Michelin-Plotter");
                ui.separator();
                self.connection_panel(ui);
                ui.separator();

                ui.toggle_value(&mut self.show_instructions, "📘 Instructions");
                if self.show_instructions {
                    ui.label(
                        RichText::new(
                            "Expected format: comma-separated values, one line per sample\nExample: 1.0,2.5,3.6,4.2",
                        )
                        .small()
                        .color(Color32::LIGHT_GRAY),
                    );
                }
                ui.separator();

                self.routing_panel(ui);
                ui.separator();

                let mut rate = self.plotter.refresh_hz();
                ui.horizontal(|ui| {
                    ui.label("Refresh (Hz):");
                    ui.add(egui::DragValue::new(&mut rate).clamp_range(1.0..=240.0).speed(1.0));
                });
                if rate != self.plotter.refresh_hz() {
                    self.plotter.set_refresh_hz(rate);
                }

                ui.horizontal(|ui| {
                    if ui.button("🗑 Clear").clicked() {
                        self.plotter.clear_buffers();
                    }
                    if ui.button("💾 Export PNG").clicked() {
                        self.export_png();
                    }
                });

                ui.add_space(10.0);
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let slots = self.plotter.routing().slot_count();
            let rows = slots.div_ceil(2).max(1);
            let plot_height = (ui.available_height() / rows as f32 - 80.0).max(80.0);
            let column_width = ui.available_width() / 2.0 - 8.0;
            egui::Grid::new("plot_grid")
                .num_columns(2)
                .min_col_width(column_width)
                .max_col_width(column_width)
                .show(ui, |ui| {
                    for slot in 0..slots {
                        self.plot_slot(ui, slot, plot_height);
                        if slot % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.plotter.disconnect();
    }
}

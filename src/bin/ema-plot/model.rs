use colorsys::Rgb;
use egui::{
    plot::{Legend, Line, Plot, PlotPoints, Points},
    Color32, ComboBox, Slider, Ui,
};
use indexmap::IndexMap;
use log::warn;

use ema_mouth_rig::{parts::PartLabel, rig_config::RigConfig, Point3D};

/// Axis names for the space being shown
pub type AxisNames = [&'static str; 3];

pub const SENSOR_AXES: AxisNames = ["x (back-front)", "y (right-left)", "z (bottom-top)"];
pub const SCENE_AXES: AxisNames = ["X", "Y", "Z"];

pub struct Model {
    pub tracks: IndexMap<PartLabel, Vec<Point3D>>,
    pub colours: IndexMap<PartLabel, Color32>,
    pub selected: PartLabel,
    pub show_all_parts: bool,
    pub point_size: f32,
    pub axis_names: AxisNames,
}

fn parse_colour(hex: &str) -> Option<Color32> {
    match Rgb::from_hex_str(hex) {
        Ok(rgb) => {
            let [r, g, b]: [u8; 3] = rgb.into();
            Some(Color32::from_rgb(r, g, b))
        }
        Err(_) => {
            warn!("Ignoring bad colour \"{}\"", hex);
            None
        }
    }
}

fn part_title(label: PartLabel) -> String {
    format!("{} ({})", label, label.description())
}

impl Model {
    pub fn new(
        tracks: IndexMap<PartLabel, Vec<Point3D>>,
        config: &RigConfig,
        selected: PartLabel,
        axis_names: AxisNames,
    ) -> Self {
        let colours = tracks
            .keys()
            .map(|label| {
                let colour = config
                    .part_colour(label.as_str())
                    .and_then(parse_colour)
                    .unwrap_or(Color32::LIGHT_GRAY);
                (*label, colour)
            })
            .collect();

        Model {
            tracks,
            colours,
            selected,
            show_all_parts: false,
            point_size: 2.0,
            axis_names,
        }
    }

    fn colour(&self, label: &PartLabel) -> Color32 {
        self.colours
            .get(label)
            .copied()
            .unwrap_or(Color32::LIGHT_GRAY)
    }

    fn visible_parts(&self) -> Vec<PartLabel> {
        if self.show_all_parts {
            self.tracks.keys().copied().collect()
        } else {
            vec![self.selected]
        }
    }

    fn render_settings(&mut self, ui: &mut Ui) {
        ui.heading("Parts");
        let labels: Vec<PartLabel> = self.tracks.keys().copied().collect();
        ComboBox::from_label("Part")
            .selected_text(part_title(self.selected))
            .show_ui(ui, |ui| {
                for label in labels {
                    ui.selectable_value(&mut self.selected, label, part_title(label));
                }
            });
        ui.checkbox(&mut self.show_all_parts, "Show all parts");
        ui.separator();

        ui.heading("Visualisation Settings");
        ui.horizontal(|ui| {
            ui.label("Point radius");
            ui.add(Slider::new(&mut self.point_size, 1.0..=10.0));
        });
        ui.separator();

        if let Some(track) = self.tracks.get(&self.selected) {
            ui.label(format!("{} frames", track.len()));
        }
    }

    fn render_projection(&self, ui: &mut Ui, a: usize, b: usize) {
        let id = format!("projection-{}-{}", a, b);
        ui.label(format!("{} / {}", self.axis_names[a], self.axis_names[b]));
        Plot::new(id)
            .data_aspect(1.0)
            .height(360.)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for label in self.visible_parts() {
                    if let Some(track) = self.tracks.get(&label) {
                        let xy: Vec<[f64; 2]> = track.iter().map(|p| [p[a], p[b]]).collect();
                        plot_ui.points(
                            Points::new(PlotPoints::new(xy))
                                .radius(self.point_size)
                                .color(self.colour(&label))
                                .name(label.as_str()),
                        );
                    }
                }
            });
    }

    fn render_time_series(&self, ui: &mut Ui) {
        let Some(track) = self.tracks.get(&self.selected) else {
            return;
        };
        ui.label(format!("{} over time", self.selected));
        let axis_colours = [Color32::RED, Color32::GREEN, Color32::LIGHT_BLUE];
        Plot::new("time-series")
            .height(240.)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for axis in 0..3 {
                    let series: Vec<[f64; 2]> = track
                        .iter()
                        .enumerate()
                        .map(|(frame, p)| [frame as f64, p[axis]])
                        .collect();
                    plot_ui.line(
                        Line::new(PlotPoints::new(series))
                            .color(axis_colours[axis])
                            .name(self.axis_names[axis]),
                    );
                }
            });
    }
}

impl eframe::App for Model {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("settings").show(ctx, |ui| {
            self.render_settings(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(3, |columns| {
                self.render_projection(&mut columns[0], 0, 1);
                self.render_projection(&mut columns[1], 0, 2);
                self.render_projection(&mut columns[2], 1, 2);
            });
            ui.separator();
            self.render_time_series(ui);
        });
    }
}

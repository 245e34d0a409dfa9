/// Sequence waveform view

use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::collab::{SequencePlot, SlicePlane};

pub fn show_sequence_plot(ui: &mut egui::Ui, plot: Option<&SequencePlot>) {
    let Some(plot) = plot else {
        ui.label("Plot the sequence to see its waveforms.");
        return;
    };

    Plot::new("sequence_plot")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("time (ms)")
        .show(ui, |plot_ui| {
            for trace in &plot.traces {
                let points: Vec<[f64; 2]> = trace.points.iter().map(|p| [p[0] * 1e3, p[1]]).collect();
                plot_ui.line(Line::new(PlotPoints::from(points)).name(trace.channel.to_string()));
            }
        });
}

pub fn show_slice_plane(ui: &mut egui::Ui, plane: &SlicePlane) {
    egui::Grid::new("slice_plane_grid").num_columns(4).show(ui, |ui| {
        ui.label("normal");
        for v in plane.normal {
            ui.monospace(format!("{:+.3}", v));
        }
        ui.end_row();
        ui.label("offset (mm)");
        for v in plane.offset_mm {
            ui.monospace(format!("{:+.2}", v));
        }
        ui.end_row();
    });
}

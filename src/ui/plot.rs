use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, RichText, ScrollArea, Sense, Shape, Stroke, Ui, Vec2, pos2,
    vec2,
};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotBounds, PlotPoint, PlotResponse, Points,
    Polygon, Text,
};

use crate::charts::bars::{RankingBars, SCORE_DOMAIN};
use crate::charts::area::AreaChart;
use crate::charts::bubble::BubbleChart;
use crate::charts::comparison::{ComparisonStyle, MedianComparison};
use crate::charts::dotplot::DotPlot;
use crate::charts::heatmap::Heatmap;
use crate::charts::hierarchy::{PACK_VALUE_SCALE, Packing, Sector, Sunburst};
use crate::charts::line::LineChart;
use crate::charts::radar::{RadarChart, RadarPolygon};
use crate::charts::ridgeline::Ridgeline;
use crate::charts::scale::{BandScale, LinearScale};
use crate::charts::summary::{SummaryPanel, format_count, format_score};
use crate::charts::{Chart, RangeChart};
use crate::color::{self, SequentialScale, generate_palette, series_color};
use crate::data::model::{Metric, Series};
use crate::selection::BrushSelection;
use crate::state::{AppState, UiAction};

const CHART_HEIGHT: f32 = 260.0;
const NO_DATA: &str = "No data for the selected years";

// ---------------------------------------------------------------------------
// Central panel – every chart, top to bottom
// ---------------------------------------------------------------------------

/// Draw the chart board. Selection changes are queued on `state` and
/// applied after drawing, once no chart is borrowed.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data folder to view the dashboard  (File → Open folder…)");
        });
        return;
    }

    let charts = state.board.charts.clone();
    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, chart) in charts.iter().enumerate() {
                let mut chart = chart.borrow_mut();
                let title = chart.title().to_string();
                ui.push_id(i, |ui: &mut Ui| {
                    egui::CollapsingHeader::new(RichText::new(title).strong())
                        .default_open(true)
                        .show(ui, |ui: &mut Ui| draw_chart(ui, &mut chart, &mut actions));
                });
            }
        });

    for action in actions {
        state.queue(action);
    }
}

fn draw_chart(ui: &mut Ui, chart: &mut Chart, actions: &mut Vec<UiAction>) {
    match chart {
        Chart::Summary(c) => summary(ui, c),
        Chart::Bars(c) => ranking_bars(ui, c),
        Chart::Line(c) => line_chart(ui, c, actions),
        Chart::Area(c) => area_chart(ui, c, actions),
        Chart::Comparison(c) => match c.style() {
            ComparisonStyle::Circular => circular_comparison(ui, c),
            ComparisonStyle::Lines => line_comparison(ui, c),
        },
        Chart::DotPlot(c) => dot_plot(ui, c),
        Chart::Heatmap(c) => heatmap(ui, c),
        Chart::Radar(c) => radar(ui, c),
        Chart::Ridgeline(c) => ridgeline(ui, c),
        Chart::Bubble(c) => bubble(ui, c),
        Chart::Sunburst(c) => sunburst(ui, c),
        Chart::Packing(c) => packing(ui, c),
    }
}

/// Whole years only.
fn year_axis(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    if mark.value.fract() == 0.0 {
        format!("{:.0}", mark.value)
    } else {
        String::new()
    }
}

fn metric_combo(ui: &mut Ui, id: &str, label: &str, metric: &mut Metric) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(metric.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in Metric::ALL {
                ui.selectable_value(metric, m, m.label());
            }
        });
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

fn summary(ui: &mut Ui, panel: &SummaryPanel) {
    ui.horizontal_top(|ui: &mut Ui| {
        ui.push_id("medians", |ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::auto().at_least(110.0))
                    .column(Column::auto().at_least(80.0))
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.strong("Series");
                        });
                        header.col(|ui| {
                            ui.strong("Median score");
                        });
                    })
                    .body(|mut body| {
                        for (series, median) in &panel.medians {
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    ui.colored_label(series_color(*series), series.label());
                                });
                                row.col(|ui| {
                                    ui.label(format_score(*median));
                                });
                            });
                        }
                    });
            });
        });

        ui.add_space(24.0);

        ui.push_id("population", |ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::auto().at_least(160.0))
                    .column(Column::auto().at_least(110.0))
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.strong("Ukraine indicator");
                        });
                        header.col(|ui| {
                            ui.strong("Population estimate");
                        });
                    })
                    .body(|mut body| {
                        for (metric, estimate) in &panel.population_estimates {
                            body.row(18.0, |mut row| {
                                row.col(|ui| {
                                    ui.label(metric.label());
                                });
                                row.col(|ui| {
                                    ui.label(estimate.map_or_else(|| "N/A".to_string(), format_count));
                                });
                            });
                        }
                    });
            });
        });
    });
}

// ---------------------------------------------------------------------------
// Ranking bars
// ---------------------------------------------------------------------------

fn ranking_bars(ui: &mut Ui, chart: &RankingBars) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let series = chart.series();
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .map(|b| {
            Bar::new(b.year as f64, b.score)
                .name(format!("{} ({})", b.country, b.year))
                .width(0.7)
        })
        .collect();

    Plot::new(("ranking_bars", series.label()))
        .height(CHART_HEIGHT)
        .include_y(SCORE_DOMAIN.0)
        .include_y(SCORE_DOMAIN.1)
        .x_axis_formatter(year_axis)
        .y_axis_label("Happiness score")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(series_color(series)).name(series.label()));
            for b in &chart.bars {
                plot_ui.text(Text::new(
                    PlotPoint::new(b.year as f64, b.score + 0.3),
                    RichText::new(&b.country).small(),
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart with brush
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, chart: &mut LineChart, actions: &mut Vec<UiAction>) {
    let palette = generate_palette(Metric::ALL.len());
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (metric, color) in Metric::ALL.iter().zip(&palette) {
            let mut on = chart.is_visible(*metric);
            if ui
                .checkbox(&mut on, RichText::new(metric.label()).color(*color))
                .changed()
            {
                chart.toggle_metric(*metric);
            }
        }
    });
    // An empty range keeps the plot, so the brush and its reset stay usable.
    let empty = chart.shape_count() == 0;
    let (x0, x1) = chart.x_domain;
    let response = Plot::new("line_chart")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .x_axis_formatter(year_axis)
        .y_axis_label("Normalized value")
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, -0.05], [x1, 1.05]));
            for (line, color) in chart.lines.iter().zip(&palette) {
                let color = if line.visible { *color } else { color.gamma_multiply(0.15) };
                plot_ui.line(
                    Line::new(line.points.clone())
                        .color(color)
                        .width(2.0)
                        .name(line.metric.label()),
                );
            }
            if empty {
                plot_ui.text(Text::new(
                    PlotPoint::new((x0 + x1) / 2.0, 0.5),
                    RichText::new(NO_DATA).weak(),
                ));
            }
        });
    ui.weak("Drag across the chart to select years, double-click to reset");
    let scale = chart.brush_scale(frame_span(&response));
    brush(ui, &response, scale, actions);
}

fn frame_span<R>(plot: &PlotResponse<R>) -> (f64, f64) {
    let frame = plot.transform.frame();
    (frame.left() as f64, frame.right() as f64)
}

/// Horizontal brush over a year plot. The pixel extent is inverse-mapped
/// through `scale`, the chart's zoomed x axis, when the drag ends.
fn brush<R>(ui: &Ui, plot: &PlotResponse<R>, scale: LinearScale, actions: &mut Vec<UiAction>) {
    let response = &plot.response;
    let frame = *plot.transform.frame();
    let id = response.id.with("brush_start");

    if response.double_clicked() {
        actions.push(UiAction::Reset);
        return;
    }
    if response.drag_started() {
        if let Some(p) = response.interact_pointer_pos() {
            ui.data_mut(|d| d.insert_temp(id, p.x));
        }
    }
    let Some(start) = ui.data(|d| d.get_temp::<f32>(id)) else {
        return;
    };
    let pointer_x = response
        .interact_pointer_pos()
        .or_else(|| ui.input(|i| i.pointer.latest_pos()))
        .map_or(start, |p| p.x)
        .clamp(frame.left(), frame.right());

    if response.dragged() {
        let (lo, hi) = (start.min(pointer_x), start.max(pointer_x));
        ui.painter().rect_filled(
            Rect::from_x_y_ranges(lo..=hi, frame.y_range()),
            0.0,
            Color32::from_rgba_unmultiplied(120, 160, 255, 40),
        );
    }

    if response.drag_stopped() {
        ui.data_mut(|d| d.remove::<f32>(id));
        match BrushSelection::new(start as f64, pointer_x as f64).to_candidate(&scale) {
            Some((min, max)) => actions.push(UiAction::SetRange(min, max)),
            None => log::debug!("Ignoring empty brush"),
        }
    }
}

// ---------------------------------------------------------------------------
// Area chart with hover story and brush
// ---------------------------------------------------------------------------

fn area_chart(ui: &mut Ui, chart: &mut AreaChart, actions: &mut Vec<UiAction>) {
    let (x0, x1) = chart.x_domain;
    let fill = series_color(Series::Ukraine);
    let response = Plot::new("area_chart")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .show_y(false)
        .x_axis_formatter(year_axis)
        .y_axis_formatter(|_, _| String::new())
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, 0.0], [x1, 1.0]));
            if chart.points.is_empty() {
                plot_ui.text(Text::new(
                    PlotPoint::new((x0 + x1) / 2.0, 0.5),
                    RichText::new(NO_DATA).weak(),
                ));
                return None;
            }
            let highlight = chart.hovered_span();
            let dim = if highlight.is_some() { 0.25 } else { 1.0 };
            plot_ui.line(
                Line::new(chart.points.clone())
                    .fill(0.0)
                    .color(fill.gamma_multiply(dim))
                    .width(3.0)
                    .name("Ukraine"),
            );
            if let Some((a, b)) = highlight {
                let segment: Vec<[f64; 2]> = chart
                    .points
                    .iter()
                    .copied()
                    .filter(|p| (a..=b).contains(&p[0]))
                    .collect();
                plot_ui.line(Line::new(segment).fill(0.0).color(fill).width(3.0));
            }
            plot_ui.pointer_coordinate().map(|p| p.x)
        });

    chart.hover(response.inner.filter(|_| response.response.hovered()));
    if let Some(text) = chart.tooltip() {
        response.response.clone().on_hover_text(text);
    }
    ui.weak("Hover a year for its story, drag to select years, double-click to reset");
    let scale = chart.brush_scale(frame_span(&response));
    brush(ui, &response, scale, actions);
}

// ---------------------------------------------------------------------------
// Median comparison by parameter
// ---------------------------------------------------------------------------

fn comparison_tooltip(series: Series, metric: Metric, median: f64, normalized: f64) -> String {
    format!(
        "{series}\n{}\nReal value: {median:.3}\nNormalized: {normalized:.3}",
        metric.label()
    )
}

fn circular_comparison(ui: &mut Ui, chart: &MedianComparison) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let side = CHART_HEIGHT + 120.0;
    let (rect, response) = ui.allocate_exact_size(vec2(ui.available_width(), side), Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = (side / 2.0 - 24.0) as f64;
    let at = polar(center, radius);
    let pointer = response.hover_pos().map(|p| pointer_polar(p - center, radius));

    let bars = chart.radial_bars();
    let mut hovered = None;
    for bar in &bars {
        let over = pointer.is_some_and(|(angle, r)| {
            (bar.start_angle..bar.end_angle).contains(&angle)
                && (bar.inner_radius..bar.outer_radius).contains(&r)
        });
        let alpha = if over { 1.0 } else { 0.8 };
        annular_segment(
            &painter,
            &at,
            (bar.start_angle, bar.end_angle),
            (bar.inner_radius, bar.outer_radius),
            series_color(bar.series).gamma_multiply(alpha),
        );
        if over {
            hovered = Some(bar);
        }
    }

    for metric in Metric::ALL {
        let Some(bar) = bars.iter().find(|b| b.metric == metric) else {
            continue;
        };
        let mid = (bar.start_angle + bar.end_angle) / 2.0;
        painter.text(
            at(mid, 1.08),
            Align2::CENTER_CENTER,
            metric.label(),
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
    }

    if let Some(bar) = hovered {
        response.on_hover_text(comparison_tooltip(
            bar.series,
            bar.metric,
            bar.median,
            bar.normalized,
        ));
    }
}

fn line_comparison(ui: &mut Ui, chart: &MedianComparison) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let labels: Vec<&'static str> = Metric::ALL.iter().map(|m| m.label()).collect();
    Plot::new("median_comparison")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .include_x(-0.5)
        .include_x(Metric::ALL.len() as f64 - 0.5)
        .include_y(0.0)
        .include_y(1.0)
        .y_axis_label("Normalized median")
        .x_axis_formatter(move |mark, _| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).map(|l| l.to_string()).unwrap_or_default()
        })
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\nNormalized: {:.3}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            for series in Series::ALL {
                let points = chart.series_points(series);
                if points.is_empty() {
                    continue;
                }
                let color = series_color(series);
                let name = format!("{} (median)", series.label());
                plot_ui.line(Line::new(points.clone()).color(color).width(2.5).name(&name));
                plot_ui.points(Points::new(points).color(color).radius(4.0).name(&name));
            }
        });
}

// ---------------------------------------------------------------------------
// Dot plot
// ---------------------------------------------------------------------------

fn dot_plot(ui: &mut Ui, plot: &mut DotPlot) {
    ui.horizontal(|ui: &mut Ui| {
        let mut metric = plot.metric();
        metric_combo(ui, "dot_metric", "Metric", &mut metric);
        plot.set_metric(metric);
        let mut descending = plot.descending;
        if ui.checkbox(&mut descending, "Descending").changed() {
            plot.set_descending(descending);
        }
    });
    let Some(domain) = plot.y_domain else {
        ui.weak(NO_DATA);
        return;
    };
    // Plot in [0, 1]; the domain order handles the flip.
    let scale = LinearScale::new(domain, (0.0, 1.0));

    Plot::new("dot_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .include_y(-0.05)
        .include_y(1.05)
        .x_axis_formatter(year_axis)
        .y_axis_formatter(move |mark, _| format!("{:.2}", scale.invert(mark.value)))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for group in plot.connectors() {
                let (lo, hi) = group
                    .values
                    .iter()
                    .filter(|v| v.is_valid())
                    .map(|v| scale.apply(v.value))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                        (lo.min(y), hi.max(y))
                    });
                let x = group.year as f64;
                plot_ui.line(Line::new(vec![[x, lo], [x, hi]]).color(Color32::GRAY).width(1.5));
            }
            for series in Series::ALL {
                let points: Vec<[f64; 2]> = plot
                    .groups
                    .iter()
                    .flat_map(|g| {
                        g.values
                            .iter()
                            .filter(move |v| v.series == series && v.is_valid())
                            .map(move |v| [g.year as f64, scale.apply(v.value)])
                    })
                    .collect();
                if points.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(points)
                        .radius(5.0)
                        .color(series_color(series))
                        .name(series.label()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, map: &Heatmap) {
    if map.years.is_empty() {
        ui.weak(NO_DATA);
        return;
    }
    let label_width = 140.0;
    let row_height = 22.0;
    let axis_height = 20.0;
    let params = map.params();
    let width = ui.available_width().max(label_width + 120.0);
    let height = row_height * params.len() as f32 + axis_height;
    let (rect, response) = ui.allocate_exact_size(vec2(width, height), Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(12.0);

    let xs = BandScale::new(
        map.years.clone(),
        ((rect.left() + label_width) as f64, rect.right() as f64),
        0.05,
    );
    let ys = BandScale::new(
        params.to_vec(),
        (rect.top() as f64, (rect.bottom() - axis_height) as f64),
        0.08,
    );
    let cell_size = vec2(xs.bandwidth() as f32, ys.bandwidth() as f32);
    let ramp = SequentialScale::heat();

    let mut hovered = None;
    for cell in &map.cells {
        let (Some(x), Some(y)) = (xs.position(&cell.year), ys.position(&cell.param)) else {
            continue;
        };
        let cell_rect = Rect::from_min_size(pos2(x as f32, y as f32), cell_size);
        painter.rect_filled(cell_rect, 2.0, ramp.color_at(cell.intensity));
        if response.hover_pos().is_some_and(|p| cell_rect.contains(p)) {
            hovered = Some(cell);
        }
    }
    for param in params {
        if let Some(y) = ys.position(param) {
            let pos = pos2(rect.left() + 4.0, y as f32 + cell_size.y / 2.0);
            painter.text(pos, Align2::LEFT_CENTER, param.label(), font.clone(), text_color);
        }
    }
    for year in &map.years {
        if let Some(x) = xs.position(year) {
            let pos = pos2(x as f32 + cell_size.x / 2.0, rect.bottom() - axis_height / 2.0);
            painter.text(pos, Align2::CENTER_CENTER, year.to_string(), font.clone(), text_color);
        }
    }

    if let Some(cell) = hovered {
        let value = if cell.value.is_finite() {
            format!("{:.3}", cell.value)
        } else {
            "N/A".to_string()
        };
        response.on_hover_text(format!("{} in {}: {value}", cell.param.label(), cell.year));
    }
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

fn closed(mut points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

fn radar(ui: &mut Ui, chart: &RadarChart) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let axes = RadarChart::axes();
    let spokes = RadarPolygon {
        year: 0,
        values: vec![1.0; axes.len()],
    }
    .vertices(1.0);
    let palette = generate_palette(chart.polygons.len());

    Plot::new("radar")
        .height(CHART_HEIGHT + 80.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .include_x(-1.4)
        .include_x(1.4)
        .include_y(-1.2)
        .include_y(1.25)
        .show(ui, |plot_ui| {
            let grid = Color32::from_gray(110);
            for level in [0.25, 0.5, 0.75, 1.0] {
                let ring = RadarPolygon {
                    year: 0,
                    values: vec![level; axes.len()],
                };
                plot_ui.line(Line::new(closed(ring.vertices(1.0))).color(grid).width(0.5));
            }
            for (metric, [x, y]) in axes.iter().zip(&spokes) {
                plot_ui.line(Line::new(vec![[0.0, 0.0], [*x, *y]]).color(grid).width(0.5));
                plot_ui.text(Text::new(
                    PlotPoint::new(x * 1.15, y * 1.1),
                    RichText::new(metric.label()).small(),
                ));
            }
            for (polygon, color) in chart.polygons.iter().zip(palette) {
                plot_ui.line(
                    Line::new(closed(polygon.vertices(1.0)))
                        .color(color)
                        .width(1.5)
                        .name(polygon.year),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Ridgeline
// ---------------------------------------------------------------------------

/// Peak height of the tallest ridge, in row units.
const RIDGE_OVERLAP: f64 = 1.6;

fn ridgeline(ui: &mut Ui, chart: &Ridgeline) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let n = chart.ridges.len();
    let peak = chart.peak_density();
    let height_scale = if peak > 0.0 { RIDGE_OVERLAP / peak } else { 0.0 };
    let labels: Vec<&'static str> = chart.ridges.iter().map(|r| r.metric.label()).collect();
    let ramp = SequentialScale::cool();

    Plot::new("ridgeline")
        .height(CHART_HEIGHT + 60.0)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(n as f64 + 0.8)
        .allow_scroll(false)
        .y_axis_formatter(move |mark, _| {
            // Row `n - 1 - i` holds ridge `i`, first metric on top.
            if mark.value.fract() != 0.0 || mark.value < 0.0 {
                return String::new();
            }
            n.checked_sub(mark.value as usize + 1)
                .and_then(|i| labels.get(i))
                .map_or_else(String::new, |l| l.to_string())
        })
        .x_axis_label(format!("Normalized value (bandwidth {})", chart.bandwidth()))
        .show(ui, |plot_ui| {
            // Top rows first so lower ridges overlap them.
            for (i, ridge) in chart.ridges.iter().enumerate() {
                let base = (n - 1 - i) as f64;
                let color = ridge.mean.map_or(color::MISSING, |m| ramp.color_at(m));
                let points: Vec<[f64; 2]> = ridge
                    .curve
                    .iter()
                    .map(|p| [p.x, base + p.density * height_scale])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .fill(base as f32)
                        .color(color)
                        .width(1.5)
                        .name(ridge.metric.label()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Bubble chart
// ---------------------------------------------------------------------------

fn bubble(ui: &mut Ui, chart: &mut BubbleChart) {
    ui.horizontal(|ui: &mut Ui| {
        let (mut x, mut y, mut size) = (chart.x_metric, chart.y_metric, chart.size_metric);
        metric_combo(ui, "bubble_x", "x", &mut x);
        metric_combo(ui, "bubble_y", "y", &mut y);
        metric_combo(ui, "bubble_size", "size", &mut size);
        chart.set_axes(x, y, size);
    });
    let (Some(xd), Some(yd)) = (chart.x_domain, chart.y_domain) else {
        ui.weak(NO_DATA);
        return;
    };

    Plot::new("bubble")
        .height(CHART_HEIGHT + 40.0)
        .legend(Legend::default())
        .include_x(xd.0)
        .include_x(xd.1)
        .include_y(yd.0)
        .include_y(yd.1)
        .x_axis_label(chart.x_metric.label())
        .y_axis_label(chart.y_metric.label())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for b in &chart.bubbles {
                plot_ui.points(
                    Points::new(vec![[b.x, b.y]])
                        .radius(chart.radius(b.size, 3.0, 16.0) as f32)
                        .color(series_color(b.series).gamma_multiply(0.7))
                        .name(b.series.label()),
                );
            }
            if let Some(pointer) = plot_ui.pointer_coordinate() {
                let near = chart.bubbles.iter().min_by(|a, b| {
                    let da = (a.x - pointer.x).powi(2) + (a.y - pointer.y).powi(2);
                    let db = (b.x - pointer.x).powi(2) + (b.y - pointer.y).powi(2);
                    da.total_cmp(&db)
                });
                if let Some(b) = near {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(b.x, b.y),
                            RichText::new(format!("{} {}", b.country, b.year)).small(),
                        )
                        .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Sunburst
// ---------------------------------------------------------------------------

/// Angular step used to split sectors into convex quads.
const ARC_STEP: f64 = 0.05;

/// Maps `(angle, fraction of radius)` to screen space. Angle 0 is at
/// twelve o'clock and grows clockwise.
fn polar(center: Pos2, radius: f64) -> impl Fn(f64, f64) -> Pos2 {
    move |angle, r| {
        center + vec2((r * radius * angle.sin()) as f32, (-r * radius * angle.cos()) as f32)
    }
}

/// Inverse of [`polar`] for a pointer offset from the centre.
fn pointer_polar(d: Vec2, radius: f64) -> (f64, f64) {
    let angle = (d.x as f64).atan2(-d.y as f64).rem_euclid(TAU);
    (angle, d.length() as f64 / radius)
}

/// Ring segment approximated by convex quads.
fn annular_segment(
    painter: &egui::Painter,
    at: &impl Fn(f64, f64) -> Pos2,
    (start, end): (f64, f64),
    (inner, outer): (f64, f64),
    fill: Color32,
) {
    let span = end - start;
    let steps = (span / ARC_STEP).ceil().max(1.0) as usize;
    for i in 0..steps {
        let a0 = start + span * i as f64 / steps as f64;
        let a1 = start + span * (i + 1) as f64 / steps as f64;
        let quad = vec![at(a0, inner), at(a0, outer), at(a1, outer), at(a1, inner)];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
}

fn sector_color(sector: &Sector) -> Color32 {
    let base = sector.series.map_or(Color32::GRAY, series_color);
    base.gamma_multiply((1.0 - 0.22 * (sector.depth as f32 - 1.0)).max(0.3))
}

fn sunburst(ui: &mut Ui, chart: &Sunburst) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    let side = CHART_HEIGHT + 80.0;
    let (rect, response) = ui.allocate_exact_size(vec2(ui.available_width(), side), Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = (side / 2.0 - 4.0) as f64;
    let at = polar(center, radius);
    let pointer = response.hover_pos().map(|p| pointer_polar(p - center, radius));
    let mut hovered = None;

    for sector in &chart.sectors {
        annular_segment(
            &painter,
            &at,
            (sector.start_angle, sector.end_angle),
            (sector.inner_radius, sector.outer_radius),
            sector_color(sector),
        );
        if let Some((angle, r)) = pointer {
            if (sector.start_angle..sector.end_angle).contains(&angle)
                && (sector.inner_radius..sector.outer_radius).contains(&r)
            {
                hovered = Some(sector);
            }
        }
    }

    if let Some(sector) = hovered {
        response.on_hover_text(format!("{}: {:.2}", sector.name, sector.value));
    }
}

// ---------------------------------------------------------------------------
// Circular packing
// ---------------------------------------------------------------------------

fn circle(x: f64, y: f64, r: f64) -> Vec<[f64; 2]> {
    let segments = 48;
    (0..segments)
        .map(|i| {
            let a = TAU * i as f64 / segments as f64;
            [x + r * a.cos(), y + r * a.sin()]
        })
        .collect()
}

fn packing(ui: &mut Ui, chart: &Packing) {
    if chart.shape_count() == 0 {
        ui.weak(NO_DATA);
        return;
    }
    Plot::new("packing")
        .height(CHART_HEIGHT + 80.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for group in &chart.groups {
                let color = series_color(group.series);
                plot_ui.polygon(
                    Polygon::new(circle(group.x, group.y, group.r))
                        .fill_color(color.gamma_multiply(0.12))
                        .stroke(Stroke::new(1.0, color))
                        .name(group.series.label()),
                );
                for leaf in &group.leaves {
                    plot_ui.polygon(
                        Polygon::new(circle(leaf.x, leaf.y, leaf.r))
                            .fill_color(color.gamma_multiply(0.55))
                            .stroke(Stroke::new(0.5, color)),
                    );
                }
            }
            if let Some(p) = plot_ui.pointer_coordinate() {
                let leaf = chart
                    .groups
                    .iter()
                    .flat_map(|g| &g.leaves)
                    .find(|l| (l.x - p.x).powi(2) + (l.y - p.y).powi(2) <= l.r * l.r);
                if let Some(leaf) = leaf {
                    plot_ui.text(Text::new(
                        PlotPoint::new(leaf.x, leaf.y),
                        RichText::new(format!("{}: {:.1}", leaf.label, leaf.value / PACK_VALUE_SCALE)).small(),
                    ));
                }
            }
        });
}

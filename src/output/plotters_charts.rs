use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::parsers::{FecSample, FecState};
use crate::processors::{BctHistogram, InTimeSeries, StatusBreakdown};
use crate::utils::AnalysisConfig;

/// Plotters 차트 생성을 위한 공통 구조체
pub struct PlottersConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: &'static str,
    pub title_font_size: u32,
    pub axis_label_font_size: u32,
    pub tick_label_font_size: u32,
    pub point_size: u32,
    pub legend_spacing: u32,
}

impl Default for PlottersConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            font_family: "sans-serif",
            title_font_size: 30,
            axis_label_font_size: 20,
            tick_label_font_size: 15,
            point_size: 2,
            legend_spacing: 30,
        }
    }
}

impl PlottersConfig {
    pub fn from_analysis(config: &AnalysisConfig) -> Self {
        Self {
            width: config.chart_width,
            height: config.chart_height,
            ..Default::default()
        }
    }

    // 차트 영역 : 레전드 영역 = 4 : 1
    fn chart_width(&self) -> u32 {
        self.width * 4 / 5
    }
}

/// 우선순위 클래스별 색상 매핑
pub fn color_for_priority(priority: u32) -> RGBColor {
    match priority {
        0 => RGBColor(50, 50, 50),      // 검은색 계열
        1 => RGBColor(65, 105, 225),    // 파란색 계열
        2 => RGBColor(220, 20, 60),     // 빨간색 계열
        3 => RGBColor(46, 139, 87),     // 초록색 계열
        4 => RGBColor(255, 165, 0),     // 주황색 계열
        _ => RGBColor(138, 43, 226),    // 보라색 계열
    }
}

pub fn color_for_fec(state: FecState) -> RGBColor {
    match state {
        FecState::TimeShort => RGBColor(220, 20, 60),
        FecState::BandwidthAmple => RGBColor(255, 165, 0),
        FecState::Disabled => RGBColor(46, 139, 87),
        FecState::Unknown(_) => RGBColor(50, 50, 50),
    }
}

/// 레전드 그리기 함수
pub fn draw_legend(
    legend_area: &DrawingArea<BitMapBackend, Shift>,
    legends: &[(String, RGBColor)],
    config: &PlottersConfig,
) -> Result<(), String> {
    legend_area.fill(&WHITE.mix(0.95)).map_err(|e| e.to_string())?;

    for (i, (name, color)) in legends.iter().enumerate() {
        let spacing = config.legend_spacing as usize;
        let y_pos = (50 + i * spacing) as i32;

        legend_area
            .draw(&PathElement::new(
                vec![(20_i32, y_pos), (50_i32, y_pos)],
                color.stroke_width(2),
            ))
            .map_err(|e| e.to_string())?;

        legend_area
            .draw(&Text::new(
                name.clone(),
                (60_i32, y_pos),
                (config.font_family, config.tick_label_font_size),
            ))
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Running in-time ratio per class over `deadline + start` time.
pub fn draw_intime_chart(
    series: &InTimeSeries,
    title: &str,
    png_path: &Path,
    config: &PlottersConfig,
) -> Result<(), String> {
    let root = BitMapBackend::new(png_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let (chart_area, legend_area) = root.split_horizontally(config.chart_width());

    // 비정상 값(NaN/inf)은 축 범위 계산에서 제외
    let finite = series.timestamps.iter().copied().filter(|t| t.is_finite());
    let min_time = finite.clone().fold(0.0_f64, f64::min);
    let max_time = finite.reduce(f64::max).unwrap_or(1.0).max(min_time + 1e-3);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(title, (config.font_family, config.title_font_size).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(min_time..max_time, 0.0..1.05)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc("Deadline + start (s)")
        .y_desc("In-time ratio")
        .axis_desc_style((config.font_family, config.axis_label_font_size))
        .label_style((config.font_family, config.tick_label_font_size))
        .draw()
        .map_err(|e| e.to_string())?;

    let mut legends = Vec::new();
    for &class in series.ratios.keys() {
        let color = color_for_priority(class);
        legends.push((format!("Priority {class}"), color));

        chart
            .draw_series(LineSeries::new(series.points(class), color.stroke_width(2)))
            .map_err(|e| e.to_string())?;
    }

    draw_legend(&legend_area, &legends, config)?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

/// Grouped bar chart of BCT buckets, one bar per class in every bucket.
pub fn draw_bct_histogram_chart(
    hist: &BctHistogram,
    title: &str,
    png_path: &Path,
    config: &PlottersConfig,
) -> Result<(), String> {
    let root = BitMapBackend::new(png_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let (chart_area, legend_area) = root.split_horizontally(config.chart_width());

    let buckets = hist.bucket_count().max(1);
    let max_x = buckets as f64 * hist.bucket_ms;
    let max_count = hist
        .counts
        .values()
        .flat_map(|c| c.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(title, (config.font_family, config.title_font_size).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_x, 0.0..max_count * 1.05)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .x_desc("Block completion time (ms)")
        .y_desc("Blocks")
        .axis_desc_style((config.font_family, config.axis_label_font_size))
        .label_style((config.font_family, config.tick_label_font_size))
        .draw()
        .map_err(|e| e.to_string())?;

    let class_count = hist.counts.len().max(1) as f64;
    let bar_width = hist.bucket_ms / class_count;
    let mut legends = Vec::new();

    for (slot, (&class, counts)) in hist.counts.iter().enumerate() {
        let color = color_for_priority(class);
        legends.push((format!("Priority {class}"), color));

        chart
            .draw_series(counts.iter().enumerate().filter(|&(_, &n)| n > 0).map(|(idx, &n)| {
                let (low, _) = hist.bounds(idx);
                let x0 = low + slot as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, n as f64)], color.filled())
            }))
            .map_err(|e| e.to_string())?;
    }

    draw_legend(&legend_area, &legends, config)?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

/// Stacked complete / cancelled / waiting bars per class.
pub fn draw_status_chart(
    breakdown: &BTreeMap<u32, StatusBreakdown>,
    title: &str,
    png_path: &Path,
    config: &PlottersConfig,
) -> Result<(), String> {
    let root = BitMapBackend::new(png_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let (chart_area, legend_area) = root.split_horizontally(config.chart_width());

    let classes: Vec<u32> = breakdown.keys().copied().collect();
    let max_total = breakdown.values().map(|b| b.total()).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(title, (config.font_family, config.title_font_size).into_font())
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..classes.len().max(1) as f64, 0.0..max_total * 1.05)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(classes.len().max(1))
        .x_label_formatter(&|x: &f64| {
            classes
                .get(x.floor() as usize)
                .map(|c| format!("P{c}"))
                .unwrap_or_default()
        })
        .x_desc("Priority class")
        .y_desc("Blocks")
        .axis_desc_style((config.font_family, config.axis_label_font_size))
        .label_style((config.font_family, config.tick_label_font_size))
        .draw()
        .map_err(|e| e.to_string())?;

    let complete_color = RGBColor(46, 139, 87);
    let cancelled_color = RGBColor(220, 20, 60);
    let waiting_color = RGBColor(169, 169, 169);

    let mut bars = Vec::new();
    for (idx, counts) in breakdown.values().enumerate() {
        let x0 = idx as f64 + 0.15;
        let x1 = idx as f64 + 0.85;
        let complete = counts.complete as f64;
        let cancelled = complete + counts.cancelled as f64;
        let waiting = cancelled + counts.waiting as f64;
        bars.push(Rectangle::new([(x0, 0.0), (x1, complete)], complete_color.filled()));
        bars.push(Rectangle::new([(x0, complete), (x1, cancelled)], cancelled_color.filled()));
        bars.push(Rectangle::new([(x0, cancelled), (x1, waiting)], waiting_color.filled()));
    }
    chart.draw_series(bars).map_err(|e| e.to_string())?;

    let legends = vec![
        ("complete".to_string(), complete_color),
        ("cancelled".to_string(), cancelled_color),
        ("waiting".to_string(), waiting_color),
    ];
    draw_legend(&legend_area, &legends, config)?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

/// RTT (top) and predicted loss / redundancy rate (bottom) per sample,
/// points colored by FEC state.
pub fn draw_tunnel_chart(
    samples: &[FecSample],
    title: &str,
    png_path: &Path,
    config: &PlottersConfig,
) -> Result<(), String> {
    let root = BitMapBackend::new(png_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;
    let (chart_area, legend_area) = root.split_horizontally(config.chart_width());
    let (rtt_area, loss_area) = chart_area.split_vertically(config.height / 2);

    let max_x = samples.len().max(1) as f64;
    let max_rtt = samples.iter().map(|s| s.rtt).fold(0.0_f64, f64::max).max(1.0);
    let max_rate = samples
        .iter()
        .map(|s| s.predict_loss_rate.max(s.redundancy_rate))
        .fold(0.0_f64, f64::max)
        .max(0.01);

    let mut rtt_chart = ChartBuilder::on(&rtt_area)
        .caption(title, (config.font_family, config.title_font_size).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_x, 0.0..max_rtt * 1.05)
        .map_err(|e| e.to_string())?;

    rtt_chart
        .configure_mesh()
        .y_desc("RTT (ms)")
        .axis_desc_style((config.font_family, config.axis_label_font_size))
        .label_style((config.font_family, config.tick_label_font_size))
        .draw()
        .map_err(|e| e.to_string())?;

    rtt_chart
        .draw_series(LineSeries::new(
            samples.iter().enumerate().map(|(i, s)| (i as f64, s.rtt)),
            RGBColor(65, 105, 225).stroke_width(2),
        ))
        .map_err(|e| e.to_string())?;
    rtt_chart
        .draw_series(samples.iter().enumerate().map(|(i, s)| {
            Circle::new((i as f64, s.rtt), config.point_size + 1, color_for_fec(s.fec).filled())
        }))
        .map_err(|e| e.to_string())?;

    let mut loss_chart = ChartBuilder::on(&loss_area)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_x, 0.0..max_rate * 1.05)
        .map_err(|e| e.to_string())?;

    loss_chart
        .configure_mesh()
        .x_desc("Sample")
        .y_desc("Rate")
        .axis_desc_style((config.font_family, config.axis_label_font_size))
        .label_style((config.font_family, config.tick_label_font_size))
        .draw()
        .map_err(|e| e.to_string())?;

    let loss_color = RGBColor(220, 20, 60);
    let redundancy_color = RGBColor(46, 139, 87);
    loss_chart
        .draw_series(LineSeries::new(
            samples.iter().enumerate().map(|(i, s)| (i as f64, s.predict_loss_rate)),
            loss_color.stroke_width(2),
        ))
        .map_err(|e| e.to_string())?;
    loss_chart
        .draw_series(LineSeries::new(
            samples.iter().enumerate().map(|(i, s)| (i as f64, s.redundancy_rate)),
            redundancy_color.stroke_width(2),
        ))
        .map_err(|e| e.to_string())?;

    let legends = vec![
        ("RTT".to_string(), RGBColor(65, 105, 225)),
        ("predicted loss".to_string(), loss_color),
        ("redundancy".to_string(), redundancy_color),
        (FecState::TimeShort.display_name(), color_for_fec(FecState::TimeShort)),
        (FecState::BandwidthAmple.display_name(), color_for_fec(FecState::BandwidthAmple)),
        (FecState::Disabled.display_name(), color_for_fec(FecState::Disabled)),
    ];
    draw_legend(&legend_area, &legends, config)?;
    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use plotters::{
    coord::Shift,
    drawing::DrawingAreaErrorKind,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use tracing::{debug, info};

use crate::{error::RenderError, series::ResultSeries, util::format_value};

const FONT: &str = "sans-serif";
const ANNOTATION_OFFSET: i32 = 10;
const LINE_WIDTH: u32 = 2;
const MARKER_SIZE: u32 = 5;
/// Headroom above the largest value so annotations stay inside the plot
const Y_HEADROOM: f64 = 1.15;
/// Pads the log axis by a quarter of a doubling on both ends
const X_PADDING: f64 = 1.189_207_115;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Display,
}

/// One panel of a [`Figure`]
#[derive(Debug, Clone)]
pub struct Chart {
    pub x_column: String,
    pub y_column: String,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub annotate: bool,
    /// Draw the legend even for a single series
    pub legend: bool,
    /// Line colour for a single-series chart, series otherwise take palette colours
    pub color: Option<RGBColor>,
    pub series: Vec<ResultSeries>,
}

impl Chart {
    pub fn new(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        let x_column = x_column.into();
        let y_column = y_column.into();
        Self {
            x_label: x_column.clone(),
            y_label: y_column.clone(),
            x_column,
            y_column,
            title: String::new(),
            annotate: true,
            legend: false,
            color: None,
            series: Vec::new(),
        }
    }

    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    pub fn legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn color(mut self, color: RGBColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_series(mut self, series: ResultSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn extend_series(mut self, series: impl IntoIterator<Item = ResultSeries>) -> Self {
        self.series.extend(series);
        self
    }

    pub fn has_legend(&self) -> bool {
        self.legend || self.series.len() > 1
    }

    fn series_color(&self, idx: usize) -> RGBAColor {
        match self.color {
            Some(color) if self.series.len() == 1 => color.to_rgba(),
            _ => Palette99::pick(idx).to_rgba(),
        }
    }

    /// Every series with its points, checking the columns exist and that x fits a log axis
    fn validated_points(&self) -> Result<Vec<(&ResultSeries, Vec<(f64, f64)>)>, RenderError> {
        if self.series.is_empty() {
            return Err(RenderError::EmptyChart(self.title.clone()));
        }

        self.series
            .iter()
            .map(|series| {
                let points = series.points(&self.x_column, &self.y_column)?;
                if let Some((x, _)) = points.iter().find(|(x, _)| x.is_nan() || *x <= 0.0) {
                    return Err(RenderError::NonPositiveX {
                        label: series.label().to_owned(),
                        column: self.x_column.clone(),
                        value: *x,
                    });
                }
                Ok((series, points))
            })
            .collect()
    }
}

/// Charts stacked top to bottom in one image
#[derive(Debug, Clone)]
pub struct Figure {
    pub size: (u32, u32),
    pub output: OutputTarget,
    pub charts: Vec<Chart>,
}

impl Figure {
    pub fn new(output: OutputTarget) -> Self {
        Self {
            size: (1000, 600),
            output,
            charts: Vec::new(),
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_chart(mut self, chart: Chart) -> Self {
        self.charts.push(chart);
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.charts.is_empty() {
            return Err(RenderError::EmptyFigure);
        }
        for chart in &self.charts {
            chart.validated_points()?;
        }
        Ok(())
    }
}

enum ImageFormat {
    Bitmap,
    Svg,
}

fn image_format(path: &Path) -> Result<ImageFormat, RenderError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png" | "jpg" | "jpeg" | "bmp") => Ok(ImageFormat::Bitmap),
        Some("svg") => Ok(ImageFormat::Svg),
        _ => Err(RenderError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Draws the figure to its output target.
///
/// Returns the path of the written image. For [`OutputTarget::Display`] the
/// image is kept in the temp directory and handed to the platform viewer.
pub fn render(figure: &Figure) -> Result<PathBuf, RenderError> {
    figure.validate()?;

    match &figure.output {
        OutputTarget::File(path) => {
            let format = image_format(path)?;
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }
            draw_to(path, format, figure)?;
            println!("Plot saved as: {}", path.display());
            Ok(path.clone())
        }
        OutputTarget::Display => {
            let file = tempfile::Builder::new()
                .prefix("kvs-plot-")
                .suffix(".png")
                .tempfile()?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            draw_to(&path, ImageFormat::Bitmap, figure)?;
            open_in_viewer(&path)?;
            Ok(path)
        }
    }
}

fn draw_to(path: &Path, format: ImageFormat, figure: &Figure) -> Result<(), RenderError> {
    debug!(
        "Drawing {} chart(s) at {:?} to {}",
        figure.charts.len(),
        figure.size,
        path.display()
    );
    match format {
        ImageFormat::Bitmap => {
            let root = BitMapBackend::new(path, figure.size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().map_err(drawing_error)
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, figure.size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().map_err(drawing_error)
        }
    }
}

fn drawing_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(drawing_error)?;
    let panels = root.split_evenly((figure.charts.len(), 1));
    for (area, chart) in panels.iter().zip(&figure.charts) {
        draw_chart(area, chart)?;
    }
    Ok(())
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn draw_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart: &Chart,
) -> Result<(), RenderError> {
    let series_points = chart.validated_points()?;

    let (x_min, x_max) = value_range(
        series_points
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(x, _)| *x)),
    )
    .unwrap_or((1.0, 2.0));
    let (y_min, y_max) = value_range(
        series_points
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(_, y)| *y)),
    )
    .unwrap_or((0.0, 1.0));
    let y_low = if y_min < 0.0 { y_min * Y_HEADROOM } else { 0.0 };
    let y_high = if y_max > 0.0 { y_max * Y_HEADROOM } else { 1.0 };

    let mut ctx = ChartBuilder::on(area)
        .margin(15)
        .caption(&chart.title, (FONT, 22))
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(
            ((x_min / X_PADDING)..(x_max * X_PADDING))
                .log_scale()
                .base(2.0),
            y_low..y_high,
        )
        .map_err(drawing_error)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&|x: &f64| format_value(*x))
        .y_label_formatter(&|y: &f64| format!("{y:.0}"))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(WHITE)
        .axis_desc_style((FONT, 16))
        .draw()
        .map_err(drawing_error)?;

    let annotation_style =
        TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));

    for (idx, (series, points)) in series_points.iter().enumerate() {
        let color = chart.series_color(idx);
        debug!("{}: {} points", series.label(), points.len());

        ctx.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(LINE_WIDTH),
        ))
        .map_err(drawing_error)?
        .label(series.label())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH))
        });

        ctx.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), MARKER_SIZE, color.filled())),
        )
        .map_err(drawing_error)?;

        if chart.annotate {
            ctx.draw_series(points.iter().map(|&(x, y)| {
                EmptyElement::at((x, y))
                    + Text::new(
                        format!("{y:.0}"),
                        (0, -ANNOTATION_OFFSET),
                        annotation_style.clone(),
                    )
            }))
            .map_err(drawing_error)?;
        }
    }

    if chart.has_legend() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.5))
            .label_font((FONT, 14))
            .draw()
            .map_err(drawing_error)?;
    }

    Ok(())
}

fn open_in_viewer(path: &Path) -> Result<(), RenderError> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };
    info!("Opening {}", path.display());
    let status = cmd.arg(path).status()?;
    if !status.success() {
        return Err(RenderError::Viewer {
            path: path.to_path_buf(),
            status: status.to_string(),
        });
    }
    Ok(())
}

use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{TAB_BLUE, TAB_ORANGE};
use crate::{
    error::Result,
    figure::{Figure, FigureSize},
};

pub const GROUPS: [&str; 5] = ["G1", "G2", "G3", "G4", "G5"];
pub const MEN_MEANS: [f64; 5] = [20., 35., 30., 35., -27.];
pub const WOMEN_MEANS: [f64; 5] = [25., 32., 34., 20., -25.];
pub const MEN_STD: [f64; 5] = [2., 3., 4., 1., 2.];
pub const WOMEN_STD: [f64; 5] = [3., 5., 2., 3., 3.];
const BAR_WIDTH: f64 = 0.35;

/// One layer of the stacked bars.
#[derive(Debug, Clone, Copy)]
struct Stack<'a> {
    label: &'a str,
    means: [f64; 5],
    std: [f64; 5],
    bottom: [f64; 5],
    color: RGBColor,
    edge_labels: bool,
}

impl Stack<'_> {
    fn top(&self, i: usize) -> f64 {
        self.bottom[i] + self.means[i]
    }
    /// Where the edge label is anchored: past the error bar, on the side the bar grows.
    fn edge_label_y(&self, i: usize) -> f64 {
        if self.means[i] >= 0. {
            self.top(i) + self.std[i]
        } else {
            self.top(i) - self.std[i]
        }
    }
    /// (lowest, highest) y touched by the bar at `i`, error bar included.
    fn extent(&self, i: usize) -> (f64, f64) {
        let (a, b) = (self.bottom[i], self.top(i));
        (a.min(b).min(b - self.std[i]), a.max(b).max(b + self.std[i]))
    }
}

fn stacks() -> [Stack<'static>; 2] {
    [
        Stack {
            label: "Men",
            means: MEN_MEANS,
            std: MEN_STD,
            bottom: [0.; 5],
            color: TAB_BLUE,
            edge_labels: false,
        },
        Stack {
            label: "Women",
            means: WOMEN_MEANS,
            std: WOMEN_STD,
            bottom: MEN_MEANS,
            color: TAB_ORANGE,
            edge_labels: true,
        },
    ]
}

fn group_label(x: f64) -> String {
    let i = x.round();
    if (x - i).abs() < 1e-6 && i >= 0. && (i as usize) < GROUPS.len() {
        GROUPS[i as usize].to_string()
    } else {
        String::new()
    }
}

fn value_label(v: f64) -> String {
    format!("{}", v)
}

pub fn draw(size: FigureSize) -> Result<Figure> {
    Figure::render(size, |root| draw_on(root, size))
}

pub fn draw_on<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, size: FigureSize) -> Result<()> {
    let stacks = stacks();
    let (mut y_min, mut y_max) = (0f64, 0f64);
    for stack in &stacks {
        for i in 0..GROUPS.len() {
            let (lo, hi) = stack.extent(i);
            y_min = y_min.min(lo);
            y_max = y_max.max(hi);
        }
    }
    let pad = (y_max - y_min) * 0.1;

    let mut chart = ChartBuilder::on(root)
        .caption("Scores by group and gender", size.font(12.))
        .margin(size.pt_px(8.))
        .x_label_area_size(size.pt_px(18.))
        .y_label_area_size(size.pt_px(36.))
        .build_cartesian_2d(-0.5f64..GROUPS.len() as f64 - 0.5, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(GROUPS.len())
        .x_label_formatter(&|x| group_label(*x))
        .y_desc("Scores")
        .label_style(size.font(9.))
        .axis_desc_style(size.font(10.))
        .draw()?;

    let label_font = size.font(9.);
    for stack in stacks {
        let half = BAR_WIDTH / 2.;
        let color = stack.color;
        chart
            .draw_series((0..GROUPS.len()).map(|i| {
                let x = i as f64;
                Rectangle::new(
                    [(x - half, stack.bottom[i]), (x + half, stack.top(i))],
                    color.filled(),
                )
            }))?
            .label(stack.label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled()));

        chart.draw_series((0..GROUPS.len()).map(|i| {
            let top = stack.top(i);
            ErrorBar::new_vertical(
                i as f64,
                top - stack.std[i],
                top,
                top + stack.std[i],
                BLACK.stroke_width(1),
                size.points_to_pixels(4.) as u32,
            )
        }))?;

        let centered = TextStyle::from(label_font.clone()).pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series((0..GROUPS.len()).map(|i| {
            Text::new(
                value_label(stack.means[i]),
                (i as f64, stack.bottom[i] + stack.means[i] / 2.),
                centered.clone(),
            )
        }))?;

        if stack.edge_labels {
            chart.draw_series((0..GROUPS.len()).map(|i| {
                let v_pos = if stack.means[i] >= 0. {
                    VPos::Bottom
                } else {
                    VPos::Top
                };
                Text::new(
                    value_label(stack.means[i]),
                    (i as f64, stack.edge_label_y(i)),
                    TextStyle::from(label_font.clone()).pos(Pos::new(HPos::Center, v_pos)),
                )
            }))?;
        }
    }

    chart.draw_series(LineSeries::new(
        [(-0.5, 0.), (GROUPS.len() as f64 - 0.5, 0.)],
        RGBColor(128, 128, 128).stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(size.font(9.))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[test]
fn group_labels_only_on_integer_ticks() {
    assert_eq!(group_label(0.), "G1");
    assert_eq!(group_label(4.), "G5");
    assert_eq!(group_label(0.5), "");
    assert_eq!(group_label(-1.), "");
    assert_eq!(group_label(5.), "");
}

#[test]
fn women_stack_on_men() {
    let [men, women] = stacks();
    assert_eq!(men.top(4), -27.);
    assert_eq!(women.top(4), -52.);
    assert_eq!(women.top(0), 45.);
    assert_eq!(women.extent(1), (35., 72.));
    assert_eq!(women.extent(4), (-55., -27.));
}

#[test]
fn edge_labels_clear_error_bars() {
    let [_, women] = stacks();
    // G2 grows up to 67 with a 5 point error bar, G5 grows down to -52 with 3
    assert_eq!(women.edge_label_y(1), 72.);
    assert_eq!(women.edge_label_y(4), -55.);
    for i in 0..GROUPS.len() {
        let (lo, hi) = women.extent(i);
        let y = women.edge_label_y(i);
        assert!(y == lo || y == hi);
    }
}

#[test]
fn values_print_like_integers() {
    assert_eq!(value_label(20.), "20");
    assert_eq!(value_label(-27.), "-27");
}

#[test]
fn renders_at_figure_size() {
    let figure = draw(FigureSize::default()).unwrap();
    assert_eq!((figure.width(), figure.height()), (620, 430));
}

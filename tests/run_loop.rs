use base64::{engine::general_purpose::STANDARD, Engine as _};
use demo_charts::{
    chart::{ChartKind, DemoContext},
    config::DemoConfig,
    controller::run,
    figure::{FigureSize, DATA_URI_PREFIX},
    price_data::CsvPrices,
};

fn run_lines(input: &str, ctx: &mut DemoContext) -> Vec<String> {
    let mut out = vec![];
    run(input.as_bytes(), &mut out, ctx).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn context() -> DemoContext {
    DemoContext::from_config(&DemoConfig::default())
}

fn decode_png(line: &str) -> image::RgbImage {
    let payload = line.strip_prefix(DATA_URI_PREFIX).expect("data uri prefix");
    let png = STANDARD.decode(payload).expect("valid base64");
    image::load_from_memory(&png).expect("valid png").to_rgb8()
}

#[test]
fn bar_label_request() {
    let lines = run_lines("Bar Label Demo\n", &mut context());
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Script started");
    assert_eq!(lines[1], "Drawing Bar Label Demo");
    assert_eq!(decode_png(&lines[2]).dimensions(), (620, 430));
    assert_eq!(lines[3], "Script ended");
}

#[test]
fn unknown_request_keeps_running() {
    let lines = run_lines("nonsense\nBar Label Demo\n", &mut context());
    assert_eq!(
        &lines[..3],
        ["Script started", "Drawing nonsense", "Unknown chart"]
    );
    assert_eq!(lines[3], "Drawing Bar Label Demo");
    assert!(lines[4].starts_with(DATA_URI_PREFIX));
    assert_eq!(lines[5], "Script ended");
    assert_eq!(lines.len(), 6);
}

#[test]
fn empty_input() {
    assert_eq!(run_lines("", &mut context()), ["Script started", "Script ended"]);
}

#[test]
fn every_chart_with_crlf_and_unterminated_last_line() {
    let input = format!(
        "{}\r\n{}\n{}",
        ChartKind::Coherence.name(),
        ChartKind::BarLabel.name(),
        ChartKind::Scatter.name()
    );
    let lines = run_lines(&input, &mut context());
    assert_eq!(lines.len(), 8);
    for (i, kind) in [ChartKind::Coherence, ChartKind::BarLabel, ChartKind::Scatter]
        .into_iter()
        .enumerate()
    {
        assert_eq!(lines[1 + 2 * i], format!("Drawing {}", kind));
        assert_eq!(decode_png(&lines[2 + 2 * i]).dimensions(), (620, 430));
    }
}

#[test]
fn same_seed_same_output() {
    let input = "Plotting the coherence of two signals\nPlotting the coherence of two signals\n";
    let first = run_lines(input, &mut context());
    let second = run_lines(input, &mut context());
    assert_eq!(first, second);
    // one generator for the whole run, so repeated requests differ
    assert_ne!(first[2], first[4]);
}

#[test]
fn configured_size() {
    let config = DemoConfig {
        width_px: 310,
        height_px: 215,
        ..DemoConfig::default()
    };
    let lines = run_lines("Scatter Demo2\n", &mut DemoContext::from_config(&config));
    assert_eq!(decode_png(&lines[2]).dimensions(), (310, 215));
}

#[test]
fn missing_price_data_aborts() {
    let mut ctx = DemoContext::new(
        1,
        FigureSize::default(),
        Box::new(CsvPrices::new("./data/no_such_prices.csv")),
    );
    let mut out = vec![];
    assert!(run("Scatter Demo2\n".as_bytes(), &mut out, &mut ctx).is_err());
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out, "Script started\nDrawing Scatter Demo2\n");
}

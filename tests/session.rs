use std::fs;
use std::time::Duration;
use thermalprinter::{
    Barcode, BarcodeOptions, BarcodePosition, CodePage, Justify, MemoryPort, OutOptions, Printer,
    PrinterConfig, PrinterError, PrinterMode, Raster, Size, Stats, Style, Underline,
};

const ESC: u8 = 27;
const GS: u8 = 29;

fn assert_close(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(
        diff <= Duration::from_micros(1),
        "{:?} != {:?}",
        actual,
        expected
    );
}

fn printer() -> Printer<MemoryPort> {
    let config = PrinterConfig::default().with_stats(false);
    let mut printer = Printer::with_port(MemoryPort::new(), &config).unwrap();
    printer.port_mut().take_written();
    printer.port_mut().clear_waits();
    printer
}

#[test]
fn test_out_plain_text() {
    let mut p = printer();
    p.out("Hi").unwrap();
    assert_eq!(p.port().written(), &[72, 105, 10]);
    assert_eq!(p.lines(), 1);
    let feed = p.pacing().dot_feed_time * 24;
    assert_eq!(p.port().waits(), &[feed]);
}

#[test]
fn test_out_without_line_feed() {
    let mut p = printer();
    p.out_with("Hi", &OutOptions::default().line_feed(false))
        .unwrap();
    assert_eq!(p.port().written(), b"Hi");
    assert_eq!(p.lines(), 0);
}

#[test]
fn test_out_overrides_are_restored() {
    let mut p = printer();
    let style = Style::new().justify(Justify::Center).inverse(true);
    p.out_with("A", &OutOptions::default().style(style)).unwrap();
    assert_eq!(
        p.port().written(),
        &[ESC, b'a', 1, GS, b'B', 1, 65, 10, GS, b'B', 0, ESC, b'a', 0]
    );
    assert_eq!(p.mode().justify, Justify::Left);
    assert!(!p.mode().inverse);
}

#[test]
fn test_out_override_already_active_costs_nothing() {
    let mut p = printer();
    let style = Style::new().bold(false).underline(Underline::Off);
    p.out_with("A", &OutOptions::default().style(style)).unwrap();
    assert_eq!(p.port().written(), &[65, 10]);
}

#[test]
fn test_out_invalid_override_sends_nothing() {
    let mut p = printer();
    let style = Style::new().bold(true).left_margin(48);
    let err = p
        .out_with("A", &OutOptions::default().style(style))
        .unwrap_err();
    assert!(matches!(err, PrinterError::Value(_)));
    assert!(p.port().written().is_empty());
    assert_eq!(p.mode(), &PrinterMode::default());
}

#[test]
fn test_lines_count_double_for_big_sizes() {
    let mut p = printer();
    p.out("one\ntwo").unwrap();
    assert_eq!(p.lines(), 2);
    p.size(Size::Medium).unwrap();
    p.out("three").unwrap();
    assert_eq!(p.lines(), 4);
    p.out_with(
        "four\nfive",
        &OutOptions::default().style(Style::new().size(Size::Large)),
    )
    .unwrap();
    assert_eq!(p.lines(), 8);
    // the override went back to the default size
    assert_eq!(p.mode().size, Size::Small);
}

#[test]
fn test_out_numbers_and_bytes() {
    let mut p = printer();
    p.out(42).unwrap();
    p.out_with(&[0x1Bu8, 0x40], &OutOptions::default().line_feed(false))
        .unwrap();
    assert_eq!(p.port().written(), &[b'4', b'2', 10, 0x1B, 0x40]);
}

#[test]
fn test_out_uses_current_codepage() {
    let mut p = printer();
    p.out_with(
        "é",
        &OutOptions::default().style(Style::new().codepage(CodePage::Iso8859_1)),
    )
    .unwrap();
    assert_eq!(
        p.port().written(),
        &[ESC, b't', 23, 0xE9, 10, ESC, b't', 0]
    );
}

#[test]
fn test_persian() {
    let mut p = printer();
    p.out_with("سلام", &OutOptions::default().persian(true))
        .unwrap();
    let written = p.port().written().to_vec();
    assert_eq!(&written[..6], &[ESC, b't', 10, ESC, b'a', 2]);
    assert_eq!(&written[written.len() - 7..], &[10, ESC, b't', 0, ESC, b'a', 0]);
    let text = &written[6..written.len() - 7];
    assert!(!text.is_empty());
    assert!(text.iter().all(|&b| b >= 0x80));
    assert_eq!(p.mode().codepage, CodePage::Cp437);
    assert_eq!(p.mode().justify, Justify::Left);
}

#[test]
fn test_barcode() {
    let mut p = printer();
    p.barcode("01234567", Barcode::JAN8).unwrap();
    assert_eq!(
        p.port().written(),
        &[GS, b'k', 68, 8, 48, 49, 50, 51, 52, 53, 54, 55]
    );
    // 162 dots high with 30 dots line spacing
    assert_eq!(p.lines(), 6);
    let printing = p.pacing().dot_print_time.mul_f64(162.0 / 30.0);
    assert_eq!(p.port().waits().last(), Some(&printing));
    assert_close(printing, Duration::from_micros(162_000));
}

#[test]
fn test_invalid_barcode_sends_nothing() {
    let mut p = printer();
    let err = p.barcode("0123456789ab", Barcode::JAN13).unwrap_err();
    assert!(matches!(err, PrinterError::Value(_)));
    let err = p
        .barcode_with("1", Barcode::Itf, BarcodeOptions::default().height(80))
        .unwrap_err();
    assert!(matches!(err, PrinterError::Value(_)));
    assert!(p.port().written().is_empty());
    assert_eq!(p.lines(), 0);
    assert_eq!(p.mode().barcode_height, 162);
}

#[test]
fn test_barcode_options_stick() {
    let mut p = printer();
    let options = BarcodeOptions::default()
        .height(60)
        .width(2)
        .left_margin(10)
        .position(BarcodePosition::Below);
    p.barcode_with("12", Barcode::Itf, options).unwrap();
    assert_eq!(
        p.port().written(),
        &[
            GS, b'h', 60, GS, b'w', 2, GS, b'x', 10, GS, b'H', 2, GS, b'k', 70, 2, b'1', b'2'
        ]
    );
    assert_eq!(p.mode().barcode_height, 60);
    assert_eq!(p.mode().barcode_position, BarcodePosition::Below);
    assert_eq!(p.lines(), 3);

    let err = p
        .barcode_with("12", Barcode::Itf, BarcodeOptions::default().width(7))
        .unwrap_err();
    assert!(matches!(err, PrinterError::Value(_)));
}

#[test]
fn test_raster_header() {
    let mut p = printer();
    let raster = Raster::from_packed(16, 60, &[0xAA; 2 * 60]).unwrap();
    p.raster(&raster).unwrap();
    let written = p.port().written();
    assert_eq!(&written[..8], &[GS, b'v', 48, 0, 2, 0, 60, 0]);
    assert_eq!(written.len(), 8 + 120);
    assert_eq!(p.lines(), 3);
    // 60 rows at 30 dots line spacing: two lines of printing
    let printing = p.pacing().dot_print_time * 2;
    assert_close(*p.port().waits().last().unwrap(), printing);
    assert_close(printing, Duration::from_millis(60));
}

#[test]
fn test_raster_empty_is_rejected() {
    let mut p = printer();
    assert!(matches!(
        p.raster(&Raster::new(0, 10)),
        Err(PrinterError::Value(_))
    ));
    assert!(p.port().written().is_empty());
}

#[cfg(feature = "image")]
#[test]
fn test_large_image_is_scaled_down() {
    let mut p = printer();
    let img = image::DynamicImage::new_rgb8(900, 900);
    p.image(&img).unwrap();
    let written = p.port().written();
    let row_bytes = u16::from_le_bytes([written[4], written[5]]);
    let height = u16::from_le_bytes([written[6], written[7]]);
    assert_eq!((row_bytes, height), (48, 384));
    assert_eq!(written.len(), 8 + 48 * 384);
}

#[cfg(feature = "image")]
#[test]
fn test_missing_image_file() {
    let mut p = printer();
    let err = p.image_file("/nonexistent/picture.png").unwrap_err();
    assert!(matches!(err, PrinterError::Image(_)));
    assert!(p.port().written().is_empty());
}

#[test]
fn test_reset_after_anything_gives_defaults() {
    let mut p = printer();
    p.reset().unwrap();
    p.bold(true).unwrap();
    p.justify(Justify::Right).unwrap();
    p.double_width(true).unwrap();
    p.left_margin(12).unwrap();
    p.barcode_height(20).unwrap();
    p.chinese(true).unwrap();
    p.sleep(5).unwrap();
    p.out("text").unwrap();
    p.reset().unwrap();
    assert_eq!(p.mode(), &PrinterMode::default());
    assert_eq!(p.port().written()[..2], [ESC, b'@']);
    assert_eq!(p.port().written()[p.port().written().len() - 2..], [ESC, b'@']);
}

#[test]
fn test_stats_are_saved_on_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.json");
    fs::write(&path, r#"{"feeds": 10, "lines": 100}"#).unwrap();

    let config = PrinterConfig::default().with_stats_path(&path);
    let mut p = Printer::with_port(MemoryPort::new(), &config).unwrap();
    p.out("a\nb").unwrap();
    p.feed(3).unwrap();
    p.close().unwrap();
    assert_eq!((p.lines(), p.feeds()), (0, 0));
    assert_eq!(Stats::load(&path).unwrap(), Stats { feeds: 13, lines: 102 });

    // a second close does not count twice
    p.close().unwrap();
    assert_eq!(Stats::load(&path).unwrap(), Stats { feeds: 13, lines: 102 });
}

#[test]
fn test_stats_are_saved_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.json");
    {
        let config = PrinterConfig::default().with_stats_path(&path);
        let mut p = Printer::with_port(MemoryPort::new(), &config).unwrap();
        p.feed(1).unwrap();
    }
    assert_eq!(Stats::load(&path).unwrap(), Stats { feeds: 1, lines: 0 });
}

#[test]
fn test_idle_session_leaves_no_stats_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.json");
    let config = PrinterConfig::default().with_stats_path(&path);
    let mut p = Printer::with_port(MemoryPort::new(), &config).unwrap();
    p.close().unwrap();
    assert!(!path.exists());
}

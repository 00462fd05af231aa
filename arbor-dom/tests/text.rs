use arbor_dom::text::{display_width, truncate_to_width};
use arbor_dom::{lines, Buffer, Element};

fn sample() -> Element {
    Element::list("root")
        .child(
            Element::item("a")
                .class("selected")
                .child(Element::toggle("a:toggle", "▾"))
                .child(Element::title("a:title", "Alpha"))
                .child(
                    Element::list("a::children").child(
                        Element::item("b").child(Element::title("b:title", "Beta")),
                    ),
                ),
        )
        .child(
            Element::item("c")
                .child(Element::toggle("c:toggle", "▸"))
                .child(Element::title("c:title", "Gamma"))
                .child(Element::placeholder("c:loading", "Loading…")),
        )
}

// ============================================================================
// Line projection
// ============================================================================

#[test]
fn test_lines_follow_display_order() {
    let rows = lines(&sample());
    let texts: Vec<_> = rows.iter().map(|l| (l.depth, l.text.as_str())).collect();
    assert_eq!(
        texts,
        vec![
            (0, "▾ Alpha"),
            (1, "Beta"),
            (0, "▸ Gamma"),
            (1, "Loading…"),
        ]
    );
    assert!(rows[0].has_class("selected"));
}

// ============================================================================
// Painting
// ============================================================================

#[test]
fn test_paint_indents_and_inverts_selection() {
    let rows = lines(&sample());
    let mut buf = Buffer::new(20, 4);
    buf.paint_lines(&rows, 0);

    assert_eq!(buf.row_text(0), "▾ Alpha");
    assert_eq!(buf.row_text(1), "  Beta");

    let selected = buf.get(0, 0).unwrap();
    let plain = buf.get(2, 1).unwrap();
    assert_ne!(selected.bg, plain.bg);
}

#[test]
fn test_paint_respects_scroll_and_width() {
    let rows = lines(&sample());
    let mut buf = Buffer::new(5, 2);
    buf.paint_lines(&rows, 2);

    assert_eq!(buf.row_text(0), "▸ Ga…");
    assert_eq!(buf.row_text(1), "  Lo…");
}

#[test]
fn test_truncate_to_width() {
    assert_eq!(truncate_to_width("hello", 10), "hello");
    assert_eq!(truncate_to_width("hello world", 6), "hello…");
    assert_eq!(display_width("日本"), 4);
}
